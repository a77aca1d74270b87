use tracing::debug;

use crate::data::{Rgb, SpectrumSlice, WaterfallImage};
use crate::error::{Result, ScopeError};

const BACKGROUND: Rgb = [0, 0, 0];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChannel {
    Red,
    #[default]
    Green,
    Blue,
}

/// Maps an intensity to a pixel: the tinted channel carries the intensity, the
/// other two sit at `baseline`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tint {
    pub channel: ColorChannel,
    pub baseline: u8,
}

impl Tint {
    #[inline]
    pub fn color(self, intensity: u8) -> Rgb {
        let mut rgb = [self.baseline; 3];
        let idx = match self.channel {
            ColorChannel::Red => 0,
            ColorChannel::Green => 1,
            ColorChannel::Blue => 2,
        };
        rgb[idx] = intensity;
        rgb
    }
}

/// `magnitude * 255`, clamped to a byte.
#[inline]
pub fn intensity(magnitude: f64) -> u8 {
    (magnitude * 255.0).clamp(0.0, 255.0) as u8
}

/// Scrolling spectrogram. Each pushed slice shifts the image left by
/// `scroll_step` columns and paints the freed columns on the right.
pub struct WaterfallCompositor {
    image: WaterfallImage,
    channels: usize,
    scroll_step: usize,
    tint: Tint,
    /// (channel, bin) for every image row, rebuilt when the bin count changes
    row_bins: Vec<(usize, usize)>,
    row_bins_len: usize,
    slices_pushed: u64,
}

impl WaterfallCompositor {
    pub fn new(width: usize, height: usize, scroll_step: usize, channels: usize, tint: Tint) -> Self {
        Self {
            image: WaterfallImage::new(width, height, BACKGROUND),
            channels,
            scroll_step,
            tint,
            row_bins: Vec::new(),
            row_bins_len: 0,
            slices_pushed: 0,
        }
    }

    #[inline]
    pub fn scroll_step(&self) -> usize {
        self.scroll_step
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn slices_pushed(&self) -> u64 {
        self.slices_pushed
    }

    /// Blank image for a new session with `channels` bands.
    pub fn reset(&mut self, channels: usize) {
        self.image.fill(BACKGROUND);
        self.channels = channels;
        self.row_bins.clear();
        self.row_bins_len = 0;
        self.slices_pushed = 0;
    }

    /// Read-only copy of the current image.
    pub fn current_image(&self) -> WaterfallImage {
        self.image.clone()
    }

    pub fn push_slice(&mut self, slice: &SpectrumSlice) -> Result<()> {
        if slice.num_channels() != self.channels {
            return Err(ScopeError::ChannelMismatch {
                expected: self.channels,
                actual: slice.num_channels(),
            });
        }
        let bins = slice.num_bins();
        if let Some(bad) = slice.channels.iter().find(|f| f.len() != bins || bins == 0) {
            return Err(ScopeError::FrameLength {
                expected: bins.max(1),
                actual: bad.len(),
            });
        }

        self.scroll();
        self.paint(slice);
        self.slices_pushed += 1;
        Ok(())
    }

    fn scroll(&mut self) {
        self.image.scroll_left(self.scroll_step);
    }

    fn paint(&mut self, slice: &SpectrumSlice) {
        let bins = slice.num_bins();
        if self.row_bins_len != bins || self.row_bins.len() != self.image.height() {
            self.rebuild_row_bins(bins);
        }

        let width = self.image.width();
        let x0 = width.saturating_sub(self.scroll_step);
        for (y, &(channel, bin)) in self.row_bins.iter().enumerate() {
            let magnitude = slice.channels[channel].magnitudes[bin];
            let color = self.tint.color(intensity(magnitude));
            self.image.fill_row_from(y, x0, color);
        }
    }

    /// Split the height into equal bands (channel 0 on top) and map each row's
    /// fractional position in its band to the nearest bin, DC on the band's
    /// top row.
    fn rebuild_row_bins(&mut self, bins: usize) {
        let height = self.image.height();
        let channels = self.channels.max(1);

        self.row_bins.clear();
        for channel in 0..channels {
            let band_start = channel * height / channels;
            let band_end = (channel + 1) * height / channels;
            let band_rows = band_end - band_start;

            for row in 0..band_rows {
                let t = if band_rows > 1 {
                    row as f64 / (band_rows - 1) as f64
                } else {
                    0.0
                };
                let bin = (t * (bins - 1) as f64).round() as usize;
                self.row_bins.push((channel, bin.min(bins - 1)));
            }
        }
        self.row_bins_len = bins;
        debug!("waterfall row map rebuilt: {} rows, {} bins, {} channel(s)", height, bins, channels);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SpectrumFrame;

    fn slice_of(channels: &[Vec<f64>]) -> SpectrumSlice {
        SpectrumSlice {
            channels: channels
                .iter()
                .map(|m| SpectrumFrame { magnitudes: m.clone() })
                .collect(),
            window_offset: 0,
        }
    }

    /// Slice whose every bin has the same magnitude, so each pushed column has
    /// a recognizable green level.
    fn flat(level: u8, bins: usize) -> SpectrumSlice {
        slice_of(&[vec![(level as f64 + 0.5) / 255.0; bins]])
    }

    fn green_column(image: &WaterfallImage, x: usize) -> Vec<u8> {
        (0..image.height()).map(|y| image.pixel(x, y).unwrap()[1]).collect()
    }

    #[test]
    fn test_intensity_clamps() {
        assert_eq!(intensity(-1.0), 0);
        assert_eq!(intensity(0.5), 127);
        assert_eq!(intensity(1.0), 255);
        assert_eq!(intensity(40.0), 255);
        assert_eq!(intensity(f64::NAN), 0);
    }

    #[test]
    fn test_tint_colors() {
        let tint = Tint { channel: ColorChannel::Blue, baseline: 16 };
        assert_eq!(tint.color(200), [16, 16, 200]);
        assert_eq!(Tint::default().color(9), [0, 9, 0]);
    }

    #[test]
    fn test_paints_rightmost_columns_only() {
        let mut waterfall = WaterfallCompositor::new(20, 4, 5, 1, Tint::default());
        waterfall.push_slice(&flat(100, 8)).unwrap();

        let image = waterfall.current_image();
        for x in 0..15 {
            assert_eq!(green_column(&image, x), vec![0; 4]);
        }
        for x in 15..20 {
            assert_eq!(green_column(&image, x), vec![100; 4]);
            assert_eq!(image.pixel(x, 0), Some([0, 100, 0]));
        }
    }

    #[test]
    fn test_k_pushes_shift_previous_content() {
        let (width, height, dx) = (30, 6, 4);
        let mut waterfall = WaterfallCompositor::new(width, height, dx, 1, Tint::default());
        for level in [10, 20, 30] {
            waterfall.push_slice(&flat(level, 16)).unwrap();
        }
        let before = waterfall.current_image();

        let levels = [40u8, 50, 60, 70];
        for &level in &levels {
            waterfall.push_slice(&flat(level, 16)).unwrap();
        }
        let after = waterfall.current_image();
        let shift = levels.len() * dx;

        for x in 0..width - shift {
            for y in 0..height {
                assert_eq!(after.pixel(x, y), before.pixel(x + shift, y));
            }
        }
        for (k, &level) in levels.iter().enumerate() {
            let first = width - shift + k * dx;
            for x in first..first + dx {
                assert_eq!(green_column(&after, x), vec![level; height]);
            }
        }
        assert_eq!(waterfall.slices_pushed(), 7);
    }

    #[test]
    fn test_rows_map_bins_within_each_channel_band() {
        // Two channels, 10 rows: rows 0..5 for channel 0, 5..10 for channel 1
        let bins = 9;
        let ramp: Vec<f64> = (0..bins).map(|i| (i as f64 + 0.5) / 255.0).collect();
        let reversed: Vec<f64> = ramp.iter().rev().copied().collect();
        let mut waterfall = WaterfallCompositor::new(4, 10, 1, 2, Tint::default());
        waterfall.push_slice(&slice_of(&[ramp, reversed])).unwrap();

        let column = green_column(&waterfall.current_image(), 3);
        // t = 0, .25, .5, .75, 1 -> bins 0, 2, 4, 6, 8
        assert_eq!(column[..5].to_vec(), vec![0, 2, 4, 6, 8]);
        assert_eq!(column[5..].to_vec(), vec![8, 6, 4, 2, 0]);
    }

    #[test]
    fn test_uneven_bands_cover_every_row() {
        let mut waterfall = WaterfallCompositor::new(2, 7, 1, 2, Tint::default());
        let slice = slice_of(&[vec![1.0; 4], vec![1.0; 4]]);
        waterfall.push_slice(&slice).unwrap();
        assert_eq!(green_column(&waterfall.current_image(), 1), vec![255; 7]);
    }

    #[test]
    fn test_scroll_step_covering_width_repaints_everything() {
        let mut waterfall = WaterfallCompositor::new(5, 2, 5, 1, Tint::default());
        waterfall.push_slice(&flat(10, 4)).unwrap();
        waterfall.push_slice(&flat(20, 4)).unwrap();
        let image = waterfall.current_image();
        for x in 0..5 {
            assert_eq!(green_column(&image, x), vec![20, 20]);
        }
    }

    #[test]
    fn test_rejects_mismatched_slices() {
        let mut waterfall = WaterfallCompositor::new(8, 4, 2, 2, Tint::default());
        assert!(matches!(
            waterfall.push_slice(&flat(1, 4)),
            Err(ScopeError::ChannelMismatch { expected: 2, actual: 1 })
        ));
        assert!(matches!(
            waterfall.push_slice(&slice_of(&[vec![0.0; 4], vec![0.0; 3]])),
            Err(ScopeError::FrameLength { .. })
        ));
        assert!(matches!(
            waterfall.push_slice(&slice_of(&[vec![], vec![]])),
            Err(ScopeError::FrameLength { .. })
        ));
        assert_eq!(waterfall.slices_pushed(), 0);
        assert_eq!(waterfall.current_image(), WaterfallImage::new(8, 4, BACKGROUND));
    }

    #[test]
    fn test_reset_blanks_image() {
        let mut waterfall = WaterfallCompositor::new(4, 2, 2, 1, Tint::default());
        waterfall.push_slice(&flat(50, 4)).unwrap();
        waterfall.reset(2);
        assert_eq!(waterfall.channels(), 2);
        assert_eq!(waterfall.slices_pushed(), 0);
        assert_eq!(waterfall.current_image(), WaterfallImage::new(4, 2, BACKGROUND));
    }
}
