use crate::data::{Point, SampleHistory, WaveformPoints};

/// Maps the newest samples of each channel onto a polyline.
///
/// Stateless: each call reads at most `point_budget` samples per channel, no
/// matter how much history the buffers hold.
pub struct WaveformSampler;

impl WaveformSampler {
    /// Channel `c` gets the horizontal band `[c, c + 1) * view_height / channels`,
    /// centred on its middle row; a full-scale sample touches the band edge.
    /// Sample `i` of the tail sits at `x = i * view_width / point_budget`.
    pub fn sample<H: SampleHistory>(
        buffers: &[H],
        point_budget: usize,
        view_width: f32,
        view_height: f32,
    ) -> WaveformPoints {
        let channels = buffers.len();
        let drawable = view_width.is_finite()
            && view_height.is_finite()
            && view_width > 0.0
            && view_height > 0.0;
        if channels == 0 || point_budget == 0 || !drawable {
            return WaveformPoints {
                channels: vec![Vec::new(); channels],
            };
        }

        let band = view_height / channels as f32;
        let half = band * 0.5;
        let dx = view_width / point_budget as f32;
        let scale = half / i16::MAX as f32;

        let lines = buffers
            .iter()
            .enumerate()
            .map(|(channel, buffer)| {
                let count = point_budget.min(buffer.len());
                let start = buffer.end_position() - count as u64;

                let top = band * channel as f32;
                let bottom = top + band;
                let center = top + half;

                buffer
                    .samples_from(start)
                    .take(count)
                    .enumerate()
                    .map(|(i, s)| Point {
                        x: dx * i as f32,
                        y: (center - s as f32 * scale).clamp(top, bottom),
                    })
                    .collect()
            })
            .collect();

        WaveformPoints { channels: lines }
    }
}
