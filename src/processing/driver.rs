use tracing::warn;

use super::spectrum_extractor::{Extraction, SpectrumExtractor};
use crate::data::{SampleHistory, SpectrumSlice, WindowType};
use crate::error::{Result, ScopeError};

/// Walks the extractor over the stream in `hop_length` steps.
///
/// Every call to [`drain`](Self::drain) consumes all windows that have become
/// complete, so bursty input never leaves a backlog behind.
pub struct SpectrumDriver {
    extractor: SpectrumExtractor,
    hop_length: usize,
    next_offset: u64,
    slice: SpectrumSlice,
    frames_extracted: u64,
}

impl SpectrumDriver {
    pub fn new(
        channels: usize,
        window_length: usize,
        hop_length: usize,
        window_type: WindowType,
    ) -> Result<Self> {
        if hop_length == 0 || hop_length >= window_length {
            return Err(ScopeError::InvalidConfig(format!(
                "hop_length must be in 1..{} (got {})",
                window_length, hop_length
            )));
        }
        let extractor = SpectrumExtractor::new(window_length, window_type)?;
        let slice = SpectrumSlice::new(channels, extractor.spectrum_len());

        Ok(Self {
            extractor,
            hop_length,
            next_offset: 0,
            slice,
            frames_extracted: 0,
        })
    }

    /// Stream position of the next window to analyse.
    #[inline]
    pub fn next_offset(&self) -> u64 {
        self.next_offset
    }

    #[inline]
    pub fn hop_length(&self) -> usize {
        self.hop_length
    }

    pub fn frames_extracted(&self) -> u64 {
        self.frames_extracted
    }

    /// Most recent successful slice.
    pub fn last_slice(&self) -> &SpectrumSlice {
        &self.slice
    }

    /// Start over at stream position 0 with `channels` channels.
    pub fn reset(&mut self, channels: usize) {
        self.next_offset = 0;
        self.frames_extracted = 0;
        self.slice = SpectrumSlice::new(channels, self.extractor.spectrum_len());
    }

    /// Extract every window now available in `buffers`, handing each slice to
    /// `on_slice` in stream order. Returns the number of slices produced.
    pub fn drain<H, F>(&mut self, buffers: &[H], mut on_slice: F) -> Result<usize>
    where
        H: SampleHistory,
        F: FnMut(&SpectrumSlice) -> Result<()>,
    {
        let mut produced = 0;
        loop {
            match self.extractor.try_extract(buffers, self.next_offset, &mut self.slice) {
                Ok(Extraction::Ready) => {
                    on_slice(&self.slice)?;
                    self.next_offset += self.hop_length as u64;
                    self.frames_extracted += 1;
                    produced += 1;
                }
                Ok(Extraction::Pending) => return Ok(produced),
                Err(ScopeError::WindowEvicted { requested, oldest }) => {
                    warn!(
                        "analysis fell behind the ring buffer: skipping samples {}..{}",
                        requested, oldest
                    );
                    self.next_offset = oldest;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ChannelBuffer;

    fn filled(count: usize, max: usize) -> ChannelBuffer {
        let mut buffer = ChannelBuffer::new(max);
        for i in 0..count {
            buffer.push((i % 200) as i16);
        }
        buffer.trim();
        buffer
    }

    #[test]
    fn test_drains_every_available_window() {
        let mut driver = SpectrumDriver::new(1, 400, 320, WindowType::Hamming).unwrap();
        // Windows at 0, 320, 640 need more than 400, 720, 1040 samples
        let buffers = vec![filled(1041, 100_000)];

        let mut offsets = Vec::new();
        let produced = driver
            .drain(&buffers, |slice| {
                offsets.push(slice.window_offset);
                Ok(())
            })
            .unwrap();

        assert_eq!(produced, 3);
        assert_eq!(offsets, vec![0, 320, 640]);
        assert_eq!(driver.next_offset(), 960);
        assert_eq!(driver.frames_extracted(), 3);

        // Nothing new arrived: nothing more to do
        assert_eq!(driver.drain(&buffers, |_| Ok(())).unwrap(), 0);
    }

    #[test]
    fn test_incremental_drain_matches_single_pass() {
        let full = filled(5000, 100_000);

        let mut single = SpectrumDriver::new(1, 400, 320, WindowType::Hamming).unwrap();
        let mut expected = Vec::new();
        single
            .drain(std::slice::from_ref(&full), |s| {
                expected.push(s.clone());
                Ok(())
            })
            .unwrap();

        let mut stepped = SpectrumDriver::new(1, 400, 320, WindowType::Hamming).unwrap();
        let mut actual = Vec::new();
        for end in (0..=5000).step_by(333) {
            let partial = full.snapshot_from(0);
            let partial = crate::data::ChannelSnapshot {
                start: 0,
                samples: partial.samples[..end].to_vec(),
            };
            stepped
                .drain(&[partial], |s| {
                    actual.push(s.clone());
                    Ok(())
                })
                .unwrap();
        }
        stepped
            .drain(std::slice::from_ref(&full), |s| {
                actual.push(s.clone());
                Ok(())
            })
            .unwrap();

        assert_eq!(actual, expected);
    }

    #[test]
    fn test_resyncs_after_eviction() {
        let mut driver = SpectrumDriver::new(1, 16, 8, WindowType::Hamming).unwrap();
        let buffers = vec![filled(100, 40)]; // retains 60..100

        let mut offsets = Vec::new();
        driver
            .drain(&buffers, |s| {
                offsets.push(s.window_offset);
                Ok(())
            })
            .unwrap();
        assert_eq!(offsets, vec![60, 68, 76]);
    }

    #[test]
    fn test_callback_errors_stop_the_drain() {
        let mut driver = SpectrumDriver::new(1, 16, 8, WindowType::Hamming).unwrap();
        let buffers = vec![filled(100, 1000)];
        let err = driver
            .drain(&buffers, |_| Err(ScopeError::ChannelMismatch { expected: 1, actual: 2 }))
            .unwrap_err();
        assert!(matches!(err, ScopeError::ChannelMismatch { .. }));
        assert_eq!(driver.next_offset(), 0);
    }

    #[test]
    fn test_rejects_hop_without_overlap() {
        assert!(SpectrumDriver::new(1, 400, 400, WindowType::Hamming).is_err());
        assert!(SpectrumDriver::new(1, 400, 0, WindowType::Hamming).is_err());
    }

    #[test]
    fn test_reset_restarts_at_zero() {
        let mut driver = SpectrumDriver::new(1, 16, 8, WindowType::Hamming).unwrap();
        driver.drain(&[filled(100, 1000)], |_| Ok(())).unwrap();
        assert!(driver.next_offset() > 0);
        driver.reset(2);
        assert_eq!(driver.next_offset(), 0);
        assert_eq!(driver.last_slice().num_channels(), 2);
    }
}
