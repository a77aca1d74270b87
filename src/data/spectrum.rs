/// Magnitude spectrum of one channel's window, DC first, Nyquist half only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpectrumFrame {
    pub magnitudes: Vec<f64>,
}

impl SpectrumFrame {
    pub fn with_capacity(bins: usize) -> Self {
        Self {
            magnitudes: Vec::with_capacity(bins),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.magnitudes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }

    /// Index of the strongest bin, first one wins on ties.
    pub fn peak_bin(&self) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, &m) in self.magnitudes.iter().enumerate() {
            if best.is_none_or(|(_, b)| m > b) {
                best = Some((i, m));
            }
        }
        best.map(|(i, _)| i)
    }

    pub fn peak_magnitude(&self) -> f64 {
        self.magnitudes.iter().copied().fold(0.0, f64::max)
    }
}

/// One point in time: a spectrum frame per channel, in channel order.
///
/// Storage is sized once per session and refilled in place by the extractor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpectrumSlice {
    pub channels: Vec<SpectrumFrame>,
    /// Stream position of the first sample of the analysed window.
    pub window_offset: u64,
}

impl SpectrumSlice {
    pub fn new(channels: usize, bins: usize) -> Self {
        Self {
            channels: (0..channels).map(|_| SpectrumFrame::with_capacity(bins)).collect(),
            window_offset: 0,
        }
    }

    #[inline]
    pub fn num_channels(&self) -> usize {
        self.channels.len()
    }

    /// Bin count shared by every channel (0 before the first extraction).
    pub fn num_bins(&self) -> usize {
        self.channels.first().map(|f| f.len()).unwrap_or(0)
    }

    pub fn frame(&self, channel: usize) -> Option<&SpectrumFrame> {
        self.channels.get(channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peak_bin() {
        let frame = SpectrumFrame {
            magnitudes: vec![0.1, 3.0, 2.0, 3.0],
        };
        assert_eq!(frame.peak_bin(), Some(1));
        assert_eq!(frame.peak_magnitude(), 3.0);
        assert_eq!(SpectrumFrame::default().peak_bin(), None);
    }

    #[test]
    fn test_slice_allocates_per_channel() {
        let slice = SpectrumSlice::new(2, 200);
        assert_eq!(slice.num_channels(), 2);
        assert_eq!(slice.num_bins(), 0);
        assert!(slice.channels.iter().all(|f| f.magnitudes.capacity() >= 200));
        assert!(slice.frame(2).is_none());
    }
}
