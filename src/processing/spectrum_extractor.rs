use realfft::num_complex::Complex;
use realfft::{RealFftPlanner, RealToComplex};
use std::sync::Arc;

use crate::data::{SampleHistory, SpectrumSlice, WindowType};
use crate::error::{Result, ScopeError};

/// Outcome of one extraction attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extraction {
    /// Not enough samples yet; retry at the same offset after more input.
    Pending,
    /// The slice was refilled with a new frame per channel.
    Ready,
}

/// Windowed magnitude spectra over a fixed-length window.
///
/// Owns only scratch space: the window coefficients and the FFT buffers.
pub struct SpectrumExtractor {
    window_length: usize,
    window_type: WindowType,
    fft: Arc<dyn RealToComplex<f64>>,
    window: Vec<f64>,
    indata: Vec<f64>,
    spectrum: Vec<Complex<f64>>,
    scratch: Vec<Complex<f64>>,
}

impl SpectrumExtractor {
    pub fn new(window_length: usize, window_type: WindowType) -> Result<Self> {
        if window_length <= 1 {
            return Err(ScopeError::InvalidWindow(window_length));
        }

        let mut planner = RealFftPlanner::<f64>::new();
        let fft = planner.plan_fft_forward(window_length);
        let indata = fft.make_input_vec();
        let spectrum = fft.make_output_vec();
        let scratch = fft.make_scratch_vec();

        Ok(Self {
            window_length,
            window_type,
            window: window_type.generate(window_length),
            fft,
            indata,
            spectrum,
            scratch,
        })
    }

    #[inline]
    pub fn window_length(&self) -> usize {
        self.window_length
    }

    pub fn window_type(&self) -> WindowType {
        self.window_type
    }

    /// Bins produced per channel.
    #[inline]
    pub fn spectrum_len(&self) -> usize {
        self.window_length / 2
    }

    /// Analyse `[window_offset, window_offset + window_length)` of every channel.
    ///
    /// Returns [`Extraction::Pending`] (leaving `out` untouched) unless every
    /// channel holds at least one sample past the end of the window.
    pub fn try_extract<H: SampleHistory>(
        &mut self,
        buffers: &[H],
        window_offset: u64,
        out: &mut SpectrumSlice,
    ) -> Result<Extraction> {
        if out.num_channels() != buffers.len() {
            return Err(ScopeError::ChannelMismatch {
                expected: buffers.len(),
                actual: out.num_channels(),
            });
        }
        if buffers.is_empty() {
            return Ok(Extraction::Pending);
        }

        let window_end = window_offset + self.window_length as u64;
        if buffers.iter().any(|b| b.end_position() <= window_end) {
            return Ok(Extraction::Pending);
        }
        if let Some(oldest) = buffers
            .iter()
            .map(|b| b.start_position())
            .find(|&start| start > window_offset)
        {
            return Err(ScopeError::WindowEvicted {
                requested: window_offset,
                oldest,
            });
        }

        let ratio = 1.0 / i16::MAX as f64;
        let bins = self.spectrum_len();

        for (buffer, frame) in buffers.iter().zip(out.channels.iter_mut()) {
            for ((slot, sample), w) in self
                .indata
                .iter_mut()
                .zip(buffer.samples_from(window_offset))
                .zip(&self.window)
            {
                *slot = sample as f64 * ratio * w;
            }

            self.fft
                .process_with_scratch(&mut self.indata, &mut self.spectrum, &mut self.scratch)
                .map_err(|e| ScopeError::Fft(e.to_string()))?;

            frame.magnitudes.clear();
            frame
                .magnitudes
                .extend(self.spectrum[..bins].iter().map(|z| z.norm()));
        }

        out.window_offset = window_offset;
        Ok(Extraction::Ready)
    }
}
