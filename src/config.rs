//! Session configuration
//!
//! Defaults reproduce the classic setup: 8 kHz mono capture, 50 ms windows
//! every 40 ms, twenty minutes of history and an 800x60 waterfall.

use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;

use crate::capture::CaptureFormat;
use crate::data::WindowType;
use crate::error::{Result, ScopeError};
use crate::rendering::waterfall::Tint;

/// Twenty minutes at 8 kHz.
pub const DEFAULT_MAX_SAMPLES: usize = 8000 * 2 * 600;

#[derive(Debug, Clone, PartialEq)]
pub struct ScopeConfig {
    // ── Capture ──
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// 1 (mono) or 2 (stereo)
    pub channels: usize,
    /// Per-channel ring buffer retention
    pub max_samples: usize,

    // ── Analysis ──
    /// Samples per FFT window
    pub window_length: usize,
    /// Samples advanced between windows, smaller than the window for overlap
    pub hop_length: usize,
    pub window_type: WindowType,

    // ── Waterfall ──
    pub image_width: usize,
    pub image_height: usize,
    /// Columns scrolled per spectrum slice
    pub scroll_step: usize,
    pub tint: Tint,

    // ── Waveform ──
    /// Points drawn per channel
    pub point_budget: usize,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            sample_rate: 8000,
            channels: 1,
            max_samples: DEFAULT_MAX_SAMPLES,

            window_length: 8000 * 50 / 1000, // 50 ms
            hop_length: 8000 * 40 / 1000,    // 40 ms
            window_type: WindowType::Hamming,

            image_width: 800,
            image_height: 60,
            scroll_step: 10,
            tint: Tint::default(),

            point_budget: 8000,
        }
    }
}

impl ScopeConfig {
    /// Check every field, reporting the first problem found.
    pub fn validate(&self) -> Result<()> {
        let fail = |msg: String| Err(ScopeError::InvalidConfig(msg));

        if self.sample_rate == 0 {
            return fail("sample_rate must be positive".into());
        }
        if !(1..=2).contains(&self.channels) {
            return fail(format!("channels must be 1 or 2 (got {})", self.channels));
        }
        if self.window_length <= 1 {
            return fail(format!("window_length must be greater than 1 (got {})", self.window_length));
        }
        if self.hop_length == 0 || self.hop_length >= self.window_length {
            return fail(format!(
                "hop_length must be in 1..{} (got {})",
                self.window_length, self.hop_length
            ));
        }
        if self.max_samples <= self.window_length {
            return fail(format!(
                "max_samples ({}) must exceed window_length ({})",
                self.max_samples, self.window_length
            ));
        }
        if self.image_width == 0 || self.image_height == 0 {
            return fail(format!(
                "waterfall image must not be empty ({}x{})",
                self.image_width, self.image_height
            ));
        }
        if self.image_height < self.channels {
            return fail(format!(
                "image_height ({}) must give every channel at least one row",
                self.image_height
            ));
        }
        if self.scroll_step == 0 || self.scroll_step > self.image_width {
            return fail(format!(
                "scroll_step must be in 1..={} (got {})",
                self.image_width, self.scroll_step
            ));
        }
        if self.point_budget < 2 {
            return fail(format!("point_budget must be at least 2 (got {})", self.point_budget));
        }
        Ok(())
    }

    pub fn capture_format(&self) -> CaptureFormat {
        CaptureFormat {
            sample_rate: self.sample_rate,
            bit_depth: 16,
            channels: self.channels,
        }
    }

    /// Bins kept per channel: everything below Nyquist.
    #[inline]
    pub fn spectrum_len(&self) -> usize {
        self.window_length / 2
    }

    /// Frequency spacing between bins.
    pub fn bin_hz(&self) -> f64 {
        self.sample_rate as f64 / self.window_length as f64
    }

    pub fn bin_frequency(&self, bin: usize) -> f64 {
        bin as f64 * self.bin_hz()
    }

    /// Time between consecutive spectrum slices.
    pub fn hop_duration(&self) -> Duration {
        Duration::from_secs_f64(self.hop_length as f64 / self.sample_rate as f64)
    }

    /// Number of slices visible in the waterfall at once.
    pub fn visible_slices(&self) -> usize {
        self.image_width / self.scroll_step
    }

    /// Defaults overlaid with `SCOPE_*` environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup`; unparsable values are errors.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(v) = parse_var(&lookup, "SCOPE_SAMPLE_RATE")? { config.sample_rate = v; }
        if let Some(v) = parse_var(&lookup, "SCOPE_CHANNELS")? { config.channels = v; }
        if let Some(v) = parse_var(&lookup, "SCOPE_WINDOW")? { config.window_length = v; }
        if let Some(v) = parse_var(&lookup, "SCOPE_HOP")? { config.hop_length = v; }
        if let Some(v) = parse_var(&lookup, "SCOPE_MAX_SAMPLES")? { config.max_samples = v; }
        if let Some(v) = parse_var(&lookup, "SCOPE_IMAGE_WIDTH")? { config.image_width = v; }
        if let Some(v) = parse_var(&lookup, "SCOPE_IMAGE_HEIGHT")? { config.image_height = v; }
        if let Some(v) = parse_var(&lookup, "SCOPE_SCROLL_STEP")? { config.scroll_step = v; }
        if let Some(v) = parse_var(&lookup, "SCOPE_POINT_BUDGET")? { config.point_budget = v; }
        if let Some(name) = lookup("SCOPE_WINDOW_TYPE") {
            config.window_type = WindowType::from_name(&name)
                .with_context(|| format!("Unknown SCOPE_WINDOW_TYPE: {:?}", name))?;
        }

        config.validate()?;
        Ok(config)
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("Invalid value for {}: {:?}", key, raw))
        })
        .transpose()
}
