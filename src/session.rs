//! Capture session: wires a source to the decoder, the spectrum driver and
//! the waterfall, and serves render requests.
//!
//! Two execution contexts meet here. The producer is whatever thread the
//! source calls `on_bytes` from; it decodes, extracts and composites. The
//! consumer is the caller of the render methods. Each shared resource has its
//! own lock, held only long enough to append/trim, copy, or scroll/paint.

use anyhow::Context;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{error, info, warn};

use crate::capture::{CaptureCallbacks, CaptureSource};
use crate::config::ScopeConfig;
use crate::data::{SampleHistory, SpectrumSlice, WaterfallImage, WaveformPoints};
use crate::error::ScopeError;
use crate::processing::{SampleDecoder, SpectrumDriver};
use crate::rendering::{RenderFrame, RenderMode, ViewSize, WaterfallCompositor, WaveformSampler};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Active,
}

/// Counters for the current (or last) run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub chunks: u64,
    pub bytes: u64,
    pub frames_extracted: u64,
    /// Samples currently retained per channel
    pub samples_buffered: usize,
}

/// State reachable from the capture callbacks.
struct Shared {
    decoder: Mutex<SampleDecoder>,
    /// Producer-only; serializes chunks if a source ever calls concurrently
    driver: Mutex<SpectrumDriver>,
    waterfall: Mutex<WaterfallCompositor>,
    latest: Mutex<SpectrumSlice>,
    fault: Mutex<Option<anyhow::Error>>,
    chunks: AtomicU64,
    bytes: AtomicU64,
    frames: AtomicU64,
}

impl Shared {
    fn on_bytes(&self, raw: &[u8]) -> Result<(), ScopeError> {
        if raw.is_empty() {
            return Ok(());
        }

        let mut driver = self.driver.lock();
        let pending = {
            let mut decoder = self.decoder.lock();
            decoder.on_bytes(raw);
            decoder.snapshot_from(driver.next_offset())
        };
        self.chunks.fetch_add(1, Ordering::Relaxed);
        self.bytes.fetch_add(raw.len() as u64, Ordering::Relaxed);

        let produced = driver.drain(&pending, |slice| {
            self.waterfall.lock().push_slice(slice)?;
            self.latest.lock().clone_from(slice);
            Ok(())
        })?;
        self.frames.fetch_add(produced as u64, Ordering::Relaxed);
        Ok(())
    }

    /// Keep the first fault of a run; later ones are usually its fallout.
    fn report_fault(&self, err: anyhow::Error) {
        error!("capture session fault: {:#}", err);
        let mut slot = self.fault.lock();
        if slot.is_none() {
            *slot = Some(err);
        }
    }

    fn reset(&self, config: &ScopeConfig) -> Result<(), ScopeError> {
        self.decoder.lock().start(config.capture_format())?;
        self.driver.lock().reset(config.channels);
        self.waterfall.lock().reset(config.channels);
        *self.latest.lock() = SpectrumSlice::new(config.channels, config.spectrum_len());
        self.fault.lock().take();
        self.chunks.store(0, Ordering::Relaxed);
        self.bytes.store(0, Ordering::Relaxed);
        self.frames.store(0, Ordering::Relaxed);
        Ok(())
    }
}

pub struct Session {
    config: ScopeConfig,
    source: Box<dyn CaptureSource>,
    shared: Arc<Shared>,
    state: SessionState,
}

impl Session {
    pub fn new(config: ScopeConfig, source: Box<dyn CaptureSource>) -> Result<Self, ScopeError> {
        config.validate()?;

        let driver = SpectrumDriver::new(
            config.channels,
            config.window_length,
            config.hop_length,
            config.window_type,
        )?;
        let waterfall = WaterfallCompositor::new(
            config.image_width,
            config.image_height,
            config.scroll_step,
            config.channels,
            config.tint,
        );

        let shared = Arc::new(Shared {
            decoder: Mutex::new(SampleDecoder::new(config.max_samples)),
            driver: Mutex::new(driver),
            waterfall: Mutex::new(waterfall),
            latest: Mutex::new(SpectrumSlice::new(config.channels, config.spectrum_len())),
            fault: Mutex::new(None),
            chunks: AtomicU64::new(0),
            bytes: AtomicU64::new(0),
            frames: AtomicU64::new(0),
        });

        Ok(Self {
            config,
            source,
            shared,
            state: SessionState::Idle,
        })
    }

    pub fn config(&self) -> &ScopeConfig {
        &self.config
    }

    /// Idle as soon as a fault is waiting, even before `poll()` has stopped
    /// the source and handed the fault over.
    pub fn state(&self) -> SessionState {
        if self.shared.fault.lock().is_some() {
            SessionState::Idle
        } else {
            self.state
        }
    }

    /// Reset buffers and image, then start capturing. An active session is
    /// stopped first. If the source fails to start the session stays Idle.
    pub fn start(&mut self) -> anyhow::Result<()> {
        if self.state == SessionState::Active {
            self.stop();
        }

        self.shared.reset(&self.config)?;

        let on_bytes_shared = Arc::clone(&self.shared);
        let on_fault_shared = Arc::clone(&self.shared);
        let callbacks = CaptureCallbacks {
            on_bytes: Arc::new(move |raw: &[u8]| {
                if let Err(e) = on_bytes_shared.on_bytes(raw) {
                    on_bytes_shared.report_fault(anyhow::Error::new(e).context("Spectrum pipeline failed"));
                }
            }),
            on_fault: Arc::new(move |err: anyhow::Error| on_fault_shared.report_fault(err)),
        };

        let name = self.source.name().to_string();
        self.source
            .start(self.config.capture_format(), callbacks)
            .with_context(|| format!("Failed to start capture from {}", name))?;

        self.state = SessionState::Active;
        info!(
            "session started: {} at {} Hz, {} channel(s), window {} / hop {}",
            name,
            self.config.sample_rate,
            self.config.channels,
            self.config.window_length,
            self.config.hop_length
        );
        Ok(())
    }

    /// Halt capture. Returns once no more callbacks can run. Buffers and
    /// image are kept until the next `start()`.
    pub fn stop(&mut self) {
        self.source.stop();
        if self.state == SessionState::Active {
            self.state = SessionState::Idle;
            info!("session stopped");
        }
    }

    /// Surface a fault reported by the source or the pipeline. A faulted
    /// session is stopped and returns to Idle.
    pub fn poll(&mut self) -> anyhow::Result<()> {
        let fault = self.shared.fault.lock().take();
        match fault {
            Some(err) => {
                warn!("stopping session after fault");
                self.stop();
                Err(err)
            }
            None => Ok(()),
        }
    }

    pub fn stats(&self) -> SessionStats {
        let samples_buffered = self
            .shared
            .decoder
            .lock()
            .buffers()
            .first()
            .map(|b| b.len())
            .unwrap_or(0);
        SessionStats {
            chunks: self.shared.chunks.load(Ordering::Relaxed),
            bytes: self.shared.bytes.load(Ordering::Relaxed),
            frames_extracted: self.shared.frames.load(Ordering::Relaxed),
            samples_buffered,
        }
    }

    /// Snapshot of the waterfall.
    pub fn waterfall_image(&self) -> WaterfallImage {
        self.shared.waterfall.lock().current_image()
    }

    /// Latest spectrum slice (empty frames until the first extraction).
    pub fn latest_spectrum(&self) -> SpectrumSlice {
        self.shared.latest.lock().clone()
    }

    /// Waveform of the newest `point_budget` samples per channel.
    pub fn waveform(&self, view: ViewSize) -> WaveformPoints {
        let tail = self.shared.decoder.lock().snapshot_tail(self.config.point_budget);
        WaveformSampler::sample(&tail, self.config.point_budget, view.width, view.height)
    }

    pub fn render(&self, mode: RenderMode, view: ViewSize) -> RenderFrame {
        match mode {
            RenderMode::None => RenderFrame::Blank,
            RenderMode::Wave => RenderFrame::Wave(self.waveform(view)),
            RenderMode::Spectrum => RenderFrame::Spectrum(self.waterfall_image()),
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.stop();
    }
}
