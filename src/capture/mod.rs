//! Audio sources feeding raw PCM bytes into a session.
//!
//! A source only moves bytes: it never decodes them. Decoding, analysis and
//! compositing all happen inside the `on_bytes` callback it is handed.

pub mod device;
pub mod signal;

use parking_lot::Mutex;
use std::sync::Arc;

pub use device::DeviceSource;
pub use signal::SignalSource;

/// Interleaved little-endian PCM layout delivered by a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureFormat {
    pub sample_rate: u32,
    pub bit_depth: u16,
    pub channels: usize,
}

impl CaptureFormat {
    pub fn bytes_per_frame(&self) -> usize {
        self.channels * (self.bit_depth as usize / 8)
    }
}

pub type ByteSink = Arc<dyn Fn(&[u8]) + Send + Sync>;
pub type FaultSink = Arc<dyn Fn(anyhow::Error) + Send + Sync>;

/// What a running source calls back into.
#[derive(Clone)]
pub struct CaptureCallbacks {
    /// A chunk of raw bytes, any size
    pub on_bytes: ByteSink,
    /// A terminal failure; the source delivers no more bytes afterwards
    pub on_fault: FaultSink,
}

pub trait CaptureSource {
    fn name(&self) -> &str;

    /// Begin delivering bytes in `format`. Restarting a running source stops
    /// the previous run first.
    fn start(&mut self, format: CaptureFormat, callbacks: CaptureCallbacks) -> anyhow::Result<()>;

    /// Stop delivering. No callback runs after this returns. Safe to call at
    /// any time, any number of times.
    fn stop(&mut self);
}

/// Source driven by the caller: bytes pushed through a [`ManualFeed`] reach the
/// session on the pushing thread. Handy for embedding and for tests.
#[derive(Default)]
pub struct ManualSource {
    slot: Arc<Mutex<Option<CaptureCallbacks>>>,
}

impl ManualSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle used to push bytes or report a fault.
    pub fn feed(&self) -> ManualFeed {
        ManualFeed {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl CaptureSource for ManualSource {
    fn name(&self) -> &str {
        "manual"
    }

    fn start(&mut self, _format: CaptureFormat, callbacks: CaptureCallbacks) -> anyhow::Result<()> {
        *self.slot.lock() = Some(callbacks);
        Ok(())
    }

    fn stop(&mut self) {
        self.slot.lock().take();
    }
}

#[derive(Clone)]
pub struct ManualFeed {
    slot: Arc<Mutex<Option<CaptureCallbacks>>>,
}

impl ManualFeed {
    /// Deliver `bytes`. Returns false when the source is not running.
    pub fn push(&self, bytes: &[u8]) -> bool {
        // Held across the callback so stop() waits for an in-flight chunk
        let slot = self.slot.lock();
        match slot.as_ref() {
            Some(cb) => {
                (cb.on_bytes)(bytes);
                true
            }
            None => false,
        }
    }

    /// Report a terminal failure and stop delivering.
    pub fn fail(&self, error: anyhow::Error) {
        let callbacks = self.slot.lock().take();
        if let Some(cb) = callbacks {
            (cb.on_fault)(error);
        }
    }

    pub fn is_running(&self) -> bool {
        self.slot.lock().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_callbacks(count: Arc<AtomicUsize>) -> CaptureCallbacks {
        CaptureCallbacks {
            on_bytes: Arc::new(move |raw: &[u8]| {
                count.fetch_add(raw.len(), Ordering::SeqCst);
            }),
            on_fault: Arc::new(|_: anyhow::Error| {}),
        }
    }

    #[test]
    fn test_bytes_per_frame() {
        let format = CaptureFormat { sample_rate: 8000, bit_depth: 16, channels: 2 };
        assert_eq!(format.bytes_per_frame(), 4);
    }

    #[test]
    fn test_manual_source_only_delivers_while_running() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut source = ManualSource::new();
        let feed = source.feed();
        let format = CaptureFormat { sample_rate: 8000, bit_depth: 16, channels: 1 };

        assert!(!feed.push(&[1, 2]));
        source.start(format, counting_callbacks(Arc::clone(&count))).unwrap();
        assert!(feed.push(&[1, 2, 3]));
        source.stop();
        source.stop();
        assert!(!feed.push(&[4]));
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }
}
