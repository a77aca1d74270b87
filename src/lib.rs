// ============================================================================
// spectrum_scope: live capture, short-time spectra and a scrolling waterfall
// ============================================================================
//
// Byte chunks from a capture source are decoded into per-channel sample
// histories; a fixed-hop driver cuts windows out of them, transforms each one
// and pushes the magnitudes into a scrolling spectrogram image. Consumers ask
// a `Session` for the image or a waveform polyline at any time.

pub mod capture;
pub mod config;
pub mod data;
pub mod error;
pub mod processing;
pub mod rendering;
pub mod session;
pub mod telemetry;

pub use capture::{CaptureCallbacks, CaptureFormat, CaptureSource, DeviceSource, ManualFeed, ManualSource, SignalSource};
pub use config::ScopeConfig;
pub use data::{SpectrumFrame, SpectrumSlice, WaterfallImage, WaveformPoints, WindowType};
pub use error::{Result, ScopeError};
pub use rendering::{RenderFrame, RenderMode, ViewSize};
pub use session::{Session, SessionState, SessionStats};
