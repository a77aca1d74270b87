pub mod waterfall;
pub mod waveform;

pub use waterfall::{ColorChannel, Tint, WaterfallCompositor};
pub use waveform::WaveformSampler;

/// What a render request should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    #[default]
    None,
    Wave,
    Spectrum,
}

/// Result of a render request.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderFrame {
    Blank,
    Wave(crate::data::WaveformPoints),
    Spectrum(crate::data::WaterfallImage),
}

/// Size of the drawing surface in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewSize {
    pub width: f32,
    pub height: f32,
}

impl ViewSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}
