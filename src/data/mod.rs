pub mod channel_buffer;
pub mod spectrum;
pub mod waterfall_image;
pub mod waveform_points;
pub mod window;

pub use channel_buffer::{ChannelBuffer, ChannelSnapshot, SampleHistory};
pub use spectrum::{SpectrumFrame, SpectrumSlice};
pub use waterfall_image::{Rgb, WaterfallImage};
pub use waveform_points::{Point, WaveformPoints};
pub use window::WindowType;
