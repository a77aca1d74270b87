pub mod decoder;
pub mod driver;
pub mod spectrum_extractor;

pub use decoder::{DecodeState, SampleDecoder};
pub use driver::SpectrumDriver;
pub use spectrum_extractor::{Extraction, SpectrumExtractor};
