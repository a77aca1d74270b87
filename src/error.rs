//! Error types for the scope core
//!
//! Only caller bugs end up here. Running out of buffered samples is a normal
//! state and is reported through return values instead.

use std::fmt;

/// Contract violations raised by the decoder, extractor and compositor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeError {
    /// A configuration field is out of range
    InvalidConfig(String),

    /// Capture format the decoder cannot handle (bit depth, channel count)
    UnsupportedFormat(String),

    /// Window length of 0 or 1
    InvalidWindow(usize),

    /// Channel counts of buffers and spectrum storage disagree
    ChannelMismatch { expected: usize, actual: usize },

    /// Frames within one slice must share a non-zero bin count
    FrameLength { expected: usize, actual: usize },

    /// The requested window starts before the oldest retained sample
    WindowEvicted { requested: u64, oldest: u64 },

    /// The FFT primitive rejected its buffers
    Fft(String),
}

impl fmt::Display for ScopeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopeError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            ScopeError::UnsupportedFormat(msg) => write!(f, "Unsupported capture format: {}", msg),
            ScopeError::InvalidWindow(len) => {
                write!(f, "Window length must be greater than 1 (got {})", len)
            }
            ScopeError::ChannelMismatch { expected, actual } => write!(
                f,
                "Channel count mismatch: expected {}, got {}",
                expected, actual
            ),
            ScopeError::FrameLength { expected, actual } => write!(
                f,
                "Spectrum frame length mismatch: expected {}, got {}",
                expected, actual
            ),
            ScopeError::WindowEvicted { requested, oldest } => write!(
                f,
                "Window at sample {} was trimmed (oldest retained sample is {})",
                requested, oldest
            ),
            ScopeError::Fft(msg) => write!(f, "FFT error: {}", msg),
        }
    }
}

impl std::error::Error for ScopeError {}

/// Result alias for the scope core
pub type Result<T> = std::result::Result<T, ScopeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_mentions_details() {
        let err = ScopeError::ChannelMismatch { expected: 2, actual: 1 };
        assert_eq!(err.to_string(), "Channel count mismatch: expected 2, got 1");

        let err = ScopeError::InvalidWindow(1);
        assert!(err.to_string().contains("got 1"));
    }

    #[test]
    fn test_converts_into_anyhow() {
        let err: anyhow::Error = ScopeError::InvalidConfig("hop_length is 0".into()).into();
        assert!(err.to_string().contains("hop_length is 0"));
    }
}
