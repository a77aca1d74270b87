use tracing::debug;

use crate::capture::CaptureFormat;
use crate::data::{ChannelBuffer, ChannelSnapshot};
use crate::error::{Result, ScopeError};

/// Cross-call decode state. These two fields are the only thing carried from
/// one chunk to the next.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeState {
    /// Low byte waiting for its high byte
    pub pending_low_byte: Option<u8>,
    /// Channel the next completed sample belongs to
    pub current_channel: usize,
}

impl DecodeState {
    /// Consume one byte. Returns `(channel, sample)` when it completes a sample.
    #[inline]
    pub fn feed(&mut self, byte: u8, channels: usize) -> Option<(usize, i16)> {
        match self.pending_low_byte.take() {
            None => {
                self.pending_low_byte = Some(byte);
                None
            }
            Some(low) => {
                let channel = self.current_channel;
                self.current_channel = (self.current_channel + 1) % channels;
                Some((channel, i16::from_le_bytes([low, byte])))
            }
        }
    }
}

/// Turns interleaved 16-bit little-endian PCM bytes into per-channel buffers.
#[derive(Debug, Clone)]
pub struct SampleDecoder {
    buffers: Vec<ChannelBuffer>,
    state: DecodeState,
    max_samples: usize,
    format: Option<CaptureFormat>,
}

impl SampleDecoder {
    pub fn new(max_samples: usize) -> Self {
        Self {
            buffers: Vec::new(),
            state: DecodeState::default(),
            max_samples,
            format: None,
        }
    }

    /// Fresh empty buffers for `format`, decode state reset.
    pub fn start(&mut self, format: CaptureFormat) -> Result<()> {
        if format.bit_depth != 16 {
            return Err(ScopeError::UnsupportedFormat(format!(
                "{}-bit samples (only 16-bit is decoded)",
                format.bit_depth
            )));
        }
        if !(1..=2).contains(&format.channels) {
            return Err(ScopeError::UnsupportedFormat(format!(
                "{} channels (expected 1 or 2)",
                format.channels
            )));
        }

        self.buffers = (0..format.channels)
            .map(|_| ChannelBuffer::new(self.max_samples))
            .collect();
        self.state = DecodeState::default();
        self.format = Some(format);
        debug!(
            "decoder started: {} Hz, {} channel(s), retaining {} samples",
            format.sample_rate, format.channels, self.max_samples
        );
        Ok(())
    }

    /// Decode a raw chunk and trim every buffer to `max_samples`.
    /// An empty chunk, or a decoder that was never started, is a no-op.
    pub fn on_bytes(&mut self, raw: &[u8]) {
        if raw.is_empty() || self.buffers.is_empty() {
            return;
        }

        let channels = self.buffers.len();
        for &byte in raw {
            if let Some((channel, sample)) = self.state.feed(byte, channels) {
                self.buffers[channel].push(sample);
            }
        }

        for buffer in &mut self.buffers {
            buffer.trim();
        }
    }

    #[inline]
    pub fn buffers(&self) -> &[ChannelBuffer] {
        &self.buffers
    }

    #[inline]
    pub fn state(&self) -> DecodeState {
        self.state
    }

    pub fn format(&self) -> Option<CaptureFormat> {
        self.format
    }

    #[inline]
    pub fn num_channels(&self) -> usize {
        self.buffers.len()
    }

    /// Copies of every channel from stream position `position` on.
    pub fn snapshot_from(&self, position: u64) -> Vec<ChannelSnapshot> {
        self.buffers.iter().map(|b| b.snapshot_from(position)).collect()
    }

    /// Copies of the newest `count` samples of every channel.
    pub fn snapshot_tail(&self, count: usize) -> Vec<ChannelSnapshot> {
        self.buffers.iter().map(|b| b.snapshot_tail(count)).collect()
    }
}
