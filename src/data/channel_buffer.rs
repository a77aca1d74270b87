use std::collections::VecDeque;

/// Read access to a chronological run of one channel's samples.
///
/// Positions are absolute: sample `n` of the stream keeps position `n` no
/// matter how much of the head has been trimmed since.
pub trait SampleHistory {
    /// Stream position of the oldest retained sample.
    fn start_position(&self) -> u64;

    /// Number of retained samples.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stream position one past the newest retained sample.
    fn end_position(&self) -> u64 {
        self.start_position() + self.len() as u64
    }

    /// Retained samples starting at `position`, oldest first. Positions before
    /// the start are clamped to the start.
    fn samples_from(&self, position: u64) -> impl Iterator<Item = i16> + '_;
}

/// Bounded per-channel sample store. Appends at the tail, trims the head.
#[derive(Debug, Clone)]
pub struct ChannelBuffer {
    samples: VecDeque<i16>,
    start: u64,
    max_samples: usize,
}

impl ChannelBuffer {
    pub fn new(max_samples: usize) -> Self {
        Self {
            samples: VecDeque::new(),
            start: 0,
            max_samples,
        }
    }

    #[inline]
    pub fn max_samples(&self) -> usize {
        self.max_samples
    }

    #[inline]
    pub fn push(&mut self, sample: i16) {
        self.samples.push_back(sample);
    }

    /// Drop the oldest samples until at most `max_samples` remain.
    /// Returns how many were discarded.
    pub fn trim(&mut self) -> usize {
        let excess = self.samples.len().saturating_sub(self.max_samples);
        if excess > 0 {
            self.samples.drain(..excess);
            self.start += excess as u64;
        }
        excess
    }

    pub fn clear(&mut self) {
        self.samples.clear();
        self.start = 0;
    }

    /// Copy of everything from `position` on.
    pub fn snapshot_from(&self, position: u64) -> ChannelSnapshot {
        let start = position.clamp(self.start, self.end_position());
        ChannelSnapshot {
            start,
            samples: self.samples_from(start).collect(),
        }
    }

    /// Copy of the newest `count` samples (fewer if not that many exist).
    pub fn snapshot_tail(&self, count: usize) -> ChannelSnapshot {
        let keep = count.min(self.samples.len());
        self.snapshot_from(self.end_position() - keep as u64)
    }

    pub fn to_vec(&self) -> Vec<i16> {
        self.samples.iter().copied().collect()
    }
}

impl SampleHistory for ChannelBuffer {
    fn start_position(&self) -> u64 {
        self.start
    }

    fn len(&self) -> usize {
        self.samples.len()
    }

    fn samples_from(&self, position: u64) -> impl Iterator<Item = i16> + '_ {
        let skip = position.saturating_sub(self.start).min(self.samples.len() as u64) as usize;
        self.samples.range(skip..).copied()
    }
}

/// Point-in-time copy of part of a [`ChannelBuffer`], safe to read while the
/// producer keeps appending to the original.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelSnapshot {
    pub start: u64,
    pub samples: Vec<i16>,
}

impl SampleHistory for ChannelSnapshot {
    fn start_position(&self) -> u64 {
        self.start
    }

    fn len(&self) -> usize {
        self.samples.len()
    }

    fn samples_from(&self, position: u64) -> impl Iterator<Item = i16> + '_ {
        let skip = position.saturating_sub(self.start).min(self.samples.len() as u64) as usize;
        self.samples[skip..].iter().copied()
    }
}
