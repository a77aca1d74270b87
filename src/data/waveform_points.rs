/// A point in view coordinates (y grows downward).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Polyline per channel, oldest sample first. An empty channel has no points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WaveformPoints {
    pub channels: Vec<Vec<Point>>,
}

impl WaveformPoints {
    pub fn num_points(&self) -> usize {
        self.channels.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.iter().all(Vec::is_empty)
    }
}
