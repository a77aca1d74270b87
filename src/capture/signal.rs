use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use super::{CaptureCallbacks, CaptureFormat, CaptureSource};

/// Synthetic input: one sine tone per channel plus optional white noise,
/// delivered from a background thread in randomly sized byte chunks at
/// roughly real-time pace.
pub struct SignalSource {
    /// Tone frequency per channel in Hz; the last entry repeats for extra channels
    pub tones_hz: Vec<f64>,
    /// Peak tone amplitude, 0..1 of full scale
    pub amplitude: f64,
    /// Peak noise amplitude, 0..1 of full scale
    pub noise: f64,
    /// Frames generated per iteration (about 20 ms at 8 kHz by default)
    pub block_frames: usize,
    pub seed: u64,
    running: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl SignalSource {
    pub fn new(tones_hz: Vec<f64>) -> Self {
        Self {
            tones_hz,
            amplitude: 0.5,
            noise: 0.0,
            block_frames: 160,
            seed: 0x5ca1e,
            running: Arc::new(AtomicBool::new(false)),
            worker: None,
        }
    }

    pub fn with_noise(mut self, noise: f64) -> Self {
        self.noise = noise;
        self
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }
}

impl Default for SignalSource {
    fn default() -> Self {
        Self::new(vec![1000.0, 440.0])
    }
}

/// Generator state owned by the worker thread.
struct Generator {
    format: CaptureFormat,
    tones_hz: Vec<f64>,
    amplitude: f64,
    noise: f64,
    phase: Vec<f64>,
    rng: StdRng,
}

impl Generator {
    /// Append `frames` interleaved frames to `out`.
    fn render(&mut self, frames: usize, out: &mut Vec<u8>) {
        let rate = self.format.sample_rate as f64;
        for _ in 0..frames {
            for channel in 0..self.format.channels {
                let freq = self
                    .tones_hz
                    .get(channel)
                    .or(self.tones_hz.last())
                    .copied()
                    .unwrap_or(0.0);
                let mut value = self.amplitude * self.phase[channel].sin();
                if self.noise > 0.0 {
                    value += self.noise * self.rng.random_range(-1.0..=1.0);
                }
                self.phase[channel] = (self.phase[channel] + 2.0 * PI * freq / rate) % (2.0 * PI);

                let sample = (value.clamp(-1.0, 1.0) * i16::MAX as f64) as i16;
                out.extend_from_slice(&sample.to_le_bytes());
            }
        }
    }
}

impl CaptureSource for SignalSource {
    fn name(&self) -> &str {
        "synthetic signal"
    }

    fn start(&mut self, format: CaptureFormat, callbacks: CaptureCallbacks) -> anyhow::Result<()> {
        self.stop();

        if format.bit_depth != 16 {
            anyhow::bail!("Synthetic source only produces 16-bit PCM, not {}-bit", format.bit_depth);
        }
        if format.sample_rate == 0 || format.channels == 0 {
            anyhow::bail!("Synthetic source needs a sample rate and at least one channel");
        }

        let mut generator = Generator {
            format,
            tones_hz: self.tones_hz.clone(),
            amplitude: self.amplitude,
            noise: self.noise,
            phase: vec![0.0; format.channels],
            rng: StdRng::seed_from_u64(self.seed),
        };
        let block_frames = self.block_frames.max(1);
        let block_time = Duration::from_secs_f64(block_frames as f64 / format.sample_rate as f64);

        let running = Arc::new(AtomicBool::new(true));
        self.running = Arc::clone(&running);

        let worker = thread::Builder::new()
            .name("scope-signal".into())
            .spawn(move || {
                let mut bytes = Vec::with_capacity(block_frames * format.bytes_per_frame());
                let mut deadline = Instant::now();

                while running.load(Ordering::SeqCst) {
                    bytes.clear();
                    generator.render(block_frames, &mut bytes);

                    // Split at arbitrary byte boundaries, odd sizes included
                    let mut rest = &bytes[..];
                    while !rest.is_empty() {
                        let n = generator.rng.random_range(1..=rest.len());
                        (callbacks.on_bytes)(&rest[..n]);
                        rest = &rest[n..];
                    }

                    deadline += block_time;
                    if let Some(wait) = deadline.checked_duration_since(Instant::now()) {
                        thread::sleep(wait);
                    }
                }
                debug!("synthetic source thread exiting");
            })
            .map_err(|e| anyhow::anyhow!("Failed to spawn synthetic source thread: {}", e))?;

        info!(
            "synthetic source started: {} Hz, {} channel(s), tones {:?} Hz",
            format.sample_rate, format.channels, self.tones_hz
        );
        self.worker = Some(worker);
        Ok(())
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("synthetic source thread panicked");
            }
            info!("synthetic source stopped");
        }
    }
}

impl Drop for SignalSource {
    fn drop(&mut self) {
        self.stop();
    }
}
