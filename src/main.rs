// ============================================================================
// scope: headless capture runner
// ============================================================================
//
// Starts a session on the default input device (or the synthetic source with
// SCOPE_SOURCE=synthetic), logs the loudest frequency per channel twice a
// second for SCOPE_SECONDS, then stops.

use anyhow::Context;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use spectrum_scope::{CaptureSource, DeviceSource, ScopeConfig, Session, SignalSource, telemetry};

const REPORT_INTERVAL: Duration = Duration::from_millis(500);
const DEFAULT_SECONDS: f64 = 10.0;

fn source_from_env() -> anyhow::Result<Box<dyn CaptureSource>> {
    match std::env::var("SCOPE_SOURCE").ok().as_deref() {
        None | Some("device") => Ok(Box::new(DeviceSource::new())),
        Some("synthetic") => Ok(Box::new(SignalSource::default())),
        Some(other) => anyhow::bail!("Unknown SCOPE_SOURCE {:?} (expected device or synthetic)", other),
    }
}

fn run_time_from_env() -> anyhow::Result<Duration> {
    let seconds = match std::env::var("SCOPE_SECONDS") {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .with_context(|| format!("Invalid value for SCOPE_SECONDS: {:?}", raw))?,
        Err(_) => DEFAULT_SECONDS,
    };
    if !seconds.is_finite() || seconds < 0.0 {
        anyhow::bail!("SCOPE_SECONDS must be a non-negative number, got {}", seconds);
    }
    Ok(Duration::from_secs_f64(seconds))
}

fn report(session: &Session) {
    let config = session.config();
    let spectrum = session.latest_spectrum();
    for (channel, frame) in spectrum.channels.iter().enumerate() {
        match frame.peak_bin() {
            Some(bin) => info!(
                "ch{} peak {:.0} Hz (bin {}, magnitude {:.1}) at sample {}",
                channel,
                config.bin_frequency(bin),
                bin,
                frame.peak_magnitude(),
                spectrum.window_offset
            ),
            None => info!("ch{} waiting for the first window", channel),
        }
    }
}

fn main() -> anyhow::Result<()> {
    telemetry::init();

    let config = ScopeConfig::from_env().context("Failed to load configuration")?;
    let source = source_from_env()?;
    let run_time = run_time_from_env()?;

    let mut session = Session::new(config, source)?;
    session.start()?;

    let begin = Instant::now();
    let mut result = Ok(());
    while begin.elapsed() < run_time {
        thread::sleep(REPORT_INTERVAL.min(run_time.saturating_sub(begin.elapsed())));
        if let Err(e) = session.poll() {
            warn!("capture ended early");
            result = Err(e);
            break;
        }
        report(&session);
    }

    session.stop();
    let stats = session.stats();
    info!(
        "done: {} chunks, {} bytes, {} spectra, {} samples retained per channel",
        stats.chunks, stats.bytes, stats.frames_extracted, stats.samples_buffered
    );
    result
}
