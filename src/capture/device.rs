use miniaudio::{Device, DeviceConfig, DeviceType, Format};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

use super::{CaptureCallbacks, CaptureFormat, CaptureSource};

/// Default system input device, captured as signed 16-bit PCM.
pub struct DeviceSource {
    device: Option<Device>,
    /// Set before we stop the device ourselves, so the stop callback can tell
    /// a requested stop from a device failure.
    stopping: Arc<AtomicBool>,
}

impl DeviceSource {
    pub fn new() -> Self {
        Self {
            device: None,
            stopping: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_running(&self) -> bool {
        self.device.is_some()
    }
}

impl Default for DeviceSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureSource for DeviceSource {
    fn name(&self) -> &str {
        "default input device"
    }

    fn start(&mut self, format: CaptureFormat, callbacks: CaptureCallbacks) -> anyhow::Result<()> {
        self.stop();

        if format.bit_depth != 16 {
            anyhow::bail!("Capture device only supports 16-bit PCM, not {}-bit", format.bit_depth);
        }

        let stopping = Arc::new(AtomicBool::new(false));
        self.stopping = Arc::clone(&stopping);

        let mut config = DeviceConfig::new(DeviceType::Capture);
        config.capture_mut().set_format(Format::S16);
        config.capture_mut().set_channels(format.channels as u32);
        config.set_sample_rate(format.sample_rate);

        let on_bytes = callbacks.on_bytes;
        config.set_data_callback(move |_device, _output, input| {
            on_bytes(input.as_bytes());
        });

        let on_fault = callbacks.on_fault;
        config.set_stop_callback(move |_device| {
            if !stopping.load(Ordering::SeqCst) {
                on_fault(anyhow::anyhow!("Capture device stopped unexpectedly"));
            }
        });

        let device = Device::new(None, &config)
            .map_err(|e| anyhow::anyhow!("Failed to create capture device: {:?}", e))?;

        device.start()
            .map_err(|e| anyhow::anyhow!("Failed to start capture device: {:?}", e))?;

        info!(
            "capture device started: {} Hz, {} channel(s), 16-bit",
            format.sample_rate, format.channels
        );
        self.device = Some(device);

        Ok(())
    }

    fn stop(&mut self) {
        self.stopping.store(true, Ordering::SeqCst);
        if let Some(device) = self.device.take() {
            // Blocks until the data callback has returned
            if let Err(e) = device.stop() {
                warn!("capture device did not stop cleanly: {:?}", e);
            }
            info!("capture device stopped");
        }
    }
}

impl Drop for DeviceSource {
    fn drop(&mut self) {
        self.stop();
    }
}
