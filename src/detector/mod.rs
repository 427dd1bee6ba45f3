//! The shake detector loop.
//!
//! ```text
//!   IDLE --(|g - |a|| > threshold)--> TRIGGERED
//!   TRIGGERED: debounce -> name -> capture -> sync -> cooldown -> IDLE
//! ```
//!
//! A single sample above the threshold is enough to trigger; there is no
//! hysteresis and no minimum time above the threshold.

pub mod clock;
pub mod naming;
pub mod shutdown;
#[cfg(test)]
mod testing;

use std::time::Duration;

use log::{debug, info, warn};

use crate::camera::{Camera, CameraError};
use crate::config::DetectorConfig;
use crate::remote::RemoteSync;
use crate::sensor::{AccelSensor, SensorError};
use crate::types::{Acceleration, PollOutcome, RunSummary, ShakeEvent, SyncOutcome};

pub use clock::{Clock, SystemClock};
pub use naming::ImageNamer;
pub use shutdown::Shutdown;

/// Errors that end the loop. Sync failures never show up here.
#[derive(Debug, thiserror::Error)]
pub enum DetectorError {
    #[error("sensor read failed: {0}")]
    Sensor(#[from] SensorError),
    #[error("capture failed: {0}")]
    Camera(#[from] CameraError),
    #[error("output directory unavailable: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorState {
    Idle,
    Triggered,
}

/// Timing and threshold values the loop runs with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectorSettings {
    pub threshold: f64,
    pub gravity: f64,
    pub poll_interval: Duration,
    pub debounce: Duration,
    pub cooldown: Duration,
}

impl From<&DetectorConfig> for DetectorSettings {
    fn from(config: &DetectorConfig) -> Self {
        Self {
            threshold: config.threshold,
            gravity: config.gravity,
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            debounce: Duration::from_millis(config.debounce_ms),
            cooldown: Duration::from_millis(config.cooldown_ms),
        }
    }
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self::from(&DetectorConfig::default())
    }
}

pub struct ShakeDetector<S, C, R, K> {
    sensor: S,
    camera: C,
    remote: Option<R>,
    clock: K,
    settings: DetectorSettings,
    namer: ImageNamer,
    state: DetectorState,
    summary: RunSummary,
}

impl<S, C, R, K> ShakeDetector<S, C, R, K>
where
    S: AccelSensor,
    C: Camera,
    R: RemoteSync,
    K: Clock,
{
    /// `remote: None` disables syncing; events then record `SyncOutcome::Skipped`.
    pub fn new(
        sensor: S,
        camera: C,
        remote: Option<R>,
        clock: K,
        settings: DetectorSettings,
        namer: ImageNamer,
    ) -> Self {
        Self {
            sensor,
            camera,
            remote,
            clock,
            settings,
            namer,
            state: DetectorState::Idle,
            summary: RunSummary::default(),
        }
    }

    pub fn state(&self) -> DetectorState {
        self.state
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// Read one sample and, if it is a shake, run the whole triggered sequence
    /// including the cooldown.
    /// A poll that ends in an error still counts towards `summary().polls`.
    pub fn poll_once(&mut self, shutdown: &Shutdown) -> Result<PollOutcome, DetectorError> {
        let result = self.read_and_handle(shutdown);
        match &result {
            Ok(outcome) => self.summary.record(outcome),
            Err(_) => self.summary.polls += 1,
        }
        result
    }

    fn read_and_handle(&mut self, shutdown: &Shutdown) -> Result<PollOutcome, DetectorError> {
        let sample = self.sensor.read_acceleration()?;
        let dynamic = sample.dynamic(self.settings.gravity);

        // strictly greater: landing exactly on the threshold stays idle
        if dynamic > self.settings.threshold {
            self.handle_trigger(sample, dynamic, shutdown)
        } else {
            debug!("dynamic acceleration {:.4}", dynamic);
            Ok(PollOutcome::Idle { dynamic })
        }
    }

    fn handle_trigger(
        &mut self,
        sample: Acceleration,
        dynamic: f64,
        shutdown: &Shutdown,
    ) -> Result<PollOutcome, DetectorError> {
        self.state = DetectorState::Triggered;
        info!(
            "Shake detected: dynamic acceleration {:.3} > {:.3}",
            dynamic, self.settings.threshold
        );

        if !self.clock.sleep(self.settings.debounce, shutdown) {
            info!("Shutdown during debounce, capture skipped");
            self.state = DetectorState::Idle;
            return Ok(PollOutcome::Interrupted);
        }

        let image = self.namer.path_for(&self.clock.now());
        if let Err(e) = self.camera.capture_to_file(&image) {
            self.state = DetectorState::Idle;
            return Err(e.into());
        }
        info!("Captured {}", image.display());

        let sync = match self.remote.as_mut() {
            None => SyncOutcome::Skipped,
            Some(remote) => match remote.sync(&image) {
                Ok(()) => SyncOutcome::Synced,
                Err(e) => {
                    warn!("Upload failed, continuing: {}", e);
                    SyncOutcome::Failed(e)
                }
            },
        };

        // residual motion after the capture must not retrigger
        self.clock.sleep(self.settings.cooldown, shutdown);
        self.state = DetectorState::Idle;

        Ok(PollOutcome::Triggered(ShakeEvent {
            sample,
            dynamic,
            image,
            sync,
        }))
    }

    /// Poll until `shutdown` fires. Sensor and camera errors end the run;
    /// sync failures are logged and the loop carries on.
    pub fn run(&mut self, shutdown: &Shutdown) -> Result<RunSummary, DetectorError> {
        info!(
            "Watching for shakes: threshold {:.5}, polling every {:?}, images in {}",
            self.settings.threshold,
            self.settings.poll_interval,
            self.namer.directory().display()
        );

        while !shutdown.is_triggered() {
            self.poll_once(shutdown)?;
            if !self.clock.sleep(self.settings.poll_interval, shutdown) {
                break;
            }
        }

        info!(
            "Detector stopped after {} polls: {} captures, {} synced, {} sync failures",
            self.summary.polls, self.summary.captures, self.summary.synced, self.summary.sync_failures
        );
        Ok(self.summary.clone())
    }
}
