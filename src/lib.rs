//! Shake-triggered still camera for a single-board computer.
//!
//! An accelerometer is polled at a fixed interval. When the acceleration
//! magnitude strays from gravity by more than a threshold, a photo is taken,
//! saved under a timestamped name inside a local git clone, and pushed.

pub mod camera;
pub mod config;
pub mod detector;
pub mod logger;
pub mod remote;
pub mod sensor;
pub mod types;

pub use config::{AppConfig, ConfigError, ConfigManager};
pub use detector::{DetectorError, DetectorSettings, ShakeDetector, Shutdown};
pub use types::{Acceleration, PollOutcome, RunSummary, ShakeEvent, SyncOutcome};
