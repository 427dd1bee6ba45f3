use std::time::Duration;

use chrono::{DateTime, Local};

use super::Shutdown;

/// Time source for the detector: wall-clock stamps for file names and the
/// interruptible delays between polls.
pub trait Clock {
    fn now(&self) -> DateTime<Local>;

    /// Sleep for `duration` unless `shutdown` fires first. Returns `false`
    /// when the sleep was cut short.
    fn sleep(&self, duration: Duration, shutdown: &Shutdown) -> bool;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }

    fn sleep(&self, duration: Duration, shutdown: &Shutdown) -> bool {
        shutdown.wait(duration)
    }
}
