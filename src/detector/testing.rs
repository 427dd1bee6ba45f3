//! Scripted stand-ins for the detector's collaborators. Time is virtual: the
//! fake clock advances instantly and the fake sensor answers according to it.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use chrono::{DateTime, Local, TimeZone};

use super::{Clock, Shutdown};
use crate::camera::{Camera, CameraError};
use crate::remote::{RemoteSync, SyncFailure, SyncStep};
use crate::sensor::{AccelSensor, SensorError};
use crate::types::Acceleration;

#[derive(Clone)]
pub struct FakeClock {
    elapsed: Rc<Cell<Duration>>,
    limit: Option<Duration>,
    base: DateTime<Local>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self {
            elapsed: Rc::new(Cell::new(Duration::ZERO)),
            limit: None,
            base: Local.with_ymd_and_hms(2025, 12, 25, 14, 30, 6).single().unwrap(),
        }
    }

    /// Trigger shutdown once virtual time reaches `limit`.
    pub fn stop_after(mut self, limit: Duration) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed.get()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> DateTime<Local> {
        self.base + chrono::Duration::from_std(self.elapsed()).unwrap()
    }

    fn sleep(&self, duration: Duration, shutdown: &Shutdown) -> bool {
        if shutdown.is_triggered() {
            return false;
        }
        let target = self.elapsed() + duration;
        match self.limit {
            Some(limit) if target >= limit => {
                self.elapsed.set(limit);
                shutdown.trigger();
                false
            }
            _ => {
                self.elapsed.set(target);
                true
            }
        }
    }
}

const RESTING: Acceleration = Acceleration { x: 0.0, y: 0.0, z: 9.81 };

/// Reads queued samples first, then whatever spike covers the current
/// virtual time, otherwise a device at rest.
pub struct FakeSensor {
    clock: FakeClock,
    queued: VecDeque<Acceleration>,
    spikes: Vec<(Duration, Duration, Acceleration)>,
    reads: u32,
    fail_after: Option<u32>,
}

impl FakeSensor {
    pub fn resting(clock: FakeClock) -> Self {
        Self {
            clock,
            queued: VecDeque::new(),
            spikes: Vec::new(),
            reads: 0,
            fail_after: None,
        }
    }

    pub fn sequence(clock: FakeClock, samples: Vec<Acceleration>) -> Self {
        Self {
            queued: samples.into(),
            ..Self::resting(clock)
        }
    }

    /// Report `sample` for reads in `[from, until)`.
    pub fn with_spike(mut self, from: Duration, until: Duration, sample: Acceleration) -> Self {
        self.spikes.push((from, until, sample));
        self
    }

    pub fn failing_after(mut self, reads: u32) -> Self {
        self.fail_after = Some(reads);
        self
    }
}

impl AccelSensor for FakeSensor {
    fn read_acceleration(&mut self) -> Result<Acceleration, SensorError> {
        self.reads += 1;
        if self.fail_after.is_some_and(|n| self.reads > n) {
            return Err(SensorError::Bus("bus went away".to_string()));
        }
        if let Some(sample) = self.queued.pop_front() {
            return Ok(sample);
        }
        let now = self.clock.elapsed();
        Ok(self
            .spikes
            .iter()
            .find(|(from, until, _)| *from <= now && now < *until)
            .map(|(_, _, sample)| *sample)
            .unwrap_or(RESTING))
    }
}

#[derive(Debug, Clone)]
pub struct CaptureRecord {
    pub path: PathBuf,
    pub at: Duration,
}

pub type CaptureLog = Rc<RefCell<Vec<CaptureRecord>>>;

pub struct FakeCamera {
    clock: FakeClock,
    log: CaptureLog,
    broken: bool,
}

impl FakeCamera {
    pub fn new(clock: FakeClock) -> Self {
        Self {
            clock,
            log: Rc::new(RefCell::new(Vec::new())),
            broken: false,
        }
    }

    pub fn broken(mut self) -> Self {
        self.broken = true;
        self
    }

    pub fn log(&self) -> CaptureLog {
        Rc::clone(&self.log)
    }
}

impl Camera for FakeCamera {
    fn start(&mut self) -> Result<(), CameraError> {
        Ok(())
    }

    fn capture_to_file(&mut self, path: &Path) -> Result<(), CameraError> {
        if self.broken {
            return Err(CameraError::MissingOutput(path.to_path_buf()));
        }
        self.log.borrow_mut().push(CaptureRecord {
            path: path.to_path_buf(),
            at: self.clock.elapsed(),
        });
        Ok(())
    }
}

pub struct FakeRemote {
    calls: Rc<Cell<u32>>,
    fail_at: Option<SyncStep>,
}

impl FakeRemote {
    pub fn succeeding() -> Self {
        Self {
            calls: Rc::new(Cell::new(0)),
            fail_at: None,
        }
    }

    pub fn failing(step: SyncStep) -> Self {
        Self {
            fail_at: Some(step),
            ..Self::succeeding()
        }
    }

    pub fn calls(&self) -> Rc<Cell<u32>> {
        Rc::clone(&self.calls)
    }
}

impl RemoteSync for FakeRemote {
    fn sync(&mut self, _image: &Path) -> Result<(), SyncFailure> {
        self.calls.set(self.calls.get() + 1);
        match self.fail_at {
            Some(step) => Err(SyncFailure::new(step, "remote rejected the update")),
            None => Ok(()),
        }
    }
}
