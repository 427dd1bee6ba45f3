use std::path::PathBuf;

use super::Acceleration;
use crate::remote::SyncFailure;

/// What happened to the remote copy of a captured image.
#[derive(Debug)]
pub enum SyncOutcome {
    Synced,
    /// Sync is disabled in configuration.
    Skipped,
    Failed(SyncFailure),
}

/// A completed trigger: the sample that crossed the threshold and what was done about it.
#[derive(Debug)]
pub struct ShakeEvent {
    pub sample: Acceleration,
    pub dynamic: f64,
    pub image: PathBuf,
    pub sync: SyncOutcome,
}

/// Result of a single poll of the sensor
#[derive(Debug)]
pub enum PollOutcome {
    Idle { dynamic: f64 },
    Triggered(ShakeEvent),
    /// Shutdown arrived during the debounce, nothing was captured.
    Interrupted,
}

/// Counters accumulated over one run of the detector loop
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub polls: u64,
    pub triggers: u64,
    pub captures: u64,
    pub synced: u64,
    pub sync_failures: u64,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &PollOutcome) {
        self.polls += 1;
        match outcome {
            PollOutcome::Idle { .. } => {}
            PollOutcome::Interrupted => self.triggers += 1,
            PollOutcome::Triggered(event) => {
                self.triggers += 1;
                self.captures += 1;
                match event.sync {
                    SyncOutcome::Synced => self.synced += 1,
                    SyncOutcome::Failed(_) => self.sync_failures += 1,
                    SyncOutcome::Skipped => {}
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::SyncStep;

    fn event(sync: SyncOutcome) -> PollOutcome {
        PollOutcome::Triggered(ShakeEvent {
            sample: Acceleration::new(0.0, 0.0, 15.0),
            dynamic: 5.19,
            image: PathBuf::from("images/shake_120000.jpg"),
            sync,
        })
    }

    #[test]
    fn summary_counts_each_outcome() {
        let mut summary = RunSummary::default();
        summary.record(&PollOutcome::Idle { dynamic: 0.1 });
        summary.record(&event(SyncOutcome::Synced));
        summary.record(&event(SyncOutcome::Failed(SyncFailure::new(SyncStep::Push, "rejected"))));
        summary.record(&event(SyncOutcome::Skipped));
        summary.record(&PollOutcome::Interrupted);

        assert_eq!(
            summary,
            RunSummary {
                polls: 5,
                triggers: 4,
                captures: 3,
                synced: 1,
                sync_failures: 1,
            }
        );
    }
}
