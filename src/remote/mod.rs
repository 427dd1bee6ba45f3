//! Pushing captured images to a remote repository.
//!
//! Sync is best-effort: every failure comes back as a [`SyncFailure`] naming
//! the step that broke, and the caller decides what to log.

pub mod git;

use std::fmt;
use std::path::Path;

pub use git::GitSync;

/// The individual steps of one sync, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStep {
    Pull,
    Add,
    Commit,
    Push,
}

impl SyncStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncStep::Pull => "pull",
            SyncStep::Add => "add",
            SyncStep::Commit => "commit",
            SyncStep::Push => "push",
        }
    }
}

impl fmt::Display for SyncStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("sync {step} failed: {reason}")]
pub struct SyncFailure {
    pub step: SyncStep,
    pub reason: String,
}

impl SyncFailure {
    pub fn new(step: SyncStep, reason: impl Into<String>) -> Self {
        Self {
            step,
            reason: reason.into(),
        }
    }
}

pub trait RemoteSync {
    /// Publish the repository state after `image` has been written.
    fn sync(&mut self, image: &Path) -> Result<(), SyncFailure>;
}

impl<T: RemoteSync + ?Sized> RemoteSync for Box<T> {
    fn sync(&mut self, image: &Path) -> Result<(), SyncFailure> {
        (**self).sync(image)
    }
}
