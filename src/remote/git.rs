use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Command;

use log::{debug, info};

use super::{RemoteSync, SyncFailure, SyncStep};
use crate::config::{OutputConfig, SyncConfig};

/// Runs the `git` CLI against an existing local clone.
///
/// One sync is `pull`, `add <image dir>`, `commit -m <message>`, `push`,
/// stopping at the first step that fails.
pub struct GitSync {
    git: String,
    repo_path: PathBuf,
    image_dir: PathBuf,
    remote: String,
    commit_message: String,
}

impl GitSync {
    pub fn from_config(sync: &SyncConfig, output: &OutputConfig) -> Self {
        Self {
            git: sync.git_command.clone(),
            repo_path: PathBuf::from(&output.repo_path),
            image_dir: output.image_directory(),
            remote: sync.remote.clone(),
            commit_message: sync.commit_message.clone(),
        }
    }

    /// Arguments passed after `git -C <repo>` for each step.
    fn step_args(&self, step: SyncStep) -> Vec<OsString> {
        match step {
            SyncStep::Pull => vec!["pull".into(), self.remote.clone().into()],
            SyncStep::Add => vec!["add".into(), self.image_dir.clone().into_os_string()],
            SyncStep::Commit => vec!["commit".into(), "-m".into(), self.commit_message.clone().into()],
            SyncStep::Push => vec!["push".into(), self.remote.clone().into()],
        }
    }

    fn run_step(&self, step: SyncStep) -> Result<(), SyncFailure> {
        let args = self.step_args(step);
        debug!("git -C {} {}", self.repo_path.display(), join_args(&args));

        let output = Command::new(&self.git)
            .arg("-C")
            .arg(&self.repo_path)
            .args(&args)
            .output()
            .map_err(|e| SyncFailure::new(step, format!("failed to run {}: {}", self.git, e)))?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(SyncFailure::new(
                step,
                format!("{} ({})", output.status, stderr.trim()),
            ))
        }
    }
}

impl RemoteSync for GitSync {
    fn sync(&mut self, image: &Path) -> Result<(), SyncFailure> {
        for step in [SyncStep::Pull, SyncStep::Add, SyncStep::Commit, SyncStep::Push] {
            self.run_step(step)?;
        }
        info!("Image {} pushed to {}", image.display(), self.remote);
        Ok(())
    }
}

fn join_args(args: &[OsString]) -> String {
    args.iter()
        .map(|a| a.as_os_str())
        .map(OsStr::to_string_lossy)
        .collect::<Vec<_>>()
        .join(" ")
}
