use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Output};

use log::debug;

use super::{Camera, CameraError};
use crate::config::CameraConfig;

/// Still capture through the libcamera command line tools (`rpicam-still`).
pub struct RpicamStill {
    command: String,
    capture_timeout_ms: u64,
    extra_args: Vec<String>,
}

impl RpicamStill {
    pub fn from_config(config: &CameraConfig) -> Self {
        Self {
            command: config.command.clone(),
            capture_timeout_ms: config.capture_timeout_ms,
            extra_args: config.extra_args.clone(),
        }
    }

    fn capture_args(&self, path: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-n".into(),
            "-t".into(),
            self.capture_timeout_ms.to_string().into(),
            "-o".into(),
            path.as_os_str().to_owned(),
        ];
        args.extend(self.extra_args.iter().map(OsString::from));
        args
    }

    fn run(&self, args: &[OsString]) -> Result<Output, CameraError> {
        let output = Command::new(&self.command)
            .args(args)
            .output()
            .map_err(|source| CameraError::Spawn {
                command: self.command.clone(),
                source,
            })?;

        if output.status.success() {
            Ok(output)
        } else {
            Err(CameraError::Status {
                command: self.command.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

impl Camera for RpicamStill {
    fn start(&mut self) -> Result<(), CameraError> {
        let output = self.run(&[OsString::from("--version")])?;
        debug!(
            "{} available: {}",
            self.command,
            String::from_utf8_lossy(&output.stdout).lines().next().unwrap_or("")
        );
        Ok(())
    }

    fn capture_to_file(&mut self, path: &Path) -> Result<(), CameraError> {
        self.run(&self.capture_args(path))?;
        if !path.exists() {
            return Err(CameraError::MissingOutput(path.to_path_buf()));
        }
        Ok(())
    }
}
