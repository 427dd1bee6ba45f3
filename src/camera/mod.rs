pub mod rpicam;
pub mod simulated;

use std::path::{Path, PathBuf};

use log::info;

use crate::config::{CameraBackend, CameraConfig};

pub use rpicam::RpicamStill;
pub use simulated::SimulatedCamera;

#[derive(Debug, thiserror::Error)]
pub enum CameraError {
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },
    #[error("{command} exited with {status}: {stderr}")]
    Status {
        command: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
    #[error("capture reported success but {0} was not written")]
    MissingOutput(PathBuf),
    #[error("failed to encode image: {0}")]
    Encode(#[from] image::ImageError),
}

pub trait Camera {
    /// Configure and start the camera; called once before the first capture.
    fn start(&mut self) -> Result<(), CameraError>;

    /// Take one still and write it to `path`. Blocks until the file is written.
    fn capture_to_file(&mut self, path: &Path) -> Result<(), CameraError>;
}

impl<T: Camera + ?Sized> Camera for Box<T> {
    fn start(&mut self) -> Result<(), CameraError> {
        (**self).start()
    }

    fn capture_to_file(&mut self, path: &Path) -> Result<(), CameraError> {
        (**self).capture_to_file(path)
    }
}

/// Build the camera selected by `config.backend`.
pub fn open(config: &CameraConfig) -> Box<dyn Camera> {
    match config.backend {
        CameraBackend::Rpicam => {
            info!("Using {} for stills", config.command);
            Box::new(RpicamStill::from_config(config))
        }
        CameraBackend::Simulated => {
            info!("Using simulated camera");
            Box::new(SimulatedCamera::new())
        }
    }
}
