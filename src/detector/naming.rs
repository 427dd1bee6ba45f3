use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::config::{CollisionPolicy, OutputConfig};

/// Builds `<prefix>_<HHMMSS>.jpg` paths inside the image directory.
#[derive(Debug, Clone)]
pub struct ImageNamer {
    directory: PathBuf,
    prefix: String,
    on_collision: CollisionPolicy,
}

impl ImageNamer {
    pub fn new(directory: impl Into<PathBuf>, prefix: impl Into<String>, on_collision: CollisionPolicy) -> Self {
        Self {
            directory: directory.into(),
            prefix: prefix.into(),
            on_collision,
        }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(config.image_directory(), config.prefix.clone(), config.on_collision)
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn ensure_directory(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.directory)
    }

    pub fn file_name(&self, at: &DateTime<Local>) -> String {
        format!("{}_{}.jpg", self.prefix, clock_stamp(at))
    }

    /// Path for a capture taken at `at`.
    ///
    /// With `Overwrite` two captures in the same second share a path; with
    /// `Suffix` the first free `<prefix>_<HHMMSS>_<n>.jpg` is used instead.
    pub fn path_for(&self, at: &DateTime<Local>) -> PathBuf {
        let path = self.directory.join(self.file_name(at));
        if self.on_collision == CollisionPolicy::Overwrite || !path.exists() {
            return path;
        }

        let stamp = clock_stamp(at);
        (1u32..)
            .map(|n| self.directory.join(format!("{}_{}_{}.jpg", self.prefix, stamp, n)))
            .find(|candidate| !candidate.exists())
            .unwrap_or(path)
    }
}

/// Local time of day as six digits, `HHMMSS`.
pub fn clock_stamp(at: &DateTime<Local>) -> String {
    at.format("%H%M%S").to_string()
}
