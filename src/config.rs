//! Configuration for the shake camera.
//! Every section has defaults, so a missing file or a partial file both work.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

use crate::sensor::lsm6dsox;

pub const DEFAULT_CONFIG_FILE: &str = "shakecam.toml";
/// Names an explicit config file; takes precedence over `shakecam.toml`.
pub const CONFIG_PATH_VAR: &str = "SHAKECAM_CONFIG";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub detector: DetectorConfig,
    pub output: OutputConfig,
    pub imu: ImuConfig,
    pub camera: CameraConfig,
    pub sync: SyncConfig,
    pub logging: LoggingConfig,
}

/// Threshold and timing of the detector loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Trigger when |gravity - |a|| exceeds this, in m/s²
    pub threshold: f64,
    pub gravity: f64,
    pub poll_interval_ms: u64,
    pub debounce_ms: u64,
    pub cooldown_ms: u64,
}

/// Where captured images go
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Local clone of the remote repository
    pub repo_path: String,
    /// Image folder, relative to `repo_path`
    pub folder_path: String,
    pub prefix: String,
    pub on_collision: CollisionPolicy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Same-second captures overwrite each other
    Overwrite,
    /// Same-second captures get `_1`, `_2`, ... appended
    Suffix,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImuConfig {
    pub backend: ImuBackend,
    pub i2c_bus: String,
    pub address: u8,
    /// Chance per read of a simulated shake; ignored by real hardware
    pub shake_probability: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImuBackend {
    Lsm6dsox,
    Simulated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub backend: CameraBackend,
    pub command: String,
    /// Settling time after the camera starts, before the first poll
    pub warmup_ms: u64,
    /// Passed to the capture command as `-t`
    pub capture_timeout_ms: u64,
    pub extra_args: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraBackend {
    Rpicam,
    Simulated,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub enabled: bool,
    pub git_command: String,
    pub remote: String,
    pub commit_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// env_logger filter, overridden by RUST_LOG
    pub level: String,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            threshold: 1.11154,
            gravity: 9.81,
            poll_interval_ms: 100,
            debounce_ms: 500,
            cooldown_ms: 2000,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            repo_path: "/home/pi/flat".to_string(),
            folder_path: "images".to_string(),
            prefix: "shake".to_string(),
            on_collision: CollisionPolicy::Overwrite,
        }
    }
}

impl Default for ImuConfig {
    fn default() -> Self {
        Self {
            backend: ImuBackend::Lsm6dsox,
            i2c_bus: "/dev/i2c-1".to_string(),
            address: lsm6dsox::DEFAULT_ADDRESS,
            shake_probability: 0.0,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            backend: CameraBackend::Rpicam,
            command: "rpicam-still".to_string(),
            warmup_ms: 2000,
            capture_timeout_ms: 1000,
            extra_args: Vec::new(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            git_command: "git".to_string(),
            remote: "origin".to_string(),
            commit_message: "New Photo".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl OutputConfig {
    /// `<repo_path>/<folder_path>`
    pub fn image_directory(&self) -> PathBuf {
        Path::new(&self.repo_path).join(&self.folder_path)
    }
}

impl FromStr for ImuBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lsm6dsox" => Ok(ImuBackend::Lsm6dsox),
            "simulated" => Ok(ImuBackend::Simulated),
            other => Err(format!("unknown IMU backend '{}'", other)),
        }
    }
}

impl FromStr for CameraBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rpicam" => Ok(CameraBackend::Rpicam),
            "simulated" => Ok(CameraBackend::Simulated),
            other => Err(format!("unknown camera backend '{}'", other)),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl AppConfig {
    /// Load configuration from a file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = Self::parse_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a file without validating it; overrides may still fix it up.
    fn parse_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(e))?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e))
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e))?;

        std::fs::write(path, content)
            .map_err(|e| ConfigError::IoError(e))?;

        Ok(())
    }

    /// Apply `SHAKECAM_*` overrides. `lookup` is `env::var` in production.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("SHAKECAM_THRESHOLD") {
            self.detector.threshold = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::override_error("SHAKECAM_THRESHOLD", &value))?;
        }
        if let Some(value) = lookup("SHAKECAM_REPO_PATH") {
            self.output.repo_path = value;
        }
        if let Some(value) = lookup("SHAKECAM_FOLDER_PATH") {
            self.output.folder_path = value;
        }
        if let Some(value) = lookup("SHAKECAM_PREFIX") {
            self.output.prefix = value;
        }
        if let Some(value) = lookup("SHAKECAM_IMU_BACKEND") {
            self.imu.backend = value
                .parse()
                .map_err(|_| ConfigError::override_error("SHAKECAM_IMU_BACKEND", &value))?;
        }
        if let Some(value) = lookup("SHAKECAM_CAMERA_BACKEND") {
            self.camera.backend = value
                .parse()
                .map_err(|_| ConfigError::override_error("SHAKECAM_CAMERA_BACKEND", &value))?;
        }
        if let Some(value) = lookup("SHAKECAM_SYNC_ENABLED") {
            self.sync.enabled = parse_bool(&value)
                .ok_or_else(|| ConfigError::override_error("SHAKECAM_SYNC_ENABLED", &value))?;
        }
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let detector = &self.detector;
        if !(detector.threshold.is_finite() && detector.threshold > 0.0) {
            return Err(ConfigError::ValidationError("Threshold must be a positive number".to_string()));
        }

        if !(detector.gravity.is_finite() && detector.gravity > 0.0) {
            return Err(ConfigError::ValidationError("Gravity must be a positive number".to_string()));
        }

        if detector.poll_interval_ms == 0 {
            return Err(ConfigError::ValidationError("Poll interval must be positive".to_string()));
        }

        let output = &self.output;
        if output.repo_path.trim().is_empty() {
            return Err(ConfigError::ValidationError("Repository path must not be empty".to_string()));
        }

        if output.prefix.is_empty() || output.prefix.contains(['/', '\\']) {
            return Err(ConfigError::ValidationError(
                "Image prefix must be non-empty and contain no path separators".to_string(),
            ));
        }

        let folder = Path::new(&output.folder_path);
        if folder.is_absolute() || folder.components().any(|c| c == Component::ParentDir) {
            return Err(ConfigError::ValidationError(
                "Folder path must be relative to the repository and stay inside it".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.imu.shake_probability) {
            return Err(ConfigError::ValidationError("Shake probability must be between 0 and 1".to_string()));
        }

        if self.camera.backend == CameraBackend::Rpicam && self.camera.command.trim().is_empty() {
            return Err(ConfigError::ValidationError("Camera command must not be empty".to_string()));
        }

        if self.sync.enabled {
            if self.sync.git_command.trim().is_empty() || self.sync.remote.trim().is_empty() {
                return Err(ConfigError::ValidationError("Sync needs a git command and a remote".to_string()));
            }
            if self.sync.commit_message.trim().is_empty() {
                return Err(ConfigError::ValidationError("Commit message must not be empty".to_string()));
            }
        }

        Ok(())
    }
}

/// Configuration error type
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(toml::de::Error),
    #[error("Serialize error: {0}")]
    SerializeError(toml::ser::Error),
    #[error("Invalid value for {var}: '{value}'")]
    OverrideError { var: String, value: String },
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl ConfigError {
    fn override_error(var: &str, value: &str) -> Self {
        ConfigError::OverrideError {
            var: var.to_string(),
            value: value.to_string(),
        }
    }
}

/// Configuration manager
pub struct ConfigManager {
    config: AppConfig,
    config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Create a manager holding the defaults
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
            config_path: None,
        }
    }

    /// Load configuration from a file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let config = AppConfig::load_from_file(&path)?;
        Ok(Self {
            config,
            config_path: Some(path.as_ref().to_path_buf()),
        })
    }

    /// Resolve the effective configuration for this process:
    /// `.env`, then `$SHAKECAM_CONFIG` or `./shakecam.toml` if present,
    /// then `SHAKECAM_*` overrides, then validation.
    pub fn from_environment() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::resolve(|key| env::var(key).ok(), Path::new(DEFAULT_CONFIG_FILE))
    }

    fn resolve<F>(lookup: F, default_path: &Path) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config_path = match lookup(CONFIG_PATH_VAR) {
            Some(path) => Some(PathBuf::from(path)),
            None if default_path.exists() => Some(default_path.to_path_buf()),
            None => None,
        };

        let mut config = match &config_path {
            Some(path) => AppConfig::parse_file(path)?,
            None => AppConfig::default(),
        };

        // validated once, after the overrides have had their say
        config.apply_overrides(&lookup)?;
        config.validate()?;
        Ok(Self { config, config_path })
    }

    /// Get the current configuration
    pub fn get_config(&self) -> &AppConfig {
        &self.config
    }

    /// File the configuration came from, if any
    pub fn source(&self) -> Option<&Path> {
        self.config_path.as_deref()
    }

    /// Save configuration to a specific file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        self.config.save_to_file(path)
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn invalid(config: &AppConfig) -> bool {
        matches!(config.validate(), Err(ConfigError::ValidationError(_)))
    }

    #[test]
    fn defaults_match_the_reference_deployment() {
        let config = AppConfig::default();
        assert_eq!(config.detector.threshold, 1.11154);
        assert_eq!(config.detector.gravity, 9.81);
        assert_eq!(config.detector.poll_interval_ms, 100);
        assert_eq!(config.detector.debounce_ms, 500);
        assert_eq!(config.detector.cooldown_ms, 2000);
        assert_eq!(config.output.image_directory(), PathBuf::from("/home/pi/flat/images"));
        assert_eq!(config.imu.address, 0x6A);
        assert_eq!(config.sync.commit_message, "New Photo");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [detector]
            threshold = 2.0

            [output]
            repo_path = "/srv/shakes"
            on_collision = "suffix"

            [imu]
            backend = "simulated"
            address = 0x6B
            "#,
        )
        .unwrap();

        assert_eq!(config.detector.threshold, 2.0);
        assert_eq!(config.detector.cooldown_ms, 2000);
        assert_eq!(config.output.folder_path, "images");
        assert_eq!(config.output.on_collision, CollisionPolicy::Suffix);
        assert_eq!(config.imu.backend, ImuBackend::Simulated);
        assert_eq!(config.imu.address, 0x6B);
        assert_eq!(config.camera, CameraConfig::default());
    }

    #[test]
    fn save_then_load_keeps_settings() {
        let path = std::env::temp_dir().join(format!("shakecam-config-{}.toml", std::process::id()));
        let mut manager = ConfigManager::new();
        manager.config.output.prefix = "porch".to_string();
        manager.config.sync.enabled = false;
        manager.save_to_file(&path).unwrap();

        let loaded = ConfigManager::load_from_file(&path).unwrap();
        assert_eq!(loaded.get_config(), manager.get_config());
        assert_eq!(loaded.source(), Some(path.as_path()));
        std::fs::remove_file(&path).unwrap();
    }

    fn scratch_file(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("shakecam-{}-{}.toml", name, std::process::id()));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn config_var_takes_precedence_over_default_file() {
        let default_file = scratch_file("resolve-default", "[output]\nprefix = \"porch\"\n");
        let chosen = scratch_file("resolve-chosen", "[output]\nprefix = \"garage\"\n");

        let manager = ConfigManager::resolve(
            lookup(&[(CONFIG_PATH_VAR, chosen.to_str().unwrap())]),
            &default_file,
        )
        .unwrap();
        assert_eq!(manager.get_config().output.prefix, "garage");
        assert_eq!(manager.source(), Some(chosen.as_path()));

        let manager = ConfigManager::resolve(lookup(&[]), &default_file).unwrap();
        assert_eq!(manager.get_config().output.prefix, "porch");
        assert_eq!(manager.source(), Some(default_file.as_path()));

        std::fs::remove_file(&default_file).unwrap();
        std::fs::remove_file(&chosen).unwrap();
    }

    #[test]
    fn defaults_apply_without_any_file() {
        let manager = ConfigManager::resolve(lookup(&[]), Path::new("/nonexistent/shakecam.toml")).unwrap();
        assert_eq!(manager.get_config(), &AppConfig::default());
        assert_eq!(manager.source(), None);
    }

    #[test]
    fn named_config_file_must_exist() {
        let err = ConfigManager::resolve(
            lookup(&[(CONFIG_PATH_VAR, "/nonexistent/chosen.toml")]),
            Path::new("/nonexistent/shakecam.toml"),
        )
        .err()
        .unwrap();
        assert!(matches!(err, ConfigError::IoError(_)));
    }

    #[test]
    fn override_can_repair_a_bad_file_value() {
        let path = scratch_file("resolve-repair", "[detector]\nthreshold = 0.0\n");
        let vars = [(CONFIG_PATH_VAR, path.to_str().unwrap()), ("SHAKECAM_THRESHOLD", "2.0")];

        let manager = ConfigManager::resolve(lookup(&vars), Path::new("/nonexistent/shakecam.toml")).unwrap();
        assert_eq!(manager.get_config().detector.threshold, 2.0);

        // without the override the same file is still rejected
        let err = ConfigManager::resolve(lookup(&vars[..1]), Path::new("/nonexistent/shakecam.toml"))
            .err()
            .unwrap();
        assert!(matches!(err, ConfigError::ValidationError(_)));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = AppConfig::load_from_file("/nonexistent/shakecam.toml").unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }

    #[test]
    fn overrides_replace_file_values() {
        let mut config = AppConfig::default();
        config
            .apply_overrides(lookup(&[
                ("SHAKECAM_THRESHOLD", "2.5"),
                ("SHAKECAM_PREFIX", "desk"),
                ("SHAKECAM_IMU_BACKEND", "Simulated"),
                ("SHAKECAM_CAMERA_BACKEND", "simulated"),
                ("SHAKECAM_SYNC_ENABLED", "no"),
            ]))
            .unwrap();

        assert_eq!(config.detector.threshold, 2.5);
        assert_eq!(config.output.prefix, "desk");
        assert_eq!(config.imu.backend, ImuBackend::Simulated);
        assert_eq!(config.camera.backend, CameraBackend::Simulated);
        assert!(!config.sync.enabled);
    }

    #[test]
    fn bad_override_names_the_variable() {
        let mut config = AppConfig::default();
        let err = config
            .apply_overrides(lookup(&[("SHAKECAM_THRESHOLD", "lots")]))
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for SHAKECAM_THRESHOLD: 'lots'");
    }

    #[test]
    fn validation_rejects_bad_detector_values() {
        let mut config = AppConfig::default();
        config.detector.threshold = 0.0;
        assert!(invalid(&config));

        let mut config = AppConfig::default();
        config.detector.threshold = f64::NAN;
        assert!(invalid(&config));

        let mut config = AppConfig::default();
        config.detector.poll_interval_ms = 0;
        assert!(invalid(&config));
    }

    #[test]
    fn validation_keeps_images_inside_the_repository() {
        let mut config = AppConfig::default();
        config.output.prefix = String::new();
        assert!(invalid(&config));

        let mut config = AppConfig::default();
        config.output.prefix = "a/b".to_string();
        assert!(invalid(&config));

        let mut config = AppConfig::default();
        config.output.folder_path = "/tmp/images".to_string();
        assert!(invalid(&config));

        let mut config = AppConfig::default();
        config.output.folder_path = "images/../../etc".to_string();
        assert!(invalid(&config));

        let mut config = AppConfig::default();
        config.output.folder_path = "images/2025".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validation_checks_sync_only_when_enabled() {
        let mut config = AppConfig::default();
        config.sync.remote = String::new();
        assert!(invalid(&config));

        config.sync.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validation_bounds_shake_probability() {
        let mut config = AppConfig::default();
        config.imu.shake_probability = 1.5;
        assert!(invalid(&config));
    }
}
