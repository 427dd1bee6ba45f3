use std::env;
use std::error::Error;
use std::time::Duration;

use log::{error, info};

use shakecam::camera::{self, Camera};
use shakecam::config::{AppConfig, ConfigManager};
use shakecam::detector::{Clock, DetectorError, DetectorSettings, ImageNamer, ShakeDetector, Shutdown, SystemClock};
use shakecam::logger;
use shakecam::remote::GitSync;
use shakecam::sensor;

/// Writes the effective configuration to the named file and exits.
const DUMP_CONFIG_VAR: &str = "SHAKECAM_DUMP_CONFIG";

fn main() {
    let manager = match ConfigManager::from_environment() {
        Ok(manager) => manager,
        Err(e) => {
            eprintln!("shakecam: invalid configuration: {}", e);
            std::process::exit(2);
        }
    };
    let config = manager.get_config();

    logger::init_logger(&config.logging.level);
    match manager.source() {
        Some(path) => info!("shakecam starting with {}", path.display()),
        None => info!("shakecam starting with built-in defaults"),
    }

    if let Ok(path) = env::var(DUMP_CONFIG_VAR) {
        match manager.save_to_file(&path) {
            Ok(()) => info!("Configuration written to {}", path),
            Err(e) => {
                error!("Failed to write configuration to {}: {}", path, e);
                std::process::exit(1);
            }
        }
        return;
    }

    if let Err(e) = run(config) {
        error!("{}", e);
        std::process::exit(1);
    }
    info!("shakecam stopped");
}

fn run(config: &AppConfig) -> Result<(), Box<dyn Error>> {
    let shutdown = Shutdown::new();
    shutdown.trigger_on_ctrl_c();

    let namer = ImageNamer::from_config(&config.output);
    if let Err(e) = namer.ensure_directory() {
        error!("Cannot create {}", namer.directory().display());
        return Err(DetectorError::from(e).into());
    }

    let sensor = sensor::open(&config.imu, config.detector.gravity)?;

    let mut camera = camera::open(&config.camera);
    camera.start()?;
    let clock = SystemClock;
    if !clock.sleep(Duration::from_millis(config.camera.warmup_ms), &shutdown) {
        info!("Shutdown during camera warm-up");
        return Ok(());
    }

    let remote = if config.sync.enabled {
        Some(GitSync::from_config(&config.sync, &config.output))
    } else {
        info!("Remote sync disabled");
        None
    };

    let mut detector = ShakeDetector::new(
        sensor,
        camera,
        remote,
        clock,
        DetectorSettings::from(&config.detector),
        namer,
    );

    if let Err(e) = detector.run(&shutdown) {
        let summary = detector.summary();
        error!(
            "Detector failed after {} polls and {} captures",
            summary.polls, summary.captures
        );
        return Err(e.into());
    }
    Ok(())
}
