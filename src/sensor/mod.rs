pub mod lsm6dsox;
pub mod simulated;

use linux_embedded_hal::I2cdev;
use log::info;

use crate::config::{ImuBackend, ImuConfig};
use crate::types::Acceleration;

pub use lsm6dsox::Lsm6dsox;
pub use simulated::SimulatedImu;

#[derive(Debug, thiserror::Error)]
pub enum SensorError {
    #[error("failed to open I2C bus {bus}: {reason}")]
    Open { bus: String, reason: String },
    #[error("I2C transfer failed: {0}")]
    Bus(String),
    #[error("unexpected device id 0x{found:02X} (expected 0x{expected:02X})")]
    WrongDevice { found: u8, expected: u8 },
}

/// Source of acceleration samples.
pub trait AccelSensor {
    fn read_acceleration(&mut self) -> Result<Acceleration, SensorError>;
}

impl<T: AccelSensor + ?Sized> AccelSensor for Box<T> {
    fn read_acceleration(&mut self) -> Result<Acceleration, SensorError> {
        (**self).read_acceleration()
    }
}

/// Build the sensor selected by `config.backend`. `gravity` only shapes the
/// simulated backend's resting reading.
pub fn open(config: &ImuConfig, gravity: f64) -> Result<Box<dyn AccelSensor>, SensorError> {
    match config.backend {
        ImuBackend::Lsm6dsox => {
            let i2c = I2cdev::new(&config.i2c_bus).map_err(|e| SensorError::Open {
                bus: config.i2c_bus.clone(),
                reason: e.to_string(),
            })?;
            let sensor = Lsm6dsox::new(i2c, config.address)?;
            info!("LSM6DSOX ready on {} at 0x{:02X}", config.i2c_bus, config.address);
            Ok(Box::new(sensor))
        }
        ImuBackend::Simulated => {
            info!(
                "Using simulated IMU (shake probability {:.3} per read)",
                config.shake_probability
            );
            Ok(Box::new(SimulatedImu::new(gravity, config.shake_probability)))
        }
    }
}
