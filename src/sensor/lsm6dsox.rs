//! Minimal LSM6DSOX accelerometer driver.
//!
//! Only the accelerometer half of the chip is used: it is set to 104 Hz with a
//! ±4 g full scale and read as three little-endian 16-bit words.

use embedded_hal::i2c::I2c;

use super::{AccelSensor, SensorError};
use crate::types::Acceleration;

pub const DEFAULT_ADDRESS: u8 = 0x6A;
pub const DEVICE_ID: u8 = 0x6C;

/// Standard gravity used by the datasheet's mg/LSB sensitivity.
const STANDARD_GRAVITY: f64 = 9.80665;
/// ±4 g full scale sensitivity, in g per LSB.
const SENSITIVITY_4G: f64 = 0.122e-3;
/// ODR_XL = 104 Hz, FS_XL = ±4 g
const CTRL1_XL_104HZ_4G: u8 = 0b0100_1000;

#[allow(non_camel_case_types)]
#[derive(Copy, Clone, Debug)]
enum Register {
    /// Fixed identification byte, reads 0x6C
    WhoAmI = 0x0F,
    /// Accelerometer output data rate and full scale
    Ctrl1Xl = 0x10,
    /// First of six accelerometer output bytes (X_L, X_H, Y_L, Y_H, Z_L, Z_H)
    OutX_L_A = 0x28,
}

pub struct Lsm6dsox<I>
where
    I: I2c,
{
    i2c: I,
    address: u8,
}

impl<I> Lsm6dsox<I>
where
    I: I2c,
{
    /// Check the device id and switch the accelerometer on.
    pub fn new(i2c: I, address: u8) -> Result<Self, SensorError> {
        let mut sensor = Self { i2c, address };

        let found = sensor.read_register(Register::WhoAmI)?;
        if found != DEVICE_ID {
            return Err(SensorError::WrongDevice {
                found,
                expected: DEVICE_ID,
            });
        }

        sensor.write_register(Register::Ctrl1Xl, CTRL1_XL_104HZ_4G)?;
        Ok(sensor)
    }

    fn read_register(&mut self, reg: Register) -> Result<u8, SensorError> {
        let mut buf = [0; 1];
        self.i2c
            .write_read(self.address, &[reg as u8], &mut buf)
            .map_err(|e| SensorError::Bus(format!("{:?}", e)))?;
        Ok(buf[0])
    }

    fn write_register(&mut self, reg: Register, value: u8) -> Result<(), SensorError> {
        self.i2c
            .write(self.address, &[reg as u8, value])
            .map_err(|e| SensorError::Bus(format!("{:?}", e)))
    }

    /// Raw accelerometer counts for x, y, z.
    pub fn read_raw(&mut self) -> Result<[i16; 3], SensorError> {
        let mut buf = [0u8; 6];
        self.i2c
            .write_read(self.address, &[Register::OutX_L_A as u8], &mut buf)
            .map_err(|e| SensorError::Bus(format!("{:?}", e)))?;

        Ok([
            i16::from_le_bytes([buf[0], buf[1]]),
            i16::from_le_bytes([buf[2], buf[3]]),
            i16::from_le_bytes([buf[4], buf[5]]),
        ])
    }
}

fn counts_to_ms2(raw: i16) -> f64 {
    raw as f64 * SENSITIVITY_4G * STANDARD_GRAVITY
}

impl<I> AccelSensor for Lsm6dsox<I>
where
    I: I2c,
{
    fn read_acceleration(&mut self) -> Result<Acceleration, SensorError> {
        let [x, y, z] = self.read_raw()?;
        Ok(Acceleration::new(
            counts_to_ms2(x),
            counts_to_ms2(y),
            counts_to_ms2(z),
        ))
    }
}
