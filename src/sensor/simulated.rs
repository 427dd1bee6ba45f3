use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{AccelSensor, SensorError};
use crate::types::Acceleration;

/// Peak-to-peak noise on each axis while at rest, in m/s².
const REST_NOISE: f64 = 0.05;

/// Stand-in IMU for running without hardware: a device lying flat, with an
/// occasional shake spike on the z axis.
pub struct SimulatedImu {
    rng: StdRng,
    gravity: f64,
    shake_probability: f64,
}

impl SimulatedImu {
    /// `gravity` is the resting magnitude reported on the z axis.
    pub fn new(gravity: f64, shake_probability: f64) -> Self {
        Self::with_rng(StdRng::from_os_rng(), gravity, shake_probability)
    }

    #[cfg(test)]
    fn with_seed(gravity: f64, shake_probability: f64, seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), gravity, shake_probability)
    }

    fn with_rng(rng: StdRng, gravity: f64, shake_probability: f64) -> Self {
        Self {
            rng,
            gravity,
            shake_probability: shake_probability.clamp(0.0, 1.0),
        }
    }

    fn noise(&mut self) -> f64 {
        self.rng.random_range(-REST_NOISE / 2.0..REST_NOISE / 2.0)
    }
}

impl AccelSensor for SimulatedImu {
    fn read_acceleration(&mut self) -> Result<Acceleration, SensorError> {
        let mut sample = Acceleration::new(self.noise(), self.noise(), self.gravity + self.noise());
        if self.rng.random_bool(self.shake_probability) {
            sample.z += self.rng.random_range(4.0..8.0);
        }
        Ok(sample)
    }
}
