/// One accelerometer reading in m/s².
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Acceleration {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Acceleration {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean norm of the three components.
    pub fn magnitude(&self) -> f64 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    /// Deviation of the magnitude from `gravity`, always non-negative.
    pub fn dynamic(&self, gravity: f64) -> f64 {
        (gravity - self.magnitude()).abs()
    }
}
