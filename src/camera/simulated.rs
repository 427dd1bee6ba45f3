use std::path::Path;

use image::{ImageFormat, Rgb, RgbImage};

use super::{Camera, CameraError};

const WIDTH: u32 = 320;
const HEIGHT: u32 = 240;

/// Writes a solid-colour JPEG per capture, cycling the colour so consecutive
/// frames differ.
pub struct SimulatedCamera {
    frames: u32,
}

impl SimulatedCamera {
    pub fn new() -> Self {
        Self { frames: 0 }
    }

    fn next_colour(&mut self) -> Rgb<u8> {
        self.frames = self.frames.wrapping_add(1);
        let shade = (self.frames.wrapping_mul(47) % 256) as u8;
        Rgb([shade, 255 - shade, 128])
    }
}

impl Default for SimulatedCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera for SimulatedCamera {
    fn start(&mut self) -> Result<(), CameraError> {
        Ok(())
    }

    fn capture_to_file(&mut self, path: &Path) -> Result<(), CameraError> {
        let frame = RgbImage::from_pixel(WIDTH, HEIGHT, self.next_colour());
        frame.save_with_format(path, ImageFormat::Jpeg)?;
        Ok(())
    }
}
