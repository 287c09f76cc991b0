//! CPU-resident single-channel images captured from GPU textures.

use glam::Vec2;

use crate::readback::read_texture;
use crate::texture::{GpuTexture, TextureError};

/// An 8-bit single-channel image, row 0 at the top.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScalarImage {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl ScalarImage {
    /// Wrap tightly packed `width × height` bytes.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, TextureError> {
        let expected = width as usize * height as usize;
        if width == 0 || height == 0 {
            return Err(TextureError::ZeroDimensions { width, height });
        }
        if data.len() != expected {
            return Err(TextureError::DataSizeMismatch {
                actual: data.len(),
                expected,
                width,
                height,
                format: wgpu::TextureFormat::R8Unorm,
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Copy an `R8Unorm` texture (with `COPY_SRC`) back from the GPU.
    pub fn capture(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        texture: &GpuTexture,
    ) -> Result<Self, TextureError> {
        if texture.format != wgpu::TextureFormat::R8Unorm {
            return Err(TextureError::UnsupportedFormat(texture.format));
        }
        let (width, height) = texture.dimensions;
        let data = read_texture(device, queue, texture)?;
        log::debug!("Captured {width}x{height} scalar image from GPU");
        Self::new(width, height, data)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Intensity in `[0, 1]` of pixel `(x, y)`, clamped to the image bounds.
    pub fn get(&self, x: u32, y: u32) -> f32 {
        let x = x.min(self.width - 1) as usize;
        let y = y.min(self.height - 1) as usize;
        f32::from(self.data[y * self.width as usize + x]) / 255.0
    }

    /// Nearest-pixel lookup at `uv`. Coordinates outside `[0, 1)` clamp to the edge pixels.
    pub fn sample_nearest(&self, uv: Vec2) -> f32 {
        let (x, y) = self.pixel_at(uv);
        self.get(x, y)
    }

    /// Pixel that `uv` falls in, truncating toward zero and clamping to the image.
    pub fn pixel_at(&self, uv: Vec2) -> (u32, u32) {
        (
            clamp_index(self.width as f32 * uv.x, self.width),
            clamp_index(self.height as f32 * uv.y, self.height),
        )
    }
}

fn clamp_index(scaled: f32, size: u32) -> u32 {
    // `as` saturates NaN to 0 and negatives to 0 before the upper clamp.
    let index = scaled as i64;
    index.clamp(0, i64::from(size) - 1) as u32
}
