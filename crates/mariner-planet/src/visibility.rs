//! Persistent fog-of-war mask.

use mariner_render::{TextureError, read_buffer};

/// Bytes per texel: `vec2<f32>` of (ever seen, visible now).
pub const VISIBILITY_TEXEL_SIZE: u64 = 8;

/// One texel of the visibility mask.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct VisibilityTexel {
    /// 1 once the texel has been inside the view radius, never reset.
    pub ever_seen: f32,
    /// 1 while the texel is inside the view radius.
    pub visible: f32,
}

/// GPU storage buffer of `width × height` [`VisibilityTexel`]s in row-major
/// equirectangular order. Zero-filled at creation; only the visibility pass
/// writes to it afterwards.
#[derive(Clone, Debug)]
pub struct VisibilityMask {
    buffer: wgpu::Buffer,
    width: u32,
    height: u32,
}

impl VisibilityMask {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("visibility-mask"),
            size: Self::byte_size_for(width, height),
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        Self {
            buffer,
            width,
            height,
        }
    }

    pub fn byte_size_for(width: u32, height: u32) -> u64 {
        u64::from(width) * u64::from(height) * VISIBILITY_TEXEL_SIZE
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn byte_size(&self) -> u64 {
        Self::byte_size_for(self.width, self.height)
    }

    /// Block until the GPU is idle and copy the whole mask back.
    pub fn read(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> Result<Vec<VisibilityTexel>, TextureError> {
        let bytes = read_buffer(device, queue, &self.buffer, self.byte_size())?;
        Ok(decode_texels(&bytes))
    }
}

fn decode_texels(bytes: &[u8]) -> Vec<VisibilityTexel> {
    bytes
        .chunks_exact(VISIBILITY_TEXEL_SIZE as usize)
        .map(|texel| VisibilityTexel {
            ever_seen: f32::from_le_bytes([texel[0], texel[1], texel[2], texel[3]]),
            visible: f32::from_le_bytes([texel[4], texel[5], texel[6], texel[7]]),
        })
        .collect()
}
