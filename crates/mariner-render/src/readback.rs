//! Blocking copies of GPU resources back to the CPU.
//!
//! Used once at globe construction to mirror the land and height maps, and by
//! tests to inspect compute output.

use std::sync::mpsc;

use crate::texture::{GpuTexture, TextureError, bytes_per_row, padded_bytes_per_row};

/// Copy `size` bytes from the start of `source` (which needs `COPY_SRC`) into a `Vec`.
pub fn read_buffer(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    source: &wgpu::Buffer,
    size: u64,
) -> Result<Vec<u8>, TextureError> {
    let staging = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("buffer-readback"),
        size,
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("buffer-readback"),
    });
    encoder.copy_buffer_to_buffer(source, 0, &staging, 0, size);
    queue.submit([encoder.finish()]);

    let bytes = map_blocking(device, &staging)?;
    Ok(bytes)
}

/// Copy a whole texture (which needs `COPY_SRC`) into tightly packed rows.
pub fn read_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    source: &GpuTexture,
) -> Result<Vec<u8>, TextureError> {
    let (width, height) = source.dimensions;
    let unpadded = bytes_per_row(width, source.format)?;
    let padded = padded_bytes_per_row(width, source.format)?;

    let staging = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("texture-readback"),
        size: u64::from(padded) * u64::from(height),
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("texture-readback"),
    });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture: &source.texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &staging,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(padded),
                rows_per_image: Some(height),
            },
        },
        source.extent(),
    );
    queue.submit([encoder.finish()]);

    let padded_bytes = map_blocking(device, &staging)?;
    if padded == unpadded {
        return Ok(padded_bytes);
    }

    let mut packed = Vec::with_capacity(unpadded as usize * height as usize);
    for row in padded_bytes.chunks_exact(padded as usize) {
        packed.extend_from_slice(&row[..unpadded as usize]);
    }
    Ok(packed)
}

fn map_blocking(device: &wgpu::Device, staging: &wgpu::Buffer) -> Result<Vec<u8>, TextureError> {
    let slice = staging.slice(..);
    let (tx, rx) = mpsc::channel();
    slice.map_async(wgpu::MapMode::Read, move |result| {
        let _ = tx.send(result);
    });
    device.poll(wgpu::PollType::Wait {
        submission_index: None,
        timeout: None,
    })?;

    rx.recv().map_err(|_| TextureError::MapCallbackDropped)??;

    let bytes = slice.get_mapped_range().to_vec();
    staging.unmap();
    Ok(bytes)
}
