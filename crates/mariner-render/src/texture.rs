//! GPU texture creation for globe maps and compute targets.
//!
//! Maps are single-mip 2D textures. Each [`GpuTexture`] carries its default
//! view so it can be bound to a compute pass directly.

/// A GPU texture with its default view and metadata.
#[derive(Clone, Debug)]
pub struct GpuTexture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    /// Width and height in texels.
    pub dimensions: (u32, u32),
    pub format: wgpu::TextureFormat,
}

/// Errors that can occur during texture creation or readback.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    /// Pixel data length doesn't match the expected size for the given dimensions and format.
    #[error(
        "texture data size ({actual}) does not match expected ({expected}) for {width}x{height} {format:?}"
    )]
    DataSizeMismatch {
        actual: usize,
        expected: usize,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
    },

    /// Width or height is zero.
    #[error("texture dimensions must be non-zero, got {width}x{height}")]
    ZeroDimensions { width: u32, height: u32 },

    /// The format has no fixed texel size (compressed or depth/stencil).
    #[error("texture format {0:?} cannot be copied texel by texel")]
    UnsupportedFormat(wgpu::TextureFormat),

    /// Mapping a readback buffer failed.
    #[error("failed to map readback buffer: {0}")]
    Map(#[from] wgpu::BufferAsyncError),

    /// The map callback was dropped before it reported a result.
    #[error("readback buffer map callback was never invoked")]
    MapCallbackDropped,

    /// Waiting on the device failed.
    #[error("failed to poll GPU device: {0}")]
    Poll(#[from] wgpu::PollError),
}

impl GpuTexture {
    /// Create a texture and upload `data` (tightly packed rows) into it.
    #[allow(clippy::too_many_arguments)]
    pub fn with_data(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        label: &str,
        data: &[u8],
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        usage: wgpu::TextureUsages,
    ) -> Result<Self, TextureError> {
        validate_dimensions(width, height)?;
        validate_data_size(data, width, height, format)?;

        let texture = Self::empty(
            device,
            label,
            width,
            height,
            format,
            usage | wgpu::TextureUsages::COPY_DST,
        )?;

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row(width, format)?),
                rows_per_image: None,
            },
            texture.extent(),
        );

        log::info!("Created texture '{label}' ({width}x{height}, {format:?})");
        Ok(texture)
    }

    /// Create an uninitialized texture. wgpu zero-fills it before first use.
    pub fn empty(
        device: &wgpu::Device,
        label: &str,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
        usage: wgpu::TextureUsages,
    ) -> Result<Self, TextureError> {
        validate_dimensions(width, height)?;
        bytes_per_row(width, format)?;

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Ok(Self {
            texture,
            view,
            dimensions: (width, height),
            format,
        })
    }

    pub fn extent(&self) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: self.dimensions.0,
            height: self.dimensions.1,
            depth_or_array_layers: 1,
        }
    }
}

/// Tightly packed bytes per row for a texture.
pub fn bytes_per_row(width: u32, format: wgpu::TextureFormat) -> Result<u32, TextureError> {
    let bpp = format
        .block_copy_size(None)
        .ok_or(TextureError::UnsupportedFormat(format))?;
    Ok(width * bpp)
}

/// Bytes per row rounded up to the buffer-copy alignment.
pub fn padded_bytes_per_row(width: u32, format: wgpu::TextureFormat) -> Result<u32, TextureError> {
    let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
    Ok(bytes_per_row(width, format)?.div_ceil(align) * align)
}

fn validate_dimensions(width: u32, height: u32) -> Result<(), TextureError> {
    if width == 0 || height == 0 {
        return Err(TextureError::ZeroDimensions { width, height });
    }
    Ok(())
}

fn validate_data_size(
    data: &[u8],
    width: u32,
    height: u32,
    format: wgpu::TextureFormat,
) -> Result<(), TextureError> {
    let expected = bytes_per_row(width, format)? as usize * height as usize;
    if data.len() != expected {
        return Err(TextureError::DataSizeMismatch {
            actual: data.len(),
            expected,
            width,
            height,
            format,
        });
    }
    Ok(())
}

/// Create a test GPU device and queue. Returns `None` if no GPU is available.
#[cfg(test)]
pub(crate) fn create_test_device_queue() -> Option<(wgpu::Device, wgpu::Queue)> {
    pollster::block_on(async {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok()?;

        adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                experimental_features: Default::default(),
                ..Default::default()
            })
            .await
            .ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_per_row_by_format() {
        assert_eq!(bytes_per_row(10, wgpu::TextureFormat::R8Unorm).unwrap(), 10);
        assert_eq!(bytes_per_row(10, wgpu::TextureFormat::Rgba8Unorm).unwrap(), 40);
        assert_eq!(bytes_per_row(10, wgpu::TextureFormat::Rg32Float).unwrap(), 80);
    }

    #[test]
    fn test_padded_rows_are_aligned() {
        let padded = padded_bytes_per_row(100, wgpu::TextureFormat::R8Unorm).unwrap();
        assert_eq!(padded, 256);
        assert_eq!(
            padded_bytes_per_row(64, wgpu::TextureFormat::Rgba8Unorm).unwrap(),
            256,
            "already aligned rows are unchanged"
        );
    }

    #[test]
    fn test_depth_format_is_unsupported() {
        assert!(matches!(
            bytes_per_row(4, wgpu::TextureFormat::Depth24Plus),
            Err(TextureError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_zero_dimensions_returns_error() {
        let Some((device, queue)) = create_test_device_queue() else {
            eprintln!("Skipping test: no GPU adapter available");
            return;
        };
        let result = GpuTexture::with_data(
            &device,
            &queue,
            "zero",
            &[],
            0,
            4,
            wgpu::TextureFormat::R8Unorm,
            wgpu::TextureUsages::TEXTURE_BINDING,
        );
        assert!(matches!(result, Err(TextureError::ZeroDimensions { .. })));
    }

    #[test]
    fn test_data_size_mismatch_returns_error() {
        let Some((device, queue)) = create_test_device_queue() else {
            eprintln!("Skipping test: no GPU adapter available");
            return;
        };
        let result = GpuTexture::with_data(
            &device,
            &queue,
            "short",
            &[0u8; 15],
            4,
            4,
            wgpu::TextureFormat::R8Unorm,
            wgpu::TextureUsages::TEXTURE_BINDING,
        );
        assert!(matches!(
            result,
            Err(TextureError::DataSizeMismatch {
                actual: 15,
                expected: 16,
                ..
            })
        ));
    }
}
