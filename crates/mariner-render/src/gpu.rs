//! GPU device initialization without a window surface.
//!
//! Provides [`GpuContext`] which owns the wgpu instance, adapter, device and
//! queue, and [`RenderContextError`] for clear diagnostics when initialization
//! fails.

/// Error type for GPU context initialization and device-wide waits.
#[derive(Debug, thiserror::Error)]
pub enum RenderContextError {
    /// No compatible GPU adapter found.
    #[error("no compatible GPU adapter found")]
    NoAdapter,

    /// Failed to request GPU device.
    #[error("failed to request GPU device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),

    /// Waiting on the device failed.
    #[error("failed to poll GPU device: {0}")]
    Poll(#[from] wgpu::PollError),
}

/// Owns all GPU state used by the compute passes.
pub struct GpuContext {
    pub instance: wgpu::Instance,
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl GpuContext {
    /// Initialize the GPU asynchronously. No surface is created; output is
    /// consumed through buffers and textures only.
    pub async fn new() -> Result<Self, RenderContextError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = match instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
        {
            Ok(adapter) => adapter,
            Err(_) => return Err(RenderContextError::NoAdapter),
        };

        let info = adapter.get_info();
        log::info!(
            "Selected GPU: {} ({:?}, {:?})",
            info.name,
            info.backend,
            info.device_type
        );

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("mariner-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        Ok(Self {
            instance,
            adapter,
            device,
            queue,
        })
    }

    /// Block until every submitted command buffer has finished executing.
    pub fn wait_idle(&self) -> Result<(), RenderContextError> {
        self.device.poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: None,
        })?;
        Ok(())
    }
}

/// Initialize the GPU synchronously using `pollster`.
pub fn init_gpu_context_blocking() -> Result<GpuContext, RenderContextError> {
    pollster::block_on(GpuContext::new())
}
