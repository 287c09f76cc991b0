//! Headless wgpu plumbing: device setup, shader registry, texture upload and
//! readback, and the compute-dispatch service the globe passes run through.

pub mod compute;
pub mod gpu;
pub mod readback;
pub mod scalar_image;
pub mod shader;
pub mod texture;

pub use compute::{
    BindingKind, BindingSlot, BindingValue, BoundComputePass, ComputeBindingSet, ComputeDispatcher,
    ComputeError, ComputeProgram, WgpuDispatcher, WorkGroups,
};
pub use gpu::{GpuContext, RenderContextError, init_gpu_context_blocking};
pub use readback::{read_buffer, read_texture};
pub use scalar_image::ScalarImage;
pub use shader::{ShaderError, ShaderLibrary};
pub use texture::{GpuTexture, TextureError, bytes_per_row, padded_bytes_per_row};
