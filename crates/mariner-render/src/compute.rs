//! Compute dispatch service.
//!
//! A [`ComputeProgram`] pairs a compiled compute pipeline with a table of
//! named binding slots. Callers describe the resources for one pass as a
//! [`ComputeBindingSet`] (name to resource), bind it once into a
//! [`BoundComputePass`], and then hand that pass to a [`ComputeDispatcher`]
//! together with a [`WorkGroups`] grid as many times as needed.

use std::collections::BTreeMap;

use log::debug;

/// Errors raised while binding or dispatching compute passes.
#[derive(Debug, thiserror::Error)]
pub enum ComputeError {
    /// A slot declared by the program has no resource in the binding set.
    #[error("program '{program}' has no resource bound for slot '{slot}'")]
    MissingBinding { program: String, slot: String },

    /// The binding set names a resource the program does not declare.
    #[error("program '{program}' has no slot named '{slot}'")]
    UnknownBinding { program: String, slot: String },

    /// A buffer was supplied for a texture slot or vice versa.
    #[error("slot '{slot}' of program '{program}' expects a {expected}")]
    KindMismatch {
        program: String,
        slot: String,
        expected: &'static str,
    },

    /// Waiting for submitted passes failed.
    #[error("failed to wait for compute passes: {0}")]
    Fence(#[from] wgpu::PollError),
}

/// The resource type a slot accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BindingKind {
    /// Small constant block, `var<uniform>`.
    Uniform,
    /// `var<storage, read>` or `var<storage, read_write>`.
    StorageBuffer { read_only: bool },
    /// `texture_2d<f32>` read with `textureLoad`.
    SampledTexture,
    /// `texture_storage_2d<format, write>`.
    StorageTexture { format: wgpu::TextureFormat },
}

impl BindingKind {
    fn layout_type(self) -> wgpu::BindingType {
        match self {
            BindingKind::Uniform => wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            BindingKind::StorageBuffer { read_only } => wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Storage { read_only },
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            BindingKind::SampledTexture => wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: false },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            BindingKind::StorageTexture { format } => wgpu::BindingType::StorageTexture {
                access: wgpu::StorageTextureAccess::WriteOnly,
                format,
                view_dimension: wgpu::TextureViewDimension::D2,
            },
        }
    }

    fn takes_buffer(self) -> bool {
        matches!(
            self,
            BindingKind::Uniform | BindingKind::StorageBuffer { .. }
        )
    }
}

/// One named `@binding(n)` in group 0 of a compute shader.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BindingSlot {
    pub name: &'static str,
    pub binding: u32,
    pub kind: BindingKind,
}

impl BindingSlot {
    pub const fn new(name: &'static str, binding: u32, kind: BindingKind) -> Self {
        Self {
            name,
            binding,
            kind,
        }
    }
}

/// A resource handed to a slot.
#[derive(Clone, Debug)]
pub enum BindingValue {
    Buffer(wgpu::Buffer),
    Texture(wgpu::TextureView),
}

/// Named resources for one pass.
#[derive(Clone, Debug, Default)]
pub struct ComputeBindingSet {
    resources: BTreeMap<String, BindingValue>,
}

impl ComputeBindingSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_buffer(mut self, name: &str, buffer: &wgpu::Buffer) -> Self {
        self.insert(name, BindingValue::Buffer(buffer.clone()));
        self
    }

    pub fn with_texture(mut self, name: &str, view: &wgpu::TextureView) -> Self {
        self.insert(name, BindingValue::Texture(view.clone()));
        self
    }

    /// Bind `value` under `name`, returning the resource it replaced.
    pub fn insert(&mut self, name: &str, value: BindingValue) -> Option<BindingValue> {
        self.resources.insert(name.to_string(), value)
    }

    pub fn get(&self, name: &str) -> Option<&BindingValue> {
        self.resources.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// Dimensions of a work-group grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WorkGroups {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl WorkGroups {
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// Smallest grid of `group_size` work groups whose invocations cover `extent`.
    pub fn covering(extent: (u32, u32, u32), group_size: (u32, u32, u32)) -> Self {
        Self {
            x: extent.0.div_ceil(group_size.0),
            y: extent.1.div_ceil(group_size.1),
            z: extent.2.div_ceil(group_size.2),
        }
    }

    pub fn total(&self) -> u64 {
        u64::from(self.x) * u64::from(self.y) * u64::from(self.z)
    }
}

/// A compute pipeline and its slot table.
#[derive(Debug)]
pub struct ComputeProgram {
    name: String,
    slots: Vec<BindingSlot>,
    layout: wgpu::BindGroupLayout,
    pipeline: wgpu::ComputePipeline,
}

impl ComputeProgram {
    /// Build the pipeline for `entry_point` of `module` with one bind group described by `slots`.
    pub fn new(
        device: &wgpu::Device,
        name: &str,
        module: &wgpu::ShaderModule,
        entry_point: &str,
        slots: &[BindingSlot],
    ) -> Self {
        let entries: Vec<wgpu::BindGroupLayoutEntry> = slots
            .iter()
            .map(|slot| wgpu::BindGroupLayoutEntry {
                binding: slot.binding,
                visibility: wgpu::ShaderStages::COMPUTE,
                ty: slot.kind.layout_type(),
                count: None,
            })
            .collect();

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&format!("{name}-bind-group-layout")),
            entries: &entries,
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{name}-pipeline-layout")),
            bind_group_layouts: &[&layout],
            immediate_size: 0,
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some(name),
            layout: Some(&pipeline_layout),
            module,
            entry_point: Some(entry_point),
            compilation_options: wgpu::PipelineCompilationOptions::default(),
            cache: None,
        });

        debug!("Created compute program '{}' with {} slots", name, slots.len());

        Self {
            name: name.to_string(),
            slots: slots.to_vec(),
            layout,
            pipeline,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn slots(&self) -> &[BindingSlot] {
        &self.slots
    }

    /// Resolve every slot against `set` and build the bind group.
    ///
    /// Every slot must be filled with a resource of the right kind and the set
    /// must not name resources the program does not declare.
    pub fn bind(
        &self,
        device: &wgpu::Device,
        set: &ComputeBindingSet,
    ) -> Result<BoundComputePass, ComputeError> {
        check_binding_set(&self.name, &self.slots, set)?;

        let entries: Vec<wgpu::BindGroupEntry> = self
            .slots
            .iter()
            .filter_map(|slot| {
                let resource = match set.get(slot.name)? {
                    BindingValue::Buffer(buffer) => buffer.as_entire_binding(),
                    BindingValue::Texture(view) => wgpu::BindingResource::TextureView(view),
                };
                Some(wgpu::BindGroupEntry {
                    binding: slot.binding,
                    resource,
                })
            })
            .collect();

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{}-bind-group", self.name)),
            layout: &self.layout,
            entries: &entries,
        });

        Ok(BoundComputePass {
            name: self.name.clone(),
            pipeline: self.pipeline.clone(),
            bind_group,
        })
    }
}

fn check_binding_set(
    program: &str,
    slots: &[BindingSlot],
    set: &ComputeBindingSet,
) -> Result<(), ComputeError> {
    for slot in slots {
        let value = set.get(slot.name).ok_or_else(|| ComputeError::MissingBinding {
            program: program.to_string(),
            slot: slot.name.to_string(),
        })?;
        let is_buffer = matches!(value, BindingValue::Buffer(_));
        if is_buffer != slot.kind.takes_buffer() {
            return Err(ComputeError::KindMismatch {
                program: program.to_string(),
                slot: slot.name.to_string(),
                expected: if slot.kind.takes_buffer() { "buffer" } else { "texture" },
            });
        }
    }
    if let Some(extra) = set.names().find(|name| !slots.iter().any(|s| s.name == *name)) {
        return Err(ComputeError::UnknownBinding {
            program: program.to_string(),
            slot: extra.to_string(),
        });
    }
    Ok(())
}

/// A program with its resources resolved, ready to dispatch.
#[derive(Clone, Debug)]
pub struct BoundComputePass {
    name: String,
    pipeline: wgpu::ComputePipeline,
    bind_group: wgpu::BindGroup,
}

impl BoundComputePass {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Runs bound compute passes on a device.
pub trait ComputeDispatcher {
    /// Record and submit one dispatch. Returns without waiting for the GPU.
    fn dispatch(&self, pass: &BoundComputePass, groups: WorkGroups) -> Result<(), ComputeError>;

    /// Block until every previously dispatched pass has completed.
    fn fence(&self) -> Result<(), ComputeError>;
}

/// [`ComputeDispatcher`] over a wgpu device and queue.
#[derive(Clone, Debug)]
pub struct WgpuDispatcher {
    device: wgpu::Device,
    queue: wgpu::Queue,
}

impl WgpuDispatcher {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        Self {
            device: device.clone(),
            queue: queue.clone(),
        }
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }
}

impl ComputeDispatcher for WgpuDispatcher {
    fn dispatch(&self, pass: &BoundComputePass, groups: WorkGroups) -> Result<(), ComputeError> {
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some(&pass.name),
            });
        {
            let mut cpass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some(&pass.name),
                timestamp_writes: None,
            });
            cpass.set_pipeline(&pass.pipeline);
            cpass.set_bind_group(0, &pass.bind_group, &[]);
            cpass.dispatch_workgroups(groups.x, groups.y, groups.z);
        }
        self.queue.submit([encoder.finish()]);
        Ok(())
    }

    fn fence(&self) -> Result<(), ComputeError> {
        self.device.poll(wgpu::PollType::Wait {
            submission_index: None,
            timeout: None,
        })?;
        Ok(())
    }
}
