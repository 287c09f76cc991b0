//! The globe's three compute passes and the orchestrator that sequences them.
//!
//! | Pass | When | Grid |
//! |---|---|---|
//! | position vertices | once, at build | `ceil(n/16) × ceil(n/16) × 6` |
//! | calculate normals | once, at build | `ceil(w/16) × ceil(h/16) × 1` over the maps |
//! | update visibility | every tick | `ceil(w/16) × ceil(h/16) × 1` over the mask |
//!
//! The one-off passes are followed by a fence before the globe is handed out.
//! Visibility updates are submitted without waiting: the mask only ever gains
//! "seen" texels, so a renderer reading it a frame late shows the same result
//! a frame late.

use bytemuck::{Pod, Zeroable};
use mariner_coords::RadialSpherePoint;
use mariner_render::{
    BindingKind, BindingSlot, BoundComputePass, ComputeBindingSet, ComputeDispatcher,
    ComputeError, ComputeProgram, GpuTexture, ShaderLibrary, WgpuDispatcher, WorkGroups,
};
use static_assertions::assert_eq_size;
use tracing::{debug, info, trace};
use wgpu::util::DeviceExt;

use crate::visibility::VisibilityMask;

/// WGSL source of the vertex positioning kernel.
pub const POSITION_VERTICES_SHADER: &str = concat!(
    include_str!("shaders/common.wgsl"),
    include_str!("shaders/position_vertices.wgsl")
);

/// WGSL source of the normal map kernel.
pub const CALCULATE_NORMALS_SHADER: &str = concat!(
    include_str!("shaders/common.wgsl"),
    include_str!("shaders/calculate_normals.wgsl")
);

/// WGSL source of the visibility kernel.
pub const UPDATE_VISIBILITY_SHADER: &str = concat!(
    include_str!("shaders/common.wgsl"),
    include_str!("shaders/update_visibility.wgsl")
);

/// `@workgroup_size` of every kernel.
pub const WORKGROUP_SIZE: (u32, u32, u32) = (16, 16, 1);

/// Storage format of the normal map written by the normal pass.
pub const NORMAL_MAP_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

/// Uniform shared by the position and normal passes.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct SurfaceParams {
    pub vertices_per_edge: u32,
    pub land_mask_cutoff: f32,
    pub water_surface_height: f32,
    pub seabed_height: f32,
}

assert_eq_size!(SurfaceParams, [u8; 16]);

/// Uniform of the visibility pass.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct VisibilityParams {
    pub player_azimuthal: f32,
    pub player_polar: f32,
    pub player_radial: f32,
    pub view_radius: f32,
    pub width: u32,
    pub height: u32,
    pub _pad0: u32,
    pub _pad1: u32,
}

assert_eq_size!(VisibilityParams, [u8; 32]);

impl VisibilityParams {
    pub fn new(player: RadialSpherePoint, view_radius: f32, size: (u32, u32)) -> Self {
        Self {
            player_azimuthal: player.azimuthal,
            player_polar: player.polar,
            player_radial: player.radial,
            view_radius,
            width: size.0,
            height: size.1,
            _pad0: 0,
            _pad1: 0,
        }
    }
}

/// Identifies one of the globe passes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PassKind {
    PositionVertices,
    CalculateNormals,
    UpdateVisibility,
}

impl PassKind {
    pub const ALL: [PassKind; 3] = [
        PassKind::PositionVertices,
        PassKind::CalculateNormals,
        PassKind::UpdateVisibility,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            PassKind::PositionVertices => "position-vertices",
            PassKind::CalculateNormals => "calculate-normals",
            PassKind::UpdateVisibility => "update-visibility",
        }
    }

    /// Runs every tick rather than once at build.
    pub const fn is_recurring(self) -> bool {
        matches!(self, PassKind::UpdateVisibility)
    }

    pub const fn source(self) -> &'static str {
        match self {
            PassKind::PositionVertices => POSITION_VERTICES_SHADER,
            PassKind::CalculateNormals => CALCULATE_NORMALS_SHADER,
            PassKind::UpdateVisibility => UPDATE_VISIBILITY_SHADER,
        }
    }

    pub fn slots(self) -> &'static [BindingSlot] {
        match self {
            PassKind::PositionVertices => &POSITION_SLOTS,
            PassKind::CalculateNormals => &NORMAL_SLOTS,
            PassKind::UpdateVisibility => &VISIBILITY_SLOTS,
        }
    }
}

const POSITION_SLOTS: [BindingSlot; 5] = [
    BindingSlot::new("u_Params", 0, BindingKind::Uniform),
    BindingSlot::new(
        "u_VertexBuffer",
        1,
        BindingKind::StorageBuffer { read_only: false },
    ),
    BindingSlot::new("u_TopologyTex", 2, BindingKind::SampledTexture),
    BindingSlot::new("u_BathymetryTex", 3, BindingKind::SampledTexture),
    BindingSlot::new("u_LandMaskTex", 4, BindingKind::SampledTexture),
];

const NORMAL_SLOTS: [BindingSlot; 5] = [
    BindingSlot::new("u_Params", 0, BindingKind::Uniform),
    BindingSlot::new("u_TopologyTex", 1, BindingKind::SampledTexture),
    BindingSlot::new("u_BathymetryTex", 2, BindingKind::SampledTexture),
    BindingSlot::new("u_LandMaskTex", 3, BindingKind::SampledTexture),
    BindingSlot::new(
        "u_NormalTex",
        4,
        BindingKind::StorageTexture {
            format: NORMAL_MAP_FORMAT,
        },
    ),
];

const VISIBILITY_SLOTS: [BindingSlot; 2] = [
    BindingSlot::new("u_Params", 0, BindingKind::Uniform),
    BindingSlot::new(
        "u_VisibilityMask",
        1,
        BindingKind::StorageBuffer { read_only: false },
    ),
];

/// One invocation per vertex, one z slab per cube face.
pub fn position_work_groups(vertices_per_edge: u32) -> WorkGroups {
    WorkGroups::covering((vertices_per_edge, vertices_per_edge, 6), WORKGROUP_SIZE)
}

/// One invocation per normal-map texel.
pub fn normal_work_groups(width: u32, height: u32) -> WorkGroups {
    WorkGroups::covering((width, height, 1), WORKGROUP_SIZE)
}

/// One invocation per visibility-mask texel.
pub fn visibility_work_groups(width: u32, height: u32) -> WorkGroups {
    WorkGroups::covering((width, height, 1), WORKGROUP_SIZE)
}

/// GPU resources the passes read and write.
pub struct PassResources<'a> {
    pub surface: SurfaceParams,
    pub position_buffer: &'a wgpu::Buffer,
    pub topology: &'a GpuTexture,
    pub bathymetry: &'a GpuTexture,
    pub land_mask: &'a GpuTexture,
    pub normal_map: &'a GpuTexture,
    pub visibility: &'a VisibilityMask,
    /// Angular radius in radians revealed around the player.
    pub view_radius: f32,
}

/// Owns the bound passes and issues them through a [`ComputeDispatcher`].
pub struct ComputePipelineOrchestrator<D = WgpuDispatcher> {
    dispatcher: D,
    queue: wgpu::Queue,
    position: BoundComputePass,
    normals: BoundComputePass,
    visibility: BoundComputePass,
    position_groups: WorkGroups,
    normal_groups: WorkGroups,
    visibility_groups: WorkGroups,
    surface_params: wgpu::Buffer,
    visibility_params: wgpu::Buffer,
    visibility_size: (u32, u32),
    view_radius: f32,
    one_off_complete: bool,
}

impl<D: ComputeDispatcher> ComputePipelineOrchestrator<D> {
    /// Compile the kernels (through `shaders`) and bind every pass to `resources`.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        shaders: &mut ShaderLibrary,
        dispatcher: D,
        resources: &PassResources<'_>,
    ) -> Result<Self, ComputeError> {
        let program = |shaders: &mut ShaderLibrary, kind: PassKind| {
            let module = shaders.get_or_load(device, kind.name(), kind.source());
            ComputeProgram::new(device, kind.name(), &module, "main", kind.slots())
        };

        let surface_params = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("surface-params"),
            contents: bytemuck::bytes_of(&resources.surface),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let visibility_size = resources.visibility.dimensions();
        let visibility_params = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("visibility-params"),
            contents: bytemuck::bytes_of(&VisibilityParams::new(
                RadialSpherePoint::default(),
                resources.view_radius,
                visibility_size,
            )),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let position = program(shaders, PassKind::PositionVertices).bind(
            device,
            &ComputeBindingSet::new()
                .with_buffer("u_Params", &surface_params)
                .with_buffer("u_VertexBuffer", resources.position_buffer)
                .with_texture("u_TopologyTex", &resources.topology.view)
                .with_texture("u_BathymetryTex", &resources.bathymetry.view)
                .with_texture("u_LandMaskTex", &resources.land_mask.view),
        )?;

        let normals = program(shaders, PassKind::CalculateNormals).bind(
            device,
            &ComputeBindingSet::new()
                .with_buffer("u_Params", &surface_params)
                .with_texture("u_TopologyTex", &resources.topology.view)
                .with_texture("u_BathymetryTex", &resources.bathymetry.view)
                .with_texture("u_LandMaskTex", &resources.land_mask.view)
                .with_texture("u_NormalTex", &resources.normal_map.view),
        )?;

        let visibility = program(shaders, PassKind::UpdateVisibility).bind(
            device,
            &ComputeBindingSet::new()
                .with_buffer("u_Params", &visibility_params)
                .with_buffer("u_VisibilityMask", resources.visibility.buffer()),
        )?;

        let (normal_width, normal_height) = resources.normal_map.dimensions;
        let orchestrator = Self {
            dispatcher,
            queue: queue.clone(),
            position,
            normals,
            visibility,
            position_groups: position_work_groups(resources.surface.vertices_per_edge),
            normal_groups: normal_work_groups(normal_width, normal_height),
            visibility_groups: visibility_work_groups(visibility_size.0, visibility_size.1),
            surface_params,
            visibility_params,
            visibility_size,
            view_radius: resources.view_radius,
            one_off_complete: false,
        };

        debug!(
            position = ?orchestrator.position_groups,
            normals = ?orchestrator.normal_groups,
            visibility = ?orchestrator.visibility_groups,
            "Bound globe compute passes"
        );
        Ok(orchestrator)
    }

    /// Position the vertices, compute the normal map, and wait for both.
    pub fn run_one_off_passes(&mut self) -> Result<(), ComputeError> {
        info!(groups = ?self.position_groups, "Dispatching {}", self.position.name());
        self.dispatcher
            .dispatch(&self.position, self.position_groups)?;

        info!(groups = ?self.normal_groups, "Dispatching {}", self.normals.name());
        self.dispatcher.dispatch(&self.normals, self.normal_groups)?;

        self.dispatcher.fence()?;
        self.one_off_complete = true;
        info!("One-off globe passes complete");
        Ok(())
    }

    /// Reveal the mask around `player`. Returns once the pass is submitted.
    pub fn update_visibility(&self, player: RadialSpherePoint) -> Result<(), ComputeError> {
        let params = VisibilityParams::new(player, self.view_radius, self.visibility_size);
        self.queue
            .write_buffer(&self.visibility_params, 0, bytemuck::bytes_of(&params));
        trace!(
            azimuthal = player.azimuthal,
            polar = player.polar,
            "Dispatching {}",
            self.visibility.name()
        );
        self.dispatcher
            .dispatch(&self.visibility, self.visibility_groups)
    }

    /// Whether [`run_one_off_passes`](Self::run_one_off_passes) has completed.
    pub fn one_off_complete(&self) -> bool {
        self.one_off_complete
    }

    pub fn work_groups(&self, kind: PassKind) -> WorkGroups {
        match kind {
            PassKind::PositionVertices => self.position_groups,
            PassKind::CalculateNormals => self.normal_groups,
            PassKind::UpdateVisibility => self.visibility_groups,
        }
    }

    pub fn view_radius(&self) -> f32 {
        self.view_radius
    }

    pub fn surface_params_buffer(&self) -> &wgpu::Buffer {
        &self.surface_params
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    /// Wait for every submitted pass, including pending visibility updates.
    pub fn fence(&self) -> Result<(), ComputeError> {
        self.dispatcher.fence()
    }
}
