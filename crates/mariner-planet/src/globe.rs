//! The globe: GPU maps, the displaced cube-sphere mesh, the visibility mask,
//! the land query mirrors and the cities, built once and updated per tick.

use glam::Vec4;
use mariner_config::{CityConfig, GlobeConfig};
use mariner_coords::UnitSpherePoint;
use mariner_cubesphere::{CubeSphereMesh, CubeSphereTopology, MIN_VERTICES_PER_EDGE};
use mariner_math::Aabb;
use mariner_render::{
    ComputeError, GpuContext, GpuTexture, ScalarImage, ShaderLibrary, TextureError,
    WgpuDispatcher, read_buffer,
};
use tracing::{debug, info};
use wgpu::util::DeviceExt;

use crate::city::City;
use crate::image_store::{ImageStore, ImageStoreError, MapKind};
use crate::land::LandQueryService;
use crate::passes::{
    ComputePipelineOrchestrator, NORMAL_MAP_FORMAT, PassResources, SurfaceParams,
};
use crate::surface::GlobeSurface;
use crate::visibility::{VisibilityMask, VisibilityTexel};

/// Errors raised while building or updating a globe.
#[derive(Debug, thiserror::Error)]
pub enum GlobeError {
    #[error(transparent)]
    Texture(#[from] TextureError),

    #[error(transparent)]
    Compute(#[from] ComputeError),

    #[error(transparent)]
    ImageStore(#[from] ImageStoreError),

    #[error("invalid globe settings: {0}")]
    InvalidSettings(String),

    #[error("{what} needs {requested}, device limit is {limit}")]
    ExceedsDeviceLimit {
        what: &'static str,
        requested: u64,
        limit: u64,
    },
}

/// Build-time parameters of a globe.
#[derive(Clone, Debug, PartialEq)]
pub struct GlobeSettings {
    /// Grid vertices per cube-face edge. Values below 2 are raised to 2.
    pub vertices_per_edge: u32,
    pub land_mask_cutoff: f32,
    pub water_surface_height: f32,
    pub seabed_height: f32,
    pub enable_land_collision: bool,
    /// Resolution of the topology, bathymetry, land-mask, albedo and normal maps.
    pub map_size: (u32, u32),
    pub visibility_size: (u32, u32),
    /// Angular radius in radians revealed around the boat each tick.
    pub visibility_radius: f32,
}

impl From<&GlobeConfig> for GlobeSettings {
    fn from(config: &GlobeConfig) -> Self {
        Self {
            vertices_per_edge: config.vertices_per_edge,
            land_mask_cutoff: config.land_mask_cutoff,
            water_surface_height: config.water_surface_height,
            seabed_height: config.seabed_height,
            enable_land_collision: config.enable_land_collision,
            map_size: (config.map_width, config.map_height),
            visibility_size: (config.visibility_width, config.visibility_height),
            visibility_radius: config.visibility_radius,
        }
    }
}

impl Default for GlobeSettings {
    fn default() -> Self {
        Self::from(&GlobeConfig::default())
    }
}

impl GlobeSettings {
    pub fn validate(&self) -> Result<(), GlobeError> {
        let invalid = |reason: String| Err(GlobeError::InvalidSettings(reason));
        if self.map_size.0 == 0 || self.map_size.1 == 0 {
            return invalid(format!("map size {:?} has a zero side", self.map_size));
        }
        if self.visibility_size.0 == 0 || self.visibility_size.1 == 0 {
            return invalid(format!(
                "visibility size {:?} has a zero side",
                self.visibility_size
            ));
        }
        if !(self.seabed_height <= self.water_surface_height && self.water_surface_height <= 1.0)
        {
            return invalid(format!(
                "expected seabed ({}) <= water surface ({}) <= 1",
                self.seabed_height, self.water_surface_height
            ));
        }
        if !(0.0..=1.0).contains(&self.land_mask_cutoff) {
            return invalid(format!(
                "land mask cutoff {} is outside [0, 1]",
                self.land_mask_cutoff
            ));
        }
        Ok(())
    }

    /// Vertices per edge after raising to the minimum.
    pub fn effective_vertices_per_edge(&self) -> u32 {
        self.vertices_per_edge.max(MIN_VERTICES_PER_EDGE)
    }

    fn surface_params(&self) -> SurfaceParams {
        SurfaceParams {
            vertices_per_edge: self.effective_vertices_per_edge(),
            land_mask_cutoff: self.land_mask_cutoff,
            water_surface_height: self.water_surface_height,
            seabed_height: self.seabed_height,
        }
    }

    fn check_device_limits(&self, limits: &wgpu::Limits) -> Result<(), GlobeError> {
        let max_side = u64::from(limits.max_texture_dimension_2d);
        let largest_side = u64::from(self.map_size.0.max(self.map_size.1));
        if largest_side > max_side {
            return Err(GlobeError::ExceedsDeviceLimit {
                what: "map texture side",
                requested: largest_side,
                limit: max_side,
            });
        }

        let max_binding = u64::from(limits.max_storage_buffer_binding_size);
        let positions =
            CubeSphereMesh::<()>::position_buffer_size_for(self.effective_vertices_per_edge());
        let visibility =
            VisibilityMask::byte_size_for(self.visibility_size.0, self.visibility_size.1);
        for (what, requested) in [
            ("position buffer", positions),
            ("visibility mask", visibility),
        ] {
            if requested > max_binding {
                return Err(GlobeError::ExceedsDeviceLimit {
                    what,
                    requested,
                    limit: max_binding,
                });
            }
        }
        Ok(())
    }
}

/// GPU copies of the globe maps.
#[derive(Clone, Debug)]
pub struct GlobeTextures {
    pub topology: GpuTexture,
    pub bathymetry: GpuTexture,
    pub land_mask: GpuTexture,
    pub albedo: GpuTexture,
    /// Written by the normal pass, `n * 0.5 + 0.5` per texel.
    pub normal_map: GpuTexture,
}

/// Borrowed GPU handles a renderer needs to draw the globe.
///
/// Attaching, scaling and positioning the globe in a scene is up to the
/// renderer.
#[derive(Clone, Copy, Debug)]
pub struct RenderableGlobe<'a> {
    /// `vec4<f32>` per vertex, written by the position pass.
    pub positions: &'a wgpu::Buffer,
    /// `u32` triangle list.
    pub indices: &'a wgpu::Buffer,
    pub index_count: u32,
    pub bounds: Aabb,
    pub textures: &'a GlobeTextures,
    /// `vec2<f32>` per texel: ever seen, visible now.
    pub visibility: &'a wgpu::Buffer,
    pub visibility_size: (u32, u32),
    pub land_mask_cutoff: f32,
}

/// A built globe.
pub struct Globe {
    settings: GlobeSettings,
    device: wgpu::Device,
    queue: wgpu::Queue,
    mesh: CubeSphereMesh<wgpu::Buffer>,
    index_buffer: wgpu::Buffer,
    textures: GlobeTextures,
    visibility: VisibilityMask,
    land: LandQueryService,
    orchestrator: ComputePipelineOrchestrator,
    shaders: ShaderLibrary,
    cities: Vec<City>,
}

impl Globe {
    /// Upload the maps from `store`, run the one-off passes to completion,
    /// capture the land query mirrors and place `cities`.
    pub fn build(
        gpu: &GpuContext,
        store: &dyn ImageStore,
        settings: GlobeSettings,
        cities: &[CityConfig],
    ) -> Result<Self, GlobeError> {
        settings.validate()?;
        settings.check_device_limits(&gpu.device.limits())?;

        let device = &gpu.device;
        let queue = &gpu.queue;
        let (width, height) = settings.map_size;
        let n = settings.effective_vertices_per_edge();

        let scalar_texture = |kind: MapKind| -> Result<GpuTexture, GlobeError> {
            let image = store.scalar_map(kind, width, height)?;
            Ok(GpuTexture::with_data(
                device,
                queue,
                kind.base_name(),
                image.as_raw(),
                width,
                height,
                wgpu::TextureFormat::R8Unorm,
                wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_SRC,
            )?)
        };
        let topology = scalar_texture(MapKind::Topology)?;
        let bathymetry = scalar_texture(MapKind::Bathymetry)?;
        let land_mask = scalar_texture(MapKind::LandMask)?;
        let albedo_image = store.color_map(MapKind::Albedo, width, height)?;
        let albedo = GpuTexture::with_data(
            device,
            queue,
            MapKind::Albedo.base_name(),
            albedo_image.as_raw(),
            width,
            height,
            wgpu::TextureFormat::Rgba8UnormSrgb,
            wgpu::TextureUsages::TEXTURE_BINDING,
        )?;
        let normal_map = GpuTexture::empty(
            device,
            "normal_map",
            width,
            height,
            NORMAL_MAP_FORMAT,
            wgpu::TextureUsages::STORAGE_BINDING
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
        )?;

        let land = LandQueryService::new(
            ScalarImage::capture(device, queue, &land_mask)?,
            ScalarImage::capture(device, queue, &topology)?,
            settings.land_mask_cutoff,
            settings.water_surface_height,
            settings.enable_land_collision,
        );

        let topology_indices = CubeSphereTopology::new(n);
        let position_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("globe-positions"),
            size: CubeSphereMesh::<()>::position_buffer_size_for(n),
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::VERTEX
                | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("globe-indices"),
            contents: bytemuck::cast_slice(topology_indices.indices()),
            usage: wgpu::BufferUsages::INDEX,
        });
        let mesh = CubeSphereMesh::new(topology_indices, position_buffer);

        let visibility =
            VisibilityMask::new(device, settings.visibility_size.0, settings.visibility_size.1);

        let mut shaders = ShaderLibrary::new();
        let mut orchestrator = ComputePipelineOrchestrator::new(
            device,
            queue,
            &mut shaders,
            WgpuDispatcher::new(device, queue),
            &PassResources {
                surface: settings.surface_params(),
                position_buffer: mesh.positions(),
                topology: &topology,
                bathymetry: &bathymetry,
                land_mask: &land_mask,
                normal_map: &normal_map,
                visibility: &visibility,
                view_radius: settings.visibility_radius,
            },
        )?;
        orchestrator.run_one_off_passes()?;

        let cities: Vec<City> = cities
            .iter()
            .enumerate()
            .map(|(id, config)| City::place(id, config, &land))
            .collect();
        for city in &cities {
            debug!(
                name = %city.name,
                azimuthal = city.location.azimuthal,
                polar = city.location.polar,
                height = city.position.radial,
                "Placed city"
            );
        }

        info!(
            width,
            height,
            vertices_per_edge = n,
            vertex_count = mesh.topology().vertex_count(),
            triangle_count = mesh.topology().triangle_count(),
            position_bytes = mesh.position_buffer_size(),
            cities = cities.len(),
            "Globe built"
        );

        Ok(Self {
            settings,
            device: device.clone(),
            queue: queue.clone(),
            mesh,
            index_buffer,
            textures: GlobeTextures {
                topology,
                bathymetry,
                land_mask,
                albedo,
                normal_map,
            },
            visibility,
            land,
            orchestrator,
            shaders,
            cities,
        })
    }

    pub fn settings(&self) -> &GlobeSettings {
        &self.settings
    }

    pub fn mesh(&self) -> &CubeSphereMesh<wgpu::Buffer> {
        &self.mesh
    }

    pub fn textures(&self) -> &GlobeTextures {
        &self.textures
    }

    pub fn land(&self) -> &LandQueryService {
        &self.land
    }

    pub fn visibility_mask(&self) -> &VisibilityMask {
        &self.visibility
    }

    pub fn orchestrator(&self) -> &ComputePipelineOrchestrator {
        &self.orchestrator
    }

    pub fn shaders(&self) -> &ShaderLibrary {
        &self.shaders
    }

    pub fn cities(&self) -> &[City] {
        &self.cities
    }

    pub fn renderable(&self) -> RenderableGlobe<'_> {
        RenderableGlobe {
            positions: self.mesh.positions(),
            indices: &self.index_buffer,
            index_count: self.mesh.topology().indices().len() as u32,
            bounds: self.mesh.bounds(),
            textures: &self.textures,
            visibility: self.visibility.buffer(),
            visibility_size: self.visibility.dimensions(),
            land_mask_cutoff: self.settings.land_mask_cutoff,
        }
    }

    /// Mark every undiscovered city within `radius` radians of `point` as
    /// discovered. Returns the ids of the newly discovered cities.
    pub fn discover_cities_near(&mut self, point: UnitSpherePoint, radius: f32) -> Vec<usize> {
        let mut discovered = Vec::new();
        for city in self
            .cities
            .iter_mut()
            .filter(|city| !city.discovered && city.is_within(point, radius))
        {
            city.discovered = true;
            info!(name = %city.name, country = %city.country, "Discovered city");
            discovered.push(city.id);
        }
        discovered
    }

    /// Copy the vertex positions back. Blocks until the GPU is idle.
    pub fn read_positions(&self) -> Result<Vec<Vec4>, GlobeError> {
        let bytes = read_buffer(
            &self.device,
            &self.queue,
            self.mesh.positions(),
            self.mesh.position_buffer_size(),
        )?;
        Ok(bytes
            .chunks_exact(16)
            .map(|v| {
                let lane = |i: usize| f32::from_le_bytes([v[i], v[i + 1], v[i + 2], v[i + 3]]);
                Vec4::new(lane(0), lane(4), lane(8), lane(12))
            })
            .collect())
    }

    /// Copy the visibility mask back. Blocks until the GPU is idle.
    pub fn read_visibility(&self) -> Result<Vec<VisibilityTexel>, GlobeError> {
        Ok(self.visibility.read(&self.device, &self.queue)?)
    }
}

impl GlobeSurface for Globe {
    fn is_land_at_point(&self, point: UnitSpherePoint) -> bool {
        self.land.is_land_at_point(point)
    }

    fn get_height_at_point(&self, point: UnitSpherePoint) -> f32 {
        self.land.get_height_at_point(point)
    }

    fn update_visibility(&mut self, position: UnitSpherePoint) -> Result<(), GlobeError> {
        self.orchestrator.update_visibility(position.to_radial())?;
        self.discover_cities_near(position, self.settings.visibility_radius);
        Ok(())
    }
}
