//! Dispatch ordering of the globe passes, observed through a recording
//! dispatcher. Skips itself when no GPU adapter is available.

use std::cell::RefCell;

use mariner_coords::RadialSpherePoint;
use mariner_planet::{
    ComputePipelineOrchestrator, NORMAL_MAP_FORMAT, PassResources, SurfaceParams, VisibilityMask,
};
use mariner_render::{
    BoundComputePass, ComputeDispatcher, ComputeError, GpuTexture, ShaderLibrary, WgpuDispatcher,
    WorkGroups, init_gpu_context_blocking,
};

#[derive(Debug, PartialEq)]
enum Event {
    Dispatch(String, WorkGroups),
    Fence,
}

struct RecordingDispatcher {
    inner: WgpuDispatcher,
    events: RefCell<Vec<Event>>,
}

impl ComputeDispatcher for RecordingDispatcher {
    fn dispatch(&self, pass: &BoundComputePass, groups: WorkGroups) -> Result<(), ComputeError> {
        self.events
            .borrow_mut()
            .push(Event::Dispatch(pass.name().to_string(), groups));
        self.inner.dispatch(pass, groups)
    }

    fn fence(&self) -> Result<(), ComputeError> {
        self.events.borrow_mut().push(Event::Fence);
        self.inner.fence()
    }
}

fn scalar(device: &wgpu::Device, queue: &wgpu::Queue, label: &str, value: u8) -> GpuTexture {
    GpuTexture::with_data(
        device,
        queue,
        label,
        &[value; 32 * 16],
        32,
        16,
        wgpu::TextureFormat::R8Unorm,
        wgpu::TextureUsages::TEXTURE_BINDING,
    )
    .unwrap()
}

#[test]
fn test_one_off_passes_fence_and_visibility_does_not() {
    let Ok(gpu) = init_gpu_context_blocking() else {
        eprintln!("Skipping test: no GPU adapter available");
        return;
    };
    let (device, queue) = (&gpu.device, &gpu.queue);

    let positions = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("positions"),
        size: 6 * 10 * 10 * 16,
        usage: wgpu::BufferUsages::STORAGE,
        mapped_at_creation: false,
    });
    let topology = scalar(device, queue, "topology", 0);
    let bathymetry = scalar(device, queue, "bathymetry", 128);
    let land_mask = scalar(device, queue, "land_mask", 255);
    let normal_map = GpuTexture::empty(
        device,
        "normal_map",
        32,
        16,
        NORMAL_MAP_FORMAT,
        wgpu::TextureUsages::STORAGE_BINDING,
    )
    .unwrap();
    let visibility = VisibilityMask::new(device, 48, 24);

    let dispatcher = RecordingDispatcher {
        inner: WgpuDispatcher::new(device, queue),
        events: RefCell::new(Vec::new()),
    };
    let mut shaders = ShaderLibrary::new();
    let mut orchestrator = ComputePipelineOrchestrator::new(
        device,
        queue,
        &mut shaders,
        dispatcher,
        &PassResources {
            surface: SurfaceParams {
                vertices_per_edge: 10,
                land_mask_cutoff: 0.5,
                water_surface_height: 0.95,
                seabed_height: 0.9,
            },
            position_buffer: &positions,
            topology: &topology,
            bathymetry: &bathymetry,
            land_mask: &land_mask,
            normal_map: &normal_map,
            visibility: &visibility,
            view_radius: 0.1,
        },
    )
    .unwrap();

    assert!(!orchestrator.one_off_complete());
    orchestrator.run_one_off_passes().unwrap();
    assert!(orchestrator.one_off_complete());
    orchestrator
        .update_visibility(RadialSpherePoint::new(0.5, 0.1, 1.0))
        .unwrap();
    orchestrator
        .update_visibility(RadialSpherePoint::new(0.6, 0.1, 1.0))
        .unwrap();

    let events = orchestrator.dispatcher().events.borrow();
    assert_eq!(
        *events,
        vec![
            Event::Dispatch("position-vertices".into(), WorkGroups::new(1, 1, 6)),
            Event::Dispatch("calculate-normals".into(), WorkGroups::new(2, 1, 1)),
            Event::Fence,
            Event::Dispatch("update-visibility".into(), WorkGroups::new(3, 2, 1)),
            Event::Dispatch("update-visibility".into(), WorkGroups::new(3, 2, 1)),
        ]
    );
}
