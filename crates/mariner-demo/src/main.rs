//! Headless Mariner run: build the globe, then sail a scripted course.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p mariner-demo -- --ticks 1200 --map-size 512x256`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use mariner_config::{CliArgs, Config, default_config_dir};
use mariner_coords::UnitSpherePoint;
use mariner_planet::{
    DirectoryImageStore, Globe, GlobeError, GlobeSettings, ImageStore, ProceduralImageStore,
};
use mariner_player::{
    AxisKey, FixedTimeSource, InputAxis, NavigationParams, NavigationStateMachine, SimulationLoop,
};
use mariner_render::{RenderContextError, init_gpu_context_blocking};
use mariner_terrain::{HeightmapParams, PlanetMapParams};
use tracing::{error, info};

#[derive(Debug, thiserror::Error)]
enum DemoError {
    #[error(transparent)]
    Gpu(#[from] RenderContextError),
    #[error(transparent)]
    Globe(#[from] GlobeError),
}

/// Legs of the scripted course as `(key, ticks held)`.
const COURSE: [(AxisKey, u64); 4] = [
    (AxisKey::Right, 240),
    (AxisKey::Up, 180),
    (AxisKey::ZoomOut, 60),
    (AxisKey::Left, 120),
];

/// Key held at `tick`, cycling through [`COURSE`].
fn course_key(tick: u64) -> AxisKey {
    let period: u64 = COURSE.iter().map(|(_, ticks)| ticks).sum();
    let mut remaining = tick % period;
    for (key, ticks) in COURSE {
        if remaining < ticks {
            return key;
        }
        remaining -= ticks;
    }
    COURSE[0].0
}

/// Release the previous leg's key and press the next one on leg boundaries.
fn steer(tick: u64, input: &mut InputAxis) {
    let key = course_key(tick);
    if tick == 0 {
        input.press(key);
        return;
    }
    let previous = course_key(tick - 1);
    if previous != key {
        input.release(previous);
        input.press(key);
    }
}

fn map_params(config: &Config) -> PlanetMapParams {
    PlanetMapParams {
        heightmap: HeightmapParams {
            seed: config.globe.seed,
            ..HeightmapParams::default()
        },
        sea_level: config.globe.sea_level,
        ..PlanetMapParams::default()
    }
}

fn run(config: &Config, ticks: u32) -> Result<(), DemoError> {
    let gpu = init_gpu_context_blocking()?;
    let adapter = gpu.adapter.get_info();
    info!(adapter = %adapter.name, backend = ?adapter.backend, "GPU ready");

    let settings = GlobeSettings::from(&config.globe);
    let store: Box<dyn ImageStore> = match &config.globe.texture_dir {
        Some(dir) => {
            info!(dir = %dir.display(), "Loading globe maps from disk");
            Box::new(DirectoryImageStore::new(dir.clone()))
        }
        None => {
            let (width, height) = settings.map_size;
            Box::new(ProceduralImageStore::generate(
                width,
                height,
                &map_params(config),
            ))
        }
    };
    let mut globe = Globe::build(&gpu, store.as_ref(), settings, &config.cities)?;

    let navigation = &config.navigation;
    let start = UnitSpherePoint::from_latitude_and_longitude(
        navigation.start_latitude,
        navigation.start_longitude,
    );
    let params = NavigationParams::from_config(navigation, &config.globe);
    let machine = NavigationStateMachine::new(params, start);
    let mut simulation = SimulationLoop::new(machine, FixedTimeSource::default());
    let completed = simulation.run(&mut globe, u64::from(ticks), steer)?;
    // Visibility dispatches are not awaited per tick; drain them before reporting.
    gpu.wait_idle()?;

    let state = simulation.navigation().state();
    let latitude = state.position.polar.to_degrees();
    let longitude = state.position.azimuthal.to_degrees() - 180.0;
    info!(
        ticks = completed,
        latitude,
        longitude,
        heading = state.heading,
        camera_distance = state.camera_distance,
        "Voyage complete"
    );
    let discovered: Vec<&str> = globe
        .cities()
        .iter()
        .filter(|city| city.discovered)
        .map(|city| city.name.as_str())
        .collect();
    info!(count = discovered.len(), cities = ?discovered, "Discovered cities");
    Ok(())
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let config_dir: PathBuf = args.config.clone().unwrap_or_else(default_config_dir);
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    if let Err(e) = mariner_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config))
    {
        eprintln!("Failed to initialize logging: {e}");
    }

    match run(&config, args.ticks) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Mariner stopped: {e}");
            ExitCode::FAILURE
        }
    }
}
