//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Globe mesh, map and collision settings.
    pub globe: GlobeConfig,
    /// Boat and camera movement settings.
    pub navigation: NavigationConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
    /// Cities placed on the globe.
    pub cities: Vec<CityConfig>,
}

/// Globe construction settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GlobeConfig {
    /// Grid vertices along each cube-face edge (at least 2).
    pub vertices_per_edge: u32,
    /// Land-mask intensity at or below which a texel counts as land.
    pub land_mask_cutoff: f32,
    /// Unit-sphere radius of the water surface.
    pub water_surface_height: f32,
    /// Unit-sphere radius of the deepest sea floor.
    pub seabed_height: f32,
    /// Block movement onto land.
    pub enable_land_collision: bool,
    /// Width of the height, bathymetry, land-mask and albedo maps.
    pub map_width: u32,
    /// Height of the source maps.
    pub map_height: u32,
    /// Width of the visibility mask.
    pub visibility_width: u32,
    /// Height of the visibility mask.
    pub visibility_height: u32,
    /// Angular radius in radians revealed around the boat.
    pub visibility_radius: f32,
    /// Seed for procedurally generated maps.
    pub seed: u32,
    /// Normalized elevation of the coastline for generated maps.
    pub sea_level: f64,
    /// Load maps from this directory instead of generating them.
    pub texture_dir: Option<PathBuf>,
}

/// Boat and camera settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NavigationConfig {
    /// World-space radius of the globe.
    pub globe_scale: f32,
    /// Boat speed in unit-sphere lengths per second.
    pub boat_speed: f32,
    /// Closest the camera gets to the boat.
    pub camera_distance_min: f32,
    /// Farthest the camera gets from the boat.
    pub camera_distance_max: f32,
    /// Camera distance change per second at full zoom input.
    pub camera_zoom_speed: f32,
    /// Starting latitude in degrees.
    pub start_latitude: f32,
    /// Starting longitude in degrees.
    pub start_longitude: f32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Write JSON logs to the log directory in debug builds.
    pub log_to_file: bool,
}

/// A named city at a latitude/longitude in degrees.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CityConfig {
    pub name: String,
    pub country: String,
    pub latitude: f32,
    pub longitude: f32,
}

impl CityConfig {
    pub fn new(name: &str, country: &str, latitude: f32, longitude: f32) -> Self {
        Self {
            name: name.to_string(),
            country: country.to_string(),
            latitude,
            longitude,
        }
    }

    /// The built-in city list.
    pub fn defaults() -> Vec<CityConfig> {
        vec![
            CityConfig::new("New York", "USA", 40.712776, -74.005974),
            CityConfig::new("Miami", "USA", 25.761832, -80.191629),
            CityConfig::new("Havana", "Cuba", 23.113568, -82.366425),
            CityConfig::new("Bogota", "Colombia", 4.710989, -74.072090),
            CityConfig::new("Lima", "Peru", -12.046434, -77.042566),
            CityConfig::new("San Francisco", "USA", 37.775018, -122.419272),
            CityConfig::new("Honolulu", "USA", 21.309919, -157.858154),
            CityConfig::new("Lisbon", "Portugal", 38.685108, -9.238115),
        ]
    }
}

// --- Default implementations ---

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            vertices_per_edge: 100,
            land_mask_cutoff: 0.5,
            water_surface_height: 0.95,
            seabed_height: 0.9,
            enable_land_collision: true,
            map_width: 2048,
            map_height: 1024,
            visibility_width: 2048,
            visibility_height: 1024,
            visibility_radius: 0.08,
            seed: 7,
            sea_level: 0.05,
            texture_dir: None,
        }
    }
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            globe_scale: 20.0,
            boat_speed: 0.07,
            camera_distance_min: 7.0,
            camera_distance_max: 20.0,
            camera_zoom_speed: 5.0,
            start_latitude: 0.0,
            start_longitude: -180.0,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_to_file: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            globe: GlobeConfig::default(),
            navigation: NavigationConfig::default(),
            debug: DebugConfig::default(),
            cities: CityConfig::defaults(),
        }
    }
}

/// Platform config directory for Mariner, falling back to the working directory.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("mariner"))
        .unwrap_or_else(|| PathBuf::from("."))
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join("config.ron");

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            log::info!("Loaded config from {}", config_path.display());
            config.validate()?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let config_path = config_dir.join("config.ron");
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);

        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(&config_path, serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = config_dir.join("config.ron");
        let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
        new_config.validate()?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    /// Reject values the globe cannot be built with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let globe = &self.globe;
        let nav = &self.navigation;
        if globe.vertices_per_edge < 2 {
            return Err(invalid("globe.vertices_per_edge", "must be at least 2"));
        }
        if !(0.0..=1.0).contains(&globe.land_mask_cutoff) {
            return Err(invalid("globe.land_mask_cutoff", "must be within [0, 1]"));
        }
        if !(globe.seabed_height <= globe.water_surface_height && globe.water_surface_height <= 1.0)
        {
            return Err(invalid(
                "globe.water_surface_height",
                "must satisfy seabed_height <= water_surface_height <= 1",
            ));
        }
        if globe.map_width == 0
            || globe.map_height == 0
            || globe.visibility_width == 0
            || globe.visibility_height == 0
        {
            return Err(invalid("globe", "map and visibility sizes must be non-zero"));
        }
        if nav.camera_distance_min > nav.camera_distance_max {
            return Err(invalid(
                "navigation.camera_distance_min",
                "must not exceed camera_distance_max",
            ));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &'static str) -> ConfigError {
    ConfigError::InvalidValue { field, reason }
}
