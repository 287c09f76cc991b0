//! Sources for the equirectangular maps a globe is built from.
//!
//! A globe needs three scalar maps (topology, bathymetry, land mask) and one
//! color map (albedo), all at the same resolution. [`ProceduralImageStore`]
//! generates them from noise; [`DirectoryImageStore`] loads PNG files named
//! `{base}_{width}x{height}.png`.

use std::path::{Path, PathBuf};

use image::{GrayImage, RgbaImage};
use mariner_terrain::{PlanetMapParams, PlanetMaps, generate_planet_maps};
use tracing::{debug, info};

/// The maps a globe samples.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MapKind {
    Topology,
    Bathymetry,
    LandMask,
    Albedo,
}

impl MapKind {
    pub const SCALAR: [MapKind; 3] = [MapKind::Topology, MapKind::Bathymetry, MapKind::LandMask];

    /// File and texture base name.
    pub fn base_name(self) -> &'static str {
        match self {
            MapKind::Topology => "topology",
            MapKind::Bathymetry => "bathymetry",
            MapKind::LandMask => "land_mask",
            MapKind::Albedo => "albedo_1",
        }
    }

    pub fn is_scalar(self) -> bool {
        !matches!(self, MapKind::Albedo)
    }

    /// `{base}_{width}x{height}.png`
    pub fn file_name(self, width: u32, height: u32) -> String {
        format!("{}_{width}x{height}.png", self.base_name())
    }
}

/// Errors raised while fetching maps.
#[derive(Debug, thiserror::Error)]
pub enum ImageStoreError {
    #[error("map file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("{kind:?} map is {actual:?}, expected {expected:?}")]
    SizeMismatch {
        kind: MapKind,
        expected: (u32, u32),
        actual: (u32, u32),
    },

    /// A scalar map was requested as color, or the reverse.
    #[error("{0:?} is not available in the requested channel layout")]
    WrongChannels(MapKind),
}

/// Read access to named globe maps at a given resolution.
pub trait ImageStore {
    /// Single-channel map. Only valid for [`MapKind::is_scalar`] kinds.
    fn scalar_map(&self, kind: MapKind, width: u32, height: u32)
    -> Result<GrayImage, ImageStoreError>;

    /// Four-channel color map.
    fn color_map(&self, kind: MapKind, width: u32, height: u32)
    -> Result<RgbaImage, ImageStoreError>;
}

fn check_size(
    kind: MapKind,
    expected: (u32, u32),
    actual: (u32, u32),
) -> Result<(), ImageStoreError> {
    if expected == actual {
        Ok(())
    } else {
        Err(ImageStoreError::SizeMismatch {
            kind,
            expected,
            actual,
        })
    }
}

/// Maps generated once from noise at a fixed resolution.
#[derive(Clone, Debug)]
pub struct ProceduralImageStore {
    maps: PlanetMaps,
    size: (u32, u32),
}

impl ProceduralImageStore {
    pub fn generate(width: u32, height: u32, params: &PlanetMapParams) -> Self {
        info!(
            width,
            height,
            seed = params.heightmap.seed,
            "Generating procedural planet maps"
        );
        Self::from_maps(generate_planet_maps(width, height, params))
    }

    /// Serve pre-built maps. All four must share the topology map's size.
    pub fn from_maps(maps: PlanetMaps) -> Self {
        let size = maps.topology.dimensions();
        Self { maps, size }
    }

    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn maps(&self) -> &PlanetMaps {
        &self.maps
    }

    /// Write every map into `dir` under the names [`DirectoryImageStore`] reads.
    pub fn export(&self, dir: &Path) -> Result<(), ImageStoreError> {
        let (width, height) = self.size;
        let scalar = [
            (MapKind::Topology, &self.maps.topology),
            (MapKind::Bathymetry, &self.maps.bathymetry),
            (MapKind::LandMask, &self.maps.land_mask),
        ];
        for (kind, map) in scalar {
            let path = dir.join(kind.file_name(width, height));
            map.save(&path)
                .map_err(|source| ImageStoreError::Write { path, source })?;
        }
        let path = dir.join(MapKind::Albedo.file_name(width, height));
        self.maps
            .albedo
            .save(&path)
            .map_err(|source| ImageStoreError::Write { path, source })?;

        info!(dir = %dir.display(), width, height, "Exported planet maps");
        Ok(())
    }
}

impl ImageStore for ProceduralImageStore {
    fn scalar_map(
        &self,
        kind: MapKind,
        width: u32,
        height: u32,
    ) -> Result<GrayImage, ImageStoreError> {
        check_size(kind, (width, height), self.size)?;
        let map = match kind {
            MapKind::Topology => &self.maps.topology,
            MapKind::Bathymetry => &self.maps.bathymetry,
            MapKind::LandMask => &self.maps.land_mask,
            MapKind::Albedo => return Err(ImageStoreError::WrongChannels(kind)),
        };
        Ok(map.clone())
    }

    fn color_map(
        &self,
        kind: MapKind,
        width: u32,
        height: u32,
    ) -> Result<RgbaImage, ImageStoreError> {
        check_size(kind, (width, height), self.size)?;
        match kind {
            MapKind::Albedo => Ok(self.maps.albedo.clone()),
            _ => Err(ImageStoreError::WrongChannels(kind)),
        }
    }
}

/// PNG maps on disk.
#[derive(Clone, Debug)]
pub struct DirectoryImageStore {
    root: PathBuf,
}

impl DirectoryImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, kind: MapKind, width: u32, height: u32) -> PathBuf {
        self.root.join(kind.file_name(width, height))
    }

    fn open(
        &self,
        kind: MapKind,
        width: u32,
        height: u32,
    ) -> Result<image::DynamicImage, ImageStoreError> {
        let path = self.path_for(kind, width, height);
        if !path.is_file() {
            return Err(ImageStoreError::NotFound(path));
        }
        debug!(path = %path.display(), "Loading map");
        let image = image::open(&path).map_err(|source| ImageStoreError::Decode {
            path: path.clone(),
            source,
        })?;
        check_size(kind, (width, height), (image.width(), image.height()))?;
        Ok(image)
    }
}

impl ImageStore for DirectoryImageStore {
    fn scalar_map(
        &self,
        kind: MapKind,
        width: u32,
        height: u32,
    ) -> Result<GrayImage, ImageStoreError> {
        if !kind.is_scalar() {
            return Err(ImageStoreError::WrongChannels(kind));
        }
        Ok(self.open(kind, width, height)?.into_luma8())
    }

    fn color_map(
        &self,
        kind: MapKind,
        width: u32,
        height: u32,
    ) -> Result<RgbaImage, ImageStoreError> {
        if kind.is_scalar() {
            return Err(ImageStoreError::WrongChannels(kind));
        }
        Ok(self.open(kind, width, height)?.into_rgba8())
    }
}
