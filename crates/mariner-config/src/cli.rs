//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Mariner command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "mariner", about = "Sail a procedurally generated globe")]
pub struct CliArgs {
    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Number of simulation ticks to run before exiting.
    #[arg(long, default_value_t = 600)]
    pub ticks: u32,

    /// Cube-sphere grid vertices per face edge.
    #[arg(long)]
    pub vertices_per_edge: Option<u32>,

    /// Map resolution as WIDTHxHEIGHT, applied to the source maps.
    #[arg(long, value_parser = parse_size)]
    pub map_size: Option<(u32, u32)>,

    /// Seed for procedurally generated maps.
    #[arg(long)]
    pub seed: Option<u32>,

    /// Load maps from this directory instead of generating them.
    #[arg(long)]
    pub texture_dir: Option<PathBuf>,

    /// Let the boat sail over land.
    #[arg(long)]
    pub disable_land_collision: bool,
}

fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let (w, h) = value
        .split_once('x')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{value}'"))?;
    let parse = |s: &str| s.trim().parse::<u32>().map_err(|e| format!("'{s}': {e}"));
    Ok((parse(w)?, parse(h)?))
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
        if let Some(n) = args.vertices_per_edge {
            self.globe.vertices_per_edge = n;
        }
        if let Some((w, h)) = args.map_size {
            self.globe.map_width = w;
            self.globe.map_height = h;
        }
        if let Some(seed) = args.seed {
            self.globe.seed = seed;
        }
        if let Some(ref dir) = args.texture_dir {
            self.globe.texture_dir = Some(dir.clone());
        }
        if args.disable_land_collision {
            self.globe.enable_land_collision = false;
        }
    }
}
