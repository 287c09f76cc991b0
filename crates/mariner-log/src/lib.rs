//! Structured logging for Mariner.
//!
//! Console output with uptime timestamps and module paths, plus a JSON log
//! file in debug builds. `log` records emitted by the GPU crates are bridged
//! into the same subscriber.

use std::path::Path;

use mariner_config::Config;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Noise suppression appended to every filter.
const QUIET_DEPENDENCIES: &str = "wgpu=warn,wgpu_core=warn,wgpu_hal=warn,naga=warn";

/// Name of the JSON log file written in debug builds.
pub const LOG_FILE_NAME: &str = "mariner.log";

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `config.debug.log_level`. The JSON file
/// layer is only installed for debug builds with a log directory and
/// `debug.log_to_file` enabled.
///
/// ```no_run
/// use mariner_config::Config;
/// use mariner_log::init_logging;
///
/// let config = Config::default();
/// init_logging(Some(std::path::Path::new("./logs")), cfg!(debug_assertions), Some(&config))
///     .expect("logging already initialized");
/// ```
pub fn init_logging(
    log_dir: Option<&Path>,
    debug_build: bool,
    config: Option<&Config>,
) -> Result<(), TryInitError> {
    let level = config.map(|c| c.debug.log_level.as_str()).unwrap_or("");
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directives(level)));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_names(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    let file_logging = config.is_none_or(|c| c.debug.log_to_file);
    if debug_build
        && file_logging
        && let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(log_file) = std::fs::File::create(log_dir.join(LOG_FILE_NAME))
    {
        let file_layer = fmt::layer()
            .with_writer(log_file)
            .with_ansi(false)
            .with_target(true)
            .with_timer(fmt::time::uptime())
            .json();

        return subscriber.with(file_layer).try_init();
    }

    subscriber.try_init()
}

/// Filter directives for a configured level, defaulting to `info`.
pub fn filter_directives(level: &str) -> String {
    let level = level.trim();
    let level = if level.is_empty() { "info" } else { level };
    format!("{level},{QUIET_DEPENDENCIES}")
}

/// `EnvFilter` with the default directives.
pub fn default_env_filter() -> EnvFilter {
    EnvFilter::new(filter_directives(""))
}
