//! Renderer configuration
//!
//! `EqConfig` is read from an optional TOML file, then overridden by
//! `SIMPLE_EQ_*` environment variables (e.g. `SIMPLE_EQ_FFT_ORDER=12`).

use anyhow::Context;
use simple_eq_core::EqConfig;
use std::collections::HashMap;
use std::path::Path;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "SIMPLE_EQ";

/// Load configuration from `path` (if any) and the process environment
pub fn load(path: Option<&Path>) -> anyhow::Result<EqConfig> {
    load_with_env(path, None)
}

/// Load configuration with an explicit environment map instead of the
/// process environment when `env` is `Some`
pub fn load_with_env(path: Option<&Path>, env: Option<HashMap<String, String>>) -> anyhow::Result<EqConfig> {
    let mut settings = config::Config::builder();

    if let Some(path) = path {
        settings = settings.add_source(config::File::from(path).required(true));
    }

    settings = settings.add_source(
        config::Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
            .source(env),
    );

    let config: EqConfig = settings
        .build()
        .context("Failed to read configuration")?
        .try_deserialize()
        .context("Invalid configuration")?;

    config.validate()?;

    tracing::debug!(
        "Configuration: FFT {} points, floor {} dB, FIFO depth {}",
        config.fft_size(),
        config.analyzer_floor_db,
        config.fifo_depth
    );

    Ok(config)
}
