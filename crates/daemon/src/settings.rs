// Settings loading: optional TOML file + DEADMAN_ environment overrides

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};

use deadman_core::MonitorConfig;

/// Build the immutable monitor configuration.
///
/// Layering, lowest priority first: struct defaults, then the TOML file
/// (if given), then `DEADMAN_`-prefixed environment variables (e.g.
/// `DEADMAN_FAILURE_THRESHOLD=5`). The result is validated before use;
/// invalid configuration is a startup error, never a silent default.
pub fn load(config_path: Option<&str>) -> Result<MonitorConfig> {
    let mut builder = Config::builder();

    if let Some(path) = config_path {
        let expanded = shellexpand::tilde(path).into_owned();
        builder = builder.add_source(File::new(&expanded, FileFormat::Toml));
    }

    builder = builder.add_source(
        Environment::with_prefix("DEADMAN")
            .separator("__")
            .try_parsing(true),
    );

    // Absent keys fall back per-field via the serde defaults on MonitorConfig.
    let loaded: MonitorConfig = builder
        .build()
        .context("failed to read configuration")?
        .try_deserialize()
        .context("failed to parse configuration")?;

    loaded.validate().context("invalid configuration")?;
    Ok(loaded)
}
