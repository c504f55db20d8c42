//! Configuration loader.

use std::path::Path;

use tracing::debug;

use crate::{Config, ConfigError, ConfigResult};

/// Loads and validates configuration from the given path.
///
/// Files ending in `.json` are read as JSON, anything else as TOML.
///
/// # Errors
///
/// Returns an error if the file is missing, cannot be read or parsed, or
/// fails validation.
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<Config> {
    let path = path.as_ref();
    debug!(?path, "loading configuration");

    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    let config: Config = if is_json(path) {
        serde_json::from_str(&content)?
    } else {
        toml::from_str(&content)?
    };

    config.validate()?;
    debug!(
        repositories = config.repositories.len(),
        page_size = config.page_size,
        "configuration loaded"
    );

    Ok(config)
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}
