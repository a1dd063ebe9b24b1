//! Configuration loading utilities.

use serde::de::DeserializeOwned;
use std::path::Path;

use super::error::ServiceError;

/// Load configuration from a YAML file.
///
/// # Example
///
/// ```rust,ignore
/// let config: WxNowConfig = load_config("wxnow.yaml")?;
/// ```
pub fn load_config<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T, ServiceError> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|e| {
        ServiceError::Config(format!("Failed to read {}: {}", path.display(), e))
    })?;

    serde_yaml::from_str(&contents).map_err(|e| {
        ServiceError::Parse(format!("Failed to parse {}: {}", path.display(), e))
    })
}

/// Load configuration from a file, or use default if file doesn't exist.
pub fn load_config_or_default<T: DeserializeOwned + Default>(
    path: impl AsRef<Path>,
) -> Result<T, ServiceError> {
    let path = path.as_ref();

    if !path.exists() {
        log::info!("Config file not found, using defaults: {}", path.display());
        return Ok(T::default());
    }

    load_config(path)
}

/// Parse configuration from a YAML string.
pub fn parse_config<T: DeserializeOwned>(yaml: &str) -> Result<T, ServiceError> {
    Ok(serde_yaml::from_str(yaml)?)
}
