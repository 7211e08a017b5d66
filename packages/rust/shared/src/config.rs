//! Application configuration for Geoflow.
//!
//! User config lives at `~/.geoflow/geoflow.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{GeoflowError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "geoflow.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".geoflow";

// ---------------------------------------------------------------------------
// Config structs (matching geoflow.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// GEO mirror settings.
    #[serde(default)]
    pub mirror: MirrorConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Default base directory for dataset output.
    #[serde(default = "default_base_dir")]
    pub base_dir: String,

    /// Concurrent workers for within-stage work (decompression).
    #[serde(default = "default_concurrency")]
    pub concurrency: u32,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            concurrency: default_concurrency(),
        }
    }
}

fn default_base_dir() -> String {
    "~/geoflow-data".into()
}
fn default_concurrency() -> u32 {
    4
}

/// `[mirror]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MirrorConfig {
    /// Base URL of the GEO FTP mirror.
    #[serde(default = "default_mirror_url")]
    pub base_url: String,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            base_url: default_mirror_url(),
        }
    }
}

fn default_mirror_url() -> String {
    "https://ftp.ncbi.nlm.nih.gov".into()
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.geoflow/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| GeoflowError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.geoflow/geoflow.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| GeoflowError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| GeoflowError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| GeoflowError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| GeoflowError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| GeoflowError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("base_dir"));
        assert!(toml_str.contains("ftp.ncbi.nlm.nih.gov"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.defaults.concurrency, 4);
        assert_eq!(parsed.mirror.base_url, "https://ftp.ncbi.nlm.nih.gov");
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[defaults]
base_dir = "/srv/geo"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.defaults.base_dir, "/srv/geo");
        assert_eq!(config.defaults.concurrency, 4);
        assert_eq!(config.mirror.base_url, "https://ftp.ncbi.nlm.nih.gov");
    }

    #[test]
    fn load_config_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("geoflow.toml");
        std::fs::write(&path, "[mirror]\nbase_url = \"http://localhost:9\"\n").unwrap();

        let config = load_config_from(&path).expect("load");
        assert_eq!(config.mirror.base_url, "http://localhost:9");
    }

    #[test]
    fn load_config_from_garbage_fails() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("geoflow.toml");
        std::fs::write(&path, "not = [valid").unwrap();

        let result = load_config_from(&path);
        assert!(result.is_err());
    }
}
