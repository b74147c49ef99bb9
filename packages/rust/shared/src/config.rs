//! Application configuration for subjects-fast.
//!
//! User config lives at `~/.subjects-fast/subjects-fast.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SubjectsFastError};
use crate::types::{DEFAULT_BASE_URL, FacetTable};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "subjects-fast.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".subjects-fast";

// ---------------------------------------------------------------------------
// Config structs (matching subjects-fast.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Remote archive settings.
    #[serde(default)]
    pub source: SourceConfig,

    /// Local directories.
    #[serde(default)]
    pub paths: PathsConfig,
}

/// `[source]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Remote directory holding the `<ArchiveName>.marcxml.zip` files.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}
fn default_timeout_secs() -> u64 {
    600
}

/// `[paths]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Where archives are downloaded and extracted.
    #[serde(default = "default_download_dir")]
    pub download_dir: String,

    /// Where the YAML vocabularies are written.
    #[serde(default = "default_vocabularies_dir")]
    pub vocabularies_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            download_dir: default_download_dir(),
            vocabularies_dir: default_vocabularies_dir(),
        }
    }
}

fn default_download_dir() -> String {
    "downloads".into()
}
fn default_vocabularies_dir() -> String {
    "vocabularies".into()
}

impl AppConfig {
    /// Build the facet table (all nine facets) for the configured base URL.
    pub fn facet_table(&self) -> Result<FacetTable> {
        FacetTable::new(&self.source.base_url)
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.subjects-fast/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| SubjectsFastError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.subjects-fast/subjects-fast.toml`).
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
    let content = std::fs::read_to_string(path).map_err(|e| SubjectsFastError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        SubjectsFastError::config(format!("failed to parse {}: {e}", path.display()))
    })?;

    // Surface a bad base_url at load time rather than mid-run.
    config.facet_table()?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| SubjectsFastError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| SubjectsFastError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| SubjectsFastError::io(&path, e))?;
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
        assert!(toml_str.contains("base_url"));
        assert!(toml_str.contains("researchworks.oclc.org"));
        assert!(toml_str.contains("vocabularies_dir"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.source.timeout_secs, 600);
        assert_eq!(parsed.paths.download_dir, "downloads");
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[source]
base_url = "http://mirror.example.org/fast"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.source.base_url, "http://mirror.example.org/fast");
        assert_eq!(config.source.timeout_secs, 600);
        assert_eq!(config.paths.vocabularies_dir, "vocabularies");

        let table = config.facet_table().unwrap();
        assert_eq!(table.facets().len(), 9);
    }

    #[test]
    fn load_rejects_invalid_base_url() {
        let path = std::env::temp_dir().join(format!(
            "subjects-fast-config-test-{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "[source]\nbase_url = \"::nope::\"\n").unwrap();

        let result = load_config_from(&path);
        let _ = std::fs::remove_file(&path);

        let err = result.unwrap_err();
        assert!(err.to_string().contains("invalid base URL"));
    }
}
