use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::model::config::EditorConfig;

/// Error type for config loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Read trellis.toml. A missing file yields the defaults; a present but
/// broken file is an error.
pub fn load_config(path: &Path) -> Result<EditorConfig, ConfigError> {
    if !path.exists() {
        return Ok(EditorConfig::default());
    }
    let text = fs::read_to_string(path).map_err(|e| ConfigError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    toml::from_str(&text).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Like [`load_config`], but fall back to defaults on any failure. Used on
/// startup paths where a bad config should not block editing.
pub fn load_config_or_default(path: &Path) -> EditorConfig {
    match load_config(path) {
        Ok(config) => config,
        Err(e) => {
            warn!("config load failed, using defaults: {e}");
            EditorConfig::default()
        }
    }
}
