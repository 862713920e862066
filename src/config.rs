//! Tool configuration loaded from TOML.
//!
//! ```toml
//! interweaved_markers = ["ECHO", "SMART_AMP", "AEC"]
//!
//! [render]
//! dynamic_color = "blue"
//! virtual_color = "gray"
//! show_core = true
//! show_cpc = false
//! ```
//!
//! Every field is optional and falls back to [`ToolConfig::default`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::graph::DEFAULT_INTERWEAVED_MARKERS;
use crate::render::RenderOptions;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{}': {source}", .path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    TomlParse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// Component prefixes that mark the shared component of interweaved pipelines.
    pub interweaved_markers: Vec<String>,
    pub render: RenderOptions,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            interweaved_markers: DEFAULT_INTERWEAVED_MARKERS.iter().map(|m| m.to_string()).collect(),
            render: RenderOptions::default(),
        }
    }
}

impl ToolConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content)?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn from_toml(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }
}
