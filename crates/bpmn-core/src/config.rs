use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{ModelerError, ModelerResult};

const DEFAULT_APPEND_SPACING: f64 = 80.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelerConfig {
    /// Maximum number of undo entries kept; unbounded when absent.
    #[serde(default)]
    pub history_limit: Option<usize>,

    /// Horizontal gap between a source shape and an appended shape.
    #[serde(default)]
    pub append_spacing: Option<f64>,

    /// Emit tooltips for rejected drops.
    #[serde(default = "default_feedback")]
    pub feedback: bool,
}

fn default_feedback() -> bool {
    true
}

impl ModelerConfig {
    pub fn config_path() -> Option<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            dirs::home_dir().map(|home| home.join(".config/bpmn-modeler/config.toml"))
        }
        #[cfg(target_os = "linux")]
        {
            dirs::config_dir().map(|config| config.join("bpmn-modeler/config.toml"))
        }
        #[cfg(target_os = "windows")]
        {
            dirs::config_dir().map(|config| config.join("bpmn-modeler\\config.toml"))
        }
        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            None
        }
    }

    /// Load the user config, falling back to defaults when it is missing or unreadable.
    pub fn load() -> Self {
        if let Some(config_path) = Self::config_path() {
            if config_path.exists() {
                match Self::from_file(&config_path) {
                    Ok(config) => return config,
                    Err(err) => {
                        tracing::warn!("Ignoring config at {}: {}", config_path.display(), err);
                    }
                }
            }
        }
        Self::with_defaults()
    }

    pub fn from_file(path: &Path) -> ModelerResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> ModelerResult<Self> {
        toml::from_str(content).map_err(|e| ModelerError::Config(e.to_string()))
    }

    /// Defaults as they would be produced by an empty config file.
    pub fn with_defaults() -> Self {
        Self {
            feedback: default_feedback(),
            ..Self::default()
        }
    }

    pub fn effective_append_spacing(&self) -> f64 {
        self.append_spacing.unwrap_or(DEFAULT_APPEND_SPACING)
    }
}
