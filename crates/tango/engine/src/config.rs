//! Engine configuration

use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Engine configuration, usually read from a TOML file
///
/// Every field has a default, so an empty file is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Value injected as `tg_mode` by the mode plugin
    pub mode: String,

    /// When false, elements without a material accept any drop
    pub strict_drop_targets: bool,

    /// Step budget for expression and code evaluation
    pub max_evaluation_steps: usize,

    /// Element types whose open state the portal plugin manages
    pub portal_types: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            mode: "design".to_string(),
            strict_drop_targets: true,
            max_evaluation_steps: 10_000,
            portal_types: vec!["Modal".to_string(), "Drawer".to_string()],
        }
    }
}

impl EngineConfig {
    /// Load configuration from a file
    ///
    /// A missing file, or no path at all, yields the default configuration.
    pub fn load(path: Option<&Path>) -> EngineResult<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        if path.exists() {
            let contents = std::fs::read_to_string(path).map_err(|e| {
                EngineError::Config(format!("Cannot read {}: {}", path.display(), e))
            })?;
            let config = Self::from_toml_str(&contents)?;
            tracing::debug!(path = %path.display(), "Engine configuration loaded");
            Ok(config)
        } else {
            tracing::debug!(path = %path.display(), "No configuration file, using defaults");
            Ok(Self::default())
        }
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(contents: &str) -> EngineResult<Self> {
        toml::from_str(contents).map_err(|e| EngineError::Config(e.to_string()))
    }

    pub fn to_toml_string(&self) -> EngineResult<String> {
        toml::to_string(self).map_err(|e| EngineError::Config(e.to_string()))
    }

    /// Whether `element_type` is handled as a portal
    pub fn is_portal_type(&self, element_type: &str) -> bool {
        self.portal_types.iter().any(|t| t == element_type)
    }
}
