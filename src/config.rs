//! Configuration for the terminal emulator

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::DEFAULT_SCROLLBACK_SIZE;
use crate::error::TerminalError;
use crate::terminal::Geometry;

/// Terminal configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerminalConfig {
    /// Width in columns
    pub cols: usize,
    /// Height in rows
    pub rows: usize,
    /// Maximum scrollback lines (0 disables scrollback)
    pub scrollback_lines: usize,
}

impl Default for TerminalConfig {
    fn default() -> Self {
        Self {
            cols: 80,
            rows: 24,
            scrollback_lines: DEFAULT_SCROLLBACK_SIZE,
        }
    }
}

impl TerminalConfig {
    /// Load configuration from a JSON file. Missing fields take their
    /// default values.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: TerminalConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Check the geometry
    pub fn validate(&self) -> Result<Geometry, TerminalError> {
        Geometry::new(self.cols, self.rows)
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(#[from] TerminalError),
}
