use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::constants::{DEFAULT_IO_BUFFER_SIZE, MAX_IO_BUFFER_SIZE, MIN_IO_BUFFER_SIZE};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

/// How the asset bytes reach the demuxer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetMode {
    /// Read the whole file up front and feed the demuxer from memory.
    #[default]
    Memory,
    /// Let the engine open the resolved path itself.
    File,
}

impl std::fmt::Display for AssetMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetMode::Memory => write!(f, "memory"),
            AssetMode::File => write!(f, "file"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Size of the staging buffer handed to the demuxer in memory mode.
    pub io_buffer_size: usize,
    pub asset_mode: AssetMode,
    /// Ask the decoder for speed over conformance.
    pub fast_decode: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            io_buffer_size: DEFAULT_IO_BUFFER_SIZE,
            asset_mode: AssetMode::Memory,
            fast_decode: false,
        }
    }
}

impl PlayerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Staging buffer size clamped to the accepted range.
    pub fn effective_io_buffer_size(&self) -> usize {
        self.io_buffer_size.clamp(MIN_IO_BUFFER_SIZE, MAX_IO_BUFFER_SIZE)
    }
}
