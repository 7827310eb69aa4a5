// src/config.rs
//! Configuration file parsing
//!
//! Supports TOML configuration files with the following sections:
//! - [shadow] - Shadow marker suffix and error policy
//! - [codec] - Canonical gzip parameters and streaming limits
//!
//! Every key is optional; an empty file yields the defaults.

use crate::compression::GzipParams;
use crate::error::{Error, Result};
use crate::shadow::DEFAULT_MARKER;
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// TOML configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BoosterConfig {
    /// Shadow naming and pass policy
    #[serde(default)]
    pub shadow: ShadowSection,

    /// Canonical codec parameters
    #[serde(default)]
    pub codec: GzipParams,
}

/// Shadow configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct ShadowSection {
    /// Marker suffix identifying shadow files
    #[serde(default = "default_marker")]
    pub marker: String,

    /// Abort a pass at the first per-file error instead of collecting
    #[serde(default)]
    pub fail_fast: bool,
}

impl Default for ShadowSection {
    fn default() -> Self {
        Self {
            marker: default_marker(),
            fail_fast: false,
        }
    }
}

fn default_marker() -> String {
    DEFAULT_MARKER.to_string()
}

impl BoosterConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate configuration from TOML text
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would break the naming or codec contracts
    pub fn validate(&self) -> Result<()> {
        let marker = &self.shadow.marker;
        if marker.is_empty() {
            return Err(Error::Config("shadow.marker must not be empty".to_string()));
        }
        if marker.contains('/') || marker.contains(std::path::MAIN_SEPARATOR) {
            return Err(Error::Config(format!(
                "shadow.marker must not contain a path separator: {:?}",
                marker
            )));
        }
        if self.codec.level > 9 {
            return Err(Error::Config(format!(
                "codec.level must be between 0 and 9, got {}",
                self.codec.level
            )));
        }
        if self.codec.buffer_size == 0 {
            return Err(Error::Config("codec.buffer_size must be positive".to_string()));
        }
        if self.codec.max_lag == 0 {
            return Err(Error::Config("codec.max_lag must be positive".to_string()));
        }
        Ok(())
    }
}
