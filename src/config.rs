// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! Configuration file support for ferro-sonar.
//!
//! This module loads `.ferro-sonar.toml` files which set defaults for the
//! worker pool and output format.
//!
//! # Example Configuration
//!
//! ```toml
//! [pipeline]
//! workers = 8
//! chunk-size = 100
//!
//! [output]
//! format = "tsv"
//! ```
//!
//! # Config File Locations
//!
//! Configuration is searched in this order (first found wins):
//! 1. `.ferro-sonar.toml` in current directory
//! 2. `~/.config/ferro-sonar/config.toml`
//!
//! CLI flags take precedence over config file settings.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::SonarError;
use crate::nextclade::DEFAULT_CHUNK_SIZE;

/// Parsed configuration from a .ferro-sonar.toml file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SonarConfig {
    pub pipeline: PipelineConfig,
    pub output: OutputConfig,
}

/// `[pipeline]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct PipelineConfig {
    /// Worker threads (0 = one per core).
    pub workers: Option<usize>,
    /// Nextclade results read per chunk.
    pub chunk_size: Option<usize>,
}

/// `[output]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// `tsv` or `json`.
    pub format: Option<String>,
}

impl SonarConfig {
    /// Load configuration from the default locations.
    ///
    /// A file that exists but fails to parse is reported with a warning and
    /// skipped.
    pub fn load() -> Option<Self> {
        let home_config = dirs_home().map(|home| {
            home.join(".config")
                .join("ferro-sonar")
                .join("config.toml")
        });

        [Some(PathBuf::from(".ferro-sonar.toml")), home_config]
            .into_iter()
            .flatten()
            .filter(|path| path.exists())
            .find_map(|path| match Self::load_from_path(&path) {
                Ok(config) => {
                    log::debug!("loaded configuration from {}", path.display());
                    Some(config)
                }
                Err(e) => {
                    log::warn!("ignoring {}: {}", path.display(), e);
                    None
                }
            })
    }

    /// Load configuration from a specific path.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, SonarError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| SonarError::Config {
            msg: format!("cannot read {}: {}", path.display(), e),
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML content.
    pub fn parse(content: &str) -> Result<Self, SonarError> {
        let config: SonarConfig = toml::from_str(content)?;
        if let Some(format) = config.output.format.as_deref() {
            if !matches!(format, "tsv" | "json") {
                return Err(SonarError::Config {
                    msg: format!("unknown output format '{format}'"),
                });
            }
        }
        Ok(config)
    }

    /// Worker count, CLI value first.
    pub fn workers(&self, cli: Option<usize>) -> usize {
        cli.or(self.pipeline.workers).unwrap_or(0)
    }

    /// Chunk size, CLI value first.
    pub fn chunk_size(&self, cli: Option<usize>) -> usize {
        cli.or(self.pipeline.chunk_size)
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_CHUNK_SIZE)
    }
}

/// Get the user's home directory.
fn dirs_home() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}
