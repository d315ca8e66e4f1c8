// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! Output formatting utilities for CLI operations

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use crate::error::SonarError;
use crate::pipeline::SampleVariants;

/// Output format for CLI results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Tab-separated var file (default)
    #[default]
    Tsv,
    /// One JSON object per sample
    Json,
}

impl OutputFormat {
    /// File extension of a sample written in this format
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Tsv => "var",
            OutputFormat::Json => "json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Tsv => "tsv",
            OutputFormat::Json => "json",
        })
    }
}

impl FromStr for OutputFormat {
    type Err = SonarError;

    /// Parse an output format from a string
    ///
    /// # Examples
    ///
    /// ```
    /// use ferro_sonar::cli::OutputFormat;
    /// use std::str::FromStr;
    ///
    /// assert_eq!(OutputFormat::from_str("json").unwrap(), OutputFormat::Json);
    /// assert_eq!(OutputFormat::from_str("TSV").unwrap(), OutputFormat::Tsv);
    /// assert!(OutputFormat::from_str("vcf").is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tsv" | "var" => Ok(OutputFormat::Tsv),
            "json" => Ok(OutputFormat::Json),
            other => Err(SonarError::Config {
                msg: format!("unknown output format '{other}'"),
            }),
        }
    }
}

/// Write one sample in the requested format
pub fn write_sample<W: Write>(
    writer: W,
    sample: &SampleVariants,
    format: OutputFormat,
) -> Result<W, SonarError> {
    match format {
        OutputFormat::Tsv => sample.write_var(writer),
        OutputFormat::Json => sample.write_json(writer),
    }
}
