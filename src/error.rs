// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! Error types for ferro-sonar
//!
//! Every fallible operation returns [`SonarError`]. Errors are scoped to a
//! single sample: callers processing a batch record the failure for that
//! sample and carry on with the rest.

use std::fmt;
use thiserror::Error;

/// Error codes for categorizing errors
///
/// These codes can be used for programmatic error handling and appear as an
/// `E####` prefix in log messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    // Input errors (E1xxx)
    /// Malformed CIGAR string or unknown operator
    InvalidCigar = 1001,
    /// Malformed tabular input (var file, codon table)
    InvalidFormat = 1002,
    /// Malformed configuration
    InvalidConfig = 1003,

    // Alignment errors (E2xxx)
    /// Aligned sequences differ in length
    LengthMismatch = 2001,
    /// Coordinates fall outside a sequence
    InvalidRange = 2002,

    // IO errors (E9xxx)
    /// File IO error
    IoError = 9001,
    /// JSON parsing error
    JsonError = 9002,
}

impl ErrorCode {
    /// Get the error code as a string (e.g., "E1001")
    pub fn as_str(&self) -> String {
        format!("E{:04}", *self as u16)
    }

    /// Get a brief description of this error code
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::InvalidCigar => "invalid CIGAR string",
            ErrorCode::InvalidFormat => "malformed input row",
            ErrorCode::InvalidConfig => "invalid configuration",
            ErrorCode::LengthMismatch => "aligned sequences differ in length",
            ErrorCode::InvalidRange => "coordinates outside sequence",
            ErrorCode::IoError => "file I/O error",
            ErrorCode::JsonError => "JSON parsing error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for ferro-sonar operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SonarError {
    /// CIGAR string could not be interpreted
    #[error("Cannot interpret CIGAR operator '{op}' at byte {pos}: {msg}")]
    Cigar { op: char, pos: usize, msg: String },

    /// Aligned reference and query differ in length
    #[error("Aligned sequences differ in length: reference={ref_len}, query={qry_len}")]
    LengthMismatch { ref_len: usize, qry_len: usize },

    /// Invalid coordinates provided
    #[error("Invalid coordinates: {msg}")]
    InvalidCoordinates { msg: String },

    /// Malformed row in a tabular file (line numbers are 1-based)
    #[error("Format error at line {line}: {msg}")]
    Format { line: usize, msg: String },

    /// Invalid configuration
    #[error("Config error: {msg}")]
    Config { msg: String },

    /// IO error (for file operations)
    #[error("IO error: {msg}")]
    Io { msg: String },

    /// JSON parsing error
    #[error("JSON error: {msg}")]
    Json { msg: String },
}

impl SonarError {
    /// Create a CIGAR error for the operator at `pos`
    pub fn cigar(op: char, pos: usize, msg: impl Into<String>) -> Self {
        SonarError::Cigar {
            op,
            pos,
            msg: msg.into(),
        }
    }

    /// Create a format error for a 1-based line number
    pub fn format(line: usize, msg: impl Into<String>) -> Self {
        SonarError::Format {
            line,
            msg: msg.into(),
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            SonarError::Cigar { .. } => ErrorCode::InvalidCigar,
            SonarError::LengthMismatch { .. } => ErrorCode::LengthMismatch,
            SonarError::InvalidCoordinates { .. } => ErrorCode::InvalidRange,
            SonarError::Format { .. } => ErrorCode::InvalidFormat,
            SonarError::Config { .. } => ErrorCode::InvalidConfig,
            SonarError::Io { .. } => ErrorCode::IoError,
            SonarError::Json { .. } => ErrorCode::JsonError,
        }
    }

    /// Message prefixed with the error code, as written to the log
    pub fn detailed_message(&self) -> String {
        format!("[{}] {}", self.code(), self)
    }
}

impl From<std::io::Error> for SonarError {
    fn from(err: std::io::Error) -> Self {
        SonarError::Io {
            msg: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for SonarError {
    fn from(err: serde_json::Error) -> Self {
        SonarError::Json {
            msg: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for SonarError {
    fn from(err: toml::de::Error) -> Self {
        SonarError::Config {
            msg: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_as_str() {
        assert_eq!(ErrorCode::InvalidCigar.as_str(), "E1001");
        assert_eq!(ErrorCode::LengthMismatch.as_str(), "E2001");
        assert_eq!(ErrorCode::JsonError.as_str(), "E9002");
    }

    #[test]
    fn test_error_code_description() {
        assert_eq!(
            ErrorCode::LengthMismatch.description(),
            "aligned sequences differ in length"
        );
        assert_eq!(ErrorCode::IoError.description(), "file I/O error");
    }

    #[test]
    fn test_cigar_error_display() {
        let err = SonarError::cigar('S', 3, "unsupported operator");
        assert_eq!(
            err.to_string(),
            "Cannot interpret CIGAR operator 'S' at byte 3: unsupported operator"
        );
        assert_eq!(err.code(), ErrorCode::InvalidCigar);
    }

    #[test]
    fn test_length_mismatch_detailed_message() {
        let err = SonarError::LengthMismatch {
            ref_len: 4,
            qry_len: 3,
        };
        assert_eq!(
            err.detailed_message(),
            "[E2001] Aligned sequences differ in length: reference=4, query=3"
        );
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.var");
        let err: SonarError = io_err.into();
        assert!(matches!(err, SonarError::Io { .. }));
        assert!(err.to_string().contains("missing.var"));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: SonarError = json_err.into();
        assert_eq!(err.code(), ErrorCode::JsonError);
    }
}
