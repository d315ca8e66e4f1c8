// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! Nucleotide variant extraction from pairwise alignments.
//!
//! Two alignment encodings are supported:
//!
//! - an aligned pair: reference and query of equal length with `-` gaps
//! - a CIGAR alignment: ungapped reference and query plus an edit script
//!
//! Both yield the same [`VariantRecord`] list, ordered by reference position,
//! with ids starting at 1 and each record its own parent.
//!
//! # Example
//!
//! ```
//! use ferro_sonar::extractor::DiffExtractor;
//!
//! let extractor = DiffExtractor::new("MN908947.3");
//! let vars = extractor.extract_aligned("ACGT", "ATGT").unwrap();
//!
//! assert_eq!(vars.len(), 1);
//! assert_eq!(vars[0].label, "C2T");
//! ```

mod aligned;
mod cigar;

pub use aligned::extract_aligned;
pub use cigar::{extract_cigar, parse_cigar, CigarOp, CigarRun};

use crate::error::SonarError;
use crate::variant::{IdCounter, VariantRecord, GAP};

/// Configuration for the diff extractor.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Gap character of aligned pairs (default: `-`).
    pub gap: u8,
    /// First id handed out (default: 1).
    pub first_id: u64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            gap: GAP,
            first_id: 1,
        }
    }
}

/// One sample's alignment against the reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlignmentInput {
    /// Equal-length gapped sequences.
    Aligned { reference: String, query: String },
    /// Ungapped sequences plus a CIGAR string.
    Cigar {
        reference: String,
        query: String,
        cigar: String,
    },
}

/// Extracts nucleotide variants against one reference element.
#[derive(Debug, Clone)]
pub struct DiffExtractor {
    element: String,
    config: ExtractorConfig,
}

impl DiffExtractor {
    /// Create an extractor with default configuration.
    pub fn new(element: impl Into<String>) -> Self {
        Self::with_config(element, ExtractorConfig::default())
    }

    pub fn with_config(element: impl Into<String>, config: ExtractorConfig) -> Self {
        Self {
            element: element.into(),
            config,
        }
    }

    /// Accession written to every record.
    pub fn element(&self) -> &str {
        &self.element
    }

    /// Extract variants from an aligned pair.
    ///
    /// # Errors
    ///
    /// [`SonarError::LengthMismatch`] if the sequences differ in length.
    pub fn extract_aligned(&self, reference: &str, query: &str) -> Result<Vec<VariantRecord>, SonarError> {
        let mut ids = IdCounter::starting_at(self.config.first_id);
        extract_aligned(reference, query, &self.element, self.config.gap, &mut ids)
    }

    /// Extract variants from ungapped sequences and a CIGAR string.
    ///
    /// # Errors
    ///
    /// [`SonarError::Cigar`] for malformed CIGAR strings or runs that overrun
    /// either sequence.
    pub fn extract_cigar(
        &self,
        reference: &str,
        query: &str,
        cigar: &str,
    ) -> Result<Vec<VariantRecord>, SonarError> {
        let runs = parse_cigar(cigar)?;
        let mut ids = IdCounter::starting_at(self.config.first_id);
        extract_cigar(reference, query, &runs, &self.element, &mut ids)
    }

    /// Extract variants from either alignment encoding.
    pub fn extract(&self, input: &AlignmentInput) -> Result<Vec<VariantRecord>, SonarError> {
        match input {
            AlignmentInput::Aligned { reference, query } => self.extract_aligned(reference, query),
            AlignmentInput::Cigar {
                reference,
                query,
                cigar,
            } => self.extract_cigar(reference, query, cigar),
        }
    }
}
