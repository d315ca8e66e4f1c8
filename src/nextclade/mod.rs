// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! Variants from precomputed Nextclade diffs.
//!
//! Nextclade already reports nucleotide substitutions, deletions and
//! insertions together with their amino acid consequences. The
//! [`NextcladeAdapter`] turns one result object into the same
//! [`VariantRecord`](crate::variant::VariantRecord) lists the alignment
//! extractor and codon lift engine produce.
//!
//! # Example
//!
//! ```
//! use ferro_sonar::nextclade::{NextcladeAdapter, NextcladeReader};
//!
//! let ndjson = r#"{"seqName": "s1", "substitutions": [{"pos": 1, "refNuc": "C", "qryNuc": "T"}]}"#;
//! let results = NextcladeReader::new(ndjson.as_bytes(), 10).unwrap().read_all().unwrap();
//!
//! let adapter = NextcladeAdapter::new("REF.1", "ACGT");
//! let sample = adapter.convert(&results[0]).unwrap();
//! assert_eq!(sample.name, "s1");
//! assert_eq!(sample.nt[0].label, "C2T");
//! ```

mod adapter;
mod reader;
mod types;

pub use adapter::NextcladeAdapter;
pub use reader::{NextcladeReader, DEFAULT_CHUNK_SIZE};
pub use types::{
    AaChange, AaChangesGroup, AaInsertion, AaMutation, FrameShift, NextcladeResult, NucDeletion,
    NucInsertion, NucSubstitution, Range,
};
