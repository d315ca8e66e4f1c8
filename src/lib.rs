// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! ferro-sonar: nucleotide and amino acid variant calls from alignments
//!
//! Part of the ferro bioinformatics toolkit.
//!
//! A sample's alignment against a reference molecule (an aligned pair or a
//! CIGAR alignment) yields nucleotide variants; a codon table lifts them to
//! amino acid variants linked to the nucleotide variants that caused them.
//! Precomputed Nextclade results produce the same records. Each sample is
//! written as one `//`-terminated var file.
//!
//! # Example
//!
//! ```
//! use ferro_sonar::extractor::AlignmentInput;
//! use ferro_sonar::lift::{CodonTable, GeneCodons};
//! use ferro_sonar::pipeline::{SampleInput, VariantPipeline};
//!
//! let reference = "ATGAAATAA";
//! let coords: Vec<u64> = (0..9).collect();
//! let mut table = CodonTable::new();
//! table.add_gene(GeneCodons::from_cds("1", "ORF1", "P1.1", &coords, "MK", reference).unwrap());
//!
//! let pipeline = VariantPipeline::new("REF.1").with_codon_table(&table);
//! let sample = SampleInput::new(
//!     "s1",
//!     AlignmentInput::Aligned { reference: reference.into(), query: "ATTAAATAA".into() },
//! );
//! let vars = pipeline.run(&sample).unwrap();
//!
//! assert_eq!(vars.nt[0].label, "G3T");
//! assert_eq!(vars.aa[0].label, "M1I");
//! assert_eq!(vars.aa[0].parent_ids.to_string(), "1");
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod lift;
pub mod nextclade;
#[cfg(feature = "parallel")]
pub mod parallel;
pub mod pipeline;
pub mod varfile;
pub mod variant;

// Re-export commonly used types
pub use error::{ErrorCode, SonarError};
pub use extractor::{AlignmentInput, DiffExtractor, ExtractorConfig};
pub use lift::{CodonLiftEngine, CodonTable};
pub use nextclade::NextcladeAdapter;
pub use pipeline::{SampleInput, SampleVariants, VariantPipeline};
pub use variant::{ParentIds, VariantKind, VariantRecord};

/// Result type alias for ferro-sonar operations
pub type Result<T> = std::result::Result<T, SonarError>;
