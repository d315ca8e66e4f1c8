// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! Lifting nucleotide variants to amino acid variants.
//!
//! A [`CodonTable`] describes, for every CDS of a reference molecule, the
//! genomic position and reference base of each codon base. The
//! [`CodonLiftEngine`] overwrites the touched bases with the sample's
//! alternate alleles, translates the altered codons and reports the amino
//! acids that changed, each linked to the nucleotide variants that caused it.
//!
//! # Example
//!
//! ```
//! use ferro_sonar::lift::{CodonLiftEngine, CodonTable, GeneCodons};
//! use ferro_sonar::variant::VariantRecord;
//!
//! let reference = "ATGAAATAA";
//! let coords: Vec<u64> = (0..9).collect();
//! let mut table = CodonTable::new();
//! table.add_gene(GeneCodons::from_cds("1", "ORF1", "P1.1", &coords, "MK", reference).unwrap());
//!
//! let nt = vec![VariantRecord::nt(1, "G", 2, 3, "T", "ref")];
//! let aa = CodonLiftEngine::new(&table).lift(&nt);
//! assert_eq!(aa[0].label, "M1I");
//! ```

mod engine;
mod table;
mod translate;

pub use engine::{mark_frameshifts, CodonLiftEngine};
pub use table::{CodonTable, GeneCodons};
pub use translate::{translate_altered, translate_codon, translate_to_stop, DELETED_AA};
