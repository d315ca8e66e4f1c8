// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! Variant record model shared by all producers.
//!
//! Every producer (aligned-pair extraction, CIGAR extraction, Nextclade diffs)
//! emits [`VariantRecord`]s: nucleotide records first, with ids starting at 1,
//! followed by amino acid records whose ids continue the same counter.
//!
//! # Example
//!
//! ```
//! use ferro_sonar::variant::{VariantKind, VariantRecord};
//!
//! let snp = VariantRecord::nt(1, "G", 28680, 28681, "K", "MN908947.3");
//! assert_eq!(snp.label, "G28681K");
//! assert_eq!(snp.kind, VariantKind::Nt);
//! assert_eq!(snp.parent_ids.to_string(), "1");
//! ```

mod group;
mod label;
mod record;
mod restore;

pub use group::{
    assign_ids, group_records, merge_deletion_blocks, DeletedCodon, DeletionBlock, IdCounter,
    PendingRecord,
};
pub use label::{deletion_label, variant_label};
pub use record::{ParentIds, VariantKind, VariantRecord, DELETION_ALT, GAP, START_ANCHOR};
pub use restore::restore_sequence;
