// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! Variant label generation.
//!
//! Labels depend only on `(ref, start, end, alt)`; the same rules apply to
//! nucleotide and amino acid records.

use super::record::DELETION_ALT;

/// Build the label of a variant.
///
/// * deletion (`alt == " "`): `del:<start+1>` for a single residue, otherwise
///   `del:<start+1>-<end>`
/// * anything else: `<ref><end><alt>`
///
/// # Examples
///
/// ```
/// use ferro_sonar::variant::variant_label;
///
/// assert_eq!(variant_label("G", 28680, 28681, "K"), "G28681K");
/// assert_eq!(variant_label("CGT", 99, 102, " "), "del:100-102");
/// assert_eq!(variant_label("C", 1, 2, " "), "del:2");
/// assert_eq!(variant_label(".", 0, 1, "TA"), ".1TA");
/// ```
pub fn variant_label(ref_seq: &str, start: u64, end: u64, alt: &str) -> String {
    if alt == DELETION_ALT {
        deletion_label(start, end)
    } else {
        format!("{ref_seq}{end}{alt}")
    }
}

/// Label of a deletion spanning `[start, end)`.
pub fn deletion_label(start: u64, end: u64) -> String {
    if end.saturating_sub(start) == 1 {
        format!("del:{}", start + 1)
    } else {
        format!("del:{}-{}", start + 1, end)
    }
}
