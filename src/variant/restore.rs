// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! Rebuild a query sequence from its reference and nucleotide records.
//!
//! Used to verify that a var file describes its sample exactly: applying every
//! nucleotide record to the reference must reproduce the ungapped query.

use super::record::{VariantKind, VariantRecord, START_ANCHOR};
use crate::error::SonarError;

/// Apply the nucleotide records in `records` to `reference`.
///
/// Amino acid records are ignored. An insertion anchored on a base that an
/// earlier record already rewrote (a substitution or deletion at the anchor)
/// contributes only its inserted bases.
///
/// # Examples
///
/// ```
/// use ferro_sonar::variant::{restore_sequence, VariantRecord};
///
/// let records = vec![
///     VariantRecord::nt(1, "C", 1, 2, "T", "ref"),
///     VariantRecord::nt(2, "G", 2, 3, "GAA", "ref"),
/// ];
/// assert_eq!(restore_sequence("ACGT", &records).unwrap(), "ATGAAT");
/// ```
pub fn restore_sequence(reference: &str, records: &[VariantRecord]) -> Result<String, SonarError> {
    let mut nt: Vec<&VariantRecord> = records
        .iter()
        .filter(|r| r.kind == VariantKind::Nt)
        .collect();
    nt.sort_by_key(|r| r.start);

    let ref_len = reference.len() as u64;
    let mut restored = String::with_capacity(reference.len());
    let mut cursor: u64 = 0;

    for rec in nt {
        if rec.start > rec.end || rec.end > ref_len {
            return Err(SonarError::InvalidCoordinates {
                msg: format!(
                    "variant {} [{}, {}) outside reference of length {}",
                    rec.label, rec.start, rec.end, ref_len
                ),
            });
        }

        if rec.start < cursor {
            let anchored_on_previous = rec.end == cursor;
            if anchored_on_previous && rec.is_insertion() && rec.ref_seq != START_ANCHOR {
                restored.push_str(&rec.alt[rec.ref_seq.len()..]);
                continue;
            }
            if anchored_on_previous && rec.is_substitution() && restored.ends_with(&rec.alt) {
                continue;
            }
            return Err(SonarError::InvalidCoordinates {
                msg: format!("variant {} overlaps a previous variant", rec.label),
            });
        }

        restored.push_str(&reference[cursor as usize..rec.start as usize]);
        if !rec.is_deletion() {
            restored.push_str(&rec.alt);
        }
        cursor = rec.end;
    }

    restored.push_str(&reference[cursor as usize..]);
    Ok(restored)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_variants() {
        assert_eq!(restore_sequence("ACGT", &[]).unwrap(), "ACGT");
    }

    #[test]
    fn test_deletion() {
        let records = vec![VariantRecord::nt_deletion(1, "CG", 1, "ref")];
        assert_eq!(restore_sequence("ACGT", &records).unwrap(), "AT");
    }

    #[test]
    fn test_leading_insertion() {
        let records = vec![VariantRecord::nt(1, ".", 0, 1, "TTA", "ref")];
        assert_eq!(restore_sequence("ACGT", &records).unwrap(), "TTACGT");
    }

    #[test]
    fn test_insertion_anchored_on_substitution() {
        let records = vec![
            VariantRecord::nt(1, "C", 1, 2, "T", "ref"),
            VariantRecord::nt(2, "C", 1, 2, "TGG", "ref"),
        ];
        assert_eq!(restore_sequence("ACGT", &records).unwrap(), "ATGGGT");
    }

    #[test]
    fn test_insertion_anchored_on_deletion() {
        let records = vec![
            VariantRecord::nt_deletion(1, "C", 1, "ref"),
            VariantRecord::nt(2, "C", 1, 2, "CAA", "ref"),
        ];
        assert_eq!(restore_sequence("ACGT", &records).unwrap(), "AAAGT");
    }

    #[test]
    fn test_out_of_bounds() {
        let records = vec![VariantRecord::nt(1, "A", 10, 11, "T", "ref")];
        assert!(matches!(
            restore_sequence("ACGT", &records),
            Err(SonarError::InvalidCoordinates { .. })
        ));
    }

    #[test]
    fn test_ignores_cds_records() {
        let mut aa = VariantRecord::nt(2, "M", 0, 1, "K", "gene");
        aa.kind = VariantKind::Cds;
        let records = vec![VariantRecord::nt(1, "A", 0, 1, "T", "ref"), aa];
        assert_eq!(restore_sequence("ACGT", &records).unwrap(), "TCGT");
    }
}
