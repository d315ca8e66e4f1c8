// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! Variant extraction from two equal-length gapped sequences.
//!
//! # Coordinate System
//!
//! | Quantity | Basis | Notes |
//! |----------|-------|-------|
//! | Alignment column | 0-based | Index into the gapped strings |
//! | `offset` | count | Reference-gap columns seen so far |
//! | Record `start`/`end` | 0-based half-open | `column - offset` |

use crate::error::SonarError;
use crate::variant::{IdCounter, VariantRecord, START_ANCHOR};

/// Extract nucleotide variants from an aligned reference/query pair.
///
/// Columns where both sequences carry `gap` are discarded before scanning.
/// Consecutive query gaps form one deletion, consecutive reference gaps form
/// one insertion, every other mismatching column is a substitution.
///
/// # Errors
///
/// [`SonarError::LengthMismatch`] if the two strings differ in length.
pub fn extract_aligned(
    ref_seq: &str,
    qry_seq: &str,
    element: &str,
    gap: u8,
    ids: &mut IdCounter,
) -> Result<Vec<VariantRecord>, SonarError> {
    if ref_seq.len() != qry_seq.len() {
        return Err(SonarError::LengthMismatch {
            ref_len: ref_seq.len(),
            qry_len: qry_seq.len(),
        });
    }

    let (reference, query): (Vec<u8>, Vec<u8>) = ref_seq
        .bytes()
        .zip(qry_seq.bytes())
        .filter(|&(r, q)| !(r == gap && q == gap))
        .unzip();

    let n = reference.len();
    let mut records = Vec::new();
    let mut offset = 0usize;
    let mut i = 0usize;

    while i < n {
        let (r, q) = (reference[i], query[i]);

        if r == q {
            i += 1;
            continue;
        }

        if q == gap {
            let first = i;
            while i + 1 < n && query[i + 1] == gap {
                i += 1;
            }
            let start = (first - offset) as u64;
            records.push(VariantRecord::nt_deletion(
                ids.next_id(),
                bases(&reference[first..=i]),
                start,
                element,
            ));
        } else if r == gap {
            let first = i;
            while i + 1 < n && reference[i + 1] == gap {
                i += 1;
            }
            let inserted = bases(&query[first..=i]);
            let ref_pos = first - offset;

            let record = if ref_pos == 0 {
                // No reference base precedes the run; the first aligned base follows it.
                match (reference.get(i + 1), query.get(i + 1)) {
                    (Some(_), Some(&next)) if next != gap => VariantRecord::nt(
                        ids.next_id(),
                        START_ANCHOR,
                        0,
                        1,
                        format!("{inserted}{}", next as char),
                        element,
                    ),
                    _ => VariantRecord::nt(ids.next_id(), START_ANCHOR, 0, 0, inserted, element),
                }
            } else {
                let anchor = first - 1;
                let ref_anchor = reference[anchor];
                let qry_anchor = if query[anchor] == gap {
                    ref_anchor
                } else {
                    query[anchor]
                };
                let start = (anchor - offset) as u64;
                VariantRecord::nt(
                    ids.next_id(),
                    (ref_anchor as char).to_string(),
                    start,
                    start + 1,
                    format!("{}{inserted}", qry_anchor as char),
                    element,
                )
            };
            records.push(record);
            offset += i + 1 - first;
        } else {
            let start = (i - offset) as u64;
            records.push(VariantRecord::nt(
                ids.next_id(),
                (r as char).to_string(),
                start,
                start + 1,
                (q as char).to_string(),
                element,
            ));
        }

        i += 1;
    }

    Ok(records)
}

fn bases(slice: &[u8]) -> String {
    slice.iter().map(|&b| b as char).collect()
}
