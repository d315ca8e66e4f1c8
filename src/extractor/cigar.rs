// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! CIGAR tokenizing and variant extraction from CIGAR alignments.
//!
//! Only the operators produced by pairwise aligners are understood:
//! `=`/`M` (match), `X` (mismatch), `I` (insertion) and `D` (deletion).
//! Clipping and skipping operators are rejected.

use std::fmt;

use crate::error::SonarError;
use crate::variant::{IdCounter, VariantRecord, START_ANCHOR};

/// CIGAR operation understood by the extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CigarOp {
    /// `=` or `M`: bases advance on both sequences.
    Match,
    /// `X`: one substitution per base.
    Mismatch,
    /// `I`: bases present only in the query.
    Insertion,
    /// `D`: bases present only in the reference.
    Deletion,
}

impl CigarOp {
    /// Convert from the CIGAR byte.
    #[inline]
    pub const fn from_byte(b: u8) -> Option<Self> {
        match b {
            b'=' | b'M' => Some(Self::Match),
            b'X' => Some(Self::Mismatch),
            b'I' => Some(Self::Insertion),
            b'D' => Some(Self::Deletion),
            _ => None,
        }
    }

    #[inline]
    pub const fn consumes_ref(self) -> bool {
        matches!(self, Self::Match | Self::Mismatch | Self::Deletion)
    }

    #[inline]
    pub const fn consumes_query(self) -> bool {
        matches!(self, Self::Match | Self::Mismatch | Self::Insertion)
    }

    fn as_char(self) -> char {
        match self {
            Self::Match => '=',
            Self::Mismatch => 'X',
            Self::Insertion => 'I',
            Self::Deletion => 'D',
        }
    }
}

impl fmt::Display for CigarOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A run of one operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CigarRun {
    pub op: CigarOp,
    pub len: usize,
    /// Byte offset of the run's operator in the CIGAR string.
    pub offset: usize,
}

/// Tokenize a CIGAR string such as `"120=1X3D40="`.
///
/// Adjacent runs of the same operator are coalesced and zero-length runs are
/// dropped.
///
/// # Errors
///
/// [`SonarError::Cigar`] for an unknown operator, a run length without an
/// operator, or an operator without a run length.
pub fn parse_cigar(cigar: &str) -> Result<Vec<CigarRun>, SonarError> {
    let bytes = cigar.trim().as_bytes();
    let mut runs: Vec<CigarRun> = Vec::new();
    let mut i = 0usize;

    while i < bytes.len() {
        let digits_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }

        let Some(&op_byte) = bytes.get(i) else {
            return Err(SonarError::cigar(
                '?',
                i,
                "run length is not followed by an operator",
            ));
        };
        if i == digits_start {
            return Err(SonarError::cigar(op_byte as char, i, "operator has no run length"));
        }

        let op = CigarOp::from_byte(op_byte)
            .ok_or_else(|| SonarError::cigar(op_byte as char, i, "unsupported operator"))?;
        let len: usize = std::str::from_utf8(&bytes[digits_start..i])
            .ok()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| SonarError::cigar(op_byte as char, i, "run length out of range"))?;

        match runs.last_mut() {
            Some(last) if last.op == op => {
                last.len = last
                    .len
                    .checked_add(len)
                    .ok_or_else(|| SonarError::cigar(op_byte as char, i, "run length out of range"))?;
            }
            _ if len > 0 => runs.push(CigarRun { op, len, offset: i }),
            _ => {}
        }
        i += 1;
    }

    Ok(runs)
}

/// Extract nucleotide variants from ungapped sequences and their CIGAR runs.
///
/// Deletions are always emitted as one record per run, including runs at
/// either end of the alignment, which downstream code treats as terminal gaps.
/// Insertions use the preceding reference base as anchor; an insertion before
/// the first reference base uses the `.` anchor and carries the following
/// query base.
///
/// # Errors
///
/// [`SonarError::Cigar`] if a run extends past the end of either sequence.
pub fn extract_cigar(
    ref_seq: &str,
    qry_seq: &str,
    runs: &[CigarRun],
    element: &str,
    ids: &mut IdCounter,
) -> Result<Vec<VariantRecord>, SonarError> {
    let reference = ref_seq.as_bytes();
    let query = qry_seq.as_bytes();
    let mut records = Vec::new();
    let mut refpos = 0usize;
    let mut qrypos = 0usize;
    let mut prev_op: Option<CigarOp> = None;

    for (idx, run) in runs.iter().enumerate() {
        check_bounds(run, refpos, reference.len(), qrypos, query.len())?;

        match run.op {
            CigarOp::Match => {
                refpos += run.len;
                qrypos += run.len;
            }
            CigarOp::Mismatch => {
                for _ in 0..run.len {
                    records.push(VariantRecord::nt(
                        ids.next_id(),
                        (reference[refpos] as char).to_string(),
                        refpos as u64,
                        refpos as u64 + 1,
                        (query[qrypos] as char).to_string(),
                        element,
                    ));
                    refpos += 1;
                    qrypos += 1;
                }
            }
            CigarOp::Deletion => {
                let terminal = (refpos == 0 && qrypos == 0) || qrypos == query.len();
                if terminal {
                    log::debug!(
                        "terminal gap of {} bases at {}:{}",
                        run.len,
                        element,
                        refpos + 1
                    );
                }
                records.push(VariantRecord::nt_deletion(
                    ids.next_id(),
                    bases(&reference[refpos..refpos + run.len]),
                    refpos as u64,
                    element,
                ));
                refpos += run.len;
            }
            CigarOp::Insertion => {
                let inserted = bases(&query[qrypos..qrypos + run.len]);
                let record = if refpos == 0 {
                    let next_aligned = runs
                        .get(idx + 1)
                        .is_some_and(|next| next.op.consumes_ref() && next.op.consumes_query());
                    match query.get(qrypos + run.len) {
                        Some(&next) if next_aligned => VariantRecord::nt(
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
                    let ref_anchor = reference[refpos - 1];
                    // After a deletion the anchor base is absent from the query.
                    let qry_anchor = match prev_op {
                        Some(op) if op.consumes_query() && qrypos > 0 => query[qrypos - 1],
                        _ => ref_anchor,
                    };
                    VariantRecord::nt(
                        ids.next_id(),
                        (ref_anchor as char).to_string(),
                        refpos as u64 - 1,
                        refpos as u64,
                        format!("{}{inserted}", qry_anchor as char),
                        element,
                    )
                };
                records.push(record);
                qrypos += run.len;
            }
        }

        prev_op = Some(run.op);
    }

    Ok(records)
}

fn check_bounds(
    run: &CigarRun,
    refpos: usize,
    ref_len: usize,
    qrypos: usize,
    qry_len: usize,
) -> Result<(), SonarError> {
    let overruns = |pos: usize, len: usize| pos.checked_add(run.len).map_or(true, |end| end > len);
    if run.op.consumes_ref() && overruns(refpos, ref_len) {
        return Err(SonarError::cigar(
            run.op.as_char(),
            run.offset,
            format!("run of {} overruns reference of length {}", run.len, ref_len),
        ));
    }
    if run.op.consumes_query() && overruns(qrypos, qry_len) {
        return Err(SonarError::cigar(
            run.op.as_char(),
            run.offset,
            format!("run of {} overruns query of length {}", run.len, qry_len),
        ));
    }
    Ok(())
}

fn bases(slice: &[u8]) -> String {
    slice.iter().map(|&b| b as char).collect()
}
