// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! The variant record shared by every producer.
//!
//! # Coordinate System
//!
//! | Field | Basis | Notes |
//! |-------|-------|-------|
//! | `start`, `end` (`nt`) | 0-based, half-open | Genomic coordinates of the element |
//! | `start`, `end` (`cds`) | 0-based, half-open | Codon index within the CDS |
//! | `label` position | 1-based | `<ref><end><alt>` or `del:<start+1>[-<end>]` |

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::label::variant_label;
use crate::error::SonarError;

/// `alt` value of a deletion.
pub const DELETION_ALT: &str = " ";

/// `ref` value of an insertion placed before the first reference base.
pub const START_ANCHOR: &str = ".";

/// Gap character of aligned sequences and altered codons.
pub const GAP: u8 = b'-';

/// Kind of a variant record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantKind {
    /// Nucleotide variant in genomic coordinates.
    Nt,
    /// Amino acid variant in codon-index coordinates.
    Cds,
}

impl VariantKind {
    /// Name used in var files.
    pub fn as_str(&self) -> &'static str {
        match self {
            VariantKind::Nt => "nt",
            VariantKind::Cds => "cds",
        }
    }
}

impl fmt::Display for VariantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VariantKind {
    type Err = SonarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nt" => Ok(VariantKind::Nt),
            "cds" => Ok(VariantKind::Cds),
            other => Err(SonarError::format(0, format!("unknown variant type '{other}'"))),
        }
    }
}

/// Ordered, duplicate-free set of nucleotide variant ids.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParentIds(Vec<u64>);

impl ParentIds {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set holding a single id.
    pub fn single(id: u64) -> Self {
        Self(vec![id])
    }

    /// Add an id, keeping first-seen order.
    pub fn insert(&mut self, id: u64) {
        if !self.0.contains(&id) {
            self.0.push(id);
        }
    }

    /// Add every id of `other`.
    pub fn extend(&mut self, other: &ParentIds) {
        for &id in &other.0 {
            self.insert(id);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.0.iter().copied()
    }

    pub fn contains(&self, id: u64) -> bool {
        self.0.contains(&id)
    }
}

impl FromIterator<u64> for ParentIds {
    fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
        let mut ids = ParentIds::new();
        for id in iter {
            ids.insert(id);
        }
        ids
    }
}

impl fmt::Display for ParentIds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, id) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{id}")?;
        }
        Ok(())
    }
}

impl FromStr for ParentIds {
    type Err = SonarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(ParentIds::new());
        }
        s.split(',')
            .map(|part| {
                part.trim()
                    .parse::<u64>()
                    .map_err(|_| SonarError::format(0, format!("invalid parent id '{part}'")))
            })
            .collect()
    }
}

/// A single nucleotide or amino acid variant call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantRecord {
    /// Sample-scoped id; nucleotide ids precede amino acid ids.
    pub id: u64,
    /// Reference residues, or [`START_ANCHOR`].
    #[serde(rename = "ref")]
    pub ref_seq: String,
    /// Start (0-based, inclusive).
    pub start: u64,
    /// End (0-based, exclusive).
    pub end: u64,
    /// Alternate residues, or [`DELETION_ALT`].
    pub alt: String,
    /// Reference molecule accession (`nt`) or CDS accession (`cds`).
    pub element: String,
    /// Human-readable notation derived from the fields above.
    pub label: String,
    pub kind: VariantKind,
    /// Nucleotide ids that produced this record.
    pub parent_ids: ParentIds,
    pub frameshift: bool,
}

impl VariantRecord {
    /// Create a nucleotide record; the record is its own parent.
    pub fn nt(
        id: u64,
        ref_seq: impl Into<String>,
        start: u64,
        end: u64,
        alt: impl Into<String>,
        element: impl Into<String>,
    ) -> Self {
        let ref_seq = ref_seq.into();
        let alt = alt.into();
        let label = variant_label(&ref_seq, start, end, &alt);
        Self {
            id,
            ref_seq,
            start,
            end,
            alt,
            element: element.into(),
            label,
            kind: VariantKind::Nt,
            parent_ids: ParentIds::single(id),
            frameshift: false,
        }
    }

    /// Nucleotide deletion of `ref_seq` at `[start, start + len)`.
    pub fn nt_deletion(
        id: u64,
        ref_seq: impl Into<String>,
        start: u64,
        element: impl Into<String>,
    ) -> Self {
        let ref_seq = ref_seq.into();
        let end = start + ref_seq.len() as u64;
        Self::nt(id, ref_seq, start, end, DELETION_ALT, element)
    }

    pub fn is_deletion(&self) -> bool {
        self.alt == DELETION_ALT
    }

    pub fn is_insertion(&self) -> bool {
        !self.is_deletion()
            && (self.ref_seq == START_ANCHOR || self.alt.chars().count() > self.ref_seq.chars().count())
    }

    pub fn is_substitution(&self) -> bool {
        !self.is_deletion() && !self.is_insertion()
    }

    /// Net change in sequence length caused by this record.
    pub fn length_delta(&self) -> i64 {
        if self.is_deletion() {
            -((self.end - self.start) as i64)
        } else if self.ref_seq == START_ANCHOR {
            // alt carries the first aligned base unless the window is empty
            self.alt.len() as i64 - (self.end - self.start) as i64
        } else {
            self.alt.len() as i64 - self.ref_seq.len() as i64
        }
    }

    /// True for indels whose length change is not a multiple of three.
    pub fn is_frameshifting_indel(&self) -> bool {
        let delta = self.length_delta();
        delta != 0 && delta % 3 != 0
    }
}
