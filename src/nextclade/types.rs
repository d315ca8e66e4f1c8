// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! Serde model of the Nextclade result fields consumed by the adapter.
//!
//! Only the fields needed to rebuild variants are modelled; everything else
//! in a result object is ignored. Missing arrays default to empty.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Half-open `[begin, end)` range, 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub begin: u64,
    pub end: u64,
}

impl Range {
    pub fn len(&self) -> u64 {
        self.end.saturating_sub(self.begin)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NucSubstitution {
    pub pos: u64,
    pub ref_nuc: String,
    pub qry_nuc: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NucDeletion {
    pub range: Range,
}

/// Bases inserted after reference position `pos`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NucInsertion {
    pub pos: u64,
    pub ins: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameShift {
    /// Absolute nucleotide ranges of the shifted region.
    #[serde(default)]
    pub nuc_abs: Vec<Range>,
}

impl FrameShift {
    /// Start of the first shifted nucleotide range.
    pub fn begin(&self) -> Option<u64> {
        self.nuc_abs.first().map(|r| r.begin)
    }
}

/// Amino acid consequence of one nucleotide change (`pos` is 0-based).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AaMutation {
    pub cds_name: String,
    pub pos: u64,
    pub ref_aa: String,
    pub qry_aa: String,
}

/// One entry of an `aaChangesGroups` group (`pos` is 1-based).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AaChange {
    pub pos: u64,
    pub nuc_pos: u64,
    pub ref_aa: String,
    pub qry_aa: String,
    #[serde(default)]
    pub nuc_ranges: Vec<Range>,
}

impl AaChange {
    /// Codon index, 0-based.
    pub fn aa_pos(&self) -> u64 {
        self.pos.saturating_sub(1)
    }

    /// Length of the first nucleotide range of the change.
    pub fn nuc_span(&self) -> u64 {
        self.nuc_ranges.first().map_or(0, Range::len)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AaChangesGroup {
    pub name: String,
    #[serde(default)]
    pub changes: Vec<AaChange>,
}

/// Residues inserted after codon `pos` (0-based).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AaInsertion {
    pub cds: String,
    pub pos: u64,
    pub ins: String,
}

/// One sample's Nextclade analysis result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextcladeResult {
    #[serde(default, alias = "seqId")]
    pub seq_name: Option<String>,
    #[serde(default)]
    pub substitutions: Vec<NucSubstitution>,
    #[serde(default)]
    pub deletions: Vec<NucDeletion>,
    #[serde(default)]
    pub insertions: Vec<NucInsertion>,
    #[serde(default)]
    pub frame_shifts: Vec<FrameShift>,
    /// Amino acid consequences keyed by nucleotide position.
    #[serde(default)]
    pub nuc_to_aa_muts: BTreeMap<u64, Vec<AaMutation>>,
    #[serde(default)]
    pub aa_changes_groups: Vec<AaChangesGroup>,
    #[serde(default)]
    pub aa_insertions: Vec<AaInsertion>,
}

impl NextcladeResult {
    /// Sample name, or `unknown` when the result carries none.
    pub fn name(&self) -> &str {
        self.seq_name.as_deref().unwrap_or("unknown")
    }

    /// True if a frameshift starts at nucleotide `pos`.
    pub fn frameshift_begins_at(&self, pos: u64) -> bool {
        self.frame_shifts.iter().any(|fs| fs.begin() == Some(pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_result() {
        let result: NextcladeResult = serde_json::from_str(r#"{"seqName": "s1"}"#).unwrap();
        assert_eq!(result.name(), "s1");
        assert!(result.substitutions.is_empty());
        assert!(result.nuc_to_aa_muts.is_empty());
    }

    #[test]
    fn test_seq_id_alias_and_unknown_fields() {
        let result: NextcladeResult =
            serde_json::from_str(r#"{"seqId": "s2", "clade": "21K", "qc": {"overallScore": 3}}"#)
                .unwrap();
        assert_eq!(result.name(), "s2");
    }

    #[test]
    fn test_nuc_to_aa_keys_are_positions() {
        let json = r#"{
            "nucToAaMuts": {
                "21764": [{"cdsName": "S", "pos": 68, "refAa": "H", "qryAa": "-"}],
                "3036": [{"cdsName": "ORF1a", "pos": 924, "refAa": "F", "qryAa": "F"}]
            },
            "frameShifts": [{"nucAbs": [{"begin": 100, "end": 130}]}]
        }"#;
        let result: NextcladeResult = serde_json::from_str(json).unwrap();
        let keys: Vec<u64> = result.nuc_to_aa_muts.keys().copied().collect();
        assert_eq!(keys, vec![3036, 21764]);
        assert!(result.frameshift_begins_at(100));
        assert!(!result.frameshift_begins_at(101));
        assert_eq!(result.name(), "unknown");
    }

    #[test]
    fn test_aa_change_positions() {
        let change = AaChange {
            pos: 69,
            nuc_pos: 21764,
            ref_aa: "H".to_string(),
            qry_aa: "-".to_string(),
            nuc_ranges: vec![Range {
                begin: 21764,
                end: 21767,
            }],
        };
        assert_eq!(change.aa_pos(), 68);
        assert_eq!(change.nuc_span(), 3);
    }
}
