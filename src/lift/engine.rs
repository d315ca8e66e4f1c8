// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! Projection of nucleotide variants onto codons.

use std::collections::{BTreeMap, HashMap};

use super::table::{CodonTable, GeneCodons};
use super::translate::{translate_altered, DELETED_AA};
use crate::variant::{
    assign_ids, group_records, merge_deletion_blocks, DeletedCodon, IdCounter, ParentIds,
    PendingRecord, VariantKind, VariantRecord, GAP, START_ANCHOR,
};

/// A codon with at least one base overwritten by a nucleotide variant.
#[derive(Debug, Clone)]
struct AlteredCodon {
    bases: [String; 3],
    parents: ParentIds,
}

impl AlteredCodon {
    fn from_reference(gene: &GeneCodons, row: usize) -> Self {
        Self {
            bases: gene
                .ref_base(row)
                .map(|b| b.map(|b| (b as char).to_string()).unwrap_or_default()),
            parents: ParentIds::new(),
        }
    }

    fn sequence(&self) -> String {
        self.bases.concat()
    }
}

/// Parents and frameshift flag carried by a deleted codon until it is merged.
type DeletionPayload = (ParentIds, bool);

/// Lifts nucleotide variants of one sample to amino acid variants.
#[derive(Debug, Clone, Copy)]
pub struct CodonLiftEngine<'a> {
    table: &'a CodonTable,
}

impl<'a> CodonLiftEngine<'a> {
    pub fn new(table: &'a CodonTable) -> Self {
        Self { table }
    }

    /// Lift `nt` and number the results after its highest id.
    pub fn lift(&self, nt: &[VariantRecord]) -> Vec<VariantRecord> {
        let mut ids = IdCounter::after(nt);
        self.lift_with(nt, &mut ids)
    }

    /// Lift `nt`, drawing ids from `ids`.
    ///
    /// Substitutions and insertions come first in gene order, then merged
    /// deletion blocks. Records describing the same change are grouped before
    /// ids are handed out.
    pub fn lift_with(&self, nt: &[VariantRecord], ids: &mut IdCounter) -> Vec<VariantRecord> {
        let frameshifts: HashMap<u64, bool> = nt.iter().map(|r| (r.id, r.frameshift)).collect();
        let inherits_frameshift =
            |parents: &ParentIds| parents.iter().any(|id| frameshifts.get(&id).copied().unwrap_or(false));

        let mut changes: Vec<PendingRecord> = Vec::new();
        let mut deleted: Vec<DeletedCodon<DeletionPayload>> = Vec::new();

        for gene in self.table.genes() {
            for (row, codon) in self.alter_gene(gene, nt) {
                let ref_codon: String = gene
                    .ref_base(row)
                    .iter()
                    .flatten()
                    .map(|&b| b as char)
                    .collect();
                let altered = codon.sequence();
                if altered == ref_codon {
                    continue;
                }

                let ref_aa = (gene.aa(row) as char).to_string();
                let alt_aa = translate_altered(&altered);
                if alt_aa.is_empty() || alt_aa == ref_aa {
                    continue;
                }
                let frameshift = inherits_frameshift(&codon.parents);
                if alt_aa == DELETED_AA {
                    deleted.push(DeletedCodon {
                        gene: gene.elemid.clone(),
                        element: gene.accession.clone(),
                        aa_pos: gene.aa_pos(row),
                        ref_aa,
                        payload: (codon.parents, frameshift),
                    });
                } else {
                    let mut pending = PendingRecord::cds_change(
                        ref_aa,
                        gene.aa_pos(row),
                        alt_aa,
                        gene.accession.clone(),
                        codon.parents,
                    );
                    pending.frameshift = frameshift;
                    changes.push(pending);
                }
            }
        }

        for block in merge_deletion_blocks(deleted) {
            let mut parents = ParentIds::new();
            let mut frameshift = false;
            for (p, fs) in &block.payloads {
                parents.extend(p);
                frameshift |= fs;
            }
            changes.push(block.into_pending(parents, frameshift));
        }

        assign_ids(group_records(changes), ids)
    }

    /// Overwrite the bases of every codon touched by a nucleotide variant.
    ///
    /// Deletions are applied first. An insertion anchored on a deleted base
    /// contributes only its inserted bases, so the anchor stays deleted.
    fn alter_gene(&self, gene: &GeneCodons, nt: &[VariantRecord]) -> BTreeMap<usize, AlteredCodon> {
        let mut altered: BTreeMap<usize, AlteredCodon> = BTreeMap::new();
        let lifted = nt
            .iter()
            .filter(|v| v.kind == VariantKind::Nt && v.ref_seq != START_ANCHOR);
        let (deletions, others): (Vec<&VariantRecord>, Vec<&VariantRecord>) =
            lifted.partition(|v| v.is_deletion());

        let deleted_anchor = |var: &VariantRecord| {
            deletions
                .iter()
                .any(|d| d.start <= var.start && var.start < d.end)
        };

        for var in deletions.iter().chain(others.iter()) {
            let value = if var.is_deletion() {
                (GAP as char).to_string()
            } else if var.is_insertion() && deleted_anchor(var) {
                var.alt.get(var.ref_seq.len()..).unwrap_or_default().to_string()
            } else {
                var.alt.clone()
            };

            for (row, slot) in gene.bases_in(var.start, var.end) {
                let codon = altered
                    .entry(row)
                    .or_insert_with(|| AlteredCodon::from_reference(gene, row));
                codon.bases[slot].clone_from(&value);
                codon.parents.insert(var.id);
            }
        }

        altered
    }
}

/// Flag nucleotide indels that shift the reading frame of a coding sequence.
///
/// An indel qualifies when its length change is not a multiple of three and
/// its window overlaps at least one codon base of `table`.
pub fn mark_frameshifts(nt: &mut [VariantRecord], table: &CodonTable) {
    for var in nt.iter_mut().filter(|v| v.kind == VariantKind::Nt) {
        if !var.is_frameshifting_indel() {
            continue;
        }
        let end = var.end.max(var.start + 1);
        if table.overlaps(var.start, end) {
            var.frameshift = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ATG AAA GCC TAA  -> M K A *
    const REFERENCE: &str = "ATGAAAGCCTAA";

    fn table() -> CodonTable {
        let coords: Vec<u64> = (0..12).collect();
        let mut table = CodonTable::new();
        table.add_gene(GeneCodons::from_cds("1", "ORF1", "P1.1", &coords, "MKA", REFERENCE).unwrap());
        table
    }

    fn lift(nt: &[VariantRecord]) -> Vec<VariantRecord> {
        let table = table();
        CodonLiftEngine::new(&table).lift(nt)
    }

    #[test]
    fn test_first_codon_substitution() {
        let nt = vec![VariantRecord::nt(1, "G", 2, 3, "T", "ref")];
        let aa = lift(&nt);
        assert_eq!(aa.len(), 1);
        assert_eq!(aa[0].id, 2);
        assert_eq!(aa[0].label, "M1I");
        assert_eq!(aa[0].element, "P1.1");
        assert_eq!(aa[0].kind, VariantKind::Cds);
        assert_eq!(aa[0].parent_ids.to_string(), "1");
    }

    #[test]
    fn test_silent_change_emits_nothing() {
        let nt = vec![VariantRecord::nt(1, "A", 5, 6, "G", "ref")];
        assert!(lift(&nt).is_empty());
    }

    #[test]
    fn test_two_variants_in_one_codon() {
        let nt = vec![
            VariantRecord::nt(1, "A", 3, 4, "G", "ref"),
            VariantRecord::nt(2, "A", 5, 6, "C", "ref"),
        ];
        let aa = lift(&nt);
        assert_eq!(aa.len(), 1);
        assert_eq!(aa[0].label, "K2D");
        assert_eq!(aa[0].parent_ids.to_string(), "1,2");
    }

    #[test]
    fn test_codon_deletion() {
        let nt = vec![VariantRecord::nt_deletion(1, "AAA", 3, "ref")];
        let aa = lift(&nt);
        assert_eq!(aa.len(), 1);
        assert_eq!(aa[0].label, "del:2");
        assert_eq!(aa[0].alt, " ");
        assert_eq!((aa[0].start, aa[0].end), (1, 2));
    }

    #[test]
    fn test_adjacent_codon_deletions_merge() {
        let nt = vec![VariantRecord::nt_deletion(1, "AAAGCC", 3, "ref")];
        let aa = lift(&nt);
        assert_eq!(aa.len(), 1);
        assert_eq!(aa[0].ref_seq, "KA");
        assert_eq!(aa[0].label, "del:2-3");
        assert_eq!(aa[0].parent_ids.to_string(), "1");
    }

    #[test]
    fn test_in_frame_insertion() {
        let nt = vec![VariantRecord::nt(1, "A", 3, 4, "AGGG", "ref")];
        let aa = lift(&nt);
        assert_eq!(aa.len(), 1);
        assert_eq!(aa[0].alt, "RE");
        assert_eq!(aa[0].label, "K2RE");
    }

    #[test]
    fn test_stop_gained() {
        let nt = vec![VariantRecord::nt(1, "A", 3, 4, "T", "ref")];
        let aa = lift(&nt);
        assert_eq!(aa[0].label, "K2*");
    }

    #[test]
    fn test_leading_insertion_is_not_lifted() {
        let nt = vec![VariantRecord::nt(1, ".", 0, 1, "CCA", "ref")];
        assert!(lift(&nt).is_empty());
    }

    #[test]
    fn test_ids_continue_after_nt() {
        let nt = vec![
            VariantRecord::nt(1, "G", 2, 3, "T", "ref"),
            VariantRecord::nt(2, "A", 20, 21, "T", "ref"),
            VariantRecord::nt(3, "C", 8, 9, "T", "ref"),
        ];
        let aa = lift(&nt);
        let ids: Vec<u64> = aa.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![4]);
        assert_eq!(aa[0].label, "M1I");
    }

    #[test]
    fn test_frameshift_marking_and_inheritance() {
        let table = table();
        let mut nt = vec![
            VariantRecord::nt_deletion(1, "A", 4, "ref"),
            VariantRecord::nt_deletion(2, "AAA", 3, "ref"),
            VariantRecord::nt_deletion(3, "T", 20, "ref"),
        ];
        mark_frameshifts(&mut nt, &table);
        assert!(nt[0].frameshift);
        assert!(!nt[1].frameshift);
        assert!(!nt[2].frameshift);

        let aa = CodonLiftEngine::new(&table).lift(&nt);
        assert_eq!(aa.len(), 1);
        assert_eq!(aa[0].label, "del:2");
        assert!(aa[0].frameshift);
        assert_eq!(aa[0].parent_ids.to_string(), "1,2");
    }

    #[test]
    fn test_insertion_anchored_on_deleted_base() {
        // ACG TAA with C deleted and G inserted after it: query codon AGG
        let coords: Vec<u64> = (0..6).collect();
        let mut table = CodonTable::new();
        table.add_gene(GeneCodons::from_cds("1", "ORF1", "P1.1", &coords, "T", "ACGTAA").unwrap());
        let nt = vec![
            VariantRecord::nt_deletion(1, "C", 1, "ref"),
            VariantRecord::nt(2, "C", 1, 2, "CG", "ref"),
        ];

        let aa = CodonLiftEngine::new(&table).lift(&nt);
        assert_eq!(aa.len(), 1);
        assert_eq!(aa[0].label, "T1R");
        assert_eq!(aa[0].parent_ids.to_string(), "1,2");
    }

    #[test]
    fn test_empty_table() {
        let table = CodonTable::new();
        let nt = vec![VariantRecord::nt(1, "G", 2, 3, "T", "ref")];
        assert!(CodonLiftEngine::new(&table).lift(&nt).is_empty());
    }
}
