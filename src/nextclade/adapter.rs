// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! Conversion of Nextclade results into variant records.
//!
//! Nucleotide records come straight from the substitution, deletion and
//! insertion lists. Amino acid records come from `nucToAaMuts`, with
//! insertion residues taken from `aaInsertions` and query residues from
//! `aaChangesGroups`. Every amino acid record must resolve to a nucleotide
//! parent; records that cannot are logged and dropped.

use std::collections::{HashMap, HashSet};

use super::types::{AaChange, NextcladeResult};
use crate::error::SonarError;
use crate::pipeline::SampleVariants;
use crate::variant::{
    assign_ids, group_records, merge_deletion_blocks, DeletedCodon, IdCounter, ParentIds,
    PendingRecord, VariantRecord,
};

/// Offsets tried around each deleted codon's nucleotide position.
const DELETION_PARENT_OFFSETS: [i64; 7] = [0, 1, 2, 3, -1, -2, -3];

const STOP: &str = "*";

/// Converts Nextclade results against one reference molecule.
#[derive(Debug, Clone)]
pub struct NextcladeAdapter {
    element: String,
    reference: String,
    cds_map: HashMap<String, String>,
}

impl NextcladeAdapter {
    pub fn new(element: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            element: element.into(),
            reference: reference.into(),
            cds_map: HashMap::new(),
        }
    }

    /// Map Nextclade CDS names to the accessions written to records.
    ///
    /// Names missing from the map are written unchanged.
    pub fn with_cds_map(mut self, cds_map: HashMap<String, String>) -> Self {
        self.cds_map = cds_map;
        self
    }

    /// Convert one result into its nucleotide and amino acid records.
    pub fn convert(&self, result: &NextcladeResult) -> Result<SampleVariants, SonarError> {
        let nt = self.nt_records(result)?;
        let aa = self.aa_records(result, &nt);
        Ok(SampleVariants::new(result.name(), nt, aa))
    }

    /// Nucleotide records ordered by start, ids from 1.
    ///
    /// # Errors
    ///
    /// [`SonarError::InvalidCoordinates`] if a deletion or insertion lies
    /// outside the reference.
    pub fn nt_records(&self, result: &NextcladeResult) -> Result<Vec<VariantRecord>, SonarError> {
        let mut records: Vec<VariantRecord> = Vec::with_capacity(
            result.substitutions.len() + result.deletions.len() + result.insertions.len(),
        );

        for sub in &result.substitutions {
            records.push(VariantRecord::nt(
                0,
                sub.ref_nuc.as_str(),
                sub.pos,
                sub.pos + 1,
                sub.qry_nuc.as_str(),
                self.element.as_str(),
            ));
        }

        for del in &result.deletions {
            let ref_seq = self.reference_slice(del.range.begin, del.range.end)?;
            let mut rec = VariantRecord::nt_deletion(0, ref_seq, del.range.begin, self.element.as_str());
            rec.frameshift = result.frameshift_begins_at(del.range.end);
            records.push(rec);
        }

        for ins in &result.insertions {
            let anchor = self.reference_slice(ins.pos, ins.pos + 1)?;
            let mut rec = VariantRecord::nt(
                0,
                anchor,
                ins.pos,
                ins.pos + 1,
                format!("{anchor}{}", ins.ins),
                self.element.as_str(),
            );
            rec.frameshift = result.frameshift_begins_at(ins.pos + 1);
            records.push(rec);
        }

        records.sort_by_key(|r| r.start);

        let mut ids = IdCounter::default();
        for rec in &mut records {
            let id = ids.next_id();
            rec.id = id;
            rec.parent_ids = ParentIds::single(id);
        }
        Ok(records)
    }

    /// Amino acid records linked to `nt`, ids continuing after it.
    pub fn aa_records(&self, result: &NextcladeResult, nt: &[VariantRecord]) -> Vec<VariantRecord> {
        let ctx = ParentLookup::new(result, nt);
        let mut pending = self.aa_deletions(result, &ctx);
        pending.extend(self.aa_changes(result, &ctx));

        let mut grouped = group_records(pending);
        for rec in &mut grouped {
            if let Some(accession) = self.cds_map.get(&rec.element) {
                rec.element.clone_from(accession);
            }
        }

        let mut ids = IdCounter::after(nt);
        assign_ids(grouped, &mut ids)
    }

    fn aa_deletions(&self, result: &NextcladeResult, ctx: &ParentLookup) -> Vec<PendingRecord> {
        let mut seen: HashSet<(&str, u64)> = HashSet::new();
        let mut codons: Vec<DeletedCodon<u64>> = Vec::new();

        for (&nt_pos, muts) in &result.nuc_to_aa_muts {
            for m in muts.iter().filter(|m| m.qry_aa == "-") {
                if seen.insert((m.cds_name.as_str(), m.pos)) {
                    codons.push(DeletedCodon {
                        gene: m.cds_name.clone(),
                        element: m.cds_name.clone(),
                        aa_pos: m.pos,
                        ref_aa: m.ref_aa.clone(),
                        payload: nt_pos,
                    });
                }
            }
        }

        let mut pending = Vec::new();
        for block in merge_deletion_blocks(codons) {
            let parent = block
                .payloads
                .iter()
                .find_map(|&nt_pos| ctx.near(nt_pos))
                .or_else(|| ctx.frameshift_deletion(result));

            match parent {
                Some(id) => {
                    let frameshift = ctx.is_frameshift(id);
                    pending.push(block.into_pending(ParentIds::single(id), frameshift));
                }
                None => log::warn!(
                    "{}: dropping deletion {}:{}-{} without nucleotide parent",
                    result.name(),
                    block.element,
                    block.start + 1,
                    block.end()
                ),
            }
        }
        pending
    }

    fn aa_changes(&self, result: &NextcladeResult, ctx: &ParentLookup) -> Vec<PendingRecord> {
        let mut insertions: Vec<(String, u64, String)> = result
            .aa_insertions
            .iter()
            .map(|i| (i.cds.clone(), i.pos, i.ins.clone()))
            .collect();
        let mut take_insertion = |cds: &str, pos: u64| -> Option<(u64, String)> {
            let candidates = [Some(pos), pos.checked_sub(1), Some(pos + 1)];
            for key in candidates.into_iter().flatten() {
                if let Some(i) = insertions.iter().position(|(c, p, _)| c == cds && *p == key) {
                    let (_, p, ins) = insertions.remove(i);
                    return Some((p, ins));
                }
            }
            None
        };

        let mut pending = Vec::new();

        for (&nt_pos, muts) in &result.nuc_to_aa_muts {
            for m in muts.iter().filter(|m| m.qry_aa != "-") {
                let Some(parent) = ctx.at(nt_pos) else {
                    log::warn!(
                        "{}: dropping {}{}{} in {} without nucleotide parent",
                        result.name(),
                        m.ref_aa,
                        m.pos + 1,
                        m.qry_aa,
                        m.cds_name
                    );
                    continue;
                };

                let alt = match take_insertion(&m.cds_name, m.pos) {
                    Some((ins_pos, inserted)) => {
                        let qry = ctx
                            .change(&m.cds_name, ins_pos)
                            .map_or(m.qry_aa.as_str(), |c| c.qry_aa.as_str());
                        splice_insertion(qry, &inserted)
                    }
                    None => m.qry_aa.clone(),
                };

                let mut rec = PendingRecord::cds_change(
                    m.ref_aa.as_str(),
                    m.pos,
                    alt,
                    m.cds_name.as_str(),
                    ParentIds::single(parent),
                );
                rec.frameshift = ctx.is_frameshift(parent);
                pending.push(rec);
            }
        }

        // Insertions never mentioned in nucToAaMuts are placed through aaChangesGroups.
        for (cds, pos, inserted) in insertions {
            let candidates = [Some(pos), pos.checked_sub(1), Some(pos + 1)];
            let placed = candidates.into_iter().flatten().find_map(|key| {
                let change = ctx.change(&cds, key)?;
                let last_nuc = (change.nuc_pos + change.nuc_span()).checked_sub(1)?;
                ctx.at(last_nuc).map(|parent| (change, parent))
            });

            match placed {
                Some((change, parent)) => {
                    let mut rec = PendingRecord::cds_change(
                        change.ref_aa.as_str(),
                        change.aa_pos(),
                        splice_insertion(&change.qry_aa, &inserted),
                        cds.as_str(),
                        ParentIds::single(parent),
                    );
                    rec.frameshift = ctx.is_frameshift(parent);
                    pending.push(rec);
                }
                None => log::warn!(
                    "{}: dropping insertion {}:{} ({}) without nucleotide parent",
                    result.name(),
                    cds,
                    pos + 1,
                    inserted
                ),
            }
        }

        pending
    }

    fn reference_slice(&self, begin: u64, end: u64) -> Result<&str, SonarError> {
        self.reference
            .get(begin as usize..end as usize)
            .filter(|_| begin < end)
            .ok_or_else(|| SonarError::InvalidCoordinates {
                msg: format!(
                    "[{}, {}) outside reference {} of length {}",
                    begin,
                    end,
                    self.element,
                    self.reference.len()
                ),
            })
    }
}

/// Inserted residues follow the query residue, or replace a stop.
fn splice_insertion(qry_aa: &str, inserted: &str) -> String {
    if qry_aa == STOP {
        inserted.to_string()
    } else {
        format!("{qry_aa}{inserted}")
    }
}

/// Lookups from Nextclade positions to nucleotide record ids.
struct ParentLookup<'r> {
    by_pos: HashMap<u64, u64>,
    frameshift: HashSet<u64>,
    changes: HashMap<(&'r str, u64), &'r AaChange>,
}

impl<'r> ParentLookup<'r> {
    fn new(result: &'r NextcladeResult, nt: &[VariantRecord]) -> Self {
        let changes = result
            .aa_changes_groups
            .iter()
            .flat_map(|g| g.changes.iter().map(move |c| ((g.name.as_str(), c.aa_pos()), c)))
            .collect();
        Self {
            by_pos: nt.iter().map(|r| (r.start, r.id)).collect(),
            frameshift: nt.iter().filter(|r| r.frameshift).map(|r| r.id).collect(),
            changes,
        }
    }

    fn at(&self, pos: u64) -> Option<u64> {
        self.by_pos.get(&pos).copied()
    }

    fn near(&self, pos: u64) -> Option<u64> {
        DELETION_PARENT_OFFSETS.iter().find_map(|&offset| {
            let shifted = pos.checked_add_signed(offset)?;
            self.at(shifted)
        })
    }

    /// Parent of a deletion whose end starts a frameshift. The last such
    /// frameshift wins; within one frameshift the first deletion wins.
    fn frameshift_deletion(&self, result: &NextcladeResult) -> Option<u64> {
        result
            .frame_shifts
            .iter()
            .rev()
            .filter_map(|fs| fs.begin())
            .find_map(|begin| {
                result
                    .deletions
                    .iter()
                    .find(|d| d.range.end == begin)
                    .and_then(|d| self.at(d.range.begin))
            })
    }

    fn change(&self, cds: &str, aa_pos: u64) -> Option<&'r AaChange> {
        self.changes.get(&(cds, aa_pos)).copied()
    }

    fn is_frameshift(&self, id: u64) -> bool {
        self.frameshift.contains(&id)
    }
}
