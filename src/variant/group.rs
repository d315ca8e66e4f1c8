// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! Id assignment, deletion block merging and duplicate grouping.
//!
//! These passes are shared by the codon lift engine and the Nextclade adapter
//! so both producers emit identical amino acid records.

use std::collections::HashMap;

use super::label::variant_label;
use super::record::{ParentIds, VariantKind, VariantRecord, DELETION_ALT};

/// Monotonic id source for one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdCounter {
    next: u64,
}

impl IdCounter {
    /// Counter whose first id is `first`.
    pub fn starting_at(first: u64) -> Self {
        Self { next: first }
    }

    /// Counter continuing after the highest id in `records` (or at 1).
    pub fn after(records: &[VariantRecord]) -> Self {
        let next = records.iter().map(|r| r.id).max().map_or(1, |max| max + 1);
        Self { next }
    }

    /// Hand out the next id.
    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// The id the next call to [`next_id`](Self::next_id) returns.
    pub fn peek(&self) -> u64 {
        self.next
    }
}

impl Default for IdCounter {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

/// An amino acid call that has not been given an id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRecord {
    pub ref_seq: String,
    pub start: u64,
    pub end: u64,
    pub alt: String,
    pub element: String,
    pub kind: VariantKind,
    pub parent_ids: ParentIds,
    pub frameshift: bool,
}

impl PendingRecord {
    /// Single-codon amino acid change at `pos`.
    pub fn cds_change(
        ref_aa: impl Into<String>,
        pos: u64,
        alt: impl Into<String>,
        element: impl Into<String>,
        parent_ids: ParentIds,
    ) -> Self {
        Self {
            ref_seq: ref_aa.into(),
            start: pos,
            end: pos + 1,
            alt: alt.into(),
            element: element.into(),
            kind: VariantKind::Cds,
            parent_ids,
            frameshift: false,
        }
    }

    pub fn label(&self) -> String {
        variant_label(&self.ref_seq, self.start, self.end, &self.alt)
    }

    fn key(&self) -> GroupKey {
        GroupKey {
            ref_seq: self.ref_seq.clone(),
            start: self.start,
            end: self.end,
            alt: self.alt.clone(),
            element: self.element.clone(),
            label: self.label(),
            kind: self.kind,
        }
    }

    /// Attach an id and produce the final record.
    pub fn into_record(self, id: u64) -> VariantRecord {
        let label = self.label();
        VariantRecord {
            id,
            ref_seq: self.ref_seq,
            start: self.start,
            end: self.end,
            alt: self.alt,
            element: self.element,
            label,
            kind: self.kind,
            parent_ids: self.parent_ids,
            frameshift: self.frameshift,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct GroupKey {
    ref_seq: String,
    start: u64,
    end: u64,
    alt: String,
    element: String,
    label: String,
    kind: VariantKind,
}

/// Collapse records describing the same change.
///
/// Records sharing `(ref, start, end, alt, element, label, kind)` become one
/// record whose parent ids are the union of the group and whose frameshift
/// flag is the OR of the group. First-seen order is preserved.
pub fn group_records(records: Vec<PendingRecord>) -> Vec<PendingRecord> {
    let mut index: HashMap<GroupKey, usize> = HashMap::with_capacity(records.len());
    let mut grouped: Vec<PendingRecord> = Vec::with_capacity(records.len());

    for record in records {
        match index.get(&record.key()) {
            Some(&i) => {
                let existing = &mut grouped[i];
                existing.parent_ids.extend(&record.parent_ids);
                existing.frameshift |= record.frameshift;
            }
            None => {
                index.insert(record.key(), grouped.len());
                grouped.push(record);
            }
        }
    }

    grouped
}

/// Give each pending record the next id from `counter`.
pub fn assign_ids(records: Vec<PendingRecord>, counter: &mut IdCounter) -> Vec<VariantRecord> {
    records
        .into_iter()
        .map(|r| r.into_record(counter.next_id()))
        .collect()
}

/// One deleted codon, before merging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedCodon<P> {
    /// Grouping key of the gene; codons only merge within one gene.
    pub gene: String,
    /// Accession written to the merged record.
    pub element: String,
    /// Codon index (0-based).
    pub aa_pos: u64,
    /// Reference amino acid(s) of the codon.
    pub ref_aa: String,
    pub payload: P,
}

/// A run of adjacent deleted codons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionBlock<P> {
    pub element: String,
    pub start: u64,
    pub ref_aa: String,
    pub payloads: Vec<P>,
}

impl<P> DeletionBlock<P> {
    pub fn end(&self) -> u64 {
        self.start + self.ref_aa.len() as u64
    }

    /// Turn the block into an amino acid deletion record.
    pub fn into_pending(self, parent_ids: ParentIds, frameshift: bool) -> PendingRecord {
        let end = self.end();
        PendingRecord {
            ref_seq: self.ref_aa,
            start: self.start,
            end,
            alt: DELETION_ALT.to_string(),
            element: self.element,
            kind: VariantKind::Cds,
            parent_ids,
            frameshift,
        }
    }
}

/// Merge deleted codons into contiguous blocks.
///
/// Codons are ordered by `(gene, aa_pos)`; a codon extends the current block
/// when it belongs to the same gene and `aa_pos == block.start + len(block.ref)`.
pub fn merge_deletion_blocks<P>(mut codons: Vec<DeletedCodon<P>>) -> Vec<DeletionBlock<P>> {
    codons.sort_by(|a, b| a.gene.cmp(&b.gene).then(a.aa_pos.cmp(&b.aa_pos)));

    let mut blocks: Vec<DeletionBlock<P>> = Vec::new();
    let mut current: Option<(String, DeletionBlock<P>)> = None;

    for codon in codons {
        let extends = matches!(
            &current,
            Some((gene, block)) if *gene == codon.gene && codon.aa_pos == block.end()
        );

        if extends {
            if let Some((_, block)) = current.as_mut() {
                block.ref_aa.push_str(&codon.ref_aa);
                block.payloads.push(codon.payload);
            }
            continue;
        }

        if let Some((_, done)) = current.take() {
            blocks.push(done);
        }
        current = Some((
            codon.gene,
            DeletionBlock {
                element: codon.element,
                start: codon.aa_pos,
                ref_aa: codon.ref_aa,
                payloads: vec![codon.payload],
            },
        ));
    }

    if let Some((_, done)) = current {
        blocks.push(done);
    }

    blocks
}
