// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! Per-gene codon position tables.
//!
//! # Coordinate System
//!
//! | Column | Basis | Notes |
//! |--------|-------|-------|
//! | `nuc_pos` | 0-based | Genomic position of each codon base, absent past the CDS end |
//! | `aa_pos` | 0-based | Codon index within the CDS |
//!
//! Columns are stored per gene as parallel vectors. A sorted
//! `(position, row, slot)` index answers "which codon bases fall in
//! `[start, end)`" with one binary search.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::SonarError;
use crate::lift::translate::STOP_AA;

/// Placeholder for an absent position or base in lift files.
const MISSING: &str = "-";

const LIFT_COLUMNS: usize = 14;

/// Codon rows of one coding sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneCodons {
    /// Annotation id of the CDS; deletion blocks never span two ids.
    pub elemid: String,
    pub symbol: String,
    /// Accession written to amino acid records.
    pub accession: String,
    nuc_pos: [Vec<Option<u64>>; 3],
    ref_base: [Vec<Option<u8>>; 3],
    aa_pos: Vec<u64>,
    aa: Vec<u8>,
    index: Vec<(u64, u32, u8)>,
}

impl GeneCodons {
    pub fn new(
        elemid: impl Into<String>,
        symbol: impl Into<String>,
        accession: impl Into<String>,
    ) -> Self {
        Self {
            elemid: elemid.into(),
            symbol: symbol.into(),
            accession: accession.into(),
            ..Self::default()
        }
    }

    /// Build the table of a CDS from its ordered genomic coordinates.
    ///
    /// `coords` lists every CDS base in reading order; a trailing partial
    /// codon keeps its missing positions absent. The codon after the last
    /// protein residue maps to `*`.
    ///
    /// # Errors
    ///
    /// [`SonarError::InvalidCoordinates`] if a coordinate lies outside
    /// `reference` or there are more codons than residues plus a stop.
    pub fn from_cds(
        elemid: impl Into<String>,
        symbol: impl Into<String>,
        accession: impl Into<String>,
        coords: &[u64],
        protein: &str,
        reference: &str,
    ) -> Result<Self, SonarError> {
        let mut gene = Self::new(elemid, symbol, accession);
        let residues: Vec<u8> = protein.bytes().chain(std::iter::once(STOP_AA)).collect();
        let sequence = reference.as_bytes();

        for (aa_pos, triplet) in coords.chunks(3).enumerate() {
            let aa = *residues.get(aa_pos).ok_or_else(|| SonarError::InvalidCoordinates {
                msg: format!(
                    "CDS {} has {} codons but protein has {} residues",
                    gene.accession,
                    coords.len().div_ceil(3),
                    protein.len()
                ),
            })?;

            let mut nuc_pos = [None; 3];
            let mut ref_base = [None; 3];
            for (slot, &pos) in triplet.iter().enumerate() {
                let base = sequence.get(pos as usize).ok_or_else(|| SonarError::InvalidCoordinates {
                    msg: format!(
                        "CDS {} position {} outside reference of length {}",
                        gene.accession,
                        pos,
                        sequence.len()
                    ),
                })?;
                nuc_pos[slot] = Some(pos);
                ref_base[slot] = Some(*base);
            }
            gene.push_codon(nuc_pos, ref_base, aa_pos as u64, aa);
        }

        gene.reindex();
        Ok(gene)
    }

    /// Append one codon row. Call [`CodonTable::add_gene`] afterwards so the
    /// position index is rebuilt.
    pub fn push_codon(
        &mut self,
        nuc_pos: [Option<u64>; 3],
        ref_base: [Option<u8>; 3],
        aa_pos: u64,
        aa: u8,
    ) {
        for slot in 0..3 {
            self.nuc_pos[slot].push(nuc_pos[slot]);
            self.ref_base[slot].push(ref_base[slot]);
        }
        self.aa_pos.push(aa_pos);
        self.aa.push(aa);
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (slot, positions) in self.nuc_pos.iter().enumerate() {
            for (row, pos) in positions.iter().enumerate() {
                if let Some(pos) = pos {
                    self.index.push((*pos, row as u32, slot as u8));
                }
            }
        }
        self.index.sort_unstable();
    }

    pub fn len(&self) -> usize {
        self.aa.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aa.is_empty()
    }

    pub fn aa_pos(&self, row: usize) -> u64 {
        self.aa_pos[row]
    }

    pub fn aa(&self, row: usize) -> u8 {
        self.aa[row]
    }

    pub fn nuc_pos(&self, row: usize) -> [Option<u64>; 3] {
        [self.nuc_pos[0][row], self.nuc_pos[1][row], self.nuc_pos[2][row]]
    }

    pub fn ref_base(&self, row: usize) -> [Option<u8>; 3] {
        [self.ref_base[0][row], self.ref_base[1][row], self.ref_base[2][row]]
    }

    /// `(row, slot)` of every codon base with a position in `[start, end)`.
    pub fn bases_in(&self, start: u64, end: u64) -> impl Iterator<Item = (usize, usize)> + '_ {
        let first = self.index.partition_point(|&(pos, _, _)| pos < start);
        self.index[first..]
            .iter()
            .take_while(move |&&(pos, _, _)| pos < end)
            .map(|&(_, row, slot)| (row as usize, slot as usize))
    }

    /// True if any codon base lies in `[start, end)`.
    pub fn overlaps(&self, start: u64, end: u64) -> bool {
        self.bases_in(start, end).next().is_some()
    }
}

/// Codon tables of every CDS on one reference molecule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CodonTable {
    genes: Vec<GeneCodons>,
}

impl CodonTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_gene(&mut self, mut gene: GeneCodons) {
        gene.reindex();
        self.genes.push(gene);
    }

    pub fn genes(&self) -> &[GeneCodons] {
        &self.genes
    }

    pub fn is_empty(&self) -> bool {
        self.genes.iter().all(GeneCodons::is_empty)
    }

    /// True if any codon of any gene has a base in `[start, end)`.
    pub fn overlaps(&self, start: u64, end: u64) -> bool {
        self.genes.iter().any(|g| g.overlaps(start, end))
    }

    /// Load a tab-separated lift file.
    pub fn load_tsv<P: AsRef<Path>>(path: P) -> Result<Self, SonarError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| SonarError::Io {
            msg: format!("Failed to open codon table {}: {}", path.display(), e),
        })?;
        Self::from_tsv(BufReader::new(file))
    }

    /// Parse a lift file.
    ///
    /// Columns: `elemid nucPos1 nucPos2 nucPos3 ref1 ref2 ref3 alt1 alt2 alt3
    /// symbol accession aaPos aa`. A header line starting with `elemid` or `#`
    /// is skipped; `-` marks an absent position. Rows are grouped into genes
    /// by `elemid`, in first-seen order.
    pub fn from_tsv<R: BufRead>(reader: R) -> Result<Self, SonarError> {
        let mut genes: Vec<GeneCodons> = Vec::new();

        for (idx, line) in reader.lines().enumerate() {
            let line_no = idx + 1;
            let line = line?;
            let line = line.trim_end_matches(['\r', '\n']);
            if line.is_empty() || line.starts_with('#') || line.starts_with("elemid\t") {
                continue;
            }

            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() != LIFT_COLUMNS {
                return Err(SonarError::format(
                    line_no,
                    format!("expected {} columns, found {}", LIFT_COLUMNS, fields.len()),
                ));
            }

            let mut nuc_pos = [None; 3];
            let mut ref_base = [None; 3];
            for slot in 0..3 {
                nuc_pos[slot] = parse_position(fields[1 + slot], line_no)?;
                ref_base[slot] = parse_base(fields[4 + slot]);
            }
            let aa_pos: u64 = fields[12]
                .parse()
                .map_err(|_| SonarError::format(line_no, format!("invalid aaPos '{}'", fields[12])))?;
            let aa = match fields[13].as_bytes() {
                [aa] => *aa,
                _ => {
                    return Err(SonarError::format(
                        line_no,
                        format!("expected one amino acid, found '{}'", fields[13]),
                    ))
                }
            };

            let elemid = fields[0];
            let gene = match genes.iter_mut().position(|g| g.elemid == elemid) {
                Some(i) => &mut genes[i],
                None => {
                    genes.push(GeneCodons::new(elemid, fields[10], fields[11]));
                    let last = genes.len() - 1;
                    &mut genes[last]
                }
            };
            gene.push_codon(nuc_pos, ref_base, aa_pos, aa);
        }

        let mut table = CodonTable::new();
        for gene in genes {
            table.add_gene(gene);
        }
        log::debug!("loaded codon table with {} genes", table.genes.len());
        Ok(table)
    }
}

fn parse_position(field: &str, line_no: usize) -> Result<Option<u64>, SonarError> {
    if field == MISSING || field.is_empty() {
        return Ok(None);
    }
    field
        .parse()
        .map(Some)
        .map_err(|_| SonarError::format(line_no, format!("invalid position '{field}'")))
}

fn parse_base(field: &str) -> Option<u8> {
    match field.as_bytes() {
        [b] if field != MISSING => Some(*b),
        _ => None,
    }
}
