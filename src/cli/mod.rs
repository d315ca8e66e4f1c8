// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! CLI utilities for ferro-sonar
//!
//! This module provides testable functions used by the CLI binary.
//! Input parsing and output formatting live in the library so they can be
//! unit tested without running the binary.

pub mod fasta;
pub mod format;

use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

pub use fasta::{open_input, read_fasta, read_fasta_path, read_single_sequence, FastaRecord};
pub use format::{write_sample, OutputFormat};

use crate::error::SonarError;
use crate::extractor::AlignmentInput;
use crate::pipeline::SampleInput;

/// UTF-8 BOM (Byte Order Mark) constant
const UTF8_BOM: &str = "\u{feff}";

/// Strip UTF-8 BOM from the beginning of a string if present.
///
/// # Examples
///
/// ```
/// use ferro_sonar::cli::strip_bom;
///
/// assert_eq!(strip_bom("\u{feff}ORF1a\tQHD43415.1"), "ORF1a\tQHD43415.1");
/// assert_eq!(strip_bom("ORF1a\tQHD43415.1"), "ORF1a\tQHD43415.1");
/// ```
pub fn strip_bom(s: &str) -> &str {
    s.strip_prefix(UTF8_BOM).unwrap_or(s)
}

/// Parse a CDS name map: `<cds name>\t<accession>` per line.
///
/// Lines starting with `#` and empty lines are skipped.
pub fn read_cds_map<R: BufRead>(reader: R) -> Result<HashMap<String, String>, SonarError> {
    let mut map = HashMap::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line = strip_bom(line.trim_end());
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match line.split('\t').collect::<Vec<_>>().as_slice() {
            [name, accession] if !name.is_empty() && !accession.is_empty() => {
                if let Some(previous) = map.insert(name.to_string(), accession.to_string()) {
                    log::warn!("CDS {} mapped twice, replacing {}", name, previous);
                }
            }
            _ => {
                return Err(SonarError::format(
                    idx + 1,
                    "expected '<cds name>\\t<accession>'",
                ))
            }
        }
    }

    Ok(map)
}

/// Read a CDS name map from a file.
pub fn read_cds_map_path<P: AsRef<Path>>(path: P) -> Result<HashMap<String, String>, SonarError> {
    read_cds_map(open_input(path)?)
}

/// Split an aligned FASTA into its reference and query samples.
///
/// The first record is the gapped reference; every further record is a
/// query aligned to it.
pub fn aligned_samples(records: Vec<FastaRecord>) -> Result<Vec<SampleInput>, SonarError> {
    let mut records = records.into_iter();
    let reference = records.next().ok_or_else(|| {
        SonarError::format(0, "aligned FASTA needs a reference and at least one query")
    })?;

    let samples: Vec<SampleInput> = records
        .map(|query| {
            SampleInput::new(
                query.name,
                AlignmentInput::Aligned {
                    reference: reference.sequence.clone(),
                    query: query.sequence,
                },
            )
        })
        .collect();

    if samples.is_empty() {
        return Err(SonarError::format(
            0,
            format!("aligned FASTA holds only the reference {}", reference.name),
        ));
    }
    Ok(samples)
}
