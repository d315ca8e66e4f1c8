// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! Per-sample processing: extract, lift, write.
//!
//! A [`VariantPipeline`] binds a reference element and an optional codon
//! table. Each sample runs independently; a failure affects only that
//! sample's result.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::SonarError;
use crate::extractor::{AlignmentInput, DiffExtractor, ExtractorConfig};
use crate::lift::{mark_frameshifts, CodonLiftEngine, CodonTable};
use crate::varfile::{write_var_file, write_var_path};
use crate::variant::VariantRecord;

/// One sample to process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleInput {
    pub name: String,
    pub alignment: AlignmentInput,
}

impl SampleInput {
    pub fn new(name: impl Into<String>, alignment: AlignmentInput) -> Self {
        Self {
            name: name.into(),
            alignment,
        }
    }
}

/// All variant records of one sample.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleVariants {
    pub name: String,
    pub nt: Vec<VariantRecord>,
    pub aa: Vec<VariantRecord>,
}

impl SampleVariants {
    pub fn new(name: impl Into<String>, nt: Vec<VariantRecord>, aa: Vec<VariantRecord>) -> Self {
        Self {
            name: name.into(),
            nt,
            aa,
        }
    }

    /// Every record, nucleotide records first.
    pub fn records(&self) -> impl Iterator<Item = &VariantRecord> {
        self.nt.iter().chain(self.aa.iter())
    }

    pub fn len(&self) -> usize {
        self.nt.len() + self.aa.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nt.is_empty() && self.aa.is_empty()
    }

    /// Write a complete var file to `sink`.
    pub fn write_var<W: Write>(&self, sink: W) -> Result<W, SonarError> {
        write_var_file(sink, self.records())
    }

    /// Write the var file `<dir>/<name>.var`.
    pub fn write_var_in<P: AsRef<Path>>(&self, dir: P) -> Result<(), SonarError> {
        let path = dir.as_ref().join(format!("{}.var", sanitize(&self.name)));
        write_var_path(path, self.records())
    }

    /// Write `<dir>/<name>.json`.
    pub fn write_json_in<P: AsRef<Path>>(&self, dir: P) -> Result<(), SonarError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.json", sanitize(&self.name)));
        let file = File::create(&path).map_err(|e| SonarError::Io {
            msg: format!("Failed to create {}: {}", path.display(), e),
        })?;
        self.write_json(BufWriter::new(file))?.flush()?;
        Ok(())
    }

    /// Write the sample as one JSON object.
    pub fn write_json<W: Write>(&self, mut sink: W) -> Result<W, SonarError> {
        serde_json::to_writer(&mut sink, self)?;
        writeln!(sink)?;
        Ok(sink)
    }
}

/// Replace path separators so a sample name is a safe file name.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| if matches!(c, '/' | '\\' | '\0') { '_' } else { c })
        .collect()
}

/// Extraction plus optional codon lift against one reference element.
#[derive(Debug, Clone)]
pub struct VariantPipeline<'a> {
    extractor: DiffExtractor,
    table: Option<&'a CodonTable>,
}

impl<'a> VariantPipeline<'a> {
    pub fn new(element: impl Into<String>) -> Self {
        Self::with_config(element, ExtractorConfig::default())
    }

    pub fn with_config(element: impl Into<String>, config: ExtractorConfig) -> Self {
        Self {
            extractor: DiffExtractor::with_config(element, config),
            table: None,
        }
    }

    /// Lift nucleotide variants through `table`.
    pub fn with_codon_table(mut self, table: &'a CodonTable) -> Self {
        self.table = Some(table);
        self
    }

    /// Process one sample.
    pub fn run(&self, sample: &SampleInput) -> Result<SampleVariants, SonarError> {
        let mut nt = self.extractor.extract(&sample.alignment)?;
        let aa = match self.table {
            Some(table) => {
                mark_frameshifts(&mut nt, table);
                CodonLiftEngine::new(table).lift(&nt)
            }
            None => Vec::new(),
        };
        log::debug!(
            "{}: {} nucleotide and {} amino acid variants",
            sample.name,
            nt.len(),
            aa.len()
        );
        Ok(SampleVariants::new(sample.name.as_str(), nt, aa))
    }

    /// Process samples one after another, keeping input order.
    pub fn run_all(&self, samples: &[SampleInput]) -> Vec<Result<SampleVariants, SonarError>> {
        samples.iter().map(|s| self.run(s)).collect()
    }
}
