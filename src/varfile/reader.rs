// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! Var file reader.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::TERMINATOR;
use crate::error::SonarError;
use crate::variant::{ParentIds, VariantKind, VariantRecord};

/// Parse a var file.
///
/// Lines starting with `#` are skipped and reading stops at `//`. Rows may
/// omit the trailing `frameshift` column.
///
/// # Errors
///
/// [`SonarError::Format`] for malformed rows or when the file ends before
/// the `//` terminator.
pub fn read_var_file<R: BufRead>(reader: R) -> Result<Vec<VariantRecord>, SonarError> {
    let mut records = Vec::new();
    let mut last_line = 0;

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        last_line = line_no;
        let line = line?;
        let line = line.trim_end_matches('\r');

        if line == TERMINATOR {
            return Ok(records);
        }
        if line.starts_with('#') || line.is_empty() {
            continue;
        }
        records.push(parse_row(line, line_no)?);
    }

    Err(SonarError::format(
        last_line + 1,
        format!("missing '{TERMINATOR}' terminator, file is truncated"),
    ))
}

/// Read the var file at `path`.
pub fn read_var_path<P: AsRef<Path>>(path: P) -> Result<Vec<VariantRecord>, SonarError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| SonarError::Io {
        msg: format!("Failed to open {}: {}", path.display(), e),
    })?;
    read_var_file(BufReader::new(file))
}

fn parse_row(line: &str, line_no: usize) -> Result<VariantRecord, SonarError> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() != 9 && fields.len() != 10 {
        return Err(SonarError::format(
            line_no,
            format!("expected 9 or 10 columns, found {}", fields.len()),
        ));
    }

    let number = |i: usize, name: &str| -> Result<u64, SonarError> {
        fields[i]
            .parse()
            .map_err(|_| SonarError::format(line_no, format!("invalid {} '{}'", name, fields[i])))
    };

    let kind: VariantKind = fields[7]
        .parse()
        .map_err(|_| SonarError::format(line_no, format!("unknown type '{}'", fields[7])))?;
    let parent_ids: ParentIds = fields[8]
        .parse()
        .map_err(|_| SonarError::format(line_no, format!("invalid parent_id '{}'", fields[8])))?;
    let frameshift = match fields.get(9).copied() {
        None | Some("0") | Some("") => false,
        Some("1") => true,
        Some(other) => {
            return Err(SonarError::format(
                line_no,
                format!("invalid frameshift '{other}'"),
            ))
        }
    };

    let start = number(2, "start")?;
    let end = number(3, "end")?;
    if start > end {
        return Err(SonarError::format(
            line_no,
            format!("start {start} is after end {end}"),
        ));
    }

    Ok(VariantRecord {
        id: number(0, "id")?,
        ref_seq: fields[1].to_string(),
        start,
        end,
        alt: fields[4].to_string(),
        element: fields[5].to_string(),
        label: fields[6].to_string(),
        kind,
        parent_ids,
        frameshift,
    })
}
