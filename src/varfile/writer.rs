// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! Var file writer.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use super::{HEADER, TERMINATOR};
use crate::error::SonarError;
use crate::variant::VariantRecord;

/// Streams records into a var file.
///
/// The header is written on creation; [`finish`](Self::finish) writes the
/// `//` terminator. A writer dropped without `finish` leaves a truncated
/// file that readers reject.
pub struct VarFileWriter<W: Write> {
    inner: W,
    rows: usize,
}

impl<W: Write> VarFileWriter<W> {
    pub fn new(mut inner: W) -> Result<Self, SonarError> {
        writeln!(inner, "{HEADER}")?;
        Ok(Self { inner, rows: 0 })
    }

    pub fn write_record(&mut self, rec: &VariantRecord) -> Result<(), SonarError> {
        writeln!(
            self.inner,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            rec.id,
            rec.ref_seq,
            rec.start,
            rec.end,
            rec.alt,
            rec.element,
            rec.label,
            rec.kind,
            rec.parent_ids,
            u8::from(rec.frameshift)
        )?;
        self.rows += 1;
        Ok(())
    }

    pub fn write_all<'a, I>(&mut self, records: I) -> Result<(), SonarError>
    where
        I: IntoIterator<Item = &'a VariantRecord>,
    {
        for rec in records {
            self.write_record(rec)?;
        }
        Ok(())
    }

    /// Number of records written so far.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Write the terminator, flush, and hand back the sink.
    pub fn finish(mut self) -> Result<W, SonarError> {
        writeln!(self.inner, "{TERMINATOR}")?;
        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// Write `records` as one complete var file.
pub fn write_var_file<'a, W, I>(sink: W, records: I) -> Result<W, SonarError>
where
    W: Write,
    I: IntoIterator<Item = &'a VariantRecord>,
{
    let mut writer = VarFileWriter::new(sink)?;
    writer.write_all(records)?;
    writer.finish()
}

/// Write `records` to `path`, creating parent directories as needed.
pub fn write_var_path<'a, P, I>(path: P, records: I) -> Result<(), SonarError>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = &'a VariantRecord>,
{
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(path).map_err(|e| SonarError::Io {
        msg: format!("Failed to create {}: {}", path.display(), e),
    })?;
    write_var_file(BufWriter::new(file), records)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variant::{ParentIds, PendingRecord};

    #[test]
    fn test_rows_and_terminator() {
        let nt = VariantRecord::nt_deletion(1, "C", 1, "REF.1");
        let mut pending = PendingRecord::cds_change("M", 0, "I", "P1.1", ParentIds::from_iter([1, 2]));
        pending.frameshift = true;
        let aa = pending.into_record(3);

        let out = write_var_file(Vec::new(), [&nt, &aa]).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], HEADER);
        assert_eq!(lines[1], "1\tC\t1\t2\t \tREF.1\tdel:2\tnt\t1\t0");
        assert_eq!(lines[2], "3\tM\t0\t1\tI\tP1.1\tM1I\tcds\t1,2\t1");
        assert_eq!(lines[3], "//");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_empty_sample_still_terminated() {
        let out = write_var_file(Vec::new(), []).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), format!("{HEADER}\n//\n"));
    }
}
