// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! FASTA input for CLI operations

use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::error::SonarError;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// One FASTA record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastaRecord {
    /// First word of the header line.
    pub name: String,
    pub sequence: String,
}

/// Open a plain or gzip-compressed file for buffered reading
///
/// Compression is detected from the file's first two bytes.
pub fn open_input<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead>, SonarError> {
    let path = path.as_ref();
    let mut file = File::open(path).map_err(|e| SonarError::Io {
        msg: format!("Failed to open {}: {}", path.display(), e),
    })?;

    let mut magic = [0u8; 2];
    let read = file.read(&mut magic)?;
    file.seek(SeekFrom::Start(0))?;

    if read == 2 && magic == GZIP_MAGIC {
        Ok(Box::new(BufReader::with_capacity(
            1024 * 1024,
            MultiGzDecoder::new(file),
        )))
    } else {
        Ok(Box::new(BufReader::with_capacity(1024 * 1024, file)))
    }
}

/// Parse FASTA records
///
/// Sequence lines are concatenated with surrounding whitespace removed and
/// bases upper-cased. Empty lines and `;` comments are skipped.
///
/// # Examples
///
/// ```
/// use ferro_sonar::cli::read_fasta;
///
/// let records = read_fasta(">ref desc\nacg\nt\n>qry\nATGT\n".as_bytes()).unwrap();
/// assert_eq!(records[0].name, "ref");
/// assert_eq!(records[0].sequence, "ACGT");
/// assert_eq!(records[1].sequence, "ATGT");
/// ```
pub fn read_fasta<R: BufRead>(reader: R) -> Result<Vec<FastaRecord>, SonarError> {
    let mut records: Vec<FastaRecord> = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }

        if let Some(header) = line.strip_prefix('>') {
            let name = header.split_whitespace().next().unwrap_or_default();
            records.push(FastaRecord {
                name: name.to_string(),
                sequence: String::new(),
            });
        } else {
            let record = records.last_mut().ok_or_else(|| {
                SonarError::format(idx + 1, "sequence data before the first '>' header")
            })?;
            record.sequence.push_str(&line.to_ascii_uppercase());
        }
    }

    Ok(records)
}

/// Read every record of a FASTA file
pub fn read_fasta_path<P: AsRef<Path>>(path: P) -> Result<Vec<FastaRecord>, SonarError> {
    read_fasta(open_input(path)?)
}

/// Read the first record of a FASTA file
pub fn read_single_sequence<P: AsRef<Path>>(path: P) -> Result<FastaRecord, SonarError> {
    let path = path.as_ref();
    let mut records = read_fasta_path(path)?;
    if records.len() > 1 {
        log::warn!(
            "{} holds {} records, using the first",
            path.display(),
            records.len()
        );
    }
    if records.is_empty() {
        return Err(SonarError::format(0, format!("{} holds no FASTA records", path.display())));
    }
    Ok(records.swap_remove(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    #[test]
    fn test_data_before_header() {
        let err = read_fasta("ACGT\n>x\n".as_bytes()).unwrap_err();
        assert!(matches!(err, SonarError::Format { line: 1, .. }));
    }

    #[test]
    fn test_gaps_are_kept() {
        let records = read_fasta(">a\nAC--GT\n".as_bytes()).unwrap();
        assert_eq!(records[0].sequence, "AC--GT");
    }

    #[test]
    fn test_open_gzip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ref.fa.gz");
        let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::default());
        encoder.write_all(b">ref\nACGT\n").unwrap();
        encoder.finish().unwrap();

        let record = read_single_sequence(&path).unwrap();
        assert_eq!(record.name, "ref");
        assert_eq!(record.sequence, "ACGT");
    }

    #[test]
    fn test_open_plain() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ref.fa");
        std::fs::write(&path, ">r1\nAC\n>r2\nGT\n").unwrap();
        assert_eq!(read_fasta_path(&path).unwrap().len(), 2);
        assert_eq!(read_single_sequence(&path).unwrap().name, "r1");
    }

    #[test]
    fn test_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.fa");
        std::fs::write(&path, "").unwrap();
        assert!(read_single_sequence(&path).is_err());
    }
}
