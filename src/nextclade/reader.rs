// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! Chunked reading of Nextclade JSON and NDJSON output.
//!
//! Three layouts are accepted:
//!
//! - a JSON document `{"results": [...]}`, a bare array, or a single result
//! - NDJSON, one result object per line
//!
//! NDJSON is streamed line by line; JSON documents are parsed whole and then
//! handed out in chunks.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines, Read};
use std::path::Path;

use serde::Deserialize;

use super::types::NextcladeResult;
use crate::error::SonarError;

/// Default number of results per chunk.
pub const DEFAULT_CHUNK_SIZE: usize = 100;

#[derive(Deserialize)]
#[serde(untagged)]
enum Document {
    Wrapped { results: Vec<NextcladeResult> },
    Many(Vec<NextcladeResult>),
    One(Box<NextcladeResult>),
}

impl Document {
    fn into_results(self) -> Vec<NextcladeResult> {
        match self {
            Document::Wrapped { results } | Document::Many(results) => results,
            Document::One(result) => vec![*result],
        }
    }
}

enum Source<R> {
    Parsed(std::vec::IntoIter<NextcladeResult>),
    Lines {
        pending: std::vec::IntoIter<NextcladeResult>,
        lines: Lines<R>,
        line_no: usize,
    },
}

/// Iterator over chunks of Nextclade results.
pub struct NextcladeReader<R> {
    source: Source<R>,
    chunk_size: usize,
}

impl NextcladeReader<BufReader<File>> {
    /// Open a Nextclade output file.
    pub fn open<P: AsRef<Path>>(path: P, chunk_size: usize) -> Result<Self, SonarError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| SonarError::Io {
            msg: format!("Failed to open {}: {}", path.display(), e),
        })?;
        Self::new(BufReader::new(file), chunk_size)
    }
}

impl<R: BufRead> NextcladeReader<R> {
    /// Detect the layout of `reader` and prepare to read it.
    ///
    /// Input starting with `[` is parsed as one JSON array. Input starting
    /// with `{` whose first line is a complete JSON value is NDJSON and is
    /// read lazily, one line at a time; a first line that is cut short
    /// means a multi-line document, which is buffered and parsed whole.
    pub fn new(mut reader: R, chunk_size: usize) -> Result<Self, SonarError> {
        let chunk_size = chunk_size.max(1);

        let source = match first_non_whitespace(&mut reader)? {
            Some(b'[') => {
                let mut text = String::new();
                reader.read_to_string(&mut text)?;
                let doc: Document = serde_json::from_str(&text)?;
                Source::Parsed(doc.into_results().into_iter())
            }
            Some(b'{') => {
                let mut first_line = String::new();
                reader.read_line(&mut first_line)?;
                match serde_json::from_str::<serde_json::Value>(first_line.trim()) {
                    Err(e) if e.is_eof() => {
                        let mut text = first_line;
                        reader.read_to_string(&mut text)?;
                        match serde_json::from_str::<Document>(&text) {
                            Ok(doc) => Source::Parsed(doc.into_results().into_iter()),
                            Err(_) => {
                                log::debug!("input is not a single JSON document, reading as NDJSON");
                                Source::Parsed(parse_ndjson(&text).into_iter())
                            }
                        }
                    }
                    first => {
                        let pending = match first.and_then(serde_json::from_value::<Document>) {
                            Ok(doc) => doc.into_results(),
                            Err(e) => {
                                log::warn!("skipping malformed NDJSON line 1: {}", e);
                                Vec::new()
                            }
                        };
                        Source::Lines {
                            pending: pending.into_iter(),
                            lines: reader.lines(),
                            line_no: 1,
                        }
                    }
                }
            }
            _ => Source::Lines {
                pending: Vec::new().into_iter(),
                lines: reader.lines(),
                line_no: 0,
            },
        };

        Ok(Self { source, chunk_size })
    }

    /// Read every remaining result.
    pub fn read_all(self) -> Result<Vec<NextcladeResult>, SonarError> {
        let mut all = Vec::new();
        for chunk in self {
            all.extend(chunk?);
        }
        Ok(all)
    }
}

impl<R: BufRead> Iterator for NextcladeReader<R> {
    type Item = Result<Vec<NextcladeResult>, SonarError>;

    fn next(&mut self) -> Option<Self::Item> {
        let chunk_size = self.chunk_size;
        let chunk: Vec<NextcladeResult> = match &mut self.source {
            Source::Parsed(results) => results.by_ref().take(chunk_size).collect(),
            Source::Lines {
                pending,
                lines,
                line_no,
            } => {
                let mut chunk: Vec<NextcladeResult> = pending.by_ref().take(chunk_size).collect();
                while chunk.len() < chunk_size {
                    let Some(line) = lines.next() else { break };
                    *line_no += 1;
                    let line = match line {
                        Ok(line) => line,
                        Err(e) => return Some(Err(e.into())),
                    };
                    if let Some(result) = parse_line(&line, *line_no) {
                        chunk.push(result);
                    }
                }
                chunk
            }
        };

        if chunk.is_empty() {
            None
        } else {
            Some(Ok(chunk))
        }
    }
}

fn first_non_whitespace<R: BufRead>(reader: &mut R) -> Result<Option<u8>, SonarError> {
    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            return Ok(None);
        }
        match buf.iter().position(|b| !b.is_ascii_whitespace()) {
            Some(i) => {
                let first = buf[i];
                reader.consume(i);
                return Ok(Some(first));
            }
            None => {
                let len = buf.len();
                reader.consume(len);
            }
        }
    }
}

fn parse_line(line: &str, line_no: usize) -> Option<NextcladeResult> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    match serde_json::from_str(line) {
        Ok(result) => Some(result),
        Err(e) => {
            log::warn!("skipping malformed NDJSON line {}: {}", line_no, e);
            None
        }
    }
}

fn parse_ndjson(text: &str) -> Vec<NextcladeResult> {
    text.lines()
        .enumerate()
        .filter_map(|(i, line)| parse_line(line, i + 1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(chunks: Vec<Vec<NextcladeResult>>) -> Vec<Vec<String>> {
        chunks
            .into_iter()
            .map(|c| c.iter().map(|r| r.name().to_string()).collect())
            .collect()
    }

    fn chunks(input: &str, size: usize) -> Vec<Vec<NextcladeResult>> {
        NextcladeReader::new(input.as_bytes(), size)
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn test_wrapped_document() {
        let input = r#"{"version": "3", "results": [{"seqName": "a"}, {"seqName": "b"}, {"seqName": "c"}]}"#;
        assert_eq!(
            names(chunks(input, 2)),
            vec![vec!["a".to_string(), "b".to_string()], vec!["c".to_string()]]
        );
    }

    #[test]
    fn test_bare_array() {
        let input = r#"  [{"seqName": "a"}, {"seqName": "b"}]"#;
        assert_eq!(names(chunks(input, 10)), vec![vec!["a".to_string(), "b".to_string()]]);
    }

    #[test]
    fn test_single_object() {
        let input = r#"{"seqName": "only"}"#;
        assert_eq!(names(chunks(input, 10)), vec![vec!["only".to_string()]]);
    }

    #[test]
    fn test_ndjson_with_bad_line() {
        let input = "{\"seqName\": \"a\"}\nnot json\n\n{\"seqName\": \"b\"}\n";
        assert_eq!(names(chunks(input, 10)), vec![vec!["a".to_string(), "b".to_string()]]);
    }

    #[test]
    fn test_broken_array_is_error() {
        let result = NextcladeReader::new(r#"[{"seqName": "a"}"#.as_bytes(), 10);
        assert!(matches!(result, Err(SonarError::Json { .. })));
    }

    #[test]
    fn test_empty_input() {
        assert!(chunks("", 10).is_empty());
        assert!(chunks("   \n", 10).is_empty());
    }

    /// Yields `head`, then fails every further read.
    struct UnreadableTail {
        head: &'static [u8],
        pos: usize,
    }

    impl Read for UnreadableTail {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pos < self.head.len() {
                let n = buf.len().min(self.head.len() - self.pos);
                buf[..n].copy_from_slice(&self.head[self.pos..self.pos + n]);
                self.pos += n;
                Ok(n)
            } else {
                Err(std::io::Error::new(std::io::ErrorKind::Other, "tail unreadable"))
            }
        }
    }

    #[test]
    fn test_ndjson_is_read_lazily() {
        let source = UnreadableTail {
            head: b"{\"seqName\": \"a\"}\n",
            pos: 0,
        };
        let mut reader = NextcladeReader::new(BufReader::new(source), 1).unwrap();
        let first = reader.next().unwrap().unwrap();
        assert_eq!(first[0].name(), "a");
        assert!(matches!(reader.next(), Some(Err(SonarError::Io { .. }))));
    }

    #[test]
    fn test_pretty_printed_document() {
        let input = "{\n  \"results\": [\n    {\"seqName\": \"a\"},\n    {\"seqName\": \"b\"}\n  ]\n}\n";
        assert_eq!(names(chunks(input, 10)), vec![vec!["a".to_string(), "b".to_string()]]);
    }

    #[test]
    fn test_malformed_first_ndjson_line() {
        let input = "{not json\n{\"seqName\": \"b\"}\n";
        assert_eq!(names(chunks(input, 10)), vec![vec!["b".to_string()]]);
    }

    #[test]
    fn test_read_all() {
        let input = "{\"seqName\": \"a\"}\n{\"seqName\": \"b\"}\n";
        let all = NextcladeReader::new(input.as_bytes(), 1).unwrap().read_all().unwrap();
        assert_eq!(all.len(), 2);
    }
}
