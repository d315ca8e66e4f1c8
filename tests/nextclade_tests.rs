//! Nextclade reading, conversion and var file output.

use std::io::Write;

use ferro_sonar::nextclade::{NextcladeAdapter, NextcladeReader};
use ferro_sonar::varfile::read_var_path;
use ferro_sonar::variant::VariantKind;
use tempfile::{NamedTempFile, TempDir};

// 30 bases: ATG GCT CAT GTT TCA GGA AAA TAA ...
const REFERENCE: &str = "ATGGCTCATGTTTCAGGAAAATAACCCGGG";

const SAMPLE_A: &str = r#"{"seqName": "sample/A", "substitutions": [{"pos": 3, "refNuc": "G", "qryNuc": "T"}], "nucToAaMuts": {"3": [{"cdsName": "ORF1", "pos": 1, "refAa": "A", "qryAa": "S"}]}}"#;
const SAMPLE_B: &str = r#"{"seqName": "sample-B", "deletions": [{"range": {"begin": 6, "end": 9}}], "nucToAaMuts": {"7": [{"cdsName": "ORF1", "pos": 2, "refAa": "H", "qryAa": "-"}]}}"#;

fn ndjson_file(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
    file.flush().unwrap();
    file
}

#[test]
fn test_ndjson_skips_malformed_lines() {
    let file = ndjson_file(&[SAMPLE_A, "{not json", "", SAMPLE_B]);
    let results = NextcladeReader::open(file.path(), 10).unwrap().read_all().unwrap();
    let names: Vec<&str> = results.iter().map(|r| r.name()).collect();
    assert_eq!(names, vec!["sample/A", "sample-B"]);
}

#[test]
fn test_ndjson_is_chunked() {
    let file = ndjson_file(&[SAMPLE_A, SAMPLE_B, SAMPLE_A]);
    let chunks: Vec<usize> = NextcladeReader::open(file.path(), 2)
        .unwrap()
        .map(|chunk| chunk.unwrap().len())
        .collect();
    assert_eq!(chunks, vec![2, 1]);
}

#[test]
fn test_wrapped_document() {
    let doc = format!(r#"{{"version": "3", "results": [{SAMPLE_A}, {SAMPLE_B}]}}"#);
    let file = ndjson_file(&[&doc]);
    let results = NextcladeReader::open(file.path(), 1).unwrap().read_all().unwrap();
    assert_eq!(results.len(), 2);
}

#[test]
fn test_convert_and_write_var_files() {
    let file = ndjson_file(&[SAMPLE_A, SAMPLE_B]);
    let results = NextcladeReader::open(file.path(), 10).unwrap().read_all().unwrap();
    let adapter = NextcladeAdapter::new("REF.1", REFERENCE);
    let out = TempDir::new().unwrap();

    for result in &results {
        adapter.convert(result).unwrap().write_var_in(out.path()).unwrap();
    }

    // '/' in sample names is not a path separator
    let a = read_var_path(out.path().join("sample_A.var")).unwrap();
    assert_eq!(a.len(), 2);
    assert_eq!(a[0].label, "G4T");
    assert_eq!(a[0].kind, VariantKind::Nt);
    assert_eq!(a[1].label, "A2S");
    assert_eq!(a[1].kind, VariantKind::Cds);
    assert_eq!(a[1].parent_ids.to_string(), "1");

    let b = read_var_path(out.path().join("sample-B.var")).unwrap();
    assert_eq!(b.len(), 2);
    assert_eq!(b[0].label, "del:7-9");
    assert_eq!(b[1].label, "del:3");
    assert_eq!(b[1].ref_seq, "H");
    assert_eq!(b[1].id, 2);
}

#[cfg(feature = "parallel")]
#[test]
fn test_parallel_conversion_keeps_input_order() {
    use ferro_sonar::parallel::{convert_nextclade_parallel, ParallelStats};

    let file = ndjson_file(&[SAMPLE_A, SAMPLE_B, SAMPLE_A, SAMPLE_B]);
    let results = NextcladeReader::open(file.path(), 10).unwrap().read_all().unwrap();
    let adapter = NextcladeAdapter::new("REF.1", REFERENCE);

    let converted = convert_nextclade_parallel(&adapter, &results);
    let names: Vec<String> = converted.iter().map(|r| r.as_ref().unwrap().name.clone()).collect();
    assert_eq!(names, vec!["sample/A", "sample-B", "sample/A", "sample-B"]);
    assert_eq!(ParallelStats::from_results(&converted).success, 4);
}
