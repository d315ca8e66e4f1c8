//! CLI helper tests: input files, codon tables, configuration and output.

use std::fs;
use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;
use ferro_sonar::cli::{aligned_samples, read_cds_map_path, read_fasta_path, write_sample, OutputFormat};
use ferro_sonar::config::SonarConfig;
use ferro_sonar::lift::CodonTable;
use ferro_sonar::nextclade::DEFAULT_CHUNK_SIZE;
use ferro_sonar::pipeline::{SampleVariants, VariantPipeline};
use ferro_sonar::varfile::read_var_file;
use rstest::rstest;
use tempfile::TempDir;

const ALIGNED_FASTA: &str = ">REF.1 reference\nATGAAA\nGCCTAA\n>s1\nATTAAAGCCTAA\n>s2\nATGAAA---TAA\n";

const LIFT: &str = "\
elemid\tnucPos1\tnucPos2\tnucPos3\tref1\tref2\tref3\talt1\talt2\talt3\tsymbol\taccession\taaPos\taa
1\t0\t1\t2\tA\tT\tG\tA\tT\tG\tG\tG.1\t0\tM
1\t3\t4\t5\tA\tA\tA\tA\tA\tA\tG\tG.1\t1\tK
1\t6\t7\t8\tG\tC\tC\tG\tC\tC\tG\tG.1\t2\tA
1\t9\t10\t11\tT\tA\tA\tT\tA\tA\tG\tG.1\t3\t*
";

#[rstest]
#[case::plain(false)]
#[case::gzip(true)]
fn test_aligned_fasta_through_pipeline(#[case] compressed: bool) {
    let dir = TempDir::new().unwrap();
    let fasta = dir.path().join("aligned.fasta");
    if compressed {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(ALIGNED_FASTA.as_bytes()).unwrap();
        fs::write(&fasta, encoder.finish().unwrap()).unwrap();
    } else {
        fs::write(&fasta, ALIGNED_FASTA).unwrap();
    }
    let lift = dir.path().join("lift.tsv");
    fs::write(&lift, LIFT).unwrap();

    let samples = aligned_samples(read_fasta_path(&fasta).unwrap()).unwrap();
    let table = CodonTable::load_tsv(&lift).unwrap();
    let pipeline = VariantPipeline::new("REF.1").with_codon_table(&table);
    let results: Vec<SampleVariants> = pipeline
        .run_all(&samples)
        .into_iter()
        .map(Result::unwrap)
        .collect();

    assert_eq!(results[0].name, "s1");
    let s1: Vec<&str> = results[0].records().map(|r| r.label.as_str()).collect();
    assert_eq!(s1, vec!["G3T", "M1I"]);

    assert_eq!(results[1].name, "s2");
    let s2: Vec<&str> = results[1].records().map(|r| r.label.as_str()).collect();
    assert_eq!(s2, vec!["del:7-9", "del:3"]);
}

#[test]
fn test_aligned_fasta_needs_a_query() {
    let dir = TempDir::new().unwrap();
    let fasta = dir.path().join("ref.fasta");
    fs::write(&fasta, ">REF.1\nACGT\n").unwrap();
    assert!(aligned_samples(read_fasta_path(&fasta).unwrap()).is_err());
}

#[test]
fn test_cds_map_with_bom() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("cds.tsv");
    fs::write(&path, "\u{feff}ORF1a\tQHD43415.1\nS\tQHD43416.1\n").unwrap();
    let map = read_cds_map_path(&path).unwrap();
    assert_eq!(map["ORF1a"], "QHD43415.1");
    assert_eq!(map["S"], "QHD43416.1");
}

#[rstest]
#[case::tsv(OutputFormat::Tsv)]
#[case::json(OutputFormat::Json)]
fn test_write_sample_formats(#[case] format: OutputFormat) {
    let dir = TempDir::new().unwrap();
    let table = CodonTable::from_tsv(LIFT.as_bytes()).unwrap();
    let samples = aligned_samples(ferro_sonar::cli::read_fasta(ALIGNED_FASTA.as_bytes()).unwrap()).unwrap();
    let vars = VariantPipeline::new("REF.1")
        .with_codon_table(&table)
        .run(&samples[0])
        .unwrap();

    let path = dir.path().join(format!("s1.{}", format.extension()));
    let file = fs::File::create(&path).unwrap();
    write_sample(file, &vars, format).unwrap();

    let bytes = fs::read(&path).unwrap();
    match format {
        OutputFormat::Tsv => assert_eq!(read_var_file(bytes.as_slice()).unwrap().len(), 2),
        OutputFormat::Json => {
            let parsed: SampleVariants = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(parsed, vars);
        }
    }
}

#[test]
fn test_config_file_with_cli_override() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[pipeline]\nworkers = 8\nchunk-size = 25\n\n[output]\nformat = \"json\"\n").unwrap();

    let config = SonarConfig::load_from_path(&path).unwrap();
    assert_eq!(config.workers(None), 8);
    assert_eq!(config.workers(Some(2)), 2);
    assert_eq!(config.chunk_size(None), 25);
    assert_eq!(config.chunk_size(Some(0)), 25);
    assert_eq!(config.output.format.as_deref(), Some("json"));
}

#[rstest]
#[case::unknown_key("[pipeline]\nthreads = 4\n")]
#[case::unknown_format("[output]\nformat = \"vcf\"\n")]
#[case::not_toml("workers = [")]
fn test_bad_config(#[case] content: &str) {
    let err = SonarConfig::parse(content).unwrap_err();
    assert_eq!(err.code().as_str(), "E1003");
}

#[test]
fn test_empty_config_uses_defaults() {
    let config = SonarConfig::parse("").unwrap();
    assert_eq!(config.workers(None), 0);
    assert_eq!(config.chunk_size(None), DEFAULT_CHUNK_SIZE);
}
