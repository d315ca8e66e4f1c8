// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! ferro-sonar CLI
//!
//! Command-line interface for turning sequence alignments and Nextclade
//! results into per-sample var files.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use ferro_sonar::cli::{
    aligned_samples, open_input, read_cds_map_path, read_fasta_path, read_single_sequence,
    write_sample, OutputFormat,
};
use ferro_sonar::config::SonarConfig;
use ferro_sonar::extractor::AlignmentInput;
use ferro_sonar::lift::CodonTable;
use ferro_sonar::nextclade::{NextcladeAdapter, NextcladeReader, NextcladeResult};
use ferro_sonar::parallel::{
    convert_nextclade_parallel, run_samples_parallel, ParallelConfig, ParallelStats,
};
use ferro_sonar::pipeline::{SampleInput, SampleVariants, VariantPipeline};
use ferro_sonar::SonarError;

#[derive(Parser)]
#[command(name = "ferro-sonar")]
#[command(author, version, about = "Nucleotide and amino acid variant calling from alignments")]
#[command(
    long_about = "Extract nucleotide variants from pairwise alignments or Nextclade results,
lift them to amino acid variants and write one var file per sample.

Examples:
  ferro-sonar aligned -a aligned.fasta -e MN908947.3 -c lift.tsv -o sample.var -j 4
  ferro-sonar cigar -r ref.fa -q sample.fa --cigar 120=1X3D40= -e MN908947.3
  ferro-sonar nextclade -i nextclade.ndjson -r ref.fa.gz -e MN908947.3 -d vars/ -j 8"
)]
struct Cli {
    /// Output format
    #[arg(short = 'f', long, global = true, value_parser = ["tsv", "json"])]
    format: Option<String>,

    /// Configuration file (default: .ferro-sonar.toml, then ~/.config/ferro-sonar/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Call variants from an aligned FASTA (reference first, then queries)
    Aligned {
        /// Aligned FASTA, optionally gzip-compressed
        #[arg(short, long)]
        aligned: PathBuf,

        /// Reference accession written to nucleotide records
        #[arg(short, long)]
        element: String,

        /// Codon lift table (TSV); without it no amino acid variants are called
        #[arg(short, long)]
        codons: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Worker threads (0 = one per core)
        #[arg(short = 'j', long)]
        jobs: Option<usize>,
    },

    /// Call variants from ungapped sequences and a CIGAR string
    Cigar {
        /// Reference FASTA
        #[arg(short, long)]
        reference: PathBuf,

        /// Query FASTA
        #[arg(short, long)]
        query: PathBuf,

        /// CIGAR string of the query against the reference
        #[arg(long)]
        cigar: String,

        /// Reference accession written to nucleotide records
        #[arg(short, long)]
        element: String,

        /// Codon lift table (TSV)
        #[arg(short, long)]
        codons: Option<PathBuf>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert Nextclade JSON/NDJSON results into one var file per sample
    Nextclade {
        /// Nextclade output (JSON or NDJSON, optionally gzip-compressed)
        #[arg(short, long)]
        input: PathBuf,

        /// Reference FASTA used by Nextclade
        #[arg(short, long)]
        reference: PathBuf,

        /// Reference accession written to nucleotide records
        #[arg(short, long)]
        element: String,

        /// Output directory
        #[arg(short = 'd', long)]
        out_dir: PathBuf,

        /// TSV mapping Nextclade CDS names to CDS accessions
        #[arg(long)]
        cds_map: Option<PathBuf>,

        /// Worker threads (0 = one per core)
        #[arg(short = 'j', long)]
        jobs: Option<usize>,

        /// Results read per chunk
        #[arg(long)]
        chunk_size: Option<usize>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(stats) => {
            report(&stats);
            if stats.errors > 0 {
                std::process::exit(2);
            }
        }
        Err(e) => {
            log::error!("{}", e.detailed_message());
            std::process::exit(1);
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

/// Run the selected command; per-sample failures are counted, not returned.
fn run(cli: Cli) -> Result<ParallelStats, SonarError> {
    let config = match &cli.config {
        Some(path) => SonarConfig::load_from_path(path)?,
        None => SonarConfig::load().unwrap_or_default(),
    };
    let format: OutputFormat = cli
        .format
        .as_deref()
        .or(config.output.format.as_deref())
        .unwrap_or("tsv")
        .parse()?;

    match cli.command {
        Commands::Aligned {
            aligned,
            element,
            codons,
            output,
            jobs,
        } => {
            let samples = aligned_samples(read_fasta_path(&aligned)?)?;
            let parallel = ParallelConfig::new().with_num_threads(config.workers(jobs));
            run_alignments(&samples, &element, codons.as_deref(), output.as_deref(), &parallel, format)
        }
        Commands::Cigar {
            reference,
            query,
            cigar,
            element,
            codons,
            output,
        } => {
            let reference = read_single_sequence(&reference)?;
            let query = read_single_sequence(&query)?;
            let sample = SampleInput::new(
                query.name,
                AlignmentInput::Cigar {
                    reference: reference.sequence,
                    query: query.sequence,
                    cigar,
                },
            );
            let parallel = ParallelConfig::new().with_num_threads(1);
            run_alignments(&[sample], &element, codons.as_deref(), output.as_deref(), &parallel, format)
        }
        Commands::Nextclade {
            input,
            reference,
            element,
            out_dir,
            cds_map,
            jobs,
            chunk_size,
        } => {
            let parallel = ParallelConfig::new()
                .with_num_threads(config.workers(jobs))
                .with_chunk_size(config.chunk_size(chunk_size));
            run_nextclade(&input, &reference, element, &out_dir, cds_map.as_deref(), &parallel, format)
        }
    }
}

fn run_alignments(
    samples: &[SampleInput],
    element: &str,
    codons: Option<&Path>,
    output: Option<&Path>,
    parallel: &ParallelConfig,
    format: OutputFormat,
) -> Result<ParallelStats, SonarError> {
    let table = codons.map(CodonTable::load_tsv).transpose()?;
    let mut pipeline = VariantPipeline::new(element);
    if let Some(table) = &table {
        pipeline = pipeline.with_codon_table(table);
    }

    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let results = parallel
        .build_pool()?
        .install(|| run_samples_parallel(&pipeline, samples));
    let stats = ParallelStats::from_results(&results);
    for (sample, result) in samples.iter().zip(results) {
        match result {
            Ok(vars) => writer = write_sample(writer, &vars, format)?,
            Err(e) => log::error!("{}: {}", sample.name, e.detailed_message()),
        }
    }
    writer.flush()?;

    Ok(stats)
}

fn run_nextclade(
    input: &Path,
    reference: &Path,
    element: String,
    out_dir: &Path,
    cds_map: Option<&Path>,
    parallel: &ParallelConfig,
    format: OutputFormat,
) -> Result<ParallelStats, SonarError> {
    let reference = read_single_sequence(reference)?;
    let mut adapter = NextcladeAdapter::new(element, reference.sequence);
    if let Some(path) = cds_map {
        adapter = adapter.with_cds_map(read_cds_map_path(path)?);
    }
    fs::create_dir_all(out_dir)?;

    let reader = NextcladeReader::new(open_input(input)?, parallel.chunk_size)?;
    let pool = parallel.build_pool()?;
    let mut stats = ParallelStats::new();

    for chunk in reader {
        let chunk = chunk?;
        let results = convert_chunk(&adapter, &chunk, &pool);

        let written: Vec<Result<(), SonarError>> = chunk
            .iter()
            .zip(results)
            .map(|(sample, result)| {
                let outcome = result.and_then(|vars| write_to_dir(&vars, out_dir, format));
                if let Err(e) = &outcome {
                    log::error!("{}: {}", sample.name(), e.detailed_message());
                }
                outcome
            })
            .collect();
        stats.record(&written);
        log::info!("processed {} samples", stats.total);
    }

    Ok(stats)
}

fn convert_chunk(
    adapter: &NextcladeAdapter,
    chunk: &[NextcladeResult],
    pool: &rayon::ThreadPool,
) -> Vec<Result<SampleVariants, SonarError>> {
    pool.install(|| convert_nextclade_parallel(adapter, chunk))
}

fn write_to_dir(vars: &SampleVariants, out_dir: &Path, format: OutputFormat) -> Result<(), SonarError> {
    match format {
        OutputFormat::Tsv => vars.write_var_in(out_dir),
        OutputFormat::Json => vars.write_json_in(out_dir),
    }
}

fn report(stats: &ParallelStats) {
    eprintln!(
        "{} of {} samples processed ({:.1}%)",
        stats.success,
        stats.total,
        stats.success_rate()
    );
}
