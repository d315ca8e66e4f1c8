//! Performance benchmarks for ferro-sonar
//!
//! Run with: cargo bench
//! Run specific benchmark: cargo bench -- extraction

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use ferro_sonar::extractor::DiffExtractor;
use ferro_sonar::lift::{CodonLiftEngine, CodonTable, GeneCodons};
use ferro_sonar::nextclade::{NextcladeAdapter, NextcladeResult};
use ferro_sonar::varfile::write_var_file;

/// Deterministic pseudo-random bases.
fn sequence(len: usize, seed: u64) -> Vec<u8> {
    let mut state = seed;
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            b"ACGT"[(state >> 62) as usize]
        })
        .collect()
}

/// Gapped pair with a substitution every `every` bases and an indel every ten
/// substitutions.
fn aligned_pair(len: usize, every: usize) -> (String, String) {
    let reference = sequence(len, 7);
    let mut gapped_ref = Vec::with_capacity(len + len / every);
    let mut gapped_qry = Vec::with_capacity(len + len / every);
    for (i, &base) in reference.iter().enumerate() {
        if i > 0 && i % every == 0 {
            match (i / every) % 10 {
                0 => {
                    gapped_ref.push(base);
                    gapped_qry.push(b'-');
                }
                5 => {
                    gapped_ref.extend_from_slice(&[b'-', base]);
                    gapped_qry.extend_from_slice(&[b'T', base]);
                }
                _ => {
                    gapped_ref.push(base);
                    gapped_qry.push(if base == b'A' { b'C' } else { b'A' });
                }
            }
        } else {
            gapped_ref.push(base);
            gapped_qry.push(base);
        }
    }
    (
        String::from_utf8_lossy(&gapped_ref).into_owned(),
        String::from_utf8_lossy(&gapped_qry).into_owned(),
    )
}

// =============================================================================
// Extraction benchmarks
// =============================================================================

fn bench_extraction(c: &mut Criterion) {
    let extractor = DiffExtractor::new("REF.1");
    let mut group = c.benchmark_group("extraction");

    // SARS-CoV-2 sized genomes at increasing divergence
    for every in [1000usize, 100, 20] {
        let (reference, query) = aligned_pair(30_000, every);
        group.throughput(Throughput::Bytes(reference.len() as u64));
        group.bench_with_input(BenchmarkId::new("aligned", every), &(reference, query), |b, (r, q)| {
            b.iter(|| extractor.extract_aligned(black_box(r), black_box(q)))
        });
    }

    let reference = String::from_utf8_lossy(&sequence(30_000, 7)).into_owned();
    let mut query = reference.clone();
    let alt = if &reference[100..101] == "T" { "A" } else { "T" };
    query.replace_range(100..101, alt);
    group.bench_function("cigar", |b| {
        b.iter(|| extractor.extract_cigar(black_box(&reference), black_box(&query), "100=1X29899="))
    });

    group.finish();
}

// =============================================================================
// Lift benchmarks
// =============================================================================

fn bench_lift(c: &mut Criterion) {
    let (gapped_ref, gapped_qry) = aligned_pair(30_000, 20);
    let reference = gapped_ref.replace('-', "");

    // One long gene spanning the whole reference
    let coords: Vec<u64> = (0..29_997u64).collect();
    let protein: String = "M".repeat(coords.len() / 3 - 1);
    let mut table = CodonTable::new();
    table.add_gene(GeneCodons::from_cds("1", "G", "G.1", &coords, &protein, &reference).unwrap());

    let nt = DiffExtractor::new("REF.1")
        .extract_aligned(&gapped_ref, &gapped_qry)
        .unwrap();
    let engine = CodonLiftEngine::new(&table);

    let mut group = c.benchmark_group("lift");
    group.throughput(Throughput::Elements(nt.len() as u64));
    group.bench_function("lift_30kb", |b| b.iter(|| engine.lift(black_box(&nt))));
    group.finish();
}

// =============================================================================
// Nextclade and output benchmarks
// =============================================================================

fn bench_nextclade(c: &mut Criterion) {
    let reference = String::from_utf8_lossy(&sequence(30_000, 11)).into_owned();
    let substitutions: Vec<String> = (0..300)
        .map(|i| {
            let pos = i * 97;
            let ref_nuc = &reference[pos..pos + 1];
            let qry_nuc = if ref_nuc == "A" { "G" } else { "A" };
            format!(r#"{{"pos": {pos}, "refNuc": "{ref_nuc}", "qryNuc": "{qry_nuc}"}}"#)
        })
        .collect();
    let json = format!(
        r#"{{"seqName": "bench", "substitutions": [{}]}}"#,
        substitutions.join(",")
    );
    let result: NextcladeResult = serde_json::from_str(&json).unwrap();
    let adapter = NextcladeAdapter::new("REF.1", reference);

    let mut group = c.benchmark_group("nextclade");
    group.throughput(Throughput::Elements(300));
    group.bench_function("convert_300", |b| b.iter(|| adapter.convert(black_box(&result))));

    let sample = adapter.convert(&result).unwrap();
    group.bench_function("write_var_300", |b| {
        b.iter(|| write_var_file(Vec::with_capacity(32 * 1024), black_box(sample.records())))
    });
    group.finish();
}

criterion_group!(benches, bench_extraction, bench_lift, bench_nextclade);

criterion_main!(benches);
