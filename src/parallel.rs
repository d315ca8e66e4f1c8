// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! Parallel processing support for ferro-sonar
//!
//! Samples are independent, so each one runs as its own rayon task. Results
//! come back in input order and a failing sample never affects the others.
//! Enable with the `parallel` feature.
//!
//! # Example
//!
//! ```
//! # #[cfg(feature = "parallel")]
//! # fn main() {
//! use ferro_sonar::extractor::AlignmentInput;
//! use ferro_sonar::parallel::{run_samples_parallel, ParallelStats};
//! use ferro_sonar::pipeline::{SampleInput, VariantPipeline};
//!
//! let samples: Vec<SampleInput> = ["ATGT", "ACGA", "ACG"]
//!     .iter()
//!     .enumerate()
//!     .map(|(i, q)| {
//!         SampleInput::new(
//!             format!("s{i}"),
//!             AlignmentInput::Aligned { reference: "ACGT".into(), query: q.to_string() },
//!         )
//!     })
//!     .collect();
//!
//! let pipeline = VariantPipeline::new("REF.1");
//! let results = run_samples_parallel(&pipeline, &samples);
//! let stats = ParallelStats::from_results(&results);
//! assert_eq!((stats.success, stats.errors), (2, 1));
//! # }
//! # #[cfg(not(feature = "parallel"))]
//! # fn main() {}
//! ```

use rayon::prelude::*;

use crate::error::SonarError;
use crate::nextclade::{NextcladeAdapter, NextcladeResult};
use crate::pipeline::{SampleInput, SampleVariants, VariantPipeline};

/// Process alignment samples in parallel
///
/// Returns one result per sample. Order is preserved.
pub fn run_samples_parallel(
    pipeline: &VariantPipeline<'_>,
    samples: &[SampleInput],
) -> Vec<Result<SampleVariants, SonarError>> {
    samples.par_iter().map(|s| pipeline.run(s)).collect()
}

/// Convert Nextclade results in parallel
///
/// Returns one result per input. Order is preserved.
pub fn convert_nextclade_parallel(
    adapter: &NextcladeAdapter,
    results: &[NextcladeResult],
) -> Vec<Result<SampleVariants, SonarError>> {
    results.par_iter().map(|r| adapter.convert(r)).collect()
}

/// Worker pool settings
#[derive(Debug, Clone)]
pub struct ParallelConfig {
    /// Nextclade results converted per chunk
    pub chunk_size: usize,
    /// Worker threads (0 = one per core)
    pub num_threads: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            chunk_size: crate::nextclade::DEFAULT_CHUNK_SIZE,
            num_threads: 0,
        }
    }
}

impl ParallelConfig {
    /// Create a new parallel configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the chunk size for batched processing
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    /// Set the number of threads
    pub fn with_num_threads(mut self, threads: usize) -> Self {
        self.num_threads = threads;
        self
    }

    /// Build a dedicated thread pool for this configuration
    pub fn build_pool(&self) -> Result<rayon::ThreadPool, SonarError> {
        rayon::ThreadPoolBuilder::new()
            .num_threads(self.num_threads)
            .build()
            .map_err(|e| SonarError::Config {
                msg: format!("cannot start {} workers: {}", self.num_threads, e),
            })
    }
}

/// Per-sample outcome counts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParallelStats {
    /// Samples seen
    pub total: usize,
    /// Samples converted
    pub success: usize,
    /// Samples that failed
    pub errors: usize,
}

impl ParallelStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Count successes and failures in `results`
    pub fn from_results<T, E>(results: &[Result<T, E>]) -> Self {
        let mut stats = Self::new();
        stats.record(results);
        stats
    }

    /// Add the outcomes of another batch
    pub fn record<T, E>(&mut self, results: &[Result<T, E>]) {
        let success = results.iter().filter(|r| r.is_ok()).count();
        self.total += results.len();
        self.success += success;
        self.errors += results.len() - success;
    }

    /// Calculate success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.success as f64 / self.total as f64) * 100.0
        }
    }
}
