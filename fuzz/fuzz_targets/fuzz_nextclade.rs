//! Fuzz target for Nextclade input
//!
//! Feeds arbitrary bytes through the reader and converts whatever parses.
//! Bad coordinates must surface as errors, not panics.

#![no_main]

use ferro_sonar::nextclade::{NextcladeAdapter, NextcladeReader};
use libfuzzer_sys::fuzz_target;

const REFERENCE: &str = "ATGGCTCATGTTTCAGGAAAATAACCCGGG";

fuzz_target!(|data: &[u8]| {
    if data.len() > 10_000 {
        return;
    }
    let Ok(reader) = NextcladeReader::new(data, 16) else {
        return;
    };
    let adapter = NextcladeAdapter::new("REF.1", REFERENCE);
    for chunk in reader.flatten() {
        for result in &chunk {
            let _ = adapter.convert(result);
        }
    }
});
