//! Fuzz target for CIGAR parsing and extraction
//!
//! Arbitrary CIGAR strings are applied to a fixed sequence pair. Extraction
//! may fail but must never panic.

#![no_main]

use ferro_sonar::extractor::{parse_cigar, DiffExtractor};
use libfuzzer_sys::fuzz_target;

const REFERENCE: &str = "ATGGCTCATGTTTCAGGAAAATAACCCGGG";
const QUERY: &str = "ATGGCTTTCATGTTTCAGAAAATAGCCC";

fuzz_target!(|data: &[u8]| {
    if let Ok(cigar) = std::str::from_utf8(data) {
        if cigar.len() > 200 {
            return;
        }
        let _ = parse_cigar(cigar);
        let _ = DiffExtractor::new("REF.1").extract_cigar(REFERENCE, QUERY, cigar);
    }
});
