// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! Standard genetic code translation of altered codons.

use crate::variant::GAP;

/// Amino acid value of a codon that lost at least one base.
pub const DELETED_AA: &str = "-";

/// Amino acid value of an ambiguous codon.
pub const UNKNOWN_AA: u8 = b'X';

pub const STOP_AA: u8 = b'*';

// Standard code, codons ordered T, C, A, G at each position.
const STANDARD_CODE: &[u8; 64] =
    b"FFLLSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG";

fn base_index(base: u8) -> Option<usize> {
    match base {
        b'T' | b'U' => Some(0),
        b'C' => Some(1),
        b'A' => Some(2),
        b'G' => Some(3),
        _ => None,
    }
}

/// Unambiguous bases an IUPAC code stands for.
fn expand(base: u8) -> &'static [u8] {
    match base.to_ascii_uppercase() {
        b'A' => b"A",
        b'C' => b"C",
        b'G' => b"G",
        b'T' | b'U' => b"T",
        b'R' => b"AG",
        b'Y' => b"CT",
        b'S' => b"CG",
        b'W' => b"AT",
        b'K' => b"GT",
        b'M' => b"AC",
        b'B' => b"CGT",
        b'D' => b"AGT",
        b'H' => b"ACT",
        b'V' => b"ACG",
        b'N' => b"ACGT",
        _ => b"",
    }
}

/// Translate one codon.
///
/// Ambiguous codons translate to the shared amino acid when every expansion
/// agrees, otherwise to `X`.
pub fn translate_codon(codon: [u8; 3]) -> u8 {
    let [a, b, c] = codon.map(expand);
    let mut result: Option<u8> = None;

    for &x in a {
        for &y in b {
            for &z in c {
                let (Some(i), Some(j), Some(k)) = (base_index(x), base_index(y), base_index(z))
                else {
                    return UNKNOWN_AA;
                };
                let aa = STANDARD_CODE[i * 16 + j * 4 + k];
                match result {
                    Some(prev) if prev != aa => return UNKNOWN_AA,
                    _ => result = Some(aa),
                }
            }
        }
    }

    result.unwrap_or(UNKNOWN_AA)
}

/// Translate complete codons of `seq` up to the first stop codon.
///
/// A trailing partial codon is ignored. A stop in the first codon yields `*`.
pub fn translate_to_stop(seq: &str) -> String {
    let mut protein = String::with_capacity(seq.len() / 3);
    for chunk in seq.as_bytes().chunks_exact(3) {
        let aa = translate_codon([chunk[0], chunk[1], chunk[2]]);
        if aa == STOP_AA {
            if protein.is_empty() {
                protein.push(STOP_AA as char);
            }
            break;
        }
        protein.push(aa as char);
    }
    protein
}

/// Amino acid(s) encoded by an altered codon.
///
/// Returns [`DELETED_AA`] if any base is a gap.
pub fn translate_altered(codon: &str) -> String {
    if codon.bytes().any(|b| b == GAP) {
        DELETED_AA.to_string()
    } else {
        translate_to_stop(codon)
    }
}
