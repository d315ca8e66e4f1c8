//! Structured fuzz target for aligned-pair extraction
//!
//! Generates alignment columns with the arbitrary crate and checks that the
//! extracted records rebuild the query from the reference.

#![no_main]

use arbitrary::Arbitrary;
use ferro_sonar::extractor::DiffExtractor;
use ferro_sonar::variant::restore_sequence;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Clone, Copy, Arbitrary)]
enum Base {
    A,
    C,
    G,
    T,
    N,
}

impl Base {
    fn byte(self) -> u8 {
        match self {
            Base::A => b'A',
            Base::C => b'C',
            Base::G => b'G',
            Base::T => b'T',
            Base::N => b'N',
        }
    }
}

#[derive(Debug, Arbitrary)]
enum Column {
    Pair(Base, Base),
    RefGap(Base),
    QryGap(Base),
    BothGap,
}

fuzz_target!(|columns: Vec<Column>| {
    if columns.len() > 500 {
        return;
    }

    let mut reference = String::new();
    let mut query = String::new();
    for col in &columns {
        let (r, q) = match *col {
            Column::Pair(r, q) => (r.byte(), q.byte()),
            Column::RefGap(q) => (b'-', q.byte()),
            Column::QryGap(r) => (r.byte(), b'-'),
            Column::BothGap => (b'-', b'-'),
        };
        reference.push(r as char);
        query.push(q as char);
    }

    let vars = DiffExtractor::new("REF.1")
        .extract_aligned(&reference, &query)
        .expect("equal-length input");
    let restored = restore_sequence(&reference.replace('-', ""), &vars).expect("records in bounds");
    assert_eq!(restored, query.replace('-', ""));
});
