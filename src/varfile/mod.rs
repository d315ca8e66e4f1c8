// Copyright (c) 2024-2025 Fulcrum Genomics LLC
// SPDX-License-Identifier: MIT

//! Tab-separated var files.
//!
//! One file per sample. A header line is followed by one row per record,
//! nucleotide records first, and a final line holding exactly `//`:
//!
//! ```text
//! #id  ref  start  end  alt  accs  label  type  parent_id  frameshift
//! 1    C    1      2    T    REF.1 C2T    nt    1          0
//! //
//! ```
//!
//! Deletions carry a single space in `alt`, so rows are split on tabs only.
//! Downstream importers locate the end of a complete file by the `//` line.

mod reader;
mod writer;

pub use reader::{read_var_file, read_var_path};
pub use writer::{write_var_file, write_var_path, VarFileWriter};

/// Column header line.
pub const HEADER: &str = "#id\tref\tstart\tend\talt\taccs\tlabel\ttype\tparent_id\tframeshift";

/// Last line of a complete var file.
pub const TERMINATOR: &str = "//";
