//! Change reporting.
//!
//! Renders the diff as one colon-delimited record per changed entry, removed
//! entries first. This stream is the machine-parseable output of the tool and
//! its format is stable: change kind, 4-column type tag, 10-column
//! right-justified size, entry name.

use std::io::{self, Write};

use crate::diff::DiffReport;
use crate::entry::EntryDescriptor;
use crate::DiffError;

fn record(kind: &str, entry: &EntryDescriptor) -> String {
    format!(":{}:{:>4}:{:>10}:{}", kind, entry.type_tag(), entry.size, entry.name)
}

/// Writes the full report to `out`, removed entries first, each snapshot's
/// order preserved.
pub fn write_report<W: Write>(out: &mut W, report: &DiffReport) -> io::Result<()> {
    for entry in &report.removed {
        writeln!(out, "{}", record("removed", entry))?;
    }
    for entry in &report.added_or_modified {
        writeln!(out, "{}", record("modified", entry))?;
    }
    Ok(())
}

/// Emits the report on stderr, the tool's diagnostic stream. A failing
/// stderr has no path to attach, so it surfaces as the catch-all error.
pub fn print_report(report: &DiffReport) -> Result<(), DiffError> {
    let stderr = io::stderr();
    write_report(&mut stderr.lock(), report).map_err(|e| DiffError::Other(e.into()))
}
