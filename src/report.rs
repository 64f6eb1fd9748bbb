//! Fixed-width text report
//!
//! The report holds two tables: every input record in input order, then every
//! accepted record with its rank in result order.
//!
//! ```text
//! ------------------------------------------
//! |               INPUT DATA               |
//! ------------------------------------------
//! |Manufacturer |     Date|        Distance|
//! ------------------------------------------
//! |Honda        |     2015|        12000.00|
//! ------------------------------------------
//! ```

use std::fmt;
use std::io;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::info;

use crate::{RankedRecord, Record, ReportError, Result};

const INPUT_WIDTH: usize = 42;
const OUTPUT_WIDTH: usize = 48;

fn rule<W: fmt::Write>(out: &mut W, width: usize) -> fmt::Result {
    writeln!(out, "{}", "-".repeat(width))
}

/// Writes the input and output tables into `out`
pub fn write_tables<W: fmt::Write>(
    out: &mut W,
    input: &[Record],
    output: &[RankedRecord],
) -> fmt::Result {
    rule(out, INPUT_WIDTH)?;
    writeln!(out, "|{:>25}{:>16}", "INPUT DATA", '|')?;
    rule(out, INPUT_WIDTH)?;
    writeln!(out, "{:<14}|{:>10}{:>17}", "|Manufacturer", "Date|", "Distance|")?;
    rule(out, INPUT_WIDTH)?;
    for record in input {
        writeln!(
            out,
            "|{:<13}|{:>9}|{:>16.2}|",
            record.manufacturer, record.date, record.distance
        )?;
    }
    rule(out, INPUT_WIDTH)?;
    writeln!(out)?;

    rule(out, OUTPUT_WIDTH)?;
    writeln!(out, "|{:>29}{:>18}", "OUTPUT DATA", '|')?;
    rule(out, OUTPUT_WIDTH)?;
    writeln!(
        out,
        "{:<14}|{:>10}{:>17}{:>6}",
        "|Manufacturer", "Date|", "Distance|", "Rank|"
    )?;
    rule(out, OUTPUT_WIDTH)?;
    for ranked in output {
        writeln!(
            out,
            "|{:<13}|{:>9}|{:>17.2}|{:>4}|",
            ranked.record.manufacturer, ranked.record.date, ranked.record.distance, ranked.rank
        )?;
    }
    rule(out, OUTPUT_WIDTH)
}

/// Renders the input and output tables into a string
#[must_use]
pub fn render_report(input: &[Record], output: &[RankedRecord]) -> String {
    let mut out = String::new();
    write_tables(&mut out, input, output).expect("writing to a String is infallible");
    out
}

/// Renders the report and writes it to `path`
///
/// The report is staged in a temporary file next to `path` and renamed into
/// place, so `path` either keeps its previous content or holds the full report.
pub fn write_report<P: AsRef<Path>>(
    path: P,
    input: &[Record],
    output: &[RankedRecord],
) -> Result<()> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => Path::new("."),
        Some(parent) => parent,
        None => return Err(ReportError::MissingParent(path.to_path_buf()).into()),
    };

    let report = render_report(input, output);
    let mut staged = NamedTempFile::new_in(parent)?;
    io::Write::write_all(&mut staged, report.as_bytes())?;
    io::Write::flush(&mut staged)?;
    staged.persist(path).map_err(|err| err.error)?;

    info!(path = %path.display(), rows = output.len(), "wrote report");
    Ok(())
}
