//! Plain-text coverage reports.
//!
//! One line per device:
//!
//! ```text
//! Best link station for point 0,0 is 0,0 with power 100
//! No link station within reach for point 100,100
//! ```
//!
//! Numbers use the shortest representation that round-trips to the same
//! `f64`.

use std::io::{self, Write};

use crate::eval::Coverage;

/// Formats a single result as a report line (without a newline).
pub fn format_coverage(coverage: &Coverage) -> String {
    let device = coverage.device.position;
    match coverage.station {
        Some(station) => format!(
            "Best link station for point {},{} is {},{} with power {}",
            device.x, device.y, station.position.x, station.position.y, coverage.power
        ),
        None => format!(
            "No link station within reach for point {},{}",
            device.x, device.y
        ),
    }
}

/// Formats all results, one newline-terminated line each.
pub fn format_report(results: &[Coverage]) -> String {
    let mut report = String::new();
    for coverage in results {
        report.push_str(&format_coverage(coverage));
        report.push('\n');
    }
    report
}

/// Writes the report for `results` to `out`.
pub fn write_report<W: Write>(out: &mut W, results: &[Coverage]) -> io::Result<()> {
    for coverage in results {
        writeln!(out, "{}", format_coverage(coverage))?;
    }
    out.flush()
}
