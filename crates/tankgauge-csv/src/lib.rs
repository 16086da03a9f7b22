//! CSV codec for strapping tables and gauging history.
//!
//! Converts between CSV text and [`tankgauge_core`] domain types. Pure
//! synchronous; no HTTP or database dependencies.
//!
//! # Quick start
//!
//! ```no_run
//! let csv = "height,volume\n0,0\n10,5000\n20,12000\n";
//! let pairs = tankgauge_csv::parse_strapping_csv(csv).unwrap();
//! assert_eq!(pairs.len(), 3);
//! ```

pub mod error;
mod parse;
mod write;

pub use error::{Error, Result};
use tankgauge_core::{gauging::GaugingRecord, strapping::StrappingTable};

/// Parse a strapping-table CSV into `(height, volume)` pairs.
///
/// The first non-blank line is a header naming at least `height` and
/// `volume` (any order, any case); other columns such as `quarter_inch` are
/// ignored. Pairs are returned in file order; feed them to
/// [`StrappingTable::with_entries`] to validate and sort them.
pub fn parse_strapping_csv(input: &str) -> Result<Vec<(f64, f64)>> {
  parse::parse_strapping(input)
}

/// Serialize `table` as `height,volume,quarter_inch` rows.
pub fn write_strapping_csv(table: &StrappingTable) -> String {
  write::write_strapping(table)
}

/// Serialize gauging records, one row per record, in the given order.
/// Missing optional values are left blank.
pub fn write_gauging_csv(records: &[GaugingRecord]) -> String {
  write::write_gauging(records)
}
