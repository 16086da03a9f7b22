//! Error types for the tankgauge-csv codec.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("CSV input is empty")]
  Empty,

  #[error("CSV header has no {0:?} column")]
  MissingColumn(&'static str),

  #[error("line {line}: unterminated quoted field")]
  UnterminatedQuote { line: usize },

  #[error("line {line}: expected at least {expected} fields, found {found}")]
  ShortRow {
    line:     usize,
    expected: usize,
    found:    usize,
  },

  #[error("line {line}: invalid {column} {value:?}")]
  InvalidNumber {
    line:   usize,
    column: &'static str,
    value:  String,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
