//! Error type for `tankgauge-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Stored rows that no longer satisfy the domain invariants, or a write
  /// that targets a missing or existing tank.
  #[error("core error: {0}")]
  Core(#[from] tankgauge_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unknown {column} value: {value:?}")]
  UnknownEnum { column: &'static str, value: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
