//! Error types for `tankgauge-core`.

use thiserror::Error;
use uuid::Uuid;

/// Broad classification of an [`Error`], used by outer layers to pick a
/// response status without matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// Malformed or missing caller input.
  Validation,
  /// The operation referenced something that does not exist.
  NotFound,
  /// The operation would create something that already exists.
  Conflict,
  /// A table was found in an internally inconsistent state.
  Computation,
}

#[derive(Debug, Clone, Error)]
pub enum Error {
  // ── Validation ────────────────────────────────────────────────────────
  #[error("{field} must be a finite number")]
  NotFinite { field: &'static str },

  #[error("{field} must not be negative (got {value})")]
  Negative { field: &'static str, value: f64 },

  #[error("{field} must be greater than zero (got {value})")]
  NotPositive { field: &'static str, value: f64 },

  #[error("gauged level is required")]
  MissingLevel,

  #[error("observer must not be empty")]
  EmptyObserver,

  #[error("strapping entry at height {0} already exists")]
  DuplicateHeight(f64),

  #[error(
    "volume {volume} at height {height} breaks the monotonic volume curve \
     (allowed range {min}..={max})"
  )]
  NonMonotonicVolume {
    height: f64,
    volume: f64,
    min:    f64,
    max:    f64,
  },

  #[error("strapping table belongs to tank {table}, not tank {tank}")]
  TankMismatch { tank: Uuid, table: Uuid },

  // ── Not found ─────────────────────────────────────────────────────────
  #[error("no strapping entry at height {0}")]
  EntryNotFound(f64),

  #[error("tank not found: {0}")]
  TankNotFound(Uuid),

  // ── Conflict ──────────────────────────────────────────────────────────
  #[error("tank already exists: {0}")]
  DuplicateTank(Uuid),

  // ── Computation ───────────────────────────────────────────────────────
  #[error("strapping table is not strictly ascending at index {index}")]
  UnsortedTable { index: usize },

  #[error("strapping table volume decreases at index {index}")]
  DecreasingVolume { index: usize },
}

impl Error {
  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::NotFinite { .. }
      | Self::Negative { .. }
      | Self::NotPositive { .. }
      | Self::MissingLevel
      | Self::EmptyObserver
      | Self::DuplicateHeight(_)
      | Self::NonMonotonicVolume { .. }
      | Self::TankMismatch { .. } => ErrorKind::Validation,
      Self::EntryNotFound(_) | Self::TankNotFound(_) => ErrorKind::NotFound,
      Self::DuplicateTank(_) => ErrorKind::Conflict,
      Self::UnsortedTable { .. } | Self::DecreasingVolume { .. } => {
        ErrorKind::Computation
      }
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Reject NaN and infinities.
pub(crate) fn finite(field: &'static str, value: f64) -> Result<f64> {
  if value.is_finite() {
    Ok(value)
  } else {
    Err(Error::NotFinite { field })
  }
}

/// Finite and `>= 0`.
pub(crate) fn non_negative(field: &'static str, value: f64) -> Result<f64> {
  let value = finite(field, value)?;
  if value < 0.0 {
    return Err(Error::Negative { field, value });
  }
  Ok(value)
}

/// Finite and `> 0`.
pub(crate) fn positive(field: &'static str, value: f64) -> Result<f64> {
  let value = finite(field, value)?;
  if value <= 0.0 {
    return Err(Error::NotPositive { field, value });
  }
  Ok(value)
}
