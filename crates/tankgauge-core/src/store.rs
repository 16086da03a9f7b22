//! The `TankStore` trait, the persistence collaborator.
//!
//! Implemented by storage backends (e.g. `tankgauge-store-sqlite`). The
//! engine never calls it; [`crate::service::GaugingService`] does, after the
//! engine has accepted a reading.

use std::future::Future;

use uuid::Uuid;

use crate::{
  gauging::GaugingRecord,
  strapping::StrappingTable,
  tank::Tank,
};

/// Abstraction over a tank/gauging store backend.
///
/// Gauging records are append-only. Tank snapshots are overwritten in place,
/// always together with the record that produced them.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait TankStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Tanks ─────────────────────────────────────────────────────────────

  /// Persist a newly provisioned tank (see [`Tank::new`]).
  fn add_tank<'a>(
    &'a self,
    tank: &'a Tank,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Retrieve a tank by id. Returns `None` if not found.
  fn get_tank(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Tank>, Self::Error>> + Send + '_;

  /// All tanks, ordered by tank number.
  fn list_tanks(
    &self,
  ) -> impl Future<Output = Result<Vec<Tank>, Self::Error>> + Send + '_;

  // ── Strapping tables ──────────────────────────────────────────────────

  /// The stored calibration table for `tank`; empty if none was stored.
  fn load_strapping_table<'a>(
    &'a self,
    tank: &'a Tank,
  ) -> impl Future<Output = Result<StrappingTable, Self::Error>> + Send + 'a;

  /// Replace every stored entry of `table`'s tank with `table`'s entries.
  fn save_strapping_table<'a>(
    &'a self,
    table: &'a StrappingTable,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Gauging ───────────────────────────────────────────────────────────

  /// Append `record` and overwrite the snapshot of `tank` in one
  /// transaction.
  fn record_gauging<'a>(
    &'a self,
    record: &'a GaugingRecord,
    tank: &'a Tank,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Records for `tank_id`, newest first, at most `limit` if given.
  fn gauging_history(
    &self,
    tank_id: Uuid,
    limit: Option<usize>,
  ) -> impl Future<Output = Result<Vec<GaugingRecord>, Self::Error>> + Send + '_;
}
