//! [`GaugingService`]: the engine wired to a [`TankStore`].
//!
//! Every read-modify-write against one tank (strapping edits, gauging
//! submissions) runs under that tank's async mutex, so at most one writer
//! touches a tank at a time. Different tanks proceed in parallel. A mutex is
//! only created once the tank is known to exist.

use std::{
  collections::HashMap,
  sync::{Arc, Mutex, PoisonError},
};

use thiserror::Error;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::{
  ErrorKind,
  gauging::{GaugingEngine, GaugingOutcome, GaugingRecord, ReadingInput},
  store::TankStore,
  strapping::{StrappingEntry, StrappingTable, VolumeLookup},
  tank::{NewTank, Tank},
};

/// Error returned by [`GaugingService`] operations.
#[derive(Debug, Error)]
pub enum ServiceError {
  #[error(transparent)]
  Core(#[from] crate::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ServiceError {
  /// Wrap a store failure. A core `NotFound` or `Conflict` error anywhere in
  /// its source chain is surfaced as [`ServiceError::Core`], so callers can
  /// tell a missing or duplicate tank from a broken backend.
  pub fn store<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
    let mut cur: Option<&(dyn std::error::Error + 'static)> = Some(&e);
    while let Some(err) = cur {
      if let Some(core) = err.downcast_ref::<crate::Error>()
        && matches!(core.kind(), ErrorKind::NotFound | ErrorKind::Conflict)
      {
        return Self::Core(core.clone());
      }
      cur = err.source();
    }
    Self::Store(Box::new(e))
  }

  /// The core classification, or `None` for store failures.
  pub fn kind(&self) -> Option<ErrorKind> {
    match self {
      Self::Core(e) => Some(e.kind()),
      Self::Store(_) => None,
    }
  }
}

fn store_err<E: std::error::Error + Send + Sync + 'static>(e: E) -> ServiceError {
  ServiceError::store(e)
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;

/// Tank operations backed by a store.
pub struct GaugingService<S> {
  store:  Arc<S>,
  engine: GaugingEngine,
  locks:  Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>,
}

impl<S: TankStore> GaugingService<S> {
  pub fn new(store: Arc<S>, engine: GaugingEngine) -> Self {
    Self {
      store,
      engine,
      locks: Mutex::new(HashMap::new()),
    }
  }

  pub fn store(&self) -> &Arc<S> { &self.store }

  /// Callers must have confirmed that `id` exists.
  async fn lock_tank(&self, id: Uuid) -> OwnedMutexGuard<()> {
    let lock = {
      let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
      locks.entry(id).or_default().clone()
    };
    lock.lock_owned().await
  }

  #[cfg(test)]
  fn lock_count(&self) -> usize {
    self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
  }

  // ── Tanks ─────────────────────────────────────────────────────────────

  pub async fn create_tank(&self, input: NewTank) -> ServiceResult<Tank> {
    let tank = Tank::new(input)?;
    self.store.add_tank(&tank).await.map_err(store_err)?;
    tracing::info!(tank = %tank.tank_number, id = %tank.id, "tank provisioned");
    Ok(tank)
  }

  pub async fn tank(&self, id: Uuid) -> ServiceResult<Tank> {
    self
      .store
      .get_tank(id)
      .await
      .map_err(store_err)?
      .ok_or_else(|| crate::Error::TankNotFound(id).into())
  }

  pub async fn tanks(&self) -> ServiceResult<Vec<Tank>> {
    self.store.list_tanks().await.map_err(store_err)
  }

  // ── Strapping ─────────────────────────────────────────────────────────

  pub async fn strapping_table(&self, id: Uuid) -> ServiceResult<StrappingTable> {
    let tank = self.tank(id).await?;
    self.store.load_strapping_table(&tank).await.map_err(store_err)
  }

  pub async fn lookup_volume(&self, id: Uuid, level: f64) -> ServiceResult<VolumeLookup> {
    let table = self.strapping_table(id).await?;
    Ok(table.lookup_volume(level)?)
  }

  pub async fn add_strapping_entry(
    &self,
    id: Uuid,
    height: f64,
    volume: f64,
  ) -> ServiceResult<StrappingTable> {
    let tank = self.tank(id).await?;
    let _guard = self.lock_tank(id).await;
    let mut table = self.store.load_strapping_table(&tank).await.map_err(store_err)?;
    table.add_entry(height, volume)?;
    self.store.save_strapping_table(&table).await.map_err(store_err)?;
    tracing::debug!(tank = %id, height, volume, "strapping entry added");
    Ok(table)
  }

  pub async fn remove_strapping_entry(
    &self,
    id: Uuid,
    height: f64,
  ) -> ServiceResult<StrappingEntry> {
    let tank = self.tank(id).await?;
    let _guard = self.lock_tank(id).await;
    let mut table = self.store.load_strapping_table(&tank).await.map_err(store_err)?;
    let removed = table.remove_entry(height)?;
    self.store.save_strapping_table(&table).await.map_err(store_err)?;
    tracing::debug!(tank = %id, height, "strapping entry removed");
    Ok(removed)
  }

  /// Swap the whole table for `pairs`; the stored table is untouched if any
  /// pair is rejected.
  pub async fn replace_strapping_table(
    &self,
    id: Uuid,
    pairs: Vec<(f64, f64)>,
  ) -> ServiceResult<StrappingTable> {
    let tank = self.tank(id).await?;
    let _guard = self.lock_tank(id).await;
    let table = StrappingTable::with_entries(&tank, pairs)?;
    self.store.save_strapping_table(&table).await.map_err(store_err)?;
    tracing::info!(tank = %tank.tank_number, entries = table.len(), "strapping table replaced");
    Ok(table)
  }

  pub async fn clear_strapping_table(&self, id: Uuid) -> ServiceResult<()> {
    let tank = self.tank(id).await?;
    let _guard = self.lock_tank(id).await;
    let mut table = self.store.load_strapping_table(&tank).await.map_err(store_err)?;
    table.clear();
    self.store.save_strapping_table(&table).await.map_err(store_err)?;
    tracing::info!(tank = %id, "strapping table cleared");
    Ok(())
  }

  // ── Gauging ───────────────────────────────────────────────────────────

  /// Run `reading` through the engine and persist the record together with
  /// the refreshed tank snapshot. Nothing is written if the engine rejects
  /// the reading.
  pub async fn submit_reading(
    &self,
    id: Uuid,
    reading: ReadingInput,
  ) -> ServiceResult<GaugingOutcome> {
    self.tank(id).await?;
    let _guard = self.lock_tank(id).await;
    // Re-read under the lock: the snapshot may have moved while waiting.
    let tank = self.tank(id).await?;
    let table = self.store.load_strapping_table(&tank).await.map_err(store_err)?;

    let outcome = match self.engine.submit_reading(&tank, &table, reading) {
      Ok(outcome) => outcome,
      Err(e) => {
        tracing::warn!(tank = %tank.tank_number, error = %e, "gauging rejected");
        return Err(e.into());
      }
    };

    self
      .store
      .record_gauging(&outcome.record, &outcome.updated_tank)
      .await
      .map_err(store_err)?;

    tracing::info!(
      tank = %tank.tank_number,
      level = outcome.record.level,
      volume = outcome.record.volume,
      operator = %outcome.record.operator,
      "gauging recorded"
    );
    Ok(outcome)
  }

  pub async fn history(
    &self,
    id: Uuid,
    limit: Option<usize>,
  ) -> ServiceResult<Vec<GaugingRecord>> {
    self.tank(id).await?;
    self.store.gauging_history(id, limit).await.map_err(store_err)
  }
}
