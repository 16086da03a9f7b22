//! [`SqliteStore`], the SQLite implementation of [`TankStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use tankgauge_core::{
  Error as CoreError,
  gauging::GaugingRecord,
  store::TankStore,
  strapping::StrappingTable,
  tank::Tank,
};

use crate::{
  Error, Result,
  encode::{RECORD_COLUMNS, RawRecord, RawTank, TANK_COLUMNS, encode_dt, encode_uuid},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A tank gauging store backed by a single SQLite file.
///
/// Clones share the inner connection.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// Parameters for the snapshot columns shared by INSERT and UPDATE.
struct TankParams {
  id:                  String,
  tank_number:         String,
  product:             String,
  capacity:            f64,
  diameter:            Option<f64>,
  height:              Option<f64>,
  current_level:       f64,
  current_temperature: Option<f64>,
  current_volume:      f64,
  water_level:         f64,
  last_gauged:         Option<String>,
  status:              String,
}

impl From<&Tank> for TankParams {
  fn from(tank: &Tank) -> Self {
    Self {
      id:                  encode_uuid(tank.id),
      tank_number:         tank.tank_number.clone(),
      product:             tank.product.clone(),
      capacity:            tank.capacity,
      diameter:            tank.diameter,
      height:              tank.height,
      current_level:       tank.current_level,
      current_temperature: tank.current_temperature,
      current_volume:      tank.current_volume,
      water_level:         tank.water_level,
      last_gauged:         tank.last_gauged.map(encode_dt),
      status:              tank.status.to_string(),
    }
  }
}

// ─── TankStore impl ──────────────────────────────────────────────────────────

impl TankStore for SqliteStore {
  type Error = Error;

  // ── Tanks ─────────────────────────────────────────────────────────────────

  async fn add_tank(&self, tank: &Tank) -> Result<()> {
    let p = TankParams::from(tank);

    let inserted = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "INSERT OR IGNORE INTO tanks (
             tank_id, tank_number, product, capacity, diameter, height,
             current_level, current_temperature, current_volume, water_level,
             last_gauged, status
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
          rusqlite::params![
            p.id,
            p.tank_number,
            p.product,
            p.capacity,
            p.diameter,
            p.height,
            p.current_level,
            p.current_temperature,
            p.current_volume,
            p.water_level,
            p.last_gauged,
            p.status,
          ],
        )?;
        Ok(n == 1)
      })
      .await?;

    if !inserted {
      return Err(CoreError::DuplicateTank(tank.id).into());
    }
    Ok(())
  }

  async fn get_tank(&self, id: Uuid) -> Result<Option<Tank>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawTank> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {TANK_COLUMNS} FROM tanks WHERE tank_id = ?1"),
              rusqlite::params![id_str],
              RawTank::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawTank::into_tank).transpose()
  }

  async fn list_tanks(&self) -> Result<Vec<Tank>> {
    let raws: Vec<RawTank> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {TANK_COLUMNS} FROM tanks ORDER BY tank_number, tank_id"
        ))?;
        let rows = stmt
          .query_map([], RawTank::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTank::into_tank).collect()
  }

  // ── Strapping tables ──────────────────────────────────────────────────────

  async fn load_strapping_table(&self, tank: &Tank) -> Result<StrappingTable> {
    let id_str = encode_uuid(tank.id);

    let pairs: Vec<(f64, f64)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT height, volume FROM strapping_entries
           WHERE tank_id = ?1 ORDER BY height",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(StrappingTable::with_entries(tank, pairs)?)
  }

  async fn save_strapping_table(&self, table: &StrappingTable) -> Result<()> {
    let tank_id = table.tank_id();
    let id_str = encode_uuid(tank_id);
    let pairs: Vec<(f64, f64)> =
      table.entries().iter().map(|e| (e.height, e.volume)).collect();

    let known = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let known = tx
          .query_row(
            "SELECT 1 FROM tanks WHERE tank_id = ?1",
            rusqlite::params![id_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !known {
          return Ok(false);
        }

        tx.execute(
          "DELETE FROM strapping_entries WHERE tank_id = ?1",
          rusqlite::params![id_str],
        )?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO strapping_entries (tank_id, height, volume) VALUES (?1, ?2, ?3)",
          )?;
          for (height, volume) in &pairs {
            stmt.execute(rusqlite::params![id_str, height, volume])?;
          }
        }
        tx.commit()?;
        Ok(true)
      })
      .await?;

    if !known {
      return Err(CoreError::TankNotFound(tank_id).into());
    }
    tracing::debug!(tank = %tank_id, entries = table.len(), "strapping table saved");
    Ok(())
  }

  // ── Gauging ───────────────────────────────────────────────────────────────

  async fn record_gauging(&self, record: &GaugingRecord, tank: &Tank) -> Result<()> {
    let record_id = encode_uuid(record.id);
    let record_tank = encode_uuid(record.tank_id);
    let gauge_time = encode_dt(record.gauge_time);
    let level = record.level;
    let temperature = record.temperature;
    let water_level = record.water_level;
    let volume = record.volume;
    let calculated_volume = record.calculated_volume;
    let gauge_type = record.gauge_type.to_string();
    let operator = record.operator.clone();
    let variance = record.variance;
    let notes = record.notes.clone();
    let p = TankParams::from(tank);

    let updated = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO gauging_records (
             record_id, tank_id, gauge_time, level, temperature, water_level,
             volume, calculated_volume, gauge_type, operator, variance, notes
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
          rusqlite::params![
            record_id,
            record_tank,
            gauge_time,
            level,
            temperature,
            water_level,
            volume,
            calculated_volume,
            gauge_type,
            operator,
            variance,
            notes,
          ],
        )?;
        let n = tx.execute(
          "UPDATE tanks SET
             current_level = ?2, current_temperature = ?3, current_volume = ?4,
             water_level = ?5, last_gauged = ?6, status = ?7
           WHERE tank_id = ?1",
          rusqlite::params![
            p.id,
            p.current_level,
            p.current_temperature,
            p.current_volume,
            p.water_level,
            p.last_gauged,
            p.status,
          ],
        )?;
        if n != 1 {
          // Dropping `tx` rolls the record insert back.
          return Ok(false);
        }
        tx.commit()?;
        Ok(true)
      })
      .await?;

    if !updated {
      return Err(CoreError::TankNotFound(tank.id).into());
    }
    Ok(())
  }

  async fn gauging_history(
    &self,
    tank_id: Uuid,
    limit: Option<usize>,
  ) -> Result<Vec<GaugingRecord>> {
    let id_str = encode_uuid(tank_id);
    // SQLite treats a negative LIMIT as "no limit".
    let limit_val = limit.map_or(-1, |l| i64::try_from(l).unwrap_or(i64::MAX));

    let raws: Vec<RawRecord> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {RECORD_COLUMNS} FROM gauging_records
           WHERE tank_id = ?1
           ORDER BY gauge_time DESC, rowid DESC
           LIMIT ?2"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id_str, limit_val], RawRecord::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRecord::into_record).collect()
  }
}
