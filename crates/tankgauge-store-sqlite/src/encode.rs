//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, UUIDs as hyphenated lowercase
//! strings, enums as their lowercase names.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use tankgauge_core::{
  gauging::{GaugeType, GaugingRecord},
  tank::{Tank, TankStatus},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

/// Fixed-width nanosecond precision, so stored values sort chronologically
/// as plain text.
pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Enums ───────────────────────────────────────────────────────────────────

fn decode_enum<T: FromStr>(column: &'static str, s: &str) -> Result<T> {
  s.parse().map_err(|_| Error::UnknownEnum {
    column,
    value: s.to_owned(),
  })
}

pub fn decode_status(s: &str) -> Result<TankStatus> { decode_enum("status", s) }

pub fn decode_gauge_type(s: &str) -> Result<GaugeType> {
  decode_enum("gauge_type", s)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `tanks` row.
pub struct RawTank {
  pub tank_id:             String,
  pub tank_number:         String,
  pub product:             String,
  pub capacity:            f64,
  pub diameter:            Option<f64>,
  pub height:              Option<f64>,
  pub current_level:       f64,
  pub current_temperature: Option<f64>,
  pub current_volume:      f64,
  pub water_level:         f64,
  pub last_gauged:         Option<String>,
  pub status:              String,
}

/// Column list matching [`RawTank::from_row`].
pub const TANK_COLUMNS: &str = "tank_id, tank_number, product, capacity, \
  diameter, height, current_level, current_temperature, current_volume, \
  water_level, last_gauged, status";

impl RawTank {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      tank_id:             row.get(0)?,
      tank_number:         row.get(1)?,
      product:             row.get(2)?,
      capacity:            row.get(3)?,
      diameter:            row.get(4)?,
      height:              row.get(5)?,
      current_level:       row.get(6)?,
      current_temperature: row.get(7)?,
      current_volume:      row.get(8)?,
      water_level:         row.get(9)?,
      last_gauged:         row.get(10)?,
      status:              row.get(11)?,
    })
  }

  pub fn into_tank(self) -> Result<Tank> {
    Ok(Tank {
      id:                  decode_uuid(&self.tank_id)?,
      tank_number:         self.tank_number,
      product:             self.product,
      capacity:            self.capacity,
      diameter:            self.diameter,
      height:              self.height,
      current_level:       self.current_level,
      current_temperature: self.current_temperature,
      current_volume:      self.current_volume,
      water_level:         self.water_level,
      last_gauged:         self.last_gauged.as_deref().map(decode_dt).transpose()?,
      status:              decode_status(&self.status)?,
    })
  }
}

/// Raw values read directly from a `gauging_records` row.
pub struct RawRecord {
  pub record_id:         String,
  pub tank_id:           String,
  pub gauge_time:        String,
  pub level:             f64,
  pub temperature:       Option<f64>,
  pub water_level:       f64,
  pub volume:            f64,
  pub calculated_volume: f64,
  pub gauge_type:        String,
  pub operator:          String,
  pub variance:          Option<f64>,
  pub notes:             Option<String>,
}

/// Column list matching [`RawRecord::from_row`].
pub const RECORD_COLUMNS: &str = "record_id, tank_id, gauge_time, level, \
  temperature, water_level, volume, calculated_volume, gauge_type, operator, \
  variance, notes";

impl RawRecord {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      record_id:         row.get(0)?,
      tank_id:           row.get(1)?,
      gauge_time:        row.get(2)?,
      level:             row.get(3)?,
      temperature:       row.get(4)?,
      water_level:       row.get(5)?,
      volume:            row.get(6)?,
      calculated_volume: row.get(7)?,
      gauge_type:        row.get(8)?,
      operator:          row.get(9)?,
      variance:          row.get(10)?,
      notes:             row.get(11)?,
    })
  }

  pub fn into_record(self) -> Result<GaugingRecord> {
    Ok(GaugingRecord {
      id:                decode_uuid(&self.record_id)?,
      tank_id:           decode_uuid(&self.tank_id)?,
      gauge_time:        decode_dt(&self.gauge_time)?,
      level:             self.level,
      temperature:       self.temperature,
      water_level:       self.water_level,
      volume:            self.volume,
      calculated_volume: self.calculated_volume,
      gauge_type:        decode_gauge_type(&self.gauge_type)?,
      operator:          self.operator,
      variance:          self.variance,
      notes:             self.notes,
    })
  }
}
