//! Gauging: turning a field reading into a record and a tank snapshot.
//!
//! [`GaugingEngine`] is pure: it validates a [`ReadingInput`], resolves the
//! volume through the tank's [`StrappingTable`], and describes the two
//! resulting entities. Persisting them is the caller's job.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::{
  Error, Result,
  error::{finite, non_negative},
  strapping::{StrappingTable, VolumeLookup},
  tank::{Tank, TankStatus, clamp_to_capacity},
};

// ─── Clock ───────────────────────────────────────────────────────────────────

/// Source of submission instants.
pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> { Utc::now() }
}

/// Always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
  fn now(&self) -> DateTime<Utc> { self.0 }
}

// ─── Net volume ──────────────────────────────────────────────────────────────

/// Correction from gross to net volume given the free-water level.
pub trait NetVolume: Send + Sync {
  fn net_volume(
    &self,
    gross: &VolumeLookup,
    water_level: f64,
    table: &StrappingTable,
  ) -> f64;
}

/// No correction: net equals gross.
#[derive(Debug, Clone, Copy, Default)]
pub struct GrossVolume;

impl NetVolume for GrossVolume {
  fn net_volume(&self, gross: &VolumeLookup, _: f64, _: &StrappingTable) -> f64 {
    gross.volume
  }
}

// ─── Readings and records ────────────────────────────────────────────────────

/// How a reading was taken.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum GaugeType {
  #[default]
  Manual,
  Automatic,
}

/// A raw field reading as entered by an observer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadingInput {
  /// Gauged height in feet. Required.
  pub level:       Option<f64>,
  /// °F. `None` means the temperature was not read.
  #[serde(default)]
  pub temperature: Option<f64>,
  /// Free-water height in feet; 0 when absent.
  #[serde(default)]
  pub water_level: Option<f64>,
  /// Missing or blank is rejected by the engine, not by deserialization.
  #[serde(default)]
  pub observer:    String,
  #[serde(default)]
  pub notes:       Option<String>,
  #[serde(default)]
  pub gauge_type:  GaugeType,
}

impl ReadingInput {
  /// A manual reading with only the required fields set.
  pub fn new(level: f64, observer: impl Into<String>) -> Self {
    Self {
      level: Some(level),
      observer: observer.into(),
      ..Self::default()
    }
  }
}

/// An accepted reading. Never mutated once created; corrections are new
/// records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaugingRecord {
  pub id:                Uuid,
  pub tank_id:           Uuid,
  pub gauge_time:        DateTime<Utc>,
  /// Feet.
  pub level:             f64,
  pub temperature:       Option<f64>,
  pub water_level:       f64,
  /// Gross volume at `gauge_time`.
  pub volume:            f64,
  /// Same as `volume`; kept for audit parity.
  pub calculated_volume: f64,
  pub gauge_type:        GaugeType,
  pub operator:          String,
  /// Reconciliation delta; 0 on creation.
  pub variance:          Option<f64>,
  pub notes:             Option<String>,
}

/// Everything an accepted submission produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GaugingOutcome {
  pub record:       GaugingRecord,
  pub updated_tank: Tank,
  pub lookup:       VolumeLookup,
  pub net_volume:   f64,
}

// ─── Engine ──────────────────────────────────────────────────────────────────

/// Stateless reading → record/snapshot converter.
#[derive(Clone)]
pub struct GaugingEngine {
  clock: Arc<dyn Clock>,
  net:   Arc<dyn NetVolume>,
}

impl Default for GaugingEngine {
  fn default() -> Self { Self::new(Arc::new(SystemClock)) }
}

impl GaugingEngine {
  pub fn new(clock: Arc<dyn Clock>) -> Self {
    Self {
      clock,
      net: Arc::new(GrossVolume),
    }
  }

  /// Replace the gross→net correction.
  pub fn with_net_volume(mut self, net: Arc<dyn NetVolume>) -> Self {
    self.net = net;
    self
  }

  /// Submit `reading` at the engine clock's current instant.
  pub fn submit_reading(
    &self,
    tank: &Tank,
    table: &StrappingTable,
    reading: ReadingInput,
  ) -> Result<GaugingOutcome> {
    self.submit_reading_at(tank, table, reading, self.clock.now())
  }

  /// Submit `reading` as taken at `at`.
  pub fn submit_reading_at(
    &self,
    tank: &Tank,
    table: &StrappingTable,
    reading: ReadingInput,
    at: DateTime<Utc>,
  ) -> Result<GaugingOutcome> {
    let reading = validate(tank, table, reading)?;

    let lookup = table.lookup_volume(reading.level)?;
    let net_volume = self.net.net_volume(&lookup, reading.water_level, table);

    let record = GaugingRecord {
      id:                Uuid::new_v4(),
      tank_id:           tank.id,
      gauge_time:        at,
      level:             reading.level,
      temperature:       reading.temperature,
      water_level:       reading.water_level,
      volume:            lookup.volume,
      calculated_volume: lookup.volume,
      gauge_type:        reading.gauge_type,
      operator:          reading.observer,
      variance:          Some(0.0),
      notes:             reading.notes,
    };

    let mut updated_tank = tank.clone();
    updated_tank.current_level = record.level;
    if let Some(t) = record.temperature {
      updated_tank.current_temperature = Some(t);
    }
    updated_tank.current_volume = clamp_to_capacity(tank, lookup.volume)?;
    updated_tank.water_level = record.water_level;
    updated_tank.last_gauged = Some(at);
    if lookup.volume > tank.capacity {
      tracing::warn!(
        tank = %tank.tank_number,
        volume = lookup.volume,
        capacity = tank.capacity,
        "gauged volume exceeds capacity"
      );
      updated_tank.status = TankStatus::Alarm;
    } else if tank.status == TankStatus::Alarm {
      tracing::info!(tank = %tank.tank_number, "gauged volume back within capacity");
      updated_tank.status = TankStatus::Normal;
    }

    Ok(GaugingOutcome {
      record,
      updated_tank,
      lookup,
      net_volume,
    })
  }
}

/// A reading that passed validation, with defaults applied.
struct ValidReading {
  level:       f64,
  temperature: Option<f64>,
  water_level: f64,
  observer:    String,
  notes:       Option<String>,
  gauge_type:  GaugeType,
}

fn validate(
  tank: &Tank,
  table: &StrappingTable,
  reading: ReadingInput,
) -> Result<ValidReading> {
  if table.tank_id() != tank.id {
    return Err(Error::TankMismatch {
      tank:  tank.id,
      table: table.tank_id(),
    });
  }

  let level = non_negative("level", reading.level.ok_or(Error::MissingLevel)?)?;
  let water_level = non_negative("water level", reading.water_level.unwrap_or(0.0))?;
  let temperature = reading
    .temperature
    .map(|t| finite("temperature", t))
    .transpose()?;

  let observer = reading.observer.trim();
  if observer.is_empty() {
    return Err(Error::EmptyObserver);
  }

  let notes = reading
    .notes
    .map(|n| n.trim().to_owned())
    .filter(|n| !n.is_empty());

  Ok(ValidReading {
    level,
    temperature,
    water_level,
    observer: observer.to_owned(),
    notes,
    gauge_type: reading.gauge_type,
  })
}
