//! The current-state snapshot of one storage tank.
//!
//! A tank is provisioned once and afterwards only changes through accepted
//! gauging submissions. History lives in
//! [`GaugingRecord`](crate::gauging::GaugingRecord)s, never in the tank.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::{
  Result,
  error::{non_negative, positive},
};

/// Reference height in feet used when a tank has none configured.
pub const DEFAULT_REFERENCE_HEIGHT: f64 = 32.0;

/// Operational status of a tank.
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
pub enum TankStatus {
  Normal,
  Loading,
  Maintenance,
  Alarm,
  #[default]
  Available,
}

/// Current snapshot of a tank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tank {
  pub id:                  Uuid,
  /// Display code, e.g. `T-001`.
  pub tank_number:         String,
  pub product:             String,
  /// Nominal maximum volume in BBL.
  pub capacity:            f64,
  /// Feet.
  pub diameter:            Option<f64>,
  /// Reference height in feet for the proportional fallback.
  pub height:              Option<f64>,
  pub current_level:       f64,
  /// `None` until a reading with a temperature has been accepted.
  pub current_temperature: Option<f64>,
  pub current_volume:      f64,
  pub water_level:         f64,
  pub last_gauged:         Option<DateTime<Utc>>,
  pub status:              TankStatus,
}

impl Tank {
  /// Validate `input` and build a fresh, empty tank with a new id.
  pub fn new(input: NewTank) -> Result<Self> {
    Self::with_id(Uuid::new_v4(), input)
  }

  /// Like [`Tank::new`], with a caller-supplied id.
  pub fn with_id(id: Uuid, input: NewTank) -> Result<Self> {
    let capacity = positive("capacity", input.capacity)?;
    let diameter = input
      .diameter
      .map(|d| positive("diameter", d))
      .transpose()?;
    let height = input.height.map(|h| positive("height", h)).transpose()?;

    Ok(Self {
      id,
      tank_number: input.tank_number,
      product: input.product,
      capacity,
      diameter,
      height,
      current_level: 0.0,
      current_temperature: None,
      current_volume: 0.0,
      water_level: 0.0,
      last_gauged: None,
      status: input.status,
    })
  }

  /// The configured height, or [`DEFAULT_REFERENCE_HEIGHT`].
  pub fn reference_height(&self) -> f64 {
    self.height.unwrap_or(DEFAULT_REFERENCE_HEIGHT)
  }

  /// `current_volume / capacity × 100`; always derived, never stored.
  pub fn utilization(&self) -> f64 {
    self.current_volume * 100.0 / self.capacity
  }
}

/// Input to [`Tank::new`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTank {
  pub tank_number: String,
  pub product:     String,
  pub capacity:    f64,
  #[serde(default)]
  pub diameter:    Option<f64>,
  #[serde(default)]
  pub height:      Option<f64>,
  #[serde(default)]
  pub status:      TankStatus,
}

impl NewTank {
  /// Convenience constructor with all optional fields set to their defaults.
  pub fn new(
    tank_number: impl Into<String>,
    product: impl Into<String>,
    capacity: f64,
  ) -> Self {
    Self {
      tank_number: tank_number.into(),
      product: product.into(),
      capacity,
      diameter: None,
      height: None,
      status: TankStatus::default(),
    }
  }
}

/// Checks shared by snapshot writers: volume within `0..=capacity`.
pub(crate) fn clamp_to_capacity(tank: &Tank, volume: f64) -> Result<f64> {
  let volume = non_negative("volume", volume)?;
  Ok(volume.min(tank.capacity))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::Error;

  #[test]
  fn new_tank_starts_empty() {
    let tank = Tank::new(NewTank::new("T-001", "REG87", 50_000.0)).unwrap();
    assert_eq!(tank.current_volume, 0.0);
    assert_eq!(tank.current_temperature, None);
    assert_eq!(tank.last_gauged, None);
    assert_eq!(tank.status, TankStatus::Available);
    assert_eq!(tank.utilization(), 0.0);
  }

  #[test]
  fn reference_height_defaults_to_32() {
    let mut input = NewTank::new("T-002", "PREM93", 50_000.0);
    let tank = Tank::new(input.clone()).unwrap();
    assert_eq!(tank.reference_height(), 32.0);

    input.height = Some(40.0);
    let tank = Tank::new(input).unwrap();
    assert_eq!(tank.reference_height(), 40.0);
  }

  #[test]
  fn rejects_non_positive_dimensions() {
    let err = Tank::new(NewTank::new("T-003", "ULSD", 0.0)).unwrap_err();
    assert!(matches!(err, Error::NotPositive { field: "capacity", .. }));

    let mut input = NewTank::new("T-003", "ULSD", 75_000.0);
    input.diameter = Some(-4.0);
    let err = Tank::new(input).unwrap_err();
    assert!(matches!(err, Error::NotPositive { field: "diameter", .. }));
  }

  #[test]
  fn utilization_tracks_volume() {
    let mut tank = Tank::new(NewTank::new("T-001", "REG87", 20_000.0)).unwrap();
    tank.current_volume = 8_500.0;
    assert!((tank.utilization() - 42.5).abs() < 1e-9);
  }

  #[test]
  fn status_string_forms() {
    assert_eq!(TankStatus::Maintenance.to_string(), "maintenance");
    assert_eq!("alarm".parse::<TankStatus>().unwrap(), TankStatus::Alarm);
    assert!("flooded".parse::<TankStatus>().is_err());
  }

  #[test]
  fn clamp_caps_at_capacity() {
    let tank = Tank::new(NewTank::new("T-001", "REG87", 1_000.0)).unwrap();
    assert_eq!(clamp_to_capacity(&tank, 1_200.0).unwrap(), 1_000.0);
    assert_eq!(clamp_to_capacity(&tank, 400.0).unwrap(), 400.0);
    assert!(clamp_to_capacity(&tank, -1.0).is_err());
  }
}
