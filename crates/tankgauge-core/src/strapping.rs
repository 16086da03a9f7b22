//! Strapping tables: per-tank height→volume calibration curves.
//!
//! A table is kept sorted ascending by height with unique heights and a
//! non-decreasing volume curve. Every mutation either succeeds completely or
//! leaves the table untouched.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  error::{finite, non_negative, positive},
  tank::Tank,
};

// ─── Entry ───────────────────────────────────────────────────────────────────

/// One calibration point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrappingEntry {
  /// Feet.
  pub height:       f64,
  /// BBL.
  pub volume:       f64,
  /// Display-only subdivision: fractional part of `height` × 4.
  pub quarter_inch: f64,
}

impl StrappingEntry {
  pub fn new(height: f64, volume: f64) -> Self {
    Self {
      height,
      volume,
      quarter_inch: height.fract() * 4.0,
    }
  }
}

// ─── Lookup result ───────────────────────────────────────────────────────────

/// How a [`VolumeLookup`] was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupSource {
  /// Empty table; `height / reference_height × capacity`.
  Proportional,
  /// The height matched a calibration point exactly.
  Exact,
  /// Linear interpolation between two calibration points.
  Interpolated,
  /// The height was outside the calibrated range and was clamped to the
  /// nearest boundary entry.
  Clamped,
}

/// Result of [`StrappingTable::lookup_volume`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeLookup {
  /// Gross volume in BBL.
  pub volume:      f64,
  /// `volume / capacity × 100`. Not clamped: values above 100 signal
  /// overfill.
  pub utilization: f64,
  pub source:      LookupSource,
}

// ─── Table ───────────────────────────────────────────────────────────────────

/// The calibration table of a single tank.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrappingTable {
  tank_id:          Uuid,
  capacity:         f64,
  reference_height: f64,
  entries:          Vec<StrappingEntry>,
}

impl StrappingTable {
  /// An empty table for a tank with the given capacity and reference height.
  pub fn new(tank_id: Uuid, capacity: f64, reference_height: f64) -> Result<Self> {
    Ok(Self {
      tank_id,
      capacity: positive("capacity", capacity)?,
      reference_height: positive("reference height", reference_height)?,
      entries: Vec::new(),
    })
  }

  /// An empty table sized from `tank`.
  pub fn for_tank(tank: &Tank) -> Result<Self> {
    Self::new(tank.id, tank.capacity, tank.reference_height())
  }

  /// Build a table for `tank` from `(height, volume)` pairs given in any
  /// order. Each pair goes through [`StrappingTable::add_entry`].
  pub fn with_entries(
    tank: &Tank,
    pairs: impl IntoIterator<Item = (f64, f64)>,
  ) -> Result<Self> {
    let mut pairs: Vec<(f64, f64)> = pairs.into_iter().collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut table = Self::for_tank(tank)?;
    for (height, volume) in pairs {
      table.add_entry(height, volume)?;
    }
    Ok(table)
  }

  pub fn tank_id(&self) -> Uuid { self.tank_id }

  pub fn capacity(&self) -> f64 { self.capacity }

  pub fn reference_height(&self) -> f64 { self.reference_height }

  /// Calibration points, ascending by height.
  pub fn entries(&self) -> &[StrappingEntry] { &self.entries }

  pub fn len(&self) -> usize { self.entries.len() }

  pub fn is_empty(&self) -> bool { self.entries.is_empty() }

  /// Lowest and highest calibrated heights.
  pub fn height_range(&self) -> Option<(f64, f64)> {
    match (self.entries.first(), self.entries.last()) {
      (Some(lo), Some(hi)) => Some((lo.height, hi.height)),
      _ => None,
    }
  }

  // ── Mutation ──────────────────────────────────────────────────────────

  /// Insert a calibration point in sorted position.
  ///
  /// Fails on a negative or non-finite value, on an existing entry at the
  /// same height (remove it first), and on a volume that would make the
  /// curve decrease.
  pub fn add_entry(&mut self, height: f64, volume: f64) -> Result<()> {
    let height = non_negative("height", height)?;
    let volume = non_negative("volume", volume)?;

    let idx = self.entries.partition_point(|e| e.height < height);
    if self.entries.get(idx).is_some_and(|e| e.height == height) {
      return Err(Error::DuplicateHeight(height));
    }

    let min = idx
      .checked_sub(1)
      .map(|i| self.entries[i].volume)
      .unwrap_or(0.0);
    let max = self
      .entries
      .get(idx)
      .map(|e| e.volume)
      .unwrap_or(f64::INFINITY);
    if volume < min || volume > max {
      return Err(Error::NonMonotonicVolume {
        height,
        volume,
        min,
        max,
      });
    }

    self.entries.insert(idx, StrappingEntry::new(height, volume));
    Ok(())
  }

  /// Remove and return the entry at exactly `height`.
  pub fn remove_entry(&mut self, height: f64) -> Result<StrappingEntry> {
    let idx = self
      .entries
      .iter()
      .position(|e| e.height == height)
      .ok_or(Error::EntryNotFound(height))?;
    Ok(self.entries.remove(idx))
  }

  /// Drop every calibration point; lookups fall back to proportion.
  pub fn clear(&mut self) { self.entries.clear(); }

  /// Break the ordering invariant on purpose.
  #[cfg(test)]
  pub(crate) fn swap_entries(&mut self, a: usize, b: usize) { self.entries.swap(a, b); }

  // ── Lookup ────────────────────────────────────────────────────────────

  /// Volume and utilization at `height`.
  pub fn lookup_volume(&self, height: f64) -> Result<VolumeLookup> {
    let height = finite("height", height)?;

    let (volume, source) = if self.entries.is_empty() {
      (self.proportional(height), LookupSource::Proportional)
    } else {
      self.interpolate(height)?
    };

    Ok(VolumeLookup {
      volume,
      utilization: volume * 100.0 / self.capacity,
      source,
    })
  }

  fn proportional(&self, height: f64) -> f64 {
    if height <= 0.0 {
      return 0.0;
    }
    (height / self.reference_height) * self.capacity
  }

  fn interpolate(&self, height: f64) -> Result<(f64, LookupSource)> {
    self.check_consistent()?;

    let entries = &self.entries;
    let first = entries[0];
    let last = entries[entries.len() - 1];

    if height < first.height {
      return Ok((first.volume, LookupSource::Clamped));
    }
    if height > last.height {
      return Ok((last.volume, LookupSource::Clamped));
    }

    // `first.height <= height`, so `idx >= 1`.
    let idx = entries.partition_point(|e| e.height <= height);
    let lo = entries[idx - 1];
    if lo.height == height {
      return Ok((lo.volume, LookupSource::Exact));
    }

    let hi = entries[idx];
    let span = hi.height - lo.height;
    if span <= 0.0 {
      return Err(Error::UnsortedTable { index: idx });
    }
    let volume =
      lo.volume + (height - lo.height) / span * (hi.volume - lo.volume);
    Ok((volume, LookupSource::Interpolated))
  }

  /// Re-verify the ordering invariants before trusting the entries.
  fn check_consistent(&self) -> Result<()> {
    for (i, pair) in self.entries.windows(2).enumerate() {
      if pair[1].height <= pair[0].height {
        return Err(Error::UnsortedTable { index: i + 1 });
      }
      if pair[1].volume < pair[0].volume {
        return Err(Error::DecreasingVolume { index: i + 1 });
      }
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{ErrorKind, tank::NewTank};

  fn tank(capacity: f64) -> Tank {
    Tank::new(NewTank::new("T-001", "REG87", capacity)).unwrap()
  }

  fn reference_table() -> StrappingTable {
    StrappingTable::with_entries(
      &tank(20_000.0),
      [(0.0, 0.0), (10.0, 5_000.0), (20.0, 12_000.0), (32.0, 20_000.0)],
    )
    .unwrap()
  }

  fn heights(table: &StrappingTable) -> Vec<f64> {
    table.entries().iter().map(|e| e.height).collect()
  }

  // ─── Proportional fallback ───────────────────────────────────────────────

  #[test]
  fn empty_table_is_proportional() {
    let table = StrappingTable::for_tank(&tank(20_000.0)).unwrap();
    for h in [1.0, 8.0, 16.0, 24.5, 31.0] {
      let lookup = table.lookup_volume(h).unwrap();
      assert_eq!(lookup.volume, (h / 32.0) * 20_000.0);
      assert_eq!(lookup.source, LookupSource::Proportional);
    }
  }

  #[test]
  fn proportional_reaches_capacity_at_reference_height() {
    let table = StrappingTable::for_tank(&tank(20_000.0)).unwrap();
    let lookup = table.lookup_volume(32.0).unwrap();
    assert_eq!(lookup.volume, 20_000.0);
    assert_eq!(lookup.utilization, 100.0);
  }

  #[test]
  fn proportional_clamps_at_zero() {
    let table = StrappingTable::for_tank(&tank(20_000.0)).unwrap();
    assert_eq!(table.lookup_volume(0.0).unwrap().volume, 0.0);
    assert_eq!(table.lookup_volume(-3.0).unwrap().volume, 0.0);
  }

  #[test]
  fn proportional_uses_configured_height() {
    let mut input = NewTank::new("T-002", "PREM93", 40_000.0);
    input.height = Some(40.0);
    let table = StrappingTable::for_tank(&Tank::new(input).unwrap()).unwrap();
    assert_eq!(table.lookup_volume(10.0).unwrap().volume, 10_000.0);
  }

  #[test]
  fn proportional_overfill_is_not_hidden() {
    let table = StrappingTable::for_tank(&tank(20_000.0)).unwrap();
    let lookup = table.lookup_volume(40.0).unwrap();
    assert_eq!(lookup.volume, 25_000.0);
    assert_eq!(lookup.utilization, 125.0);
  }

  // ─── Interpolation ───────────────────────────────────────────────────────

  #[test]
  fn interpolates_between_points() {
    let lookup = reference_table().lookup_volume(15.0).unwrap();
    assert_eq!(lookup.volume, 8_500.0);
    assert!((lookup.utilization - 42.5).abs() < 1e-9);
    assert_eq!(lookup.source, LookupSource::Interpolated);

    let lookup = reference_table().lookup_volume(24.5).unwrap();
    assert!((lookup.volume - 15_000.0).abs() < 1e-9);
  }

  #[test]
  fn exact_heights_have_no_drift() {
    let table = reference_table();
    for entry in table.entries() {
      let lookup = table.lookup_volume(entry.height).unwrap();
      assert_eq!(lookup.volume, entry.volume);
      assert_eq!(lookup.source, LookupSource::Exact);
    }
  }

  #[test]
  fn out_of_range_heights_clamp() {
    let table = StrappingTable::with_entries(
      &tank(20_000.0),
      [(2.0, 800.0), (10.0, 5_000.0), (30.0, 19_000.0)],
    )
    .unwrap();

    let below = table.lookup_volume(1.0).unwrap();
    assert_eq!(below.volume, 800.0);
    assert_eq!(below.source, LookupSource::Clamped);

    let above = table.lookup_volume(35.0).unwrap();
    assert_eq!(above.volume, 19_000.0);
    assert_eq!(above.source, LookupSource::Clamped);
  }

  #[test]
  fn single_entry_table_clamps_everywhere() {
    let table =
      StrappingTable::with_entries(&tank(20_000.0), [(5.0, 2_500.0)]).unwrap();
    assert_eq!(table.lookup_volume(0.0).unwrap().volume, 2_500.0);
    assert_eq!(table.lookup_volume(5.0).unwrap().volume, 2_500.0);
    assert_eq!(table.lookup_volume(9.0).unwrap().volume, 2_500.0);
  }

  #[test]
  fn lookup_rejects_nan() {
    let err = reference_table().lookup_volume(f64::NAN).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
  }

  #[test]
  fn corrupted_table_is_a_computation_error() {
    let mut table = reference_table();
    table.swap_entries(1, 2);
    let err = table.lookup_volume(15.0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Computation);
    assert!(matches!(err, Error::UnsortedTable { index: 2 }));
  }

  // ─── Mutation ────────────────────────────────────────────────────────────

  #[test]
  fn add_entry_keeps_order() {
    let mut table = StrappingTable::for_tank(&tank(20_000.0)).unwrap();
    table.add_entry(20.0, 12_000.0).unwrap();
    table.add_entry(0.0, 0.0).unwrap();
    table.add_entry(32.0, 20_000.0).unwrap();
    table.add_entry(10.0, 5_000.0).unwrap();
    assert_eq!(heights(&table), vec![0.0, 10.0, 20.0, 32.0]);
    assert_eq!(table.height_range(), Some((0.0, 32.0)));
  }

  #[test]
  fn quarter_inch_marker_is_derived() {
    let mut table = StrappingTable::for_tank(&tank(20_000.0)).unwrap();
    table.add_entry(10.25, 5_100.0).unwrap();
    table.add_entry(10.75, 5_300.0).unwrap();
    let markers: Vec<f64> =
      table.entries().iter().map(|e| e.quarter_inch).collect();
    assert_eq!(markers, vec![1.0, 3.0]);
  }

  #[test]
  fn duplicate_height_is_rejected_without_change() {
    let mut table = reference_table();
    let before = table.clone();
    let err = table.add_entry(10.0, 5_000.0).unwrap_err();
    assert!(matches!(err, Error::DuplicateHeight(h) if h == 10.0));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(table, before);
  }

  #[test]
  fn negative_values_are_rejected() {
    let mut table = reference_table();
    let before = table.clone();
    assert!(matches!(
      table.add_entry(-1.0, 10.0),
      Err(Error::Negative { field: "height", .. })
    ));
    assert!(matches!(
      table.add_entry(1.0, -10.0),
      Err(Error::Negative { field: "volume", .. })
    ));
    assert_eq!(table, before);
  }

  #[test]
  fn non_monotonic_volume_is_rejected() {
    let mut table = reference_table();
    let before = table.clone();
    let err = table.add_entry(15.0, 13_000.0).unwrap_err();
    assert!(matches!(
      err,
      Error::NonMonotonicVolume { min, max, .. } if min == 5_000.0 && max == 12_000.0
    ));
    assert_eq!(table, before);
  }

  #[test]
  fn with_entries_accepts_any_order() {
    let table = StrappingTable::with_entries(
      &tank(20_000.0),
      [(32.0, 20_000.0), (0.0, 0.0), (20.0, 12_000.0), (10.0, 5_000.0)],
    )
    .unwrap();
    assert_eq!(table, reference_table());
  }

  #[test]
  fn remove_entry() {
    let mut table = reference_table();
    let removed = table.remove_entry(20.0).unwrap();
    assert_eq!(removed.volume, 12_000.0);
    assert_eq!(heights(&table), vec![0.0, 10.0, 32.0]);
  }

  #[test]
  fn remove_missing_entry_is_not_found() {
    let mut table = reference_table();
    let before = table.clone();
    let err = table.remove_entry(11.0).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(table, before);
  }

  #[test]
  fn clear_falls_back_to_proportion() {
    let mut table = reference_table();
    table.clear();
    assert!(table.is_empty());
    let lookup = table.lookup_volume(16.0).unwrap();
    assert_eq!(lookup.volume, 10_000.0);
    assert_eq!(lookup.source, LookupSource::Proportional);
  }
}
