//! Integration tests for `SqliteStore` against an in-memory database.

use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use tankgauge_core::{
  Error as CoreError, ErrorKind,
  gauging::{FixedClock, GaugeType, GaugingEngine, ReadingInput},
  service::{GaugingService, ServiceError},
  store::TankStore,
  strapping::StrappingTable,
  tank::{NewTank, Tank, TankStatus},
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn tank(number: &str, capacity: f64) -> Tank {
  Tank::new(NewTank::new(number, "REG87", capacity)).unwrap()
}

fn reference_pairs() -> Vec<(f64, f64)> {
  vec![(0.0, 0.0), (10.0, 5_000.0), (20.0, 12_000.0), (32.0, 20_000.0)]
}

// ─── Tanks ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_and_get_tank() {
  let s = store().await;
  let mut input = NewTank::new("T-003", "ULSD", 75_000.0);
  input.diameter = Some(60.0);
  input.height = Some(40.0);
  input.status = TankStatus::Normal;
  let t = Tank::new(input).unwrap();

  s.add_tank(&t).await.unwrap();
  let fetched = s.get_tank(t.id).await.unwrap().unwrap();
  assert_eq!(fetched, t);
}

#[tokio::test]
async fn get_tank_missing_returns_none() {
  let s = store().await;
  assert!(s.get_tank(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_tank_is_rejected() {
  let s = store().await;
  let t = tank("T-001", 50_000.0);
  s.add_tank(&t).await.unwrap();
  let err = s.add_tank(&t).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::DuplicateTank(id)) if id == t.id));

  let err = ServiceError::store(err);
  assert_eq!(err.kind(), Some(ErrorKind::Conflict));
}

#[tokio::test]
async fn list_tanks_is_ordered_by_number() {
  let s = store().await;
  for number in ["T-003", "T-001", "T-002"] {
    s.add_tank(&tank(number, 50_000.0)).await.unwrap();
  }
  let numbers: Vec<String> = s
    .list_tanks()
    .await
    .unwrap()
    .into_iter()
    .map(|t| t.tank_number)
    .collect();
  assert_eq!(numbers, vec!["T-001", "T-002", "T-003"]);
}

// ─── Strapping tables ────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_table_loads_empty() {
  let s = store().await;
  let t = tank("T-001", 20_000.0);
  s.add_tank(&t).await.unwrap();
  let table = s.load_strapping_table(&t).await.unwrap();
  assert!(table.is_empty());
  assert_eq!(table.tank_id(), t.id);
}

#[tokio::test]
async fn save_and_load_table() {
  let s = store().await;
  let t = tank("T-001", 20_000.0);
  s.add_tank(&t).await.unwrap();

  let table = StrappingTable::with_entries(&t, reference_pairs()).unwrap();
  s.save_strapping_table(&table).await.unwrap();

  let loaded = s.load_strapping_table(&t).await.unwrap();
  assert_eq!(loaded, table);
  assert_eq!(loaded.lookup_volume(15.0).unwrap().volume, 8_500.0);
}

#[tokio::test]
async fn save_replaces_previous_entries() {
  let s = store().await;
  let t = tank("T-001", 20_000.0);
  s.add_tank(&t).await.unwrap();

  let mut table = StrappingTable::with_entries(&t, reference_pairs()).unwrap();
  s.save_strapping_table(&table).await.unwrap();

  table.remove_entry(20.0).unwrap();
  s.save_strapping_table(&table).await.unwrap();
  let loaded = s.load_strapping_table(&t).await.unwrap();
  assert_eq!(loaded.len(), 3);

  table.clear();
  s.save_strapping_table(&table).await.unwrap();
  assert!(s.load_strapping_table(&t).await.unwrap().is_empty());
}

#[tokio::test]
async fn save_table_for_unknown_tank_fails() {
  let s = store().await;
  let t = tank("T-404", 20_000.0);
  let table = StrappingTable::with_entries(&t, reference_pairs()).unwrap();
  let err = s.save_strapping_table(&table).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::TankNotFound(id)) if id == t.id));
}

#[tokio::test]
async fn tables_are_per_tank() {
  let s = store().await;
  let a = tank("T-001", 20_000.0);
  let b = tank("T-002", 20_000.0);
  s.add_tank(&a).await.unwrap();
  s.add_tank(&b).await.unwrap();

  let table = StrappingTable::with_entries(&a, reference_pairs()).unwrap();
  s.save_strapping_table(&table).await.unwrap();

  assert_eq!(s.load_strapping_table(&a).await.unwrap().len(), 4);
  assert!(s.load_strapping_table(&b).await.unwrap().is_empty());
}

// ─── Gauging ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn record_gauging_writes_record_and_snapshot() {
  let s = store().await;
  let t = tank("T-001", 20_000.0);
  s.add_tank(&t).await.unwrap();
  let table = StrappingTable::with_entries(&t, reference_pairs()).unwrap();

  let at = Utc.with_ymd_and_hms(2024, 3, 14, 6, 30, 0).unwrap();
  let mut reading = ReadingInput::new(24.5, "J. Doe");
  reading.temperature = Some(68.4);
  reading.notes = Some("after receipt".into());
  let out = GaugingEngine::default()
    .submit_reading_at(&t, &table, reading, at)
    .unwrap();

  s.record_gauging(&out.record, &out.updated_tank).await.unwrap();

  let stored = s.get_tank(t.id).await.unwrap().unwrap();
  assert_eq!(stored, out.updated_tank);
  assert_eq!(stored.last_gauged, Some(at));

  let history = s.gauging_history(t.id, None).await.unwrap();
  assert_eq!(history, vec![out.record]);
}

#[tokio::test]
async fn record_for_unknown_tank_rolls_back() {
  let s = store().await;
  let known = tank("T-001", 20_000.0);
  s.add_tank(&known).await.unwrap();

  // A record pointing at a known tank but paired with an unknown snapshot.
  let stranger = tank("T-404", 20_000.0);
  let table = StrappingTable::for_tank(&known).unwrap();
  let out = GaugingEngine::default()
    .submit_reading(&known, &table, ReadingInput::new(4.0, "ops"))
    .unwrap();

  let err = s.record_gauging(&out.record, &stranger).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::TankNotFound(id)) if id == stranger.id));
  assert_eq!(ServiceError::store(err).kind(), Some(ErrorKind::NotFound));
  assert!(s.gauging_history(known.id, None).await.unwrap().is_empty());
}

#[tokio::test]
async fn history_is_newest_first_and_limited() {
  let s = store().await;
  let t = tank("T-001", 20_000.0);
  s.add_tank(&t).await.unwrap();
  let table = StrappingTable::for_tank(&t).unwrap();
  let engine = GaugingEngine::default();

  let start = Utc.with_ymd_and_hms(2024, 3, 14, 0, 0, 0).unwrap();
  let mut snapshot = t.clone();
  for hour in 0..5 {
    let mut reading = ReadingInput::new(hour as f64, "ops");
    reading.gauge_type = GaugeType::Automatic;
    let out = engine
      .submit_reading_at(&snapshot, &table, reading, start + Duration::hours(hour))
      .unwrap();
    s.record_gauging(&out.record, &out.updated_tank).await.unwrap();
    snapshot = out.updated_tank;
  }

  let history = s.gauging_history(t.id, None).await.unwrap();
  let levels: Vec<f64> = history.iter().map(|r| r.level).collect();
  assert_eq!(levels, vec![4.0, 3.0, 2.0, 1.0, 0.0]);
  assert!(history.iter().all(|r| r.gauge_type == GaugeType::Automatic));

  let recent = s.gauging_history(t.id, Some(2)).await.unwrap();
  assert_eq!(recent.len(), 2);
  assert_eq!(recent[0].level, 4.0);
}

// ─── Through the service ─────────────────────────────────────────────────────

#[tokio::test]
async fn service_over_sqlite() {
  let at = Utc.with_ymd_and_hms(2024, 3, 14, 6, 30, 0).unwrap();
  let svc = GaugingService::new(
    Arc::new(store().await),
    GaugingEngine::new(Arc::new(FixedClock(at))),
  );

  let t = svc
    .create_tank(NewTank::new("T-001", "REG87", 20_000.0))
    .await
    .unwrap();
  svc.replace_strapping_table(t.id, reference_pairs()).await.unwrap();

  let out = svc
    .submit_reading(t.id, ReadingInput::new(24.5, "J. Doe"))
    .await
    .unwrap();
  assert!((out.updated_tank.current_volume - 15_000.0).abs() < 1e-9);

  let stored = svc.tank(t.id).await.unwrap();
  assert_eq!(stored.last_gauged, Some(at));
  assert_eq!(svc.history(t.id, None).await.unwrap().len(), 1);
}
