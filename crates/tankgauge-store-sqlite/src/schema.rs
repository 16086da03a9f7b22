//! SQL schema for the tank gauging SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Current-state snapshot, one row per tank. Overwritten on every accepted
-- gauging, in the same transaction as the record insert.
CREATE TABLE IF NOT EXISTS tanks (
    tank_id             TEXT PRIMARY KEY,
    tank_number         TEXT NOT NULL,
    product             TEXT NOT NULL,
    capacity            REAL NOT NULL CHECK (capacity > 0),
    diameter            REAL,
    height              REAL,
    current_level       REAL NOT NULL DEFAULT 0,
    current_temperature REAL,
    current_volume      REAL NOT NULL DEFAULT 0,
    water_level         REAL NOT NULL DEFAULT 0,
    last_gauged         TEXT,            -- ISO 8601 UTC or NULL
    status              TEXT NOT NULL    -- 'normal' | 'loading' | 'maintenance' | 'alarm' | 'available'
);

-- Calibration points. Rewritten wholesale on every table edit.
CREATE TABLE IF NOT EXISTS strapping_entries (
    tank_id  TEXT NOT NULL REFERENCES tanks(tank_id),
    height   REAL NOT NULL CHECK (height >= 0),
    volume   REAL NOT NULL CHECK (volume >= 0),
    PRIMARY KEY (tank_id, height)
);

-- Gauging records are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS gauging_records (
    record_id         TEXT PRIMARY KEY,
    tank_id           TEXT NOT NULL REFERENCES tanks(tank_id),
    gauge_time        TEXT NOT NULL,   -- ISO 8601 UTC
    level             REAL NOT NULL,
    temperature       REAL,            -- NULL when not read
    water_level       REAL NOT NULL DEFAULT 0,
    volume            REAL NOT NULL,
    calculated_volume REAL NOT NULL,
    gauge_type        TEXT NOT NULL,   -- 'manual' | 'automatic'
    operator          TEXT NOT NULL,
    variance          REAL,
    notes             TEXT
);

CREATE INDEX IF NOT EXISTS tanks_number_idx  ON tanks(tank_number);
CREATE INDEX IF NOT EXISTS records_tank_idx  ON gauging_records(tank_id, gauge_time);

PRAGMA user_version = 1;
";
