//! CSV writers for strapping tables and gauging history.
//!
//! Rows end in `\n`. Numbers use Rust's shortest round-trip formatting.

use std::fmt::Write as _;

use chrono::SecondsFormat;
use tankgauge_core::{gauging::GaugingRecord, strapping::StrappingTable};

/// Quote `s` if it contains a delimiter, quote or line break.
pub(crate) fn escape_field(s: &str) -> String {
  if s.contains([',', '"', '\n', '\r']) {
    format!("\"{}\"", s.replace('"', "\"\""))
  } else {
    s.to_owned()
  }
}

fn opt_num(v: Option<f64>) -> String { v.map(|v| v.to_string()).unwrap_or_default() }

pub(crate) fn write_strapping(table: &StrappingTable) -> String {
  let mut out = String::from("height,volume,quarter_inch\n");
  for e in table.entries() {
    let _ = writeln!(out, "{},{},{}", e.height, e.volume, e.quarter_inch);
  }
  out
}

pub(crate) fn write_gauging(records: &[GaugingRecord]) -> String {
  let mut out = String::from(
    "id,tank_id,gauge_time,level,temperature,water_level,volume,\
     calculated_volume,gauge_type,operator,variance,notes\n",
  );
  for r in records {
    let _ = writeln!(
      out,
      "{},{},{},{},{},{},{},{},{},{},{},{}",
      r.id,
      r.tank_id,
      r.gauge_time.to_rfc3339_opts(SecondsFormat::Secs, true),
      r.level,
      opt_num(r.temperature),
      r.water_level,
      r.volume,
      r.calculated_volume,
      r.gauge_type,
      escape_field(&r.operator),
      opt_num(r.variance),
      escape_field(r.notes.as_deref().unwrap_or_default()),
    );
  }
  out
}
