//! Strapping-table CSV reader.

use crate::error::{Error, Result};

/// Split one CSV line into fields. Double-quoted fields may contain commas
/// and `""` escapes; whitespace around unquoted fields is trimmed.
pub(crate) fn split_fields(line: &str, line_no: usize) -> Result<Vec<String>> {
  let mut fields = Vec::new();
  let mut field = String::new();
  let mut chars = line.chars().peekable();
  let mut quoted = false;
  let mut was_quoted = false;

  while let Some(c) = chars.next() {
    match (quoted, c) {
      (true, '"') if chars.peek() == Some(&'"') => {
        chars.next();
        field.push('"');
      }
      (true, '"') => quoted = false,
      (true, c) => field.push(c),
      (false, '"') if field.trim().is_empty() => {
        field.clear();
        quoted = true;
        was_quoted = true;
      }
      (false, ',') => {
        fields.push(finish(&mut field, was_quoted));
        was_quoted = false;
      }
      (false, c) => field.push(c),
    }
  }

  if quoted {
    return Err(Error::UnterminatedQuote { line: line_no });
  }
  fields.push(finish(&mut field, was_quoted));
  Ok(fields)
}

fn finish(field: &mut String, was_quoted: bool) -> String {
  let value = std::mem::take(field);
  if was_quoted { value } else { value.trim().to_owned() }
}

fn parse_number(line: usize, column: &'static str, raw: &str) -> Result<f64> {
  raw
    .parse::<f64>()
    .ok()
    .filter(|v| v.is_finite())
    .ok_or_else(|| Error::InvalidNumber {
      line,
      column,
      value: raw.to_owned(),
    })
}

pub(crate) fn parse_strapping(input: &str) -> Result<Vec<(f64, f64)>> {
  let mut lines = input
    .lines()
    .enumerate()
    .map(|(i, l)| (i + 1, l.trim_start_matches('\u{feff}')))
    .filter(|(_, l)| !l.trim().is_empty());

  let (header_no, header) = lines.next().ok_or(Error::Empty)?;
  let header = split_fields(header, header_no)?;
  let column = |name: &'static str| {
    header
      .iter()
      .position(|h| h.eq_ignore_ascii_case(name))
      .ok_or(Error::MissingColumn(name))
  };
  let height_col = column("height")?;
  let volume_col = column("volume")?;
  let needed = height_col.max(volume_col) + 1;

  let mut pairs = Vec::new();
  for (line_no, line) in lines {
    let fields = split_fields(line, line_no)?;
    if fields.len() < needed {
      return Err(Error::ShortRow {
        line:     line_no,
        expected: needed,
        found:    fields.len(),
      });
    }
    let height = parse_number(line_no, "height", &fields[height_col])?;
    let volume = parse_number(line_no, "volume", &fields[volume_col])?;
    pairs.push((height, volume));
  }
  Ok(pairs)
}
