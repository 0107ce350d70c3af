//! CSV upload parsing.

use std::collections::HashMap;

use thiserror::Error;

use super::record::{FieldValue, Record};

/// Cell texts treated as missing values, matching common spreadsheet exports.
const NA_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

#[derive(Debug, Error)]
pub enum InputError {
    #[error("file is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),
    #[error("no columns to parse from file")]
    NoColumns,
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row} has {found} fields, expected at most {expected}")]
    TooManyFields {
        row: usize,
        found: usize,
        expected: usize,
    },
}

/// Parse uploaded CSV bytes into records, one per data row.
///
/// Empty cells and NA tokens become null fields; cells that parse as finite
/// numbers become [`FieldValue::Number`].
pub fn parse_records(bytes: &[u8]) -> Result<Vec<Record>, InputError> {
    let text = std::str::from_utf8(bytes)?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = normalize_headers(reader.headers()?);
    if headers.is_empty() {
        return Err(InputError::NoColumns);
    }

    let mut records = Vec::new();
    for (i, row) in reader.records().enumerate() {
        let row = row?;
        if row.len() > headers.len() {
            return Err(InputError::TooManyFields {
                row: i + 1,
                found: row.len(),
                expected: headers.len(),
            });
        }

        let record: Record = headers
            .iter()
            .enumerate()
            .map(|(col, header)| (header.clone(), row.get(col).and_then(parse_cell)))
            .collect();
        records.push(record);
    }

    Ok(records)
}

fn normalize_headers(raw: &csv::StringRecord) -> Vec<String> {
    if raw.len() == 1 && raw.get(0).map_or(true, |h| h.trim().is_empty()) {
        return Vec::new();
    }

    let mut seen: HashMap<String, usize> = HashMap::new();
    raw.iter()
        .enumerate()
        .map(|(i, h)| {
            let base = match h.trim() {
                "" => format!("Unnamed: {}", i),
                name => name.to_string(),
            };
            let count = seen.entry(base.to_lowercase()).or_insert(0);
            let name = if *count == 0 {
                base
            } else {
                format!("{}.{}", base, count)
            };
            *count += 1;
            name
        })
        .collect()
}

fn parse_cell(raw: &str) -> Option<FieldValue> {
    let cell = raw.trim();
    if cell.is_empty() || NA_TOKENS.contains(&cell) {
        return None;
    }

    match cell.parse::<f64>() {
        Ok(n) if n.is_finite() => Some(FieldValue::Number(n)),
        _ => Some(FieldValue::Text(cell.to_string())),
    }
}
