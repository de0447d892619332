use csv::{ReaderBuilder, Trim};

use super::record::{RawRecord, RawValue};
use crate::error::ImportError;

// Header-driven rows; every row must be as wide as the header
pub fn parse(text: &str) -> Result<Vec<RawRecord>, ImportError> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::Headers)
        .from_reader(text.as_bytes());

    let headers = reader.headers()?.clone();
    if headers.iter().all(str::is_empty) {
        return Err(ImportError::Structure("CSV file has no header row".to_string()));
    }

    let mut records = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let row = row?;
        records.push(RawRecord {
            // header is line 1
            label: format!("row {}", index + 2),
            fields: headers
                .iter()
                .zip(row.iter())
                .map(|(name, value)| (name.to_string(), RawValue::Text(value.to_string())))
                .collect(),
        });
    }

    Ok(records)
}
