use serde_json::Value;

use super::record::{RawRecord, RawValue};
use crate::error::ImportError;

// An object of records: {"1": {...}, "2": {...}}
pub fn parse(text: &str) -> Result<Vec<RawRecord>, ImportError> {
    let document: Value = serde_json::from_str(text)?;
    let Value::Object(records) = document else {
        return Err(ImportError::Structure(
            "expected a JSON object whose values are records".to_string(),
        ));
    };

    records
        .into_iter()
        .map(|(key, value)| {
            let label = format!("record '{key}'");
            let Value::Object(fields) = value else {
                return Err(ImportError::Structure(format!("{label} is not an object")));
            };

            let fields = fields
                .into_iter()
                .map(|(name, value)| {
                    let raw = raw_value(value).ok_or_else(|| ImportError::InvalidField {
                        record: label.clone(),
                        field: name.clone(),
                        reason: "nested objects are not supported".to_string(),
                    })?;
                    Ok::<_, ImportError>((name, raw))
                })
                .collect::<Result<Vec<_>, ImportError>>()?;

            Ok(RawRecord { label, fields })
        })
        .collect()
}

fn raw_value(value: Value) -> Option<RawValue> {
    match value {
        Value::Null => Some(RawValue::Null),
        Value::Array(items) => items
            .into_iter()
            .map(scalar_text)
            .collect::<Option<Vec<_>>>()
            .map(RawValue::List),
        other => scalar_text(other).map(RawValue::Text),
    }
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
