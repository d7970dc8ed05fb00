//! JSON dataset documents: either a bare array of year records or an
//! object with a `records` array.
//!
//! ```json
//! {"records": [{"year": 2021, "oil_gas": 12.1, "total": "20.4"}]}
//! ```

use serde_json::Value;
use thiserror::Error;

use crate::model::{Dataset, YearRecord};

#[derive(Debug, Error)]
pub enum JsonLoadError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("expected an array of records or an object with `records`")]
    Shape,
    #[error("record {index} has no usable `year`")]
    MissingYear { index: usize },
}

pub(crate) fn records_of(value: &Value) -> Option<&Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        Value::Object(obj) => obj.get("records").and_then(Value::as_array),
        _ => None,
    }
}

fn year_of(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
        Value::String(s) => super::vectors::parse_year(s),
        _ => None,
    }
}

/// Parse a JSON dataset document.
///
/// Numeric strings are accepted. Any other non-numeric field value is
/// treated as missing.
pub fn parse_dataset_json(data: &[u8]) -> Result<Dataset, JsonLoadError> {
    let value: Value = serde_json::from_slice(data)?;
    let items = records_of(&value).ok_or(JsonLoadError::Shape)?;

    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let obj = item.as_object().ok_or(JsonLoadError::Shape)?;
        let year = obj
            .get("year")
            .and_then(year_of)
            .ok_or(JsonLoadError::MissingYear { index })?;

        let mut record = YearRecord::new(year);
        for (field, v) in obj {
            if field == "year" {
                continue;
            }
            let parsed = match v {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => super::vectors::parse_value(s),
                _ => None,
            };
            match parsed {
                Some(x) => record.set(field, x),
                None => tracing::warn!(year, field = field.as_str(), "non-numeric field treated as missing"),
            }
        }
        records.push(record);
    }
    Ok(Dataset::from_records(records))
}
