//! Table Export Formatting
//!
//! Records are flattened through `serde_json` so one writer serves every
//! table; columns follow struct field order.

use crate::error::{ApiError, ApiResult};
use serde::Serialize;
use serde_json::Value;
use std::str::FromStr;

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Json => "application/json",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "excel" | "pdf" => Err(ApiError::BadRequest(format!(
                "Export format '{}' is not supported; use csv or json",
                s
            ))),
            other => Err(ApiError::BadRequest(format!("Unknown export format '{}'", other))),
        }
    }
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Quote a field when it contains a delimiter, quote or line break
fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn to_object<T: Serialize>(record: &T) -> ApiResult<serde_json::Map<String, Value>> {
    match serde_json::to_value(record) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ApiError::Internal("Export record is not an object".to_string())),
        Err(e) => Err(ApiError::Internal(format!("Serialization error: {}", e))),
    }
}

/// Render records as CSV with a header row. An empty table yields an empty body.
pub fn to_csv<T: Serialize>(records: &[T]) -> ApiResult<String> {
    let rows = records.iter().map(to_object).collect::<ApiResult<Vec<_>>>()?;
    let Some(first) = rows.first() else {
        return Ok(String::new());
    };

    let headers: Vec<&String> = first.keys().collect();
    let mut out = headers
        .iter()
        .map(|h| escape(h))
        .collect::<Vec<_>>()
        .join(",");
    out.push_str("\r\n");

    for row in &rows {
        let line = headers
            .iter()
            .map(|h| escape(&row.get(*h).map(cell).unwrap_or_default()))
            .collect::<Vec<_>>()
            .join(",");
        out.push_str(&line);
        out.push_str("\r\n");
    }
    Ok(out)
}

/// Render records as a pretty-printed JSON array
pub fn to_json<T: Serialize>(records: &T) -> ApiResult<String> {
    serde_json::to_string_pretty(records)
        .map_err(|e| ApiError::Internal(format!("Serialization error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::fixtures;

    #[test]
    fn test_format_parsing() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!("json".parse::<ExportFormat>().unwrap(), ExportFormat::Json);
        assert!(matches!(
            "excel".parse::<ExportFormat>(),
            Err(ApiError::BadRequest(_))
        ));
        assert!("xml".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("plain"), "plain");
        assert_eq!(escape("a,b"), "\"a,b\"");
        assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_csv_columns_follow_field_order() {
        let mut analyte = fixtures::analyte("TA1");
        analyte.ta_name = "Glucose, free".to_string();
        let csv = to_csv(&[analyte]).unwrap();
        let mut lines = csv.lines();

        assert_eq!(
            lines.next().unwrap(),
            "ta_id,ta_name,ph_min,ph_max,t_max,stability,half_life,power_consumption"
        );
        assert_eq!(lines.next().unwrap(), "TA1,\"Glucose, free\",5.0,8.0,45,30,48,10");
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_csv_enums_are_plain_text() {
        let csv = to_csv(&[fixtures::immobilization("IM1")]).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert!(row.contains(",high,insoluble,"));
    }

    #[test]
    fn test_empty_table() {
        let empty: Vec<storage::TargetAnalyte> = Vec::new();
        assert_eq!(to_csv(&empty).unwrap(), "");
        assert_eq!(to_json(&empty).unwrap(), "[]");
    }
}
