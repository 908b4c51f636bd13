//! CSV export functionality.
//!
//! Records are turned into JSON objects first, so any `Serialize` struct
//! works. Column headers come from the first record's fields in declaration
//! order. Later records are read through those headers only; extra fields
//! are dropped and missing ones export as empty cells.

use chrono::Local;
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{AppError, Result};

/// MIME type for hosts that serve the exported file as a download.
pub const CSV_MIME_TYPE: &str = "text/csv;charset=utf-8;";

/// Render `records` as CSV text.
///
/// Returns `Ok(None)` for an empty slice.
pub fn records_to_csv<T: Serialize>(records: &[T]) -> Result<Option<String>> {
    if records.is_empty() {
        warn!("No data to export");
        return Ok(None);
    }

    let rows = records
        .iter()
        .map(|record| match serde_json::to_value(record)? {
            Value::Object(map) => Ok(map),
            other => Err(AppError::export(format!("Expected a flat record, got {}", kind_of(&other)))),
        })
        .collect::<Result<Vec<Map<String, Value>>>>()?;

    let headers: Vec<&String> = rows[0].keys().collect();

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(headers.iter().map(|h| h.as_str()).collect::<Vec<_>>().join(","));
    for row in &rows {
        let cells: Vec<String> = headers.iter().map(|h| format_cell(row.get(h.as_str()))).collect();
        lines.push(cells.join(","));
    }

    Ok(Some(lines.join("\n")))
}

/// Write `records` to `<dir>/<filename>.csv`.
///
/// Nothing is written for an empty slice. Returns the written path.
pub fn export_to_csv<T: Serialize>(records: &[T], filename: &str, dir: &Path) -> Result<Option<PathBuf>> {
    let Some(content) = records_to_csv(records)? else {
        return Ok(None);
    };

    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{filename}.csv"));
    std::fs::write(&path, content)?;

    info!("Exported {} records to {:?}", records.len(), path);
    Ok(Some(path))
}

/// PDF export is not available; the error carries the text to show the user.
pub fn export_to_pdf(element_id: &str, filename: &str) -> Result<()> {
    info!("Exporting element #{element_id} to PDF: {filename}.pdf");
    Err(AppError::Unsupported(
        "PDF export is not available yet. Use CSV export instead.".to_string(),
    ))
}

/// Generate default filename (without extension) for export.
pub fn generate_export_filename(prefix: &str) -> String {
    let now = Local::now();
    format!("{prefix}_{ts}", ts = now.format("%Y%m%d_%H%M%S"))
}

fn format_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(s)) => quote_if_needed(s),
        Some(Value::Array(items)) => {
            let joined = items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    Value::Null => String::new(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(",");
            quote_if_needed(&joined)
        }
        Some(obj @ Value::Object(_)) => quote_if_needed(&obj.to_string()),
    }
}

/// Wrap in quotes (doubling inner quotes) when the value holds a comma or newline.
fn quote_if_needed(s: &str) -> String {
    if s.contains(',') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
