//! JSON renderer for record sets.

use crate::error::{Error, Result};
use crate::patch::RecordSet;
use serde_json::{json, Map, Value};

/// JSON output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JsonFormat {
    /// Compact single-line JSON
    Compact,
    /// Pretty-printed with 2-space indentation
    #[default]
    Pretty,
}

/// Convert a record set to JSON.
///
/// Records become objects keyed by header text, in header order.
pub fn to_json(set: &RecordSet, format: JsonFormat) -> Result<String> {
    let records: Vec<Value> = set
        .records
        .iter()
        .map(|record| {
            let fields: Map<String, Value> = record
                .fields()
                .map(|(name, value)| (name.to_string(), Value::String(value.to_string())))
                .collect();
            json!({ "row": record.source_row, "fields": fields })
        })
        .collect();

    let value = json!({
        "sheet": set.name,
        "header": set.header.columns(),
        "records": records,
    });

    let rendered = match format {
        JsonFormat::Compact => serde_json::to_string(&value),
        JsonFormat::Pretty => serde_json::to_string_pretty(&value),
    };
    rendered.map_err(|e| Error::Encode(format!("JSON serialization error: {}", e)))
}
