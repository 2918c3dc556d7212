//! Worksheet cell values.

use serde::{Deserialize, Serialize};

/// A decoded cell value.
///
/// Numbers keep the lexical form stored in the package so that
/// re-encoding never introduces formatting the source did not have.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum CellValue {
    /// No value
    #[default]
    Empty,
    /// Shared, inline or formula string
    Text(String),
    /// Numeric value as written in `<v>`
    Number(String),
    /// Boolean
    Bool(bool),
    /// Error code such as `#N/A`
    Error(String),
}

impl CellValue {
    /// Build a value from the raw `<v>` text and the cell's `t` attribute.
    ///
    /// Shared-string indices must be resolved by the caller first; this
    /// only handles the self-contained types.
    pub fn from_raw(raw: &str, cell_type: Option<&str>) -> Self {
        match cell_type {
            Some("b") => CellValue::Bool(raw.trim() == "1" || raw.trim().eq_ignore_ascii_case("true")),
            Some("e") => CellValue::Error(raw.to_string()),
            Some("str") | Some("inlineStr") | Some("s") | Some("d") => {
                if raw.is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::Text(raw.to_string())
                }
            }
            _ => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    CellValue::Empty
                } else {
                    CellValue::Number(trimmed.to_string())
                }
            }
        }
    }

    /// Render the value as the text a record holds.
    pub fn to_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) | CellValue::Number(s) | CellValue::Error(s) => s.clone(),
            CellValue::Bool(true) => "TRUE".to_string(),
            CellValue::Bool(false) => "FALSE".to_string(),
        }
    }

    /// Whether the value is blank after trimming.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_text())
    }
}
