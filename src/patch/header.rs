//! Header resolution: maps normalized column names to positions.

use crate::error::{Error, Result};
use crate::xlsx::SheetRow;
use serde::Serialize;
use std::collections::HashMap;
use tracing::warn;
use unicode_normalization::UnicodeNormalization;

/// Column names every bulk-upload workbook must carry.
pub const REQUIRED_COLUMNS: [&str; 3] = ["CODE", "DECODE", "FUNCTION"];

/// Normalize a header for lookup: trim, NFC, uppercase.
pub fn normalize_header(name: &str) -> String {
    name.trim().nfc().collect::<String>().to_uppercase()
}

/// One column of the header row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderColumn {
    /// Header text as it appears in the workbook
    pub name: String,
    /// Normalized lookup key
    pub key: String,
    /// 1-based column position
    pub column: u32,
}

/// Resolved header row.
///
/// Columns keep their left-to-right order; lookups go through a separate
/// index so positioning never depends on map iteration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderMap {
    columns: Vec<HeaderColumn>,
    index: HashMap<String, usize>,
}

impl HeaderMap {
    /// Resolve the header from row 1 of a worksheet.
    ///
    /// `None` means the sheet has no header row at all. Fails with
    /// [`Error::MissingColumn`] naming the first required column absent.
    pub fn resolve(row: Option<&SheetRow>) -> Result<Self> {
        let cells = row
            .map(|r| {
                r.cells
                    .iter()
                    .map(|c| (c.column, c.value.to_text()))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        Self::from_cells(cells)
    }

    /// Build from header names laid out from column A onwards.
    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let cells = names
            .into_iter()
            .zip(1u32..)
            .map(|(name, column)| (column, name.into()))
            .collect();
        Self::from_cells(cells)
    }

    fn from_cells(mut cells: Vec<(u32, String)>) -> Result<Self> {
        cells.sort_by_key(|(column, _)| *column);

        let mut header = Self::default();
        for (column, name) in cells {
            let key = normalize_header(&name);
            // Whitespace-only headers carry their column through but are never looked up
            if key.is_empty() {
                header.columns.push(HeaderColumn { name, key, column });
                continue;
            }
            if header.index.contains_key(&key) {
                warn!(header = %name, column, "duplicate header name; first occurrence wins");
            } else {
                header.index.insert(key.clone(), header.columns.len());
            }
            header.columns.push(HeaderColumn { name, key, column });
        }

        header.require(&REQUIRED_COLUMNS)?;
        Ok(header)
    }

    /// Check that every named column is present.
    pub fn require(&self, names: &[&str]) -> Result<()> {
        match names.iter().find(|name| self.column_of(name).is_none()) {
            Some(missing) => Err(Error::MissingColumn(missing.to_string())),
            None => Ok(()),
        }
    }

    /// 1-based column of a header name, matched case- and space-insensitively.
    pub fn column_of(&self, name: &str) -> Option<u32> {
        self.position_of(name).map(|i| self.columns[i].column)
    }

    /// Position of a header within [`columns`](Self::columns).
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.index.get(&normalize_header(name)).copied()
    }

    /// Header columns in left-to-right order, whitespace-only ones included.
    pub fn columns(&self) -> &[HeaderColumn] {
        &self.columns
    }

    /// Header texts in left-to-right order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}
