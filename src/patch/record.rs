//! Data rows as header-keyed records.

use super::header::{normalize_header, HeaderMap};
use crate::xlsx::Sheet;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// What to do with data rows whose cells are all blank.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlankRowPolicy {
    /// Drop blank rows; the first non-blank row is patched.
    #[default]
    Skip,
    /// Keep blank rows in place; physical row 2 is always patched.
    Positional,
}

/// One data row keyed by header name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    /// Worksheet row the record was read from
    pub source_row: u32,
    fields: Vec<(String, String)>,
}

impl Record {
    /// Create a record from `(header, value)` pairs in header order.
    pub fn new(source_row: u32, fields: Vec<(String, String)>) -> Self {
        Self { source_row, fields }
    }

    /// Value of a header; absent headers read as the empty string.
    pub fn get(&self, name: &str) -> &str {
        self.position(name)
            .map(|i| self.fields[i].1.as_str())
            .unwrap_or("")
    }

    /// Overwrite the value of an existing header.
    ///
    /// Returns `false` when the record has no such header.
    pub fn set(&mut self, name: &str, value: impl Into<String>) -> bool {
        match self.position(name) {
            Some(i) => {
                self.fields[i].1 = value.into();
                true
            }
            None => false,
        }
    }

    /// `(header, value)` pairs in header order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Whether every value is blank after trimming.
    pub fn is_blank(&self) -> bool {
        self.fields.iter().all(|(_, v)| v.trim().is_empty())
    }

    fn position(&self, name: &str) -> Option<usize> {
        let key = normalize_header(name);
        self.fields
            .iter()
            .position(|(header, _)| normalize_header(header) == key)
    }
}

/// Read rows 2 through the last populated row into records.
///
/// A row counts as populated when any cell under a named header is
/// non-blank; trailing blank rows are never returned.
pub fn read_records(sheet: &Sheet, header: &HeaderMap, policy: BlankRowPolicy) -> Vec<Record> {
    let columns = header.columns();

    let rows: Vec<(u32, Vec<(String, String)>)> = sheet
        .rows
        .iter()
        .filter(|row| row.index >= 2)
        .map(|row| {
            let fields = columns
                .iter()
                .map(|c| (c.name.clone(), row.text(c.column)))
                .collect();
            (row.index, fields)
        })
        .collect();

    let is_blank = |fields: &[(String, String)]| fields.iter().all(|(_, v)| v.trim().is_empty());
    let last_populated = rows
        .iter()
        .rev()
        .find(|(_, fields)| !is_blank(fields))
        .map(|(index, _)| *index);

    let Some(last) = last_populated else {
        debug!("worksheet has no populated data rows");
        return Vec::new();
    };

    let records: Vec<Record> = match policy {
        BlankRowPolicy::Skip => rows
            .into_iter()
            .filter(|(_, fields)| !is_blank(fields))
            .map(|(index, fields)| Record::new(index, fields))
            .collect(),
        BlankRowPolicy::Positional => {
            let mut by_index = rows.into_iter().peekable();
            (2..=last)
                .map(|index| match by_index.next_if(|(i, _)| *i == index) {
                    Some((_, fields)) => Record::new(index, fields),
                    None => Record::new(
                        index,
                        columns
                            .iter()
                            .map(|c| (c.name.clone(), String::new()))
                            .collect(),
                    ),
                })
                .collect()
        }
    };

    debug!(
        records = records.len(),
        last_row = last,
        policy = ?policy,
        "read data records"
    );

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xlsx::{CellValue, SheetRow};

    fn sheet(rows: &[(u32, &[&str])]) -> Sheet {
        let mut sheet = Sheet::new("Codes");
        for (index, values) in rows {
            let mut row = SheetRow::new(*index);
            for (i, v) in values.iter().enumerate() {
                if !v.is_empty() {
                    row.set(i as u32 + 1, CellValue::Text(v.to_string()));
                }
            }
            sheet.push_row(row);
        }
        sheet
    }

    fn header_of(sheet: &Sheet) -> HeaderMap {
        HeaderMap::resolve(sheet.row(1)).unwrap()
    }

    #[test]
    fn test_records_keyed_by_header() {
        let sheet = sheet(&[
            (1, &["CODE", "DECODE", "FUNCTION"]),
            (2, &["A1", "B1", "Add"]),
            (3, &["A2", "", "Delete"]),
        ]);
        let records = read_records(&sheet, &header_of(&sheet), BlankRowPolicy::Skip);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].get("code"), "A1");
        assert_eq!(records[1].get("DECODE"), "");
        assert_eq!(records[1].get("MISSING"), "");
        assert_eq!(records[1].source_row, 3);
    }

    #[test]
    fn test_skip_policy_drops_blank_rows() {
        let sheet = sheet(&[
            (1, &["CODE", "DECODE", "FUNCTION"]),
            (2, &["  ", "", ""]),
            (3, &["A2", "B2", "Update"]),
        ]);
        let records = read_records(&sheet, &header_of(&sheet), BlankRowPolicy::Skip);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].source_row, 3);
    }

    #[test]
    fn test_positional_policy_keeps_interior_gaps() {
        let sheet = sheet(&[
            (1, &["CODE", "DECODE", "FUNCTION"]),
            (3, &["A3", "B3", "Add"]),
            (6, &["", "", ""]),
        ]);
        let records = read_records(&sheet, &header_of(&sheet), BlankRowPolicy::Positional);

        let rows: Vec<u32> = records.iter().map(|r| r.source_row).collect();
        assert_eq!(rows, vec![2, 3]);
        assert!(records[0].is_blank());
        assert_eq!(records[1].get("CODE"), "A3");
    }

    #[test]
    fn test_header_only_has_no_records() {
        let sheet = sheet(&[(1, &["CODE", "DECODE", "FUNCTION"])]);
        for policy in [BlankRowPolicy::Skip, BlankRowPolicy::Positional] {
            assert!(read_records(&sheet, &header_of(&sheet), policy).is_empty());
        }
    }

    #[test]
    fn test_cells_outside_header_ignored() {
        let sheet = sheet(&[
            (1, &["CODE", "DECODE", "FUNCTION"]),
            (2, &["", "", "", "stray"]),
        ]);
        assert!(read_records(&sheet, &header_of(&sheet), BlankRowPolicy::Skip).is_empty());
    }

    #[test]
    fn test_record_set() {
        let mut record = Record::new(
            2,
            vec![("Code".to_string(), "A".to_string())],
        );
        assert!(record.set("CODE", "Z"));
        assert_eq!(record.get("code"), "Z");
        assert!(!record.set("DECODE", "Y"));
    }
}
