//! Decoded worksheet model.

use super::cell::CellValue;
use serde::Serialize;

/// A single populated cell. Columns are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetCell {
    pub column: u32,
    pub value: CellValue,
}

/// A worksheet row holding its cells in column order. Rows are 1-based.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SheetRow {
    pub index: u32,
    pub cells: Vec<SheetCell>,
}

impl SheetRow {
    /// Create an empty row.
    pub fn new(index: u32) -> Self {
        Self {
            index,
            cells: Vec::new(),
        }
    }

    /// Look up the value in a column.
    pub fn get(&self, column: u32) -> Option<&CellValue> {
        self.cells
            .binary_search_by_key(&column, |c| c.column)
            .ok()
            .map(|i| &self.cells[i].value)
    }

    /// Text of a column; missing cells render as the empty string.
    pub fn text(&self, column: u32) -> String {
        self.get(column).map(CellValue::to_text).unwrap_or_default()
    }

    /// Insert or replace a cell, keeping column order.
    pub fn set(&mut self, column: u32, value: CellValue) {
        match self.cells.binary_search_by_key(&column, |c| c.column) {
            Ok(i) => self.cells[i].value = value,
            Err(i) => self.cells.insert(i, SheetCell { column, value }),
        }
    }

    /// Whether every cell is blank after trimming.
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|c| c.value.is_blank())
    }
}

/// The first worksheet of a workbook, rows in ascending order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<SheetRow>,
}

impl Sheet {
    /// Create an empty sheet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    /// Look up a row by its 1-based index.
    pub fn row(&self, index: u32) -> Option<&SheetRow> {
        self.rows
            .binary_search_by_key(&index, |r| r.index)
            .ok()
            .map(|i| &self.rows[i])
    }

    /// Index of the last row that holds any cell.
    pub fn last_row_index(&self) -> u32 {
        self.rows.last().map(|r| r.index).unwrap_or(0)
    }

    /// Largest column index in use.
    pub fn max_column(&self) -> u32 {
        self.rows
            .iter()
            .filter_map(|r| r.cells.last().map(|c| c.column))
            .max()
            .unwrap_or(0)
    }

    /// Append a row, keeping row order.
    pub fn push_row(&mut self, row: SheetRow) {
        match self.rows.binary_search_by_key(&row.index, |r| r.index) {
            Ok(i) => self.rows[i] = row,
            Err(i) => self.rows.insert(i, row),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_lookup_and_defaults() {
        let mut row = SheetRow::new(2);
        row.set(3, CellValue::Text("c".into()));
        row.set(1, CellValue::Number("7".into()));

        assert_eq!(row.cells[0].column, 1);
        assert_eq!(row.text(1), "7");
        assert_eq!(row.text(2), "");
        assert_eq!(row.text(3), "c");

        row.set(3, CellValue::Text("d".into()));
        assert_eq!(row.cells.len(), 2);
        assert_eq!(row.text(3), "d");
    }

    #[test]
    fn test_sheet_rows_ordered() {
        let mut sheet = Sheet::new("Codes");
        sheet.push_row(SheetRow::new(5));
        sheet.push_row(SheetRow::new(1));
        sheet.push_row(SheetRow::new(3));

        let order: Vec<u32> = sheet.rows.iter().map(|r| r.index).collect();
        assert_eq!(order, vec![1, 3, 5]);
        assert!(sheet.row(3).is_some());
        assert!(sheet.row(2).is_none());
        assert_eq!(sheet.last_row_index(), 5);
    }

    #[test]
    fn test_blank_row() {
        let mut row = SheetRow::new(4);
        assert!(row.is_blank());
        row.set(1, CellValue::Text("  ".into()));
        assert!(row.is_blank());
        row.set(2, CellValue::Number("0".into()));
        assert!(!row.is_blank());
    }
}
