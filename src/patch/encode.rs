//! Workbook encoding: header plus records back into a worksheet.

use super::header::HeaderMap;
use super::record::Record;
use crate::xlsx::{CellValue, Sheet, SheetRow};

/// Lay out a header and its records as a worksheet.
///
/// Row 1 holds the header texts verbatim. Record `n` lands on row `n + 2`.
/// Every value sits in its header's original column, so column order is
/// that of the source header row.
pub fn encode_sheet(name: &str, header: &HeaderMap, records: &[Record]) -> Sheet {
    let mut sheet = Sheet::new(name);

    let mut header_row = SheetRow::new(1);
    for column in header.columns() {
        header_row.set(column.column, CellValue::Text(column.name.clone()));
    }
    sheet.push_row(header_row);

    for (record, index) in records.iter().zip(2u32..) {
        let mut row = SheetRow::new(index);
        for (position, column) in header.columns().iter().enumerate() {
            let value = record
                .fields()
                .nth(position)
                .filter(|(name, _)| *name == column.name)
                .map(|(_, value)| value)
                .unwrap_or_else(|| record.get(&column.name));
            if !value.is_empty() {
                row.set(column.column, CellValue::Text(value.to_string()));
            }
        }
        sheet.push_row(row);
    }

    sheet
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_follow_header_positions() {
        let header = HeaderMap::from_names(["FUNCTION", "CODE", "EXTRA", "DECODE"]).unwrap();
        let record = Record::new(
            2,
            vec![
                ("FUNCTION".into(), "Add".into()),
                ("CODE".into(), "A1".into()),
                ("EXTRA".into(), String::new()),
                ("DECODE".into(), "B1".into()),
            ],
        );

        let sheet = encode_sheet("Codes", &header, &[record]);
        let header_row = sheet.row(1).unwrap();
        let texts: Vec<String> = (1..=4).map(|c| header_row.text(c)).collect();
        assert_eq!(texts, vec!["FUNCTION", "CODE", "EXTRA", "DECODE"]);

        let data = sheet.row(2).unwrap();
        assert_eq!(data.text(1), "Add");
        assert_eq!(data.text(2), "A1");
        assert!(data.get(3).is_none());
        assert_eq!(data.text(4), "B1");
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let header = HeaderMap::from_names(["CODE", "DECODE", "FUNCTION"]).unwrap();
        let record = Record::new(5, vec![("code".into(), "only".into())]);

        let sheet = encode_sheet("Codes", &header, &[record]);
        let data = sheet.row(2).unwrap();
        assert_eq!(data.text(1), "only");
        assert_eq!(data.cells.len(), 1);
    }
}
