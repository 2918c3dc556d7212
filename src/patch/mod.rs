//! Row-patch transformation for bulk-upload workbooks.
//!
//! The pipeline runs once per call and shares nothing between calls:
//! decode the workbook, resolve the header, read the data rows, patch
//! the first record, encode a fresh workbook.
//!
//! # Example
//!
//! ```no_run
//! use xlpatch::patch::{Patch, RowPatcher, UploadType};
//! use xlpatch::PatchOptions;
//!
//! let input = std::fs::read("fixtures/codes.xlsx")?;
//! let patch = Patch::new("X9Z12", "Q7R33", UploadType::Update);
//!
//! let output = RowPatcher::new(PatchOptions::default()).patch_bytes(&input, &patch)?;
//! std::fs::write("patched.xlsx", output)?;
//! # Ok::<(), xlpatch::Error>(())
//! ```

mod encode;
mod header;
mod patcher;
mod record;

pub use encode::encode_sheet;
pub use header::{normalize_header, HeaderColumn, HeaderMap, REQUIRED_COLUMNS};
pub use patcher::{apply_patch, Patch, UploadType};
pub use record::{read_records, BlankRowPolicy, Record};

use crate::error::Result;
use crate::options::PatchOptions;
use crate::xlsx::{Sheet, XlsxReader, XlsxWriter};
use tracing::{debug, info};

/// Header and records of a bulk-upload worksheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSet {
    /// Worksheet name
    pub name: String,
    pub header: HeaderMap,
    pub records: Vec<Record>,
}

impl RecordSet {
    /// Lay the records back out as a worksheet.
    pub fn to_sheet(&self) -> Sheet {
        encode_sheet(&self.name, &self.header, &self.records)
    }
}

/// Runs the decode, patch, encode pipeline.
#[derive(Debug, Clone, Default)]
pub struct RowPatcher {
    options: PatchOptions,
    writer: XlsxWriter,
}

impl RowPatcher {
    /// Create a patcher with the given options.
    pub fn new(options: PatchOptions) -> Self {
        Self {
            options,
            writer: XlsxWriter::default(),
        }
    }

    /// Use a custom workbook writer.
    pub fn with_writer(mut self, writer: XlsxWriter) -> Self {
        self.writer = writer;
        self
    }

    pub fn options(&self) -> &PatchOptions {
        &self.options
    }

    /// Decode a workbook into its header and records.
    ///
    /// The header is validated before any data row is read.
    pub fn read(&self, data: &[u8]) -> Result<RecordSet> {
        let sheet = XlsxReader::from_bytes(data.to_vec())?.first_sheet()?;
        let header = HeaderMap::resolve(sheet.row(1))?;
        debug!(sheet = %sheet.name, columns = header.len(), "resolved header");

        let records = read_records(&sheet, &header, self.options.blank_rows);
        Ok(RecordSet {
            name: self.options.sheet_name.clone().unwrap_or(sheet.name),
            header,
            records,
        })
    }

    /// Decode and patch, returning the patched records.
    pub fn patch_workbook(&self, data: &[u8], patch: &Patch) -> Result<RecordSet> {
        let set = self.read(data)?;
        let records = apply_patch(&set.records, patch)?;
        debug!(
            source_row = records[0].source_row,
            code = %patch.code,
            decode = %patch.decode,
            function = %patch.function,
            "patched first record"
        );

        Ok(RecordSet { records, ..set })
    }

    /// Run the full pipeline, returning the encoded workbook.
    pub fn patch_bytes(&self, data: &[u8], patch: &Patch) -> Result<Vec<u8>> {
        let patched = self.patch_workbook(data, patch)?;
        let bytes = self.writer.write(&patched.to_sheet())?;

        info!(
            sheet = %patched.name,
            records = patched.records.len(),
            bytes = bytes.len(),
            "workbook patched"
        );

        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::xlsx::{CellValue, SheetRow};

    fn workbook(rows: &[&[&str]]) -> Vec<u8> {
        let mut sheet = Sheet::new("Codes");
        for (values, index) in rows.iter().zip(1u32..) {
            let mut row = SheetRow::new(index);
            for (value, column) in values.iter().zip(1u32..) {
                row.set(column, CellValue::Text(value.to_string()));
            }
            sheet.push_row(row);
        }
        XlsxWriter::new().write(&sheet).unwrap()
    }

    #[test]
    fn test_patch_bytes_round_trip() {
        let input = workbook(&[
            &["CODE", "DECODE", "FUNCTION"],
            &["A1", "B1", "Add"],
            &["A2", "B2", "Delete"],
        ]);
        let patch = Patch::new("X9Z12", "Q7R33", UploadType::Update);
        let patcher = RowPatcher::default();

        let output = patcher.patch_bytes(&input, &patch).unwrap();
        let set = patcher.read(&output).unwrap();

        assert_eq!(set.name, "Codes");
        assert_eq!(set.records[0].get("CODE"), "X9Z12");
        assert_eq!(set.records[0].get("DECODE"), "Q7R33");
        assert_eq!(set.records[0].get("FUNCTION"), "Update");
        assert_eq!(set.records[1].get("CODE"), "A2");
    }

    #[test]
    fn test_sheet_name_override() {
        let input = workbook(&[&["CODE", "DECODE", "FUNCTION"], &["A1", "B1", "Add"]]);
        let patcher = RowPatcher::new(PatchOptions::new().with_sheet_name("Upload"));
        let output = patcher
            .patch_bytes(&input, &Patch::new("C", "D", UploadType::Add))
            .unwrap();

        let sheet = XlsxReader::from_bytes(output).unwrap().first_sheet().unwrap();
        assert_eq!(sheet.name, "Upload");
    }

    #[test]
    fn test_header_checked_before_rows() {
        let input = workbook(&[&["CODE", "DECODE"]]);
        let err = RowPatcher::default()
            .patch_bytes(&input, &Patch::new("C", "D", UploadType::Add))
            .unwrap_err();
        assert!(matches!(err, Error::MissingColumn(name) if name == "FUNCTION"));
    }

    #[test]
    fn test_garbage_input() {
        let err = RowPatcher::default()
            .patch_bytes(b"not a workbook", &Patch::new("C", "D", UploadType::Add))
            .unwrap_err();
        assert!(err.is_decode_failure());
    }

    #[test]
    fn test_custom_writer() {
        let input = workbook(&[&["CODE", "DECODE", "FUNCTION"], &["A1", "B1", "Add"]]);
        let patcher = RowPatcher::default().with_writer(
            XlsxWriter::new()
                .with_creator("bulk-qa")
                .with_compression(zip::CompressionMethod::Stored),
        );

        let output = patcher
            .patch_bytes(&input, &Patch::new("C", "D", UploadType::Delete))
            .unwrap();

        let container = crate::container::OoxmlContainer::from_bytes(output.clone()).unwrap();
        let core = container.read_xml("docProps/core.xml").unwrap();
        assert!(core.contains("<dc:creator>bulk-qa</dc:creator>"));

        let set = patcher.read(&output).unwrap();
        assert_eq!(set.records[0].get("CODE"), "C");
        assert_eq!(set.records[0].get("FUNCTION"), "Delete");
    }
}
