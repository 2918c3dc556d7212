//! # xlpatch
//!
//! Row patching for bulk-upload spreadsheets.
//!
//! This library decodes an `.xlsx` workbook, locates the `CODE`, `DECODE`
//! and `FUNCTION` header columns, overwrites those fields in the first data
//! row and re-encodes the workbook. It also carries the surrounding upload
//! flow: fixture loading, a scenario context and a file-input abstraction.
//!
//! ## Quick Start
//!
//! ```no_run
//! use xlpatch::{patch_file, Patch, UploadType};
//!
//! let patch = Patch::new("X9Z12", "Q7R33", UploadType::NewCategory);
//! let output = patch_file("fixtures/codes.xlsx", &patch)?;
//! std::fs::write("patched.xlsx", output)?;
//! # Ok::<(), xlpatch::Error>(())
//! ```
//!
//! ## Bulk Upload
//!
//! ```no_run
//! use xlpatch::{BulkUpload, RecordingFileInput, ScenarioContext, UploadOptions};
//!
//! let bulk = BulkUpload::new(UploadOptions::default());
//! let mut ctx = ScenarioContext::new();
//! let mut input = RecordingFileInput::new();
//!
//! let patch = bulk.user_uploads_code_decode_file(&mut ctx, &mut input, "codes.xlsx", "new category")?;
//! println!("uploaded code {}", patch.code);
//! # Ok::<(), xlpatch::Error>(())
//! ```
//!
//! ## Features
//!
//! - `async`: Async file input with Tokio

pub mod bulk;
pub mod container;
pub mod context;
pub mod detect;
pub mod error;
pub mod fixture;
pub mod options;
pub mod patch;
pub mod render;
pub mod upload;
pub mod xlsx;

// Re-exports
pub use bulk::{generate_random_value, BulkUpload};
pub use container::{OoxmlContainer, Relationship, Relationships};
pub use context::ScenarioContext;
pub use detect::{detect_format_from_bytes, detect_format_from_path, FormatType};
pub use error::{Error, Result};
pub use fixture::FixtureLoader;
pub use options::{PatchOptions, UploadOptions};
pub use patch::{BlankRowPolicy, HeaderMap, Patch, Record, RecordSet, RowPatcher, UploadType};
pub use upload::{FileInput, RecordingFileInput, SimulatedFile};

use std::path::Path;

/// Patch the first data row of a workbook held in memory.
///
/// # Example
///
/// ```no_run
/// use xlpatch::{patch_bytes, Patch, UploadType};
///
/// let data = std::fs::read("codes.xlsx")?;
/// let output = patch_bytes(&data, &Patch::new("X9Z12", "Q7R33", UploadType::Add))?;
/// # Ok::<(), xlpatch::Error>(())
/// ```
pub fn patch_bytes(data: &[u8], patch: &Patch) -> Result<Vec<u8>> {
    RowPatcher::default().patch_bytes(data, patch)
}

/// Patch the first data row of a workbook file.
///
/// The format is checked before the workbook is decoded.
pub fn patch_file(path: impl AsRef<Path>, patch: &Patch) -> Result<Vec<u8>> {
    let data = std::fs::read(path.as_ref())?;
    check_spreadsheet(detect_format_from_bytes(&data)?)?;
    patch_bytes(&data, patch)
}

/// Decode a workbook's header and data records without patching.
pub fn read_records_from_bytes(data: &[u8]) -> Result<RecordSet> {
    RowPatcher::default().read(data)
}

/// Patch the first data row of a workbook file, reading it asynchronously.
#[cfg(feature = "async")]
pub async fn patch_file_async(path: impl AsRef<Path>, patch: &Patch) -> Result<Vec<u8>> {
    let data = tokio::fs::read(path.as_ref()).await?;
    check_spreadsheet(detect_format_from_bytes(&data)?)?;
    patch_bytes(&data, patch)
}

fn check_spreadsheet(format: FormatType) -> Result<()> {
    match format {
        FormatType::Xlsx => Ok(()),
        other => Err(Error::UnsupportedFormat(other.name().to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xlsx::{CellValue, Sheet, SheetRow, XlsxWriter};

    fn codes_workbook() -> Vec<u8> {
        let mut sheet = Sheet::new("Sheet1");
        for (index, values) in [(1, ["CODE", "DECODE", "FUNCTION"]), (2, ["A1", "B1", "Add"])] {
            let mut row = SheetRow::new(index);
            for (value, column) in values.iter().zip(1u32..) {
                row.set(column, CellValue::Text(value.to_string()));
            }
            sheet.push_row(row);
        }
        XlsxWriter::new().write(&sheet).unwrap()
    }

    #[test]
    fn test_patch_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("codes.xlsx");
        std::fs::write(&path, codes_workbook()).unwrap();

        let output = patch_file(&path, &Patch::new("C1", "D1", UploadType::Delete)).unwrap();
        let set = read_records_from_bytes(&output).unwrap();
        assert_eq!(set.records.len(), 1);
        assert_eq!(set.records[0].get("FUNCTION"), "Delete");
    }

    #[test]
    fn test_patch_file_rejects_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "CODE,DECODE,FUNCTION").unwrap();

        let err = patch_file(&path, &Patch::new("C", "D", UploadType::Add)).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn test_patch_file_async() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("codes.xlsx");
        std::fs::write(&path, codes_workbook()).unwrap();

        let output = patch_file_async(&path, &Patch::new("C1", "D1", UploadType::Update))
            .await
            .unwrap();
        let set = read_records_from_bytes(&output).unwrap();
        assert_eq!(set.records[0].get("CODE"), "C1");
    }
}
