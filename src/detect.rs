//! Format detection for upload payloads.

use crate::container::decode_xml_bytes;
use crate::error::{Error, Result};
use std::io::{Read, Seek};
use std::path::Path;

/// ZIP file magic bytes: PK\x03\x04
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// Content type for the XLSX workbook part.
const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";

/// MIME type announced for spreadsheet uploads.
pub const XLSX_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// MIME type announced for plain-text uploads.
pub const TEXT_MIME_TYPE: &str = "text/plain";

/// Detected upload payload format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatType {
    /// Excel workbook (.xlsx)
    Xlsx,
    /// Anything that decodes as UTF-8 text
    PlainText,
}

impl FormatType {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            FormatType::Xlsx => "xlsx",
            FormatType::PlainText => "txt",
        }
    }

    /// Returns the MIME type a browser would attach to this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            FormatType::Xlsx => XLSX_MIME_TYPE,
            FormatType::PlainText => TEXT_MIME_TYPE,
        }
    }

    /// Returns a human-readable name for this format.
    pub fn name(&self) -> &'static str {
        match self {
            FormatType::Xlsx => "Excel Workbook",
            FormatType::PlainText => "Plain Text",
        }
    }
}

impl std::fmt::Display for FormatType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Detect the format type from a file path.
pub fn detect_format_from_path(path: impl AsRef<Path>) -> Result<FormatType> {
    let data = std::fs::read(path.as_ref())?;
    detect_format_from_bytes(&data)
}

/// Detect the format type from a byte slice.
///
/// # Example
///
/// ```no_run
/// use xlpatch::detect::{detect_format_from_bytes, FormatType};
///
/// let data = std::fs::read("fixtures/codes.xlsx")?;
/// assert_eq!(detect_format_from_bytes(&data)?, FormatType::Xlsx);
/// # Ok::<(), xlpatch::Error>(())
/// ```
pub fn detect_format_from_bytes(data: &[u8]) -> Result<FormatType> {
    if data.len() >= 4 && data[..4] == ZIP_MAGIC {
        let cursor = std::io::Cursor::new(data);
        return detect_package_format(cursor);
    }

    match std::str::from_utf8(data) {
        Ok(text) if !text.contains('\0') => Ok(FormatType::PlainText),
        _ => Err(Error::UnknownFormat),
    }
}

/// Inspect `[Content_Types].xml` of a ZIP package.
fn detect_package_format<R: Read + Seek>(reader: R) -> Result<FormatType> {
    let mut archive = zip::ZipArchive::new(reader)?;

    let content_types = match archive.by_name("[Content_Types].xml") {
        Ok(mut file) => {
            let mut bytes = Vec::new();
            file.read_to_end(&mut bytes)?;
            decode_xml_bytes(&bytes)?
        }
        Err(_) => {
            return Err(Error::MissingComponent("[Content_Types].xml".to_string()));
        }
    };

    if content_types.contains(XLSX_CONTENT_TYPE) {
        Ok(FormatType::Xlsx)
    } else {
        Err(Error::UnsupportedFormat(
            "ZIP package without a spreadsheet workbook".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;

    fn zip_with_content_types(content_types: &str) -> Vec<u8> {
        let mut buffer = Vec::new();
        let mut zip = zip::ZipWriter::new(Cursor::new(&mut buffer));
        zip.start_file("[Content_Types].xml", SimpleFileOptions::default())
            .unwrap();
        zip.write_all(content_types.as_bytes()).unwrap();
        zip.finish().unwrap();
        buffer
    }

    #[test]
    fn test_detect_xlsx() {
        let data = zip_with_content_types(&format!(
            r#"<Types><Override PartName="/xl/workbook.xml" ContentType="{}"/></Types>"#,
            XLSX_CONTENT_TYPE
        ));
        let format = detect_format_from_bytes(&data).unwrap();
        assert_eq!(format, FormatType::Xlsx);
        assert_eq!(format.mime_type(), XLSX_MIME_TYPE);
    }

    #[test]
    fn test_detect_other_package() {
        let data = zip_with_content_types("<Types/>");
        assert!(matches!(
            detect_format_from_bytes(&data),
            Err(Error::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_detect_plain_text() {
        let format = detect_format_from_bytes(b"just some notes\n").unwrap();
        assert_eq!(format, FormatType::PlainText);
        assert_eq!(format.mime_type(), "text/plain");
    }

    #[test]
    fn test_detect_binary_garbage() {
        assert!(matches!(
            detect_format_from_bytes(&[0x00, 0xFF, 0x10, 0x80]),
            Err(Error::UnknownFormat)
        ));
    }

    #[test]
    fn test_detect_from_path() {
        let dir = tempfile::tempdir().unwrap();

        let workbook = dir.path().join("codes.xlsx");
        std::fs::write(
            &workbook,
            zip_with_content_types(&format!(
                r#"<Types><Override PartName="/xl/workbook.xml" ContentType="{}"/></Types>"#,
                XLSX_CONTENT_TYPE
            )),
        )
        .unwrap();
        assert_eq!(detect_format_from_path(&workbook).unwrap(), FormatType::Xlsx);

        let notes = dir.path().join("notes.txt");
        std::fs::write(&notes, "plain text").unwrap();
        assert_eq!(detect_format_from_path(&notes).unwrap(), FormatType::PlainText);

        assert!(matches!(
            detect_format_from_path(dir.path().join("absent.xlsx")),
            Err(Error::Io(_))
        ));
    }
}
