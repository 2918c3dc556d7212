//! Error types for the xlpatch library.

use std::io;
use thiserror::Error;

/// Result type alias for xlpatch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while patching and uploading workbooks.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A required header column is absent from row 1.
    #[error("Required header missing: {0}")]
    MissingColumn(String),

    /// The worksheet has no data rows to patch.
    #[error("No data rows found to update")]
    EmptyInput,

    /// The input bytes are not a well-formed spreadsheet package.
    #[error("Decode failure: {0}")]
    Decode(String),

    /// Serializing the output workbook failed.
    #[error("Encode failure: {0}")]
    Encode(String),

    /// The file format could not be determined.
    #[error("Unknown file format")]
    UnknownFormat,

    /// The file format is recognized but not supported.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A required package part is missing.
    #[error("Missing component: {0}")]
    MissingComponent(String),

    /// An operation label that does not name an upload type.
    #[error("Unknown operation type: {0}")]
    UnknownOperation(String),

    /// A write-once scenario key was written twice.
    #[error("Scenario key already set: {0}")]
    ContextKeyExists(String),

    /// A configuration file could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A post-upload check on the page did not hold.
    #[error("Assertion failed: {0}")]
    Assertion(String),

    /// A fixture file could not be found.
    #[error("Fixture not found: {0}")]
    FixtureNotFound(String),
}

impl Error {
    /// Whether this error means the input was not a readable spreadsheet.
    pub fn is_decode_failure(&self) -> bool {
        matches!(
            self,
            Error::Decode(_) | Error::MissingComponent(_) | Error::UnknownFormat | Error::UnsupportedFormat(_)
        )
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::Decode(format!("ZIP archive error: {}", err))
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Decode(format!("XML parse error: {}", err))
    }
}

impl From<base64::DecodeError> for Error {
    fn from(err: base64::DecodeError) -> Self {
        Error::Decode(format!("base64 error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::MissingColumn("FUNCTION".to_string());
        assert_eq!(err.to_string(), "Required header missing: FUNCTION");

        let err = Error::EmptyInput;
        assert_eq!(err.to_string(), "No data rows found to update");

        let err = Error::UnknownOperation("rename".to_string());
        assert_eq!(err.to_string(), "Unknown operation type: rename");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(!err.is_decode_failure());
    }

    #[test]
    fn test_decode_failure_grouping() {
        assert!(Error::Decode("bad".into()).is_decode_failure());
        assert!(Error::MissingComponent("xl/workbook.xml".into()).is_decode_failure());
        assert!(!Error::EmptyInput.is_decode_failure());
        assert!(!Error::Encode("x".into()).is_decode_failure());
    }
}
