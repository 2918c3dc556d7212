//! Upload dispatch: hand bytes to a file input and raise a change event.
//!
//! The browser side is abstracted behind [`FileInput`]. A real driver
//! assigns the files to an `<input type="file">` and fires `change`;
//! [`RecordingFileInput`] does the same bookkeeping headlessly.

use crate::detect::{detect_format_from_bytes, TEXT_MIME_TYPE, XLSX_MIME_TYPE};
use crate::error::{Error, Result};
use crate::fixture::{decode_base64_fixture, FixtureLoader};
use tracing::info;

/// A file object as a page script would see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulatedFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl SimulatedFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }

    /// A spreadsheet file with the XLSX MIME type.
    pub fn spreadsheet(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::new(name, XLSX_MIME_TYPE, bytes)
    }

    /// Size in bytes.
    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// A change event raised on a file input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    /// Names of the files selected when the event fired
    pub files: Vec<String>,
    /// Whether actionability checks were bypassed
    pub forced: bool,
}

/// A file-selection element.
pub trait FileInput {
    /// Replace the selected files.
    fn set_files(&mut self, files: Vec<SimulatedFile>);

    /// Fire a `change` event.
    fn trigger_change(&mut self, force: bool) -> Result<()>;

    /// Text of the application's filename label, if it shows one.
    fn filename_label(&self) -> Option<String>;
}

/// Headless [`FileInput`] that records what was selected and fired.
///
/// The filename label mirrors what the application renders after a
/// change event: the names of the selected files.
#[derive(Debug, Default)]
pub struct RecordingFileInput {
    files: Vec<SimulatedFile>,
    events: Vec<ChangeEvent>,
    label: Option<String>,
}

impl RecordingFileInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Currently selected files.
    pub fn files(&self) -> &[SimulatedFile] {
        &self.files
    }

    /// Change events fired so far.
    pub fn events(&self) -> &[ChangeEvent] {
        &self.events
    }
}

impl FileInput for RecordingFileInput {
    fn set_files(&mut self, files: Vec<SimulatedFile>) {
        self.files = files;
    }

    fn trigger_change(&mut self, force: bool) -> Result<()> {
        let names: Vec<String> = self.files.iter().map(|f| f.name.clone()).collect();
        self.label = Some(names.join(", "));
        self.events.push(ChangeEvent {
            files: names,
            forced: force,
        });
        Ok(())
    }

    fn filename_label(&self) -> Option<String> {
        self.label.clone()
    }
}

/// Select exactly `file` on `input` and fire one forced change event.
pub fn dispatch_upload<I: FileInput + ?Sized>(input: &mut I, file: SimulatedFile) -> Result<()> {
    info!(
        file = %file.name,
        mime = %file.mime_type,
        bytes = file.size(),
        "dispatching upload"
    );
    input.set_files(vec![file]);
    input.trigger_change(true)
}

/// Check the filename label shows `expected`.
pub fn verify_filename_label<I: FileInput + ?Sized>(input: &I, expected: &str) -> Result<()> {
    match input.filename_label() {
        Some(label) if label == expected => Ok(()),
        other => Err(Error::Assertion(format!(
            "filename label expected {:?}, found {:?}",
            expected,
            other.unwrap_or_default()
        ))),
    }
}

/// Upload a spreadsheet fixture unchanged.
pub fn upload_fixture<I: FileInput + ?Sized>(
    loader: &FixtureLoader,
    input: &mut I,
    name: &str,
) -> Result<()> {
    let bytes = decode_base64_fixture(&loader.load_base64(name)?)?;
    dispatch_upload(input, SimulatedFile::spreadsheet(name, bytes))?;
    verify_filename_label(input, name)
}

/// Upload a fixture announced as plain text.
pub fn upload_non_excel_fixture<I: FileInput + ?Sized>(
    loader: &FixtureLoader,
    input: &mut I,
    name: &str,
) -> Result<()> {
    let bytes = decode_base64_fixture(&loader.load_base64(name)?)?;
    dispatch_upload(input, SimulatedFile::new(name, TEXT_MIME_TYPE, bytes))?;
    verify_filename_label(input, name)
}

/// Upload a fixture with the MIME type its content implies.
pub fn upload_detected<I: FileInput + ?Sized>(
    loader: &FixtureLoader,
    input: &mut I,
    name: &str,
) -> Result<()> {
    let bytes = loader.load(name)?;
    let format = detect_format_from_bytes(&bytes)?;
    dispatch_upload(input, SimulatedFile::new(name, format.mime_type(), bytes))?;
    verify_filename_label(input, name)
}
