//! Patch and upload configuration.

use crate::error::{Error, Result};
use crate::patch::BlankRowPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default directory fixtures are resolved against.
pub const DEFAULT_FIXTURES_DIR: &str = "fixtures";

/// Default location of the patched workbook written for inspection.
pub const DEFAULT_TEMP_PATH: &str = "temp/temp.xlsx";

/// Default length of generated code/decode values.
pub const DEFAULT_RANDOM_LENGTH: usize = 5;

/// Options for the row-patch transformation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PatchOptions {
    /// How all-blank data rows are treated
    pub blank_rows: BlankRowPolicy,

    /// Name of the output sheet (default: the source sheet's name)
    pub sheet_name: Option<String>,
}

impl PatchOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the blank-row policy.
    pub fn with_blank_rows(mut self, policy: BlankRowPolicy) -> Self {
        self.blank_rows = policy;
        self
    }

    /// Override the output sheet name.
    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = Some(name.into());
        self
    }
}

/// Options for a bulk-upload run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadOptions {
    /// Directory fixture names are resolved against
    pub fixtures_dir: PathBuf,

    /// Where the patched workbook is written
    pub temp_path: PathBuf,

    /// Length of generated code/decode values
    pub random_length: usize,

    /// Transformation options
    pub patch: PatchOptions,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            fixtures_dir: PathBuf::from(DEFAULT_FIXTURES_DIR),
            temp_path: PathBuf::from(DEFAULT_TEMP_PATH),
            random_length: DEFAULT_RANDOM_LENGTH,
            patch: PatchOptions::default(),
        }
    }
}

impl UploadOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load options from a JSON file. Missing fields take their defaults.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use xlpatch::UploadOptions;
    ///
    /// let options = UploadOptions::from_json_file("xlpatch.json")?;
    /// println!("fixtures: {}", options.fixtures_dir.display());
    /// # Ok::<(), xlpatch::Error>(())
    /// ```
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }

    /// Parse options from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    /// Set the fixtures directory.
    pub fn with_fixtures_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fixtures_dir = dir.into();
        self
    }

    /// Set the temp file path.
    pub fn with_temp_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.temp_path = path.into();
        self
    }

    /// Set the generated value length.
    pub fn with_random_length(mut self, length: usize) -> Self {
        self.random_length = length;
        self
    }

    /// Set the transformation options.
    pub fn with_patch_options(mut self, patch: PatchOptions) -> Self {
        self.patch = patch;
        self
    }
}
