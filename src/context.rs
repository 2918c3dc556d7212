//! Scenario-scoped key-value store shared between steps.

use crate::error::{Error, Result};
use std::collections::HashMap;
use std::path::PathBuf;

/// Key holding the path of the patched workbook.
pub const UPLOADED_EXCEL_PATH: &str = "uploadedExcelPath";

/// Key holding the generated CODE value.
pub const UPLOADED_CODE: &str = "uploadedCode";

/// Key holding the generated DECODE value.
pub const UPLOADED_DECODE: &str = "uploadedDecode";

/// Values handed from one step of a scenario to later ones.
///
/// Each key may be written once per scenario. Call [`clear`](Self::clear)
/// between scenarios.
#[derive(Debug, Clone, Default)]
pub struct ScenarioContext {
    values: HashMap<String, String>,
}

impl ScenarioContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value; fails if the key was already written.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<()> {
        if self.values.contains_key(key) {
            return Err(Error::ContextKeyExists(key.to_string()));
        }
        self.values.insert(key.to_string(), value.into());
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Read a value as a filesystem path.
    pub fn get_path(&self, key: &str) -> Option<PathBuf> {
        self.get(key).map(PathBuf::from)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Forget every value.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
