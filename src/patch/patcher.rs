//! Row patching: overwrite the first record's CODE/DECODE/FUNCTION.

use super::record::Record;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Bulk-upload operation written into the FUNCTION column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UploadType {
    Add,
    Update,
    Delete,
    NewCategory,
}

impl UploadType {
    /// Every upload type, in declaration order.
    pub const ALL: [UploadType; 4] = [
        UploadType::Add,
        UploadType::Update,
        UploadType::Delete,
        UploadType::NewCategory,
    ];

    /// The text stored in the FUNCTION column.
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadType::Add => "Add",
            UploadType::Update => "Update",
            UploadType::Delete => "Delete",
            UploadType::NewCategory => "NewCategory",
        }
    }
}

impl std::fmt::Display for UploadType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UploadType {
    type Err = Error;

    /// Parse an operation label such as `"new category"` (case-insensitive).
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "add" => Ok(UploadType::Add),
            "update" => Ok(UploadType::Update),
            "delete" => Ok(UploadType::Delete),
            "new category" | "newcategory" => Ok(UploadType::NewCategory),
            _ => Err(Error::UnknownOperation(s.to_string())),
        }
    }
}

/// New values for the first data row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patch {
    pub code: String,
    pub decode: String,
    pub function: UploadType,
}

impl Patch {
    pub fn new(code: impl Into<String>, decode: impl Into<String>, function: UploadType) -> Self {
        Self {
            code: code.into(),
            decode: decode.into(),
            function,
        }
    }

    /// `(column, value)` pairs this patch writes.
    pub fn assignments(&self) -> [(&'static str, &str); 3] {
        [
            ("CODE", self.code.as_str()),
            ("DECODE", self.decode.as_str()),
            ("FUNCTION", self.function.as_str()),
        ]
    }
}

/// Return a copy of `records` with the first record patched.
///
/// Fails with [`Error::EmptyInput`] when there is no record to patch.
pub fn apply_patch(records: &[Record], patch: &Patch) -> Result<Vec<Record>> {
    let mut patched = records.to_vec();
    let first = patched.first_mut().ok_or(Error::EmptyInput)?;

    for (column, value) in patch.assignments() {
        if !first.set(column, value) {
            return Err(Error::MissingColumn(column.to_string()));
        }
    }

    Ok(patched)
}
