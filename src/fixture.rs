//! Fixture loading for upload scenarios.

use crate::error::{Error, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolves fixture names against a root directory.
#[derive(Debug, Clone)]
pub struct FixtureLoader {
    root: PathBuf,
}

impl FixtureLoader {
    /// Create a loader rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full path of a fixture.
    pub fn resolve(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Read a fixture's raw bytes.
    pub fn load(&self, name: &str) -> Result<Vec<u8>> {
        let path = self.resolve(name);
        let bytes = std::fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::FixtureNotFound(path.display().to_string()),
            _ => Error::Io(e),
        })?;
        debug!(fixture = %path.display(), bytes = bytes.len(), "loaded fixture");
        Ok(bytes)
    }

    /// Read a fixture as base64 text.
    pub fn load_base64(&self, name: &str) -> Result<String> {
        Ok(STANDARD.encode(self.load(name)?))
    }
}

/// Decode fixture content handed over as base64 text.
///
/// Line breaks and other ASCII whitespace are ignored.
pub fn decode_base64_fixture(text: &str) -> Result<Vec<u8>> {
    let compact: String = text.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    Ok(STANDARD.decode(compact)?)
}
