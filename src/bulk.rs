//! Bulk code/decode upload: patch a fixture workbook and upload it.

use crate::context::{ScenarioContext, UPLOADED_CODE, UPLOADED_DECODE, UPLOADED_EXCEL_PATH};
use crate::error::Result;
use crate::fixture::FixtureLoader;
use crate::options::UploadOptions;
use crate::patch::{Patch, RowPatcher, UploadType};
use crate::upload::{dispatch_upload, FileInput, SimulatedFile};
use rand::Rng;
use std::path::PathBuf;
use tracing::{debug, info};

/// Characters generated codes are drawn from.
pub const RANDOM_ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvw123456789";

/// Generate a random value of `length` characters.
pub fn generate_random_value(length: usize) -> String {
    generate_random_value_with(&mut rand::thread_rng(), length)
}

/// Generate a random value from a caller-supplied RNG.
pub fn generate_random_value_with<R: Rng + ?Sized>(rng: &mut R, length: usize) -> String {
    let alphabet = RANDOM_ALPHABET.as_bytes();
    (0..length)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())] as char)
        .collect()
}

/// Drives the code/decode bulk-upload flow.
#[derive(Debug, Clone)]
pub struct BulkUpload {
    options: UploadOptions,
    loader: FixtureLoader,
    patcher: RowPatcher,
}

impl BulkUpload {
    pub fn new(options: UploadOptions) -> Self {
        let loader = FixtureLoader::new(options.fixtures_dir.clone());
        let patcher = RowPatcher::new(options.patch.clone());
        Self {
            options,
            loader,
            patcher,
        }
    }

    pub fn options(&self) -> &UploadOptions {
        &self.options
    }

    pub fn loader(&self) -> &FixtureLoader {
        &self.loader
    }

    /// Patch `file_name`'s first data row and upload the result.
    ///
    /// The patched workbook is also written to the configured temp path,
    /// which is recorded under [`UPLOADED_EXCEL_PATH`]. Returns that path.
    /// The path is recorded before the file is written, so a context that
    /// already holds it leaves the temp file untouched.
    pub fn upload_code_decode_excel<I: FileInput + ?Sized>(
        &self,
        ctx: &mut ScenarioContext,
        input: &mut I,
        file_name: &str,
        patch: &Patch,
    ) -> Result<PathBuf> {
        let source = self.loader.load(file_name)?;
        let patched = self.patcher.patch_bytes(&source, patch)?;

        // A scenario that already uploaded must not overwrite its temp copy
        let temp_path = self.options.temp_path.clone();
        ctx.set(UPLOADED_EXCEL_PATH, temp_path.display().to_string())?;

        if let Some(parent) = temp_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&temp_path, &patched)?;
        debug!(path = %temp_path.display(), bytes = patched.len(), "wrote patched workbook");

        dispatch_upload(input, SimulatedFile::spreadsheet(file_name, patched))?;
        Ok(temp_path)
    }

    /// Upload `file_name` for an operation label such as `"new category"`.
    ///
    /// Fresh code and decode values are generated and recorded under
    /// [`UPLOADED_CODE`] and [`UPLOADED_DECODE`]. They are recorded before
    /// the workbook is patched and stay in the context if patching fails.
    pub fn user_uploads_code_decode_file<I: FileInput + ?Sized>(
        &self,
        ctx: &mut ScenarioContext,
        input: &mut I,
        file_name: &str,
        operation: &str,
    ) -> Result<Patch> {
        let function: UploadType = operation.parse()?;

        let code = generate_random_value(self.options.random_length);
        let decode = generate_random_value(self.options.random_length);
        ctx.set(UPLOADED_CODE, code.clone())?;
        ctx.set(UPLOADED_DECODE, decode.clone())?;

        let patch = Patch::new(code, decode, function);
        self.upload_code_decode_excel(ctx, input, file_name, &patch)?;

        info!(file = %file_name, function = %function, "code/decode file uploaded");
        Ok(patch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_value_alphabet_and_length() {
        let value = generate_random_value(5);
        assert_eq!(value.chars().count(), 5);
        assert!(value.chars().all(|c| RANDOM_ALPHABET.contains(c)));
        assert!(generate_random_value(0).is_empty());
    }

    #[test]
    fn test_random_value_seeded() {
        let a = generate_random_value_with(&mut StdRng::seed_from_u64(7), 12);
        let b = generate_random_value_with(&mut StdRng::seed_from_u64(7), 12);
        assert_eq!(a, b);
    }

    #[test]
    fn test_unknown_operation_has_no_side_effects() {
        let dir = tempfile::tempdir().unwrap();
        let bulk = BulkUpload::new(UploadOptions::new().with_fixtures_dir(dir.path()));
        let mut ctx = ScenarioContext::new();
        let mut input = crate::upload::RecordingFileInput::new();

        let err = bulk
            .user_uploads_code_decode_file(&mut ctx, &mut input, "codes.xlsx", "archive")
            .unwrap_err();

        assert!(matches!(err, crate::Error::UnknownOperation(_)));
        assert!(ctx.is_empty());
        assert!(input.events().is_empty());
    }
}
