use std::path::{Path, PathBuf};

use super::AcquiredMedia;
use crate::{Result, TranscriptorError};

/// Resolves a local input file into [`AcquiredMedia`]
pub struct LocalFileExtractor;

impl LocalFileExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Check that the file exists and read its size.
    ///
    /// Runs before the provider client is built, so a missing file never reaches it.
    pub fn acquire(&self, path: &str) -> Result<AcquiredMedia> {
        let file_path = Path::new(path);

        if !file_path.is_file() {
            return Err(TranscriptorError::FileNotFound {
                path: PathBuf::from(path),
            });
        }

        let metadata = fs_err::metadata(file_path)?;

        tracing::debug!(
            path = %file_path.display(),
            size = %crate::utils::format_file_size(metadata.len()),
            "Local file accepted"
        );

        Ok(AcquiredMedia {
            local_path: file_path.to_path_buf(),
            original_url: None,
            size_bytes: metadata.len(),
        })
    }
}

impl Default for LocalFileExtractor {
    fn default() -> Self {
        Self::new()
    }
}
