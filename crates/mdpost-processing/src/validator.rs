use mdpost_core::constants::{MARKDOWN_EXTENSIONS, MAX_MARKDOWN_FILE_SIZE};
use mdpost_core::{FileReadFailure, UploadError};

use crate::file_name::split_extension;

/// Validation errors for uploaded Markdown files
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: u64, max: u64 },

    #[error("Invalid file extension: '{extension}' (allowed: {allowed:?})")]
    InvalidExtension {
        extension: String,
        allowed: Vec<String>,
    },

    #[error("Empty file")]
    EmptyFile,
}

impl From<ValidationError> for UploadError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::FileTooLarge { size, max } => UploadError::FileTooLarge {
                size: Some(size),
                max,
            },
            ValidationError::InvalidExtension { extension, .. } => {
                UploadError::InvalidFileType { extension }
            }
            ValidationError::EmptyFile => UploadError::FileReadError(FileReadFailure::Empty),
        }
    }
}

/// Markdown file validator
///
/// Checks run in the order the pipeline needs them: extension first, then size, then
/// content once it has been read.
#[derive(Debug, Clone)]
pub struct MarkdownValidator {
    max_file_size: u64,
    allowed_extensions: Vec<String>,
}

impl Default for MarkdownValidator {
    fn default() -> Self {
        Self::new(
            MAX_MARKDOWN_FILE_SIZE,
            MARKDOWN_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        )
    }
}

impl MarkdownValidator {
    pub fn new(max_file_size: u64, allowed_extensions: Vec<String>) -> Self {
        Self {
            max_file_size,
            allowed_extensions: allowed_extensions
                .into_iter()
                .map(|e| e.to_lowercase())
                .collect(),
        }
    }

    pub fn max_file_size(&self) -> u64 {
        self.max_file_size
    }

    /// Validate the file extension and return it lower-cased
    pub fn validate_extension(&self, file_name: &str) -> Result<String, ValidationError> {
        let extension = split_extension(file_name)
            .1
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        if !self.allowed_extensions.contains(&extension) {
            return Err(ValidationError::InvalidExtension {
                extension,
                allowed: self.allowed_extensions.clone(),
            });
        }

        Ok(extension)
    }

    /// Validate file size
    pub fn validate_file_size(&self, size: u64) -> Result<(), ValidationError> {
        if size > self.max_file_size {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Validate content that has been read: non-empty and within the size ceiling
    pub fn validate_content(&self, content: &[u8]) -> Result<(), ValidationError> {
        if content.is_empty() {
            return Err(ValidationError::EmptyFile);
        }
        self.validate_file_size(content.len() as u64)
    }
}
