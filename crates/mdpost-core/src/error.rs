//! Error types module
//!
//! Two layers live here. `UploadError` is the closed set of pipeline failures that the
//! upload contract exposes to clients (`missing_file`, `invalid_file_type`,
//! `file_too_large`, `file_read_error`, `post_creation_failed`). `AppError` wraps it
//! together with the transport and authentication failures of the HTTP surface.
//!
//! Both implement [`ErrorMetadata`], so the HTTP layer renders every error from one table.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "invalid_file_type")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden from clients
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// Why the uploaded content could not be used.
///
/// Both variants are reported to clients as `file_read_error`; the split only shows up in
/// logs and in non-production error details.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FileReadFailure {
    #[error("file is empty")]
    Empty,

    #[error("{0}")]
    Io(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("No file uploaded")]
    MissingFile,

    #[error("Invalid file type: '{extension}'")]
    InvalidFileType { extension: String },

    /// `size` is `None` when reading stopped at the ceiling, before the end of the file.
    #[error("File too large: {} (max: {max} bytes)", describe_size(size))]
    FileTooLarge { size: Option<u64>, max: u64 },

    #[error("Failed to read upload: {0}")]
    FileReadError(FileReadFailure),

    #[error("Entry creation failed: {0}")]
    PostCreationFailed(String),
}

fn describe_size(size: &Option<u64>) -> String {
    match size {
        Some(size) => format!("{} bytes", size),
        None => "exceeds the upload ceiling".to_string(),
    }
}

impl From<io::Error> for UploadError {
    fn from(err: io::Error) -> Self {
        UploadError::FileReadError(FileReadFailure::Io(err.to_string()))
    }
}

/// (http_status, error_code, recoverable, suggested_action, sensitive, log_level)
type StaticMetadata = (u16, &'static str, bool, Option<&'static str>, bool, LogLevel);

fn upload_error_static_metadata(err: &UploadError) -> StaticMetadata {
    match err {
        UploadError::MissingFile => (
            400,
            "missing_file",
            false,
            Some("Send the Markdown file in the 'markdown_file' form field"),
            false,
            LogLevel::Debug,
        ),
        UploadError::InvalidFileType { .. } => (
            400,
            "invalid_file_type",
            false,
            Some("Upload a file with a .md or .markdown extension"),
            false,
            LogLevel::Debug,
        ),
        UploadError::FileTooLarge { .. } => (
            400,
            "file_too_large",
            false,
            Some("Reduce the file to 5MB or less"),
            false,
            LogLevel::Debug,
        ),
        UploadError::FileReadError(_) => (
            500,
            "file_read_error",
            false,
            Some("Check that the file is not empty and upload it again"),
            false,
            LogLevel::Warn,
        ),
        UploadError::PostCreationFailed(_) => (
            500,
            "post_creation_failed",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl ErrorMetadata for UploadError {
    fn http_status_code(&self) -> u16 {
        upload_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        upload_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        upload_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        upload_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            UploadError::MissingFile => "No file uploaded.".to_string(),
            UploadError::InvalidFileType { .. } => {
                "Only Markdown files (.md or .markdown) are allowed.".to_string()
            }
            UploadError::FileTooLarge { .. } => {
                "File size exceeds the maximum limit of 5MB.".to_string()
            }
            UploadError::FileReadError(_) => "Failed to read the file content.".to_string(),
            UploadError::PostCreationFailed(_) => "Failed to create the post.".to_string(),
        }
    }

    fn is_sensitive(&self) -> bool {
        upload_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        upload_error_static_metadata(self).5
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

fn app_error_static_metadata(err: &AppError) -> StaticMetadata {
    match err {
        AppError::Upload(inner) => upload_error_static_metadata(inner),
        AppError::InvalidInput(_) => (
            400,
            "invalid_request",
            false,
            Some("Check the multipart form and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::Unauthorized(_) => (
            401,
            "unauthorized",
            false,
            Some("Send a valid API key as a Bearer token"),
            false,
            LogLevel::Debug,
        ),
        AppError::Forbidden(_) => (
            403,
            "forbidden",
            false,
            Some("Use an API key whose role can edit posts"),
            false,
            LogLevel::Debug,
        ),
        AppError::InternalWithSource { .. } => (
            500,
            "internal_error",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::Upload(UploadError::MissingFile) => "MissingFile",
            AppError::Upload(UploadError::InvalidFileType { .. }) => "InvalidFileType",
            AppError::Upload(UploadError::FileTooLarge { .. }) => "FileTooLarge",
            AppError::Upload(UploadError::FileReadError(_)) => "FileReadError",
            AppError::Upload(UploadError::PostCreationFailed(_)) => "PostCreationFailed",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::Unauthorized(_) => "Unauthorized",
            AppError::Forbidden(_) => "Forbidden",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Upload(inner) => inner.client_message(),
            AppError::InvalidInput(msg) => msg.clone(),
            AppError::Unauthorized(msg) => msg.clone(),
            AppError::Forbidden(msg) => msg.clone(),
            AppError::InternalWithSource { .. } => {
                "An internal error occurred".to_string()
            }
        }
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }
}
