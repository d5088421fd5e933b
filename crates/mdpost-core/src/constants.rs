//! Fixed limits and names of the upload contract.

/// Largest accepted Markdown upload (5 MiB).
pub const MAX_MARKDOWN_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// Accepted Markdown extensions, lower-case, without the leading dot.
pub const MARKDOWN_EXTENSIONS: [&str; 2] = ["md", "markdown"];

/// Multipart field carrying the Markdown file.
pub const MARKDOWN_FILE_FIELD: &str = "markdown_file";

/// Message returned with every successful upload.
pub const UPLOAD_SUCCESS_MESSAGE: &str = "Post created successfully.";

/// Most bytes read from form fields other than the Markdown file.
pub const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;
