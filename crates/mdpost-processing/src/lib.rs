//! Markdown processing
//!
//! Everything the upload pipeline does to a file before anything is stored: extension and
//! size validation, Markdown to HTML conversion, cover image extraction and title
//! derivation. The image MIME table shared by the CMS adapters lives here as well.

pub mod converter;
pub mod extract;
pub mod file_name;
pub mod mime;
pub mod title;
pub mod validator;

pub use converter::{CommonMarkConverter, MarkdownConverter};
pub use extract::{first_image_url, sanitize_url};
pub use file_name::{base_name, sanitize_filename, split_extension};
pub use title::{derive_title, sanitize_text_field};
pub use validator::{MarkdownValidator, ValidationError};
