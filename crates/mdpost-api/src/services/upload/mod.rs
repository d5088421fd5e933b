//! Markdown upload pipeline
//!
//! Validation, conversion, extraction and the CMS calls for one uploaded file. The HTTP
//! handler only turns multipart input into an [`UploadRequest`] and the outcome into a
//! response.

mod pipeline;
mod types;

pub use pipeline::{UploadPipeline, UploadStage};
pub use types::{CoverImageOutcome, FileContent, UploadOutcome, UploadRequest, UploadedFile};
