//! mdpost API Library
//!
//! This crate provides the HTTP handlers, middleware, the upload pipeline and application
//! setup for the Markdown ingestion service.

// Module declarations
mod api_doc;
pub mod constants;
mod handlers;
mod middleware;
pub mod services;
pub mod setup;
mod telemetry;
mod utils;

// Public modules
pub mod auth;
pub mod error;
pub mod state;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use services::upload::{CoverImageOutcome, UploadOutcome, UploadPipeline};
