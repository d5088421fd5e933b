//! mdpost Core Library
//!
//! This crate provides the domain models, error types, configuration and constants
//! shared by every mdpost component.

pub mod cms_types;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use cms_types::CmsBackend;
pub use config::{
    ApiKeyGrant, AuthConfig, BaseConfig, CmsConfig, Config, EntryDefaults, ImportConfig, LogFormat,
};
pub use error::{AppError, ErrorMetadata, FileReadFailure, LogLevel, UploadError};
