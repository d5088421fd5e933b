//! Data models for the application
//!
//! Entries and attachments mirror what the host content store keeps; users carry the
//! role that decides which operations a caller may run.

mod entry;
mod ids;
mod media;
mod response;
mod user;

pub use entry::*;
pub use ids::*;
pub use media::*;
pub use response::*;
pub use user::*;
