pub mod health;
pub mod markdown_upload;
