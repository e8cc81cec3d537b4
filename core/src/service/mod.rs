//! Service layer: the public interface used by the HTTP front end
//!
//! - `core`: `ClipService` struct, startup, auth gates
//! - `config`: `ServiceConfig`
//! - `items`: submission, listing, deletion
//! - `files`: file retrieval and MIME guessing
//! - `settings`: display settings
//! - `types`: request and response types

pub mod config;
pub mod core;
pub mod error;
pub mod files;
pub mod items;
pub mod settings;
pub mod types;

pub use config::ServiceConfig;
pub use self::core::ClipService;
pub use error::ServiceError;
pub use files::{inline_mime, mime_from_name};
pub use types::{
    AppSettings, ClipFile, FileMetadataEntry, Item, ItemPage, Pagination, ServedFile,
    SettingsUpdate, SubmissionForm, Upload,
};
