//! CloudClip Core
//!
//! Password-gated clipboard sharing: text snippets and files stored in
//! SQLite, listed page by page and fetched back by id.
//!
//! # Module Structure
//!
//! - `service/`: Public interface (ClipService, config, types, item/file/settings methods)
//! - `data/`: SQLite persistence (items, files, settings)
//! - `security/`: Shared-secret credential check
//!
//! The HTTP front end lives in the `cloudclip` binary.
//!
//! # Quick Start
//!
//! ```ignore
//! use cloudclip_core::{ClipService, ServiceConfig, SubmissionForm};
//!
//! let config = ServiceConfig::default().with_auth_password("s3cret");
//! let service = ClipService::start(config)?;
//!
//! let item = service
//!     .submit_item(SubmissionForm {
//!         title: Some("Note".into()),
//!         texts: Some(r#"["hello"]"#.into()),
//!         ..Default::default()
//!     })
//!     .await?;
//!
//! let page = service.list_items(Some(1), Some(20)).await?;
//! ```

// Public interface
pub mod service;

// Infrastructure modules (pub for flexibility)
pub mod data;
pub mod security;

// Re-export main API types for convenience
pub use service::{
    AppSettings,
    ClipFile,
    ClipService,
    FileMetadataEntry,
    Item,
    ItemPage,
    Pagination,
    ServedFile,
    ServiceConfig,
    ServiceError,
    SettingsUpdate,
    SubmissionForm,
    Upload,
};
