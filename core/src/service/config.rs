//! Service configuration

use std::fmt;
use std::path::PathBuf;

/// Default request body limit (32 MiB)
pub const DEFAULT_MAX_BODY_BYTES: u64 = 32 * 1024 * 1024;

/// Configuration for the clipboard service
#[derive(Clone)]
pub struct ServiceConfig {
    /// Path to the database file
    /// If None, uses `cloudclip.db` in the working directory
    pub db_path: Option<PathBuf>,

    /// Shared secret for every gated route
    /// If None, see `allow_default_password`
    pub auth_password: Option<String>,

    /// Fall back to the built-in password when `auth_password` is unset
    /// Default: true
    pub allow_default_password: bool,

    /// Largest accepted request body (bytes)
    /// Default: 32 MiB
    pub max_body_bytes: u64,

    /// Page size when the caller gives none
    /// Default: 20
    pub default_page_size: u32,

    /// Upper bound for caller-supplied page sizes
    /// Default: 100
    pub max_page_size: u32,
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("db_path", &self.db_path)
            .field("auth_password", &self.auth_password.as_ref().map(|_| "[REDACTED]"))
            .field("allow_default_password", &self.allow_default_password)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("default_page_size", &self.default_page_size)
            .field("max_page_size", &self.max_page_size)
            .finish()
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            auth_password: None,
            allow_default_password: true,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}

impl ServiceConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the database path
    pub fn with_db_path(mut self, path: PathBuf) -> Self {
        self.db_path = Some(path);
        self
    }

    /// Set the shared secret
    pub fn with_auth_password(mut self, password: impl Into<String>) -> Self {
        self.auth_password = Some(password.into());
        self
    }

    /// Refuse to start serving gated routes without a configured secret
    pub fn with_strict_auth(mut self) -> Self {
        self.allow_default_password = false;
        self
    }

    /// Set the request body limit
    pub fn with_max_body_bytes(mut self, bytes: u64) -> Self {
        self.max_body_bytes = bytes;
        self
    }

    /// Configuration for testing (fixed password, small body limit)
    pub fn for_testing() -> Self {
        Self {
            db_path: None,
            auth_password: Some("test-password".to_string()),
            allow_default_password: false,
            max_body_bytes: 1024 * 1024, // 1 MB
            default_page_size: 20,
            max_page_size: 100,
        }
    }
}
