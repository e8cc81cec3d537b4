//! Main service implementation
//!
//! `ClipService` owns the database connection and the resolved auth secret.
//! Operations are split across:
//! - `items.rs`: submission, listing, deletion
//! - `files.rs`: single-file retrieval
//! - `settings.rs`: display settings

use std::sync::Arc;

use rusqlite::Connection;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::data::{start_db, start_memory_db};
use crate::security::AuthSecret;

use super::config::ServiceConfig;
use super::error::ServiceError;

/// Default database file name
pub const DEFAULT_DB_PATH: &str = "cloudclip.db";

/// The clipboard service
///
/// Cheap to clone; clones share the same connection.
#[derive(Clone)]
pub struct ClipService {
    /// Configuration
    pub(crate) config: Arc<ServiceConfig>,
    /// Resolved shared secret
    pub(crate) secret: AuthSecret,
    /// Database connection (wrapped for thread safety)
    pub(crate) db: Arc<Mutex<Connection>>,
}

impl ClipService {
    /// Start the service on the configured database file
    pub fn start(config: ServiceConfig) -> Result<Self, ServiceError> {
        let db_path = config
            .db_path
            .clone()
            .map(|p| p.to_string_lossy().to_string())
            .unwrap_or_else(|| DEFAULT_DB_PATH.to_string());

        let conn = start_db(&db_path).map_err(|e| ServiceError::StartFailed(e.to_string()))?;

        info!(db_path = %db_path, "Database opened");
        Ok(Self::with_connection(config, conn))
    }

    /// Start the service on a fresh in-memory database
    pub fn start_in_memory(config: ServiceConfig) -> Result<Self, ServiceError> {
        let conn = start_memory_db().map_err(|e| ServiceError::StartFailed(e.to_string()))?;
        Ok(Self::with_connection(config, conn))
    }

    fn with_connection(config: ServiceConfig, conn: Connection) -> Self {
        let secret = AuthSecret::resolve(
            config.auth_password.as_deref(),
            config.allow_default_password,
        );

        if secret.is_default() {
            warn!("AUTH_PASSWORD not set, using the built-in default password");
        } else if !secret.is_configured() {
            warn!("AUTH_PASSWORD not set, gated routes will fail until it is configured");
        }

        Self {
            config: Arc::new(config),
            secret,
            db: Arc::new(Mutex::new(conn)),
        }
    }

    /// The active configuration
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Gate for management routes (one credential, usually a header)
    pub fn authorize(&self, credential: Option<&str>) -> Result<(), ServiceError> {
        self.secret.check(credential)?;
        Ok(())
    }

    /// Gate for file routes (header or query token)
    pub fn authorize_any<'a>(
        &self,
        credentials: impl IntoIterator<Item = Option<&'a str>>,
    ) -> Result<(), ServiceError> {
        self.secret.check_any(credentials)?;
        Ok(())
    }

    /// Login check for `POST /api/auth`
    pub fn verify_password(&self, password: &str) -> Result<(), ServiceError> {
        let result = self.authorize(Some(password));
        if let Err(ServiceError::Unauthorized) = result {
            info!("Login rejected");
        }
        result
    }
}
