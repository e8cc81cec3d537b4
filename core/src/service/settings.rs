//! Display settings for the service

use tracing::{info, warn};

use crate::data::{get_all_settings, upsert_titles};

use super::core::ClipService;
use super::error::ServiceError;
use super::types::{AppSettings, SettingsUpdate};

impl ClipService {
    /// Stored settings merged over the defaults
    ///
    /// Never fails: a read error (e.g. the table is missing) yields the
    /// defaults.
    pub async fn get_settings(&self) -> AppSettings {
        let mut settings = AppSettings::default();

        let rows = {
            let db = self.db.lock().await;
            get_all_settings(&db)
        };

        match rows {
            Ok(rows) => {
                for (key, value) in rows {
                    match key.as_str() {
                        "appTitle" => settings.app_title = value,
                        "subTitle" => settings.sub_title = value,
                        _ => {}
                    }
                }
            }
            Err(e) => warn!(error = %e, "Failed to read settings, using defaults"),
        }

        settings
    }

    /// Upsert the title pair
    pub async fn update_settings(&self, update: SettingsUpdate) -> Result<AppSettings, ServiceError> {
        let app_title = update
            .app_title
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ServiceError::Validation("appTitle is required".to_string()))?;
        let sub_title = update.sub_title.unwrap_or_default();

        {
            let db = self.db.lock().await;
            upsert_titles(&db, &app_title, &sub_title)?;
        }

        info!(app_title = %app_title, "Settings updated");
        Ok(AppSettings {
            app_title,
            sub_title,
        })
    }
}
