//! File retrieval for the service

use tracing::debug;

use crate::data::get_file_content;

use super::core::ClipService;
use super::error::ServiceError;
use super::types::ServedFile;

/// Fallback MIME type for unknown extensions
pub const OCTET_STREAM: &str = "application/octet-stream";

/// MIME type guessed from a file name's extension
pub fn mime_from_name(name: &str) -> &'static str {
    let ext = match name.rsplit_once('.') {
        Some((_, ext)) => ext.to_ascii_lowercase(),
        None => return OCTET_STREAM,
    };

    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "ico" => "image/x-icon",
        "txt" | "log" => "text/plain; charset=utf-8",
        "md" => "text/markdown; charset=utf-8",
        "csv" => "text/csv; charset=utf-8",
        "html" | "htm" => "text/html; charset=utf-8",
        "json" => "application/json",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "mp3" => "audio/mpeg",
        "mp4" => "video/mp4",
        _ => OCTET_STREAM,
    }
}

/// MIME type for same-origin inline display
///
/// Types a browser would run script from are shown as plain text.
pub fn inline_mime(mime: &'static str) -> &'static str {
    match mime {
        "text/html; charset=utf-8" | "image/svg+xml" => "text/plain; charset=utf-8",
        other => other,
    }
}

impl ClipService {
    /// Load one file's bytes for download or preview
    pub async fn get_file(&self, id: &str) -> Result<ServedFile, ServiceError> {
        let stored = {
            let db = self.db.lock().await;
            get_file_content(&db, id)?
        };

        let stored = stored.ok_or_else(|| ServiceError::NotFound(format!("file {}", id)))?;
        debug!(file_id = %id, bytes = stored.content.len(), "Serving file");

        Ok(ServedFile {
            mime: mime_from_name(&stored.name),
            name: stored.name,
            content: stored.content,
        })
    }
}
