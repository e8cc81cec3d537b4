//! Item operations for the service
//!
//! Submission writes one item row and its file rows in a single
//! transaction; deletion removes files then the item in another. Listing
//! reads a page of items, then the files for just that page.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::data::{
    self, count_items, delete_files_for_item, file_exists, get_files_for_items, get_items_page,
    insert_file, insert_item, item_exists, FileKind, FileRecord, ItemRecord, EXPIRY_LABELS,
    FILE_ID_LEN, ITEM_ID_LEN,
};

use super::core::ClipService;
use super::error::ServiceError;
use super::files::mime_from_name;
use super::types::{ClipFile, FileMetadataEntry, Item, ItemPage, Pagination, SubmissionForm, Upload};

/// Title used when neither a title, a file, nor a text is available
pub const UNTITLED: &str = "Untitled";

/// Characters of the first text block used as a fallback title
const TITLE_FROM_TEXT_CHARS: usize = 30;

/// Attempts at drawing an unused random id before giving up
const ID_ATTEMPTS: usize = 5;

/// Human-readable size stored with each file ("12.3 KB")
pub fn format_size(bytes: usize) -> String {
    format!("{:.1} KB", bytes as f64 / 1024.0)
}

/// Type tag for an upload
///
/// The declared content type wins unless it is missing or generic, in which
/// case the file name extension decides.
pub fn file_kind_for(upload: &Upload) -> FileKind {
    match upload.content_type.as_deref().map(str::trim) {
        Some(ct) if !ct.is_empty() && !ct.eq_ignore_ascii_case("application/octet-stream") => {
            FileKind::from_mime(ct)
        }
        _ => FileKind::from_mime(mime_from_name(&upload.file_name)),
    }
}

/// Clamp caller-supplied paging to sane bounds
pub fn normalize_paging(
    page: Option<u64>,
    limit: Option<u32>,
    default_limit: u32,
    max_limit: u32,
) -> (u64, u32) {
    let page = page.unwrap_or(1).max(1);
    let limit = limit.unwrap_or(default_limit).clamp(1, max_limit.max(1));
    (page, limit)
}

/// Validated submission, ready to persist
#[derive(Debug)]
struct ValidSubmission {
    title: String,
    texts: Vec<String>,
    expiry: String,
    visit_limit: String,
    share_password: Option<String>,
    /// Metadata entries paired with their uploads, in metadata order
    files: Vec<(FileMetadataEntry, Upload)>,
}

fn validate_submission(form: SubmissionForm) -> Result<ValidSubmission, ServiceError> {
    let texts: Vec<String> = match form.texts.as_deref().map(str::trim) {
        None | Some("") => Vec::new(),
        Some(raw) => serde_json::from_str(raw).map_err(|e| {
            ServiceError::Validation(format!("texts must be a JSON array of strings: {}", e))
        })?,
    };
    let texts: Vec<String> = texts.into_iter().filter(|t| !t.trim().is_empty()).collect();

    let metadata: Vec<FileMetadataEntry> = match form.file_metadata.as_deref().map(str::trim) {
        None | Some("") => Vec::new(),
        Some(raw) => serde_json::from_str(raw).map_err(|e| {
            ServiceError::Validation(format!("fileMetadata must be a JSON array: {}", e))
        })?,
    };

    let expiry = match form.expiry.as_deref().map(str::trim) {
        None | Some("") => "never".to_string(),
        Some(e) if EXPIRY_LABELS.contains(&e) => e.to_string(),
        Some(e) => {
            return Err(ServiceError::Validation(format!(
                "expiry must be one of {}, got {:?}",
                EXPIRY_LABELS.join(", "),
                e
            )))
        }
    };

    let visit_limit = form.visit_limit.unwrap_or_default().trim().to_string();
    if !visit_limit.chars().all(|c| c.is_ascii_digit()) {
        return Err(ServiceError::Validation(format!(
            "visitLimit must be empty or a whole number, got {:?}",
            visit_limit
        )));
    }

    let share_password = form.share_password.filter(|p| !p.is_empty());

    // Entries without a matching payload are skipped; each payload is used once.
    let mut uploads = form.uploads;
    let mut files = Vec::new();
    for entry in metadata {
        match uploads.remove(&entry.temp_id) {
            Some(upload) => files.push((entry, upload)),
            None => debug!(temp_id = %entry.temp_id, "No upload for file metadata entry"),
        }
    }

    if texts.is_empty() && files.is_empty() {
        return Err(ServiceError::Validation(
            "submission needs at least one text block or file".to_string(),
        ));
    }

    let title = match form.title.as_deref().map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => default_title(&texts, &files),
    };

    Ok(ValidSubmission {
        title,
        texts,
        expiry,
        visit_limit,
        share_password,
        files,
    })
}

fn default_title(texts: &[String], files: &[(FileMetadataEntry, Upload)]) -> String {
    if let Some((_, upload)) = files.first() {
        return upload.file_name.clone();
    }
    if let Some(text) = texts.first() {
        return text.chars().take(TITLE_FROM_TEXT_CHARS).collect();
    }
    UNTITLED.to_string()
}

fn unused_id(
    conn: &rusqlite::Connection,
    len: usize,
    taken: impl Fn(&rusqlite::Connection, &str) -> rusqlite::Result<bool>,
) -> Result<String, ServiceError> {
    for _ in 0..ID_ATTEMPTS {
        let id = data::generate_id(len);
        if !taken(conn, &id)? {
            return Ok(id);
        }
    }
    Err(ServiceError::Database(
        "could not allocate a unique id".to_string(),
    ))
}

impl ClipService {
    /// Create an item and its files from a submitted form
    ///
    /// Everything is written in one transaction: either the item and all of
    /// its files exist afterwards, or none of them do.
    pub async fn submit_item(&self, form: SubmissionForm) -> Result<Item, ServiceError> {
        let submission = validate_submission(form)?;

        let mut db = self.db.lock().await;
        let tx = db.transaction()?;

        let record = ItemRecord {
            id: unused_id(&tx, ITEM_ID_LEN, item_exists)?,
            title: submission.title,
            texts: submission.texts,
            created_at: data::current_timestamp_millis(),
            expiry: submission.expiry,
            visit_limit: submission.visit_limit,
            share_password: submission.share_password,
        };
        insert_item(&tx, &record)?;

        let mut files = Vec::with_capacity(submission.files.len());
        for (entry, upload) in submission.files {
            let file = FileRecord {
                id: unused_id(&tx, FILE_ID_LEN, file_exists)?,
                item_id: record.id.clone(),
                name: upload.file_name.clone(),
                size: format_size(upload.content.len()),
                kind: file_kind_for(&upload),
                remark: entry.remark,
                created_at: data::current_timestamp_millis(),
            };
            insert_file(&tx, &file, &upload.content)?;
            files.push(ClipFile::from(file));
        }

        tx.commit()?;

        info!(
            item_id = %record.id,
            texts = record.texts.len(),
            files = files.len(),
            "Item created"
        );

        Ok(Item::from_record(record, files))
    }

    /// One page of items, newest first, each with its file metadata
    pub async fn list_items(
        &self,
        page: Option<u64>,
        limit: Option<u32>,
    ) -> Result<ItemPage, ServiceError> {
        let (page, limit) = normalize_paging(
            page,
            limit,
            self.config.default_page_size,
            self.config.max_page_size,
        );
        let offset = (page - 1).saturating_mul(u64::from(limit));

        let db = self.db.lock().await;
        let total = count_items(&db)?;
        // Past the last row there is nothing to fetch; huge offsets also
        // exceed SQLite's integer range
        let records = if offset >= total {
            Vec::new()
        } else {
            get_items_page(&db, limit, offset)?
        };

        let files = if records.is_empty() {
            Vec::new()
        } else {
            let ids: Vec<String> = records.iter().map(|r| r.id.clone()).collect();
            get_files_for_items(&db, &ids)?
        };
        drop(db);

        let mut by_item: HashMap<String, Vec<ClipFile>> = HashMap::new();
        for file in files {
            by_item
                .entry(file.item_id.clone())
                .or_default()
                .push(ClipFile::from(file));
        }

        let items = records
            .into_iter()
            .map(|record| {
                let files = by_item.remove(&record.id).unwrap_or_default();
                Item::from_record(record, files)
            })
            .collect();

        Ok(ItemPage {
            items,
            pagination: Pagination {
                page,
                limit,
                total,
                total_pages: total.div_ceil(u64::from(limit)),
            },
        })
    }

    /// Delete an item and all of its files
    pub async fn delete_item(&self, id: &str) -> Result<(), ServiceError> {
        let mut db = self.db.lock().await;
        let tx = db.transaction()?;

        if !item_exists(&tx, id)? {
            return Err(ServiceError::NotFound(format!("item {}", id)));
        }

        let removed_files = delete_files_for_item(&tx, id)?;
        data::delete_item(&tx, id)?;
        tx.commit()?;

        info!(item_id = %id, files = removed_files, "Item deleted");
        Ok(())
    }
}
