//! Types for the service API
//!
//! Serialized field names match what the web client reads (camelCase).

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::data::{FileKind, FileRecord, ItemRecord};

// ============================================================================
// Items and files
// ============================================================================

/// File metadata as returned to clients (never includes content)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipFile {
    pub id: String,
    pub item_id: String,
    pub name: String,
    pub size: String,
    #[serde(rename = "type")]
    pub kind: FileKind,
    pub remark: String,
}

impl From<FileRecord> for ClipFile {
    fn from(record: FileRecord) -> Self {
        Self {
            id: record.id,
            item_id: record.item_id,
            name: record.name,
            size: record.size,
            kind: record.kind,
            remark: record.remark,
        }
    }
}

/// An item with its attached files
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: String,
    pub title: String,
    pub texts: Vec<String>,
    pub files: Vec<ClipFile>,
    /// Unix millis
    pub created_at: i64,
    pub expiry: String,
    pub visit_limit: String,
    pub share_password: Option<String>,
}

impl Item {
    pub(crate) fn from_record(record: ItemRecord, files: Vec<ClipFile>) -> Self {
        Self {
            id: record.id,
            title: record.title,
            texts: record.texts,
            files,
            created_at: record.created_at,
            expiry: record.expiry,
            visit_limit: record.visit_limit,
            share_password: record.share_password,
        }
    }
}

/// Pagination metadata for a listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u64,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
}

/// One page of items
#[derive(Debug, Clone, Serialize)]
pub struct ItemPage {
    pub items: Vec<Item>,
    pub pagination: Pagination,
}

// ============================================================================
// Submission
// ============================================================================

/// One uploaded file payload
#[derive(Debug, Clone)]
pub struct Upload {
    /// Client-side file name
    pub file_name: String,
    /// Content type declared by the client, if any
    pub content_type: Option<String>,
    pub content: Vec<u8>,
}

/// A submission as received from the form, before validation
///
/// `texts` and `file_metadata` are the raw JSON strings the client sent.
#[derive(Debug, Clone, Default)]
pub struct SubmissionForm {
    pub title: Option<String>,
    pub texts: Option<String>,
    pub expiry: Option<String>,
    pub visit_limit: Option<String>,
    pub share_password: Option<String>,
    pub file_metadata: Option<String>,
    /// Uploaded payloads keyed by the client's temporary id
    pub uploads: HashMap<String, Upload>,
}

/// Per-file metadata entry inside `fileMetadata`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadataEntry {
    #[serde(deserialize_with = "string_or_number")]
    pub temp_id: String,
    #[serde(default)]
    pub remark: String,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Num(n) => n.to_string(),
    })
}

// ============================================================================
// Settings
// ============================================================================

/// Display settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub app_title: String,
    pub sub_title: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            app_title: "Clipboard".to_string(),
            sub_title: "Cloud Share".to_string(),
        }
    }
}

/// Settings write request; both fields optional on the wire
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    #[serde(default)]
    pub app_title: Option<String>,
    #[serde(default)]
    pub sub_title: Option<String>,
}

// ============================================================================
// File retrieval
// ============================================================================

/// A file ready to be written to a response
#[derive(Debug, Clone)]
pub struct ServedFile {
    pub name: String,
    pub mime: &'static str,
    pub content: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_serializes_camel_case() {
        let item = Item {
            id: "abc".to_string(),
            title: "Test".to_string(),
            texts: vec!["hello".to_string()],
            files: vec![ClipFile {
                id: "f1".to_string(),
                item_id: "abc".to_string(),
                name: "a.png".to_string(),
                size: "1.0 KB".to_string(),
                kind: FileKind::Image,
                remark: "pic".to_string(),
            }],
            created_at: 42,
            expiry: "never".to_string(),
            visit_limit: String::new(),
            share_password: None,
        };

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["createdAt"], 42);
        assert_eq!(json["visitLimit"], "");
        assert!(json["sharePassword"].is_null());
        assert_eq!(json["files"][0]["type"], "image");
        assert_eq!(json["files"][0]["itemId"], "abc");
    }

    #[test]
    fn test_metadata_temp_id_accepts_numbers() {
        let entries: Vec<FileMetadataEntry> =
            serde_json::from_str(r#"[{"tempId":"x1","remark":"r"},{"tempId":7}]"#).unwrap();
        assert_eq!(entries[0].temp_id, "x1");
        assert_eq!(entries[0].remark, "r");
        assert_eq!(entries[1].temp_id, "7");
        assert_eq!(entries[1].remark, "");
    }

    #[test]
    fn test_pagination_field_names() {
        let p = Pagination {
            page: 2,
            limit: 20,
            total: 41,
            total_pages: 3,
        };
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, r#"{"page":2,"limit":20,"total":41,"totalPages":3}"#);
    }
}
