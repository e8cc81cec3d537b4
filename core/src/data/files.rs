//! File table operations
//!
//! Attachments are stored inline as BLOBs next to their metadata. Listing
//! queries never select `content`; only single-file retrieval does.

use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use serde::Serialize;

/// Coarse file type tag, fixed at upload time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Image,
    File,
}

impl FileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Image => "image",
            FileKind::File => "file",
        }
    }

    /// Tag from a MIME type: anything under `image/` is an image
    pub fn from_mime(mime: &str) -> Self {
        if mime.trim().to_ascii_lowercase().starts_with("image/") {
            FileKind::Image
        } else {
            FileKind::File
        }
    }
}

fn parse_file_kind(value: &str, column_index: usize) -> rusqlite::Result<FileKind> {
    match value {
        "image" => Ok(FileKind::Image),
        "file" => Ok(FileKind::File),
        other => Err(rusqlite::Error::FromSqlConversionFailure(
            column_index,
            rusqlite::types::Type::Text,
            format!("unknown file type tag: {}", other).into(),
        )),
    }
}

/// File metadata row (no content)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub id: String,
    pub item_id: String,
    pub name: String,
    /// Human-readable size, e.g. "12.3 KB"
    pub size: String,
    pub kind: FileKind,
    pub remark: String,
    /// Unix millis
    pub created_at: i64,
}

/// A file's bytes plus what is needed to serve them
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub name: String,
    pub content: Vec<u8>,
}

fn parse_file_row(row: &rusqlite::Row) -> rusqlite::Result<FileRecord> {
    let kind_raw: String = row.get(4)?;
    Ok(FileRecord {
        id: row.get(0)?,
        item_id: row.get(1)?,
        name: row.get(2)?,
        size: row.get(3)?,
        kind: parse_file_kind(&kind_raw, 4)?,
        remark: row.get(5)?,
        created_at: row.get(6)?,
    })
}

/// Insert a file row with its content
pub fn insert_file(conn: &Connection, file: &FileRecord, content: &[u8]) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO files (id, itemId, name, size, type, remark, content, createdAt)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            file.id,
            file.item_id,
            file.name,
            file.size,
            file.kind.as_str(),
            file.remark,
            content,
            file.created_at,
        ],
    )?;
    Ok(())
}

/// Check whether a file id is taken
pub fn file_exists(conn: &Connection, id: &str) -> rusqlite::Result<bool> {
    conn.query_row("SELECT COUNT(*) > 0 FROM files WHERE id = ?1", [id], |row| {
        row.get(0)
    })
}

/// Metadata for every file owned by any of `item_ids`
///
/// Returns an empty list without touching the database when `item_ids` is
/// empty (`IN ()` is not valid SQL).
pub fn get_files_for_items(
    conn: &Connection,
    item_ids: &[String],
) -> rusqlite::Result<Vec<FileRecord>> {
    if item_ids.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = vec!["?"; item_ids.len()].join(",");
    let sql = format!(
        "SELECT id, itemId, name, size, type, remark, createdAt
         FROM files WHERE itemId IN ({})
         ORDER BY createdAt, rowid",
        placeholders
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(item_ids.iter()), parse_file_row)?;

    rows.collect()
}

/// Load a single file with its content
pub fn get_file_content(conn: &Connection, id: &str) -> rusqlite::Result<Option<StoredFile>> {
    conn.query_row(
        "SELECT name, content FROM files WHERE id = ?1",
        [id],
        |row| {
            Ok(StoredFile {
                name: row.get(0)?,
                content: row.get(1)?,
            })
        },
    )
    .optional()
}

/// Delete all files owned by an item, returning how many were removed
pub fn delete_files_for_item(conn: &Connection, item_id: &str) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM files WHERE itemId = ?1", [item_id])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::items::{delete_item, insert_item, ItemRecord};
    use crate::data::start::start_memory_db;

    fn setup_item(conn: &Connection, id: &str) {
        insert_item(
            conn,
            &ItemRecord {
                id: id.to_string(),
                title: "t".to_string(),
                texts: vec![],
                created_at: 1,
                expiry: "never".to_string(),
                visit_limit: String::new(),
                share_password: None,
            },
        )
        .unwrap();
    }

    fn file(id: &str, item_id: &str, kind: FileKind) -> FileRecord {
        FileRecord {
            id: id.to_string(),
            item_id: item_id.to_string(),
            name: format!("{}.bin", id),
            size: "0.0 KB".to_string(),
            kind,
            remark: format!("remark {}", id),
            created_at: 1,
        }
    }

    #[test]
    fn test_file_kind_from_mime() {
        assert_eq!(FileKind::from_mime("image/png"), FileKind::Image);
        assert_eq!(FileKind::from_mime("IMAGE/JPEG"), FileKind::Image);
        assert_eq!(FileKind::from_mime("application/pdf"), FileKind::File);
        assert_eq!(FileKind::from_mime(""), FileKind::File);
    }

    #[test]
    fn test_insert_and_load_content() {
        let conn = start_memory_db().unwrap();
        setup_item(&conn, "item1");
        insert_file(&conn, &file("f1", "item1", FileKind::Image), &[1, 2, 3]).unwrap();

        let stored = get_file_content(&conn, "f1").unwrap().unwrap();
        assert_eq!(stored.name, "f1.bin");
        assert_eq!(stored.content, vec![1, 2, 3]);
        assert!(file_exists(&conn, "f1").unwrap());
        assert!(get_file_content(&conn, "missing").unwrap().is_none());
    }

    #[test]
    fn test_file_requires_existing_item() {
        let conn = start_memory_db().unwrap();
        let result = insert_file(&conn, &file("f1", "ghost", FileKind::File), b"x");
        assert!(result.is_err(), "orphan file should violate the foreign key");
    }

    #[test]
    fn test_files_for_items_filters_by_owner() {
        let conn = start_memory_db().unwrap();
        setup_item(&conn, "a");
        setup_item(&conn, "b");
        setup_item(&conn, "c");
        insert_file(&conn, &file("fa1", "a", FileKind::File), b"1").unwrap();
        insert_file(&conn, &file("fa2", "a", FileKind::Image), b"2").unwrap();
        insert_file(&conn, &file("fb1", "b", FileKind::File), b"3").unwrap();
        insert_file(&conn, &file("fc1", "c", FileKind::File), b"4").unwrap();

        let files = get_files_for_items(&conn, &["a".to_string(), "b".to_string()]).unwrap();
        let ids: Vec<&str> = files.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["fa1", "fa2", "fb1"]);

        assert!(get_files_for_items(&conn, &[]).unwrap().is_empty());
    }

    #[test]
    fn test_item_delete_blocked_until_files_removed() {
        let conn = start_memory_db().unwrap();
        setup_item(&conn, "a");
        insert_file(&conn, &file("f1", "a", FileKind::File), b"1").unwrap();
        insert_file(&conn, &file("f2", "a", FileKind::File), b"2").unwrap();

        assert!(delete_item(&conn, "a").is_err());

        assert_eq!(delete_files_for_item(&conn, "a").unwrap(), 2);
        assert_eq!(delete_item(&conn, "a").unwrap(), 1);
    }
}
