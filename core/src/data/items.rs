//! Item table operations
//!
//! Items are created once and deleted wholesale; there is no update path.

use rusqlite::{params, Connection};

/// Expiry label values accepted on submission
pub const EXPIRY_LABELS: [&str; 4] = ["never", "10m", "1h", "1d"];

/// Item row from the database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRecord {
    pub id: String,
    pub title: String,
    /// Decoded from the JSON `texts` column
    pub texts: Vec<String>,
    /// Unix millis
    pub created_at: i64,
    pub expiry: String,
    pub visit_limit: String,
    pub share_password: Option<String>,
}

fn encode_texts(texts: &[String]) -> rusqlite::Result<String> {
    serde_json::to_string(texts).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

fn decode_texts(raw: Option<String>, column_index: usize) -> rusqlite::Result<Vec<String>> {
    match raw {
        None => Ok(Vec::new()),
        Some(s) if s.trim().is_empty() => Ok(Vec::new()),
        Some(s) => serde_json::from_str(&s).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                column_index,
                rusqlite::types::Type::Text,
                Box::new(e),
            )
        }),
    }
}

fn parse_item_row(row: &rusqlite::Row) -> rusqlite::Result<ItemRecord> {
    let texts_raw: Option<String> = row.get(2)?;
    Ok(ItemRecord {
        id: row.get(0)?,
        title: row.get(1)?,
        texts: decode_texts(texts_raw, 2)?,
        created_at: row.get(3)?,
        expiry: row.get(4)?,
        visit_limit: row.get(5)?,
        share_password: row.get(6)?,
    })
}

/// Insert a new item
pub fn insert_item(conn: &Connection, item: &ItemRecord) -> rusqlite::Result<()> {
    let texts = encode_texts(&item.texts)?;
    conn.execute(
        "INSERT INTO items (id, title, texts, createdAt, expiry, visitLimit, sharePassword)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            item.id,
            item.title,
            texts,
            item.created_at,
            item.expiry,
            item.visit_limit,
            item.share_password,
        ],
    )?;
    Ok(())
}

/// Check whether an item id is taken
pub fn item_exists(conn: &Connection, id: &str) -> rusqlite::Result<bool> {
    conn.query_row("SELECT COUNT(*) > 0 FROM items WHERE id = ?1", [id], |row| {
        row.get(0)
    })
}

/// Total number of items
pub fn count_items(conn: &Connection) -> rusqlite::Result<u64> {
    let total: i64 = conn.query_row("SELECT COUNT(*) FROM items", [], |row| row.get(0))?;
    u64::try_from(total).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(0, total))
}

/// One page of items, newest first
pub fn get_items_page(
    conn: &Connection,
    limit: u32,
    offset: u64,
) -> rusqlite::Result<Vec<ItemRecord>> {
    let offset_sql = i64::try_from(offset).map_err(|_| {
        rusqlite::Error::InvalidParameterName("offset exceeds sqlite INTEGER range".to_string())
    })?;

    let mut stmt = conn.prepare(
        "SELECT id, title, texts, createdAt, expiry, visitLimit, sharePassword
         FROM items
         ORDER BY createdAt DESC, id DESC
         LIMIT ?1 OFFSET ?2",
    )?;

    let rows = stmt.query_map(params![i64::from(limit), offset_sql], parse_item_row)?;

    rows.collect()
}

/// Delete an item row, returning how many rows were removed
///
/// Files must already be gone; the foreign key rejects the delete otherwise.
pub fn delete_item(conn: &Connection, id: &str) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM items WHERE id = ?1", [id])
}
