//! Database schema definitions for the clipboard store
//!
//! Column names follow the JSON field names the web client uses
//! (`createdAt`, `itemId`, ...), so rows map onto the API without renaming.

use rusqlite::Connection;

/// Creates all required database tables
pub fn create_all_tables(conn: &Connection) -> rusqlite::Result<()> {
    create_items_table(conn)?;
    create_files_table(conn)?;
    create_settings_table(conn)?;
    Ok(())
}

/// Items table: one row per shareable entry
///
/// `texts` holds a JSON array of strings. `expiry` and `visitLimit` are
/// descriptive labels; nothing purges rows based on them.
pub fn create_items_table(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS items (
            id TEXT PRIMARY KEY NOT NULL,
            title TEXT NOT NULL DEFAULT '',
            texts TEXT NOT NULL DEFAULT '[]',
            createdAt INTEGER NOT NULL,
            expiry TEXT NOT NULL DEFAULT 'never',
            visitLimit TEXT NOT NULL DEFAULT '',
            sharePassword TEXT
        )",
        [],
    )?;

    // Listing is always newest first
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_items_created_at ON items(createdAt)",
        [],
    )?;

    Ok(())
}

/// Files table: binary attachments stored inline
///
/// No `ON DELETE CASCADE`: with foreign keys enabled an item cannot be
/// removed while files still reference it, so deletes go files first.
pub fn create_files_table(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS files (
            id TEXT PRIMARY KEY NOT NULL,
            itemId TEXT NOT NULL,
            name TEXT NOT NULL,
            size TEXT NOT NULL,
            type TEXT NOT NULL CHECK (type IN ('image', 'file')),
            remark TEXT NOT NULL DEFAULT '',
            content BLOB NOT NULL,
            createdAt INTEGER NOT NULL,
            FOREIGN KEY (itemId) REFERENCES items(id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_files_item ON files(itemId)",
        [],
    )?;

    Ok(())
}

/// Settings table: display settings as key/value pairs
pub fn create_settings_table(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL
        )",
        [],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_names(conn: &Connection) -> Vec<String> {
        conn.prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn test_create_all_tables() {
        let conn = Connection::open_in_memory().unwrap();
        create_all_tables(&conn).unwrap();

        let tables = table_names(&conn);
        assert_eq!(tables, vec!["files", "items", "settings"]);
    }

    #[test]
    fn test_create_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        create_all_tables(&conn).unwrap();
        conn.execute(
            "INSERT INTO settings (key, value) VALUES ('appTitle', 'Kept')",
            [],
        )
        .unwrap();

        create_all_tables(&conn).unwrap();

        let value: String = conn
            .query_row("SELECT value FROM settings WHERE key = 'appTitle'", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(value, "Kept");
    }

    #[test]
    fn test_file_type_is_constrained() {
        let conn = Connection::open_in_memory().unwrap();
        create_all_tables(&conn).unwrap();
        conn.execute(
            "INSERT INTO items (id, title, texts, createdAt) VALUES ('i1', 't', '[]', 1)",
            [],
        )
        .unwrap();

        let result = conn.execute(
            "INSERT INTO files (id, itemId, name, size, type, remark, content, createdAt)
             VALUES ('f1', 'i1', 'a.bin', '0.0 KB', 'video', '', x'00', 1)",
            [],
        );
        assert!(result.is_err(), "unknown type tag should be rejected");
    }
}
