//! Database initialization and startup
//!
//! Opens the SQLite database and ensures all required tables exist.

use rusqlite::Connection;

use super::schema::create_all_tables;

/// Error type for database startup
#[derive(Debug)]
pub enum StartError {
    /// Empty database path provided
    EmptyPath,
    /// SQLite error
    Database(rusqlite::Error),
}

impl std::fmt::Display for StartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StartError::EmptyPath => write!(f, "database path cannot be empty"),
            StartError::Database(e) => write!(f, "database error: {}", e),
        }
    }
}

impl std::error::Error for StartError {}

impl From<rusqlite::Error> for StartError {
    fn from(e: rusqlite::Error) -> Self {
        StartError::Database(e)
    }
}

/// Opens the database file and ensures all required tables exist
///
/// # Errors
/// - `StartError::EmptyPath` if `db_path` is empty
/// - `StartError::Database` for SQLite errors
pub fn start_db(db_path: &str) -> Result<Connection, StartError> {
    if db_path.trim().is_empty() {
        return Err(StartError::EmptyPath);
    }

    let conn = Connection::open(db_path)?;

    // Readers don't block the writer while a large upload commits.
    // PRAGMA returns the new mode, so query_row instead of execute.
    let _: String = conn.query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))?;

    // Files reference items; keep the reference honest.
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    // Idempotent (`CREATE TABLE IF NOT EXISTS`), so always run it to recover
    // cleanly from partially initialized databases.
    create_all_tables(&conn)?;

    Ok(conn)
}

/// Create an in-memory database for testing
pub fn start_memory_db() -> rusqlite::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    // WAL mode doesn't work with in-memory databases, skip it
    conn.execute("PRAGMA foreign_keys = ON", [])?;
    create_all_tables(&conn)?;
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_db_path(name: &str) -> String {
        let temp_dir = std::env::temp_dir();
        format!("{}/cloudclip_test_{}_{}.db", temp_dir.display(), name, std::process::id())
    }

    fn cleanup(path: &str) {
        let _ = fs::remove_file(path);
        let _ = fs::remove_file(format!("{}-wal", path));
        let _ = fs::remove_file(format!("{}-shm", path));
    }

    #[test]
    fn test_empty_path_rejected() {
        let result = start_db("   ");
        assert!(matches!(result, Err(StartError::EmptyPath)));
    }

    #[test]
    fn test_reopening_db_preserves_data() {
        let db_path = temp_db_path("reopen");
        cleanup(&db_path);

        {
            let conn = start_db(&db_path).unwrap();
            conn.execute(
                "INSERT INTO settings (key, value) VALUES (?1, ?2)",
                rusqlite::params!["appTitle", "Persisted"],
            )
            .unwrap();
        }

        {
            let conn = start_db(&db_path).unwrap();
            let value: String = conn
                .query_row(
                    "SELECT value FROM settings WHERE key = 'appTitle'",
                    [],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(value, "Persisted");
        }

        cleanup(&db_path);
    }

    #[test]
    fn test_recovers_partial_schema() {
        let db_path = temp_db_path("partial_schema");
        cleanup(&db_path);

        {
            let conn = start_db(&db_path).unwrap();
            conn.execute("DROP TABLE files", []).unwrap();
            conn.execute("DROP TABLE settings", []).unwrap();
        }

        let conn = start_db(&db_path).unwrap();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN ('items', 'files', 'settings')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 3);

        cleanup(&db_path);
    }

    #[test]
    fn test_foreign_keys_enabled() {
        let conn = start_memory_db().unwrap();

        let fk_enabled: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();

        assert_eq!(fk_enabled, 1, "foreign keys should be enabled");
    }

    #[test]
    fn test_error_display() {
        assert_eq!(
            StartError::EmptyPath.to_string(),
            "database path cannot be empty"
        );
    }
}
