//! Settings table operations

use rusqlite::{params, Connection};

/// All stored key/value pairs
pub fn get_all_settings(conn: &Connection) -> rusqlite::Result<Vec<(String, String)>> {
    let mut stmt = conn.prepare("SELECT key, value FROM settings ORDER BY key")?;
    let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
    rows.collect()
}

/// Upsert the title pair in a single statement
pub fn upsert_titles(conn: &Connection, app_title: &str, sub_title: &str) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO settings (key, value) VALUES ('appTitle', ?1), ('subTitle', ?2)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value",
        params![app_title, sub_title],
    )?;
    Ok(())
}
