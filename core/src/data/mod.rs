//! Data layer for the clipboard database
//!
//! Provides storage and retrieval for:
//! - Items (title, text blocks, share labels)
//! - Files (inline BLOB attachments owned by an item)
//! - Display settings (key/value)
//!
//! Every function takes a `&Connection`, so callers can run several of them
//! inside one `rusqlite::Transaction`.

pub mod files;
pub mod items;
pub mod schema;
pub mod settings;
pub mod start;

use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;

pub use files::{
    delete_files_for_item, file_exists, get_file_content, get_files_for_items, insert_file,
    FileKind, FileRecord, StoredFile,
};
pub use items::{
    count_items, delete_item, get_items_page, insert_item, item_exists, ItemRecord,
    EXPIRY_LABELS,
};
pub use schema::create_all_tables;
pub use settings::{get_all_settings, upsert_titles};
pub use start::{start_db, start_memory_db, StartError};

/// Length of generated item ids
pub const ITEM_ID_LEN: usize = 8;

/// Length of generated file ids
pub const FILE_ID_LEN: usize = 10;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Current time as Unix millis
pub fn current_timestamp_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Random lowercase base36 identifier
pub fn generate_id(len: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char)
        .collect()
}
