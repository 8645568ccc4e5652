// ==========================================
// Campus Records - configuration manager
// ==========================================
// Tunables stored in the config_kv table. Missing or
// unparseable values fall back to compiled defaults,
// so a fresh database needs no seeding.
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};
use tracing::warn;

/// Rows shown per data-table page when the client sends none.
pub const KEY_DEFAULT_PAGE_LENGTH: &str = "table.default_page_length";
/// Activities shown on the dashboard feed.
pub const KEY_RECENT_ACTIVITIES: &str = "dashboard.recent_activities";
/// Upper bound on rows accepted from one uploaded sheet.
pub const KEY_IMPORT_MAX_ROWS: &str = "import.max_rows";

pub const DEFAULT_PAGE_LENGTH: i64 = 10;
pub const DEFAULT_RECENT_ACTIVITIES: i64 = 5;
pub const DEFAULT_IMPORT_MAX_ROWS: i64 = 1_000;

pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_value(&self, key: &str) -> RepositoryResult<Option<String>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );
        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn set_value(&self, key: &str, value: &str) -> RepositoryResult<()> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        conn.execute(
            "INSERT INTO config_kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, value],
        )?;
        Ok(())
    }

    /// Integer tunable with a fallback; bad stored values are logged
    /// and ignored.
    pub fn get_i64(&self, key: &str, default: i64) -> RepositoryResult<i64> {
        let Some(raw) = self.get_value(key)? else {
            return Ok(default);
        };
        match raw.trim().parse() {
            Ok(value) => Ok(value),
            Err(_) => {
                warn!(key, value = %raw, "unparseable config value, using default");
                Ok(default)
            }
        }
    }

    pub fn default_page_length(&self) -> RepositoryResult<i64> {
        self.get_i64(KEY_DEFAULT_PAGE_LENGTH, DEFAULT_PAGE_LENGTH)
    }

    pub fn recent_activities_limit(&self) -> RepositoryResult<i64> {
        self.get_i64(KEY_RECENT_ACTIVITIES, DEFAULT_RECENT_ACTIVITIES)
    }

    pub fn import_max_rows(&self) -> RepositoryResult<i64> {
        self.get_i64(KEY_IMPORT_MAX_ROWS, DEFAULT_IMPORT_MAX_ROWS)
    }
}
