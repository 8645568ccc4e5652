// ==========================================
// Campus Records - activity audit repository
// ==========================================
// Append-only log behind the dashboard feed. Written
// on every mutation and on table exports.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::activity::Activity;
use crate::domain::types::ActivityCategory;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

pub struct ActivityRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ActivityRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Append one entry and return its id.
    pub fn insert(&self, activity: &Activity) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO activities (categ, title, detail, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                activity.categ,
                activity.title,
                activity.detail,
                activity.created_at
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Convenience append used by the entity services.
    pub fn record(
        &self,
        categ: ActivityCategory,
        title: &str,
        detail: &str,
    ) -> RepositoryResult<i64> {
        self.insert(&Activity::new(categ, title, detail))
    }

    /// Most recent entries, newest first.
    pub fn find_recent(&self, limit: i64) -> RepositoryResult<Vec<Activity>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, categ, title, detail, created_at
            FROM activities
            ORDER BY created_at DESC, id DESC
            LIMIT ?1
            "#,
        )?;

        let entries = stmt
            .query_map(params![limit], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(entries)
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM activities", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn map_row(row: &Row<'_>) -> SqliteResult<Activity> {
    Ok(Activity {
        id: row.get(0)?,
        categ: row.get(1)?,
        title: row.get(2)?,
        detail: row.get(3)?,
        created_at: row.get(4)?,
    })
}
