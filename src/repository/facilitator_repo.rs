// ==========================================
// Campus Records - facilitator repository
// ==========================================
// Data access for the facilitators table, including
// the joined overview rows (course counts) consumed
// by the facilitators data table.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::facilitator::Facilitator;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

/// Column values for a not-yet-persisted facilitator (bulk import path).
#[derive(Debug, Clone)]
pub struct NewFacilitator {
    pub name: String,
    pub comment: Option<String>,
}

/// Facilitator row plus its LEFT JOIN course count, as listed in the table.
#[derive(Debug, Clone)]
pub struct FacilitatorOverview {
    pub id: i64,
    pub name: String,
    pub comment: Option<String>,
    pub courses_count: i64,
    pub created_at: DateTime<Utc>,
}

pub struct FacilitatorRepository {
    conn: Arc<Mutex<Connection>>,
}

impl FacilitatorRepository {
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

    pub fn insert(&self, facilitator: &NewFacilitator) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO facilitators (name, comment, created_at) VALUES (?1, ?2, ?3)",
            params![facilitator.name, facilitator.comment, Utc::now()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update(&self, id: i64, name: &str, comment: Option<&str>) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "UPDATE facilitators SET name = ?1, comment = ?2 WHERE id = ?3",
            params![name, comment, id],
        )?;
        Ok(rows)
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Facilitator>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT id, name, comment, created_at FROM facilitators WHERE id = ?1")?;
        match stmt.query_row(params![id], map_row) {
            Ok(facilitator) => Ok(Some(facilitator)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Case-insensitive lookup by name (course import path).
    pub fn find_by_name_ci(&self, name: &str) -> RepositoryResult<Option<Facilitator>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, comment, created_at FROM facilitators WHERE LOWER(name) = LOWER(?1)",
        )?;
        match stmt.query_row(params![name], map_row) {
            Ok(facilitator) => Ok(Some(facilitator)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn name_exists_ci(&self, name: &str, exclude_id: Option<i64>) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM facilitators WHERE LOWER(name) = LOWER(?1) AND id != ?2",
            params![name, exclude_id.unwrap_or(-1)],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn delete_by_id(&self, id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute("DELETE FROM facilitators WHERE id = ?1", params![id])?;
        Ok(rows)
    }

    /// Delete a batch of ids; returns how many rows actually went away.
    pub fn delete_many(&self, ids: &[i64]) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        let mut deleted = 0;
        for id in ids {
            deleted += tx.execute("DELETE FROM facilitators WHERE id = ?1", params![id])?;
        }
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(deleted)
    }

    pub fn delete_all(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute("DELETE FROM facilitators", [])?;
        Ok(rows)
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM facilitators", [], |row| row.get(0))?;
        Ok(count)
    }

    /// All facilitators ordered by name (selection lists).
    pub fn list_all(&self) -> RepositoryResult<Vec<Facilitator>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT id, name, comment, created_at FROM facilitators ORDER BY name")?;
        let facilitators = stmt
            .query_map([], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(facilitators)
    }

    /// Overview rows with course counts for the data table.
    pub fn list_overview(&self) -> RepositoryResult<Vec<FacilitatorOverview>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT f.id, f.name, f.comment, COUNT(c.id) AS courses_count, f.created_at
            FROM facilitators f
            LEFT JOIN courses c ON c.facilitator_id = f.id
            GROUP BY f.id, f.name, f.comment, f.created_at
            "#,
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(FacilitatorOverview {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    comment: row.get(2)?,
                    courses_count: row.get(3)?,
                    created_at: row.get(4)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    /// Transactional bulk insert (import path, pre-validated rows).
    pub fn bulk_insert(&self, facilitators: &[NewFacilitator]) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let mut count = 0;
        for facilitator in facilitators {
            tx.execute(
                "INSERT INTO facilitators (name, comment, created_at) VALUES (?1, ?2, ?3)",
                params![facilitator.name, facilitator.comment, Utc::now()],
            )?;
            count += 1;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(count)
    }
}

fn map_row(row: &Row<'_>) -> SqliteResult<Facilitator> {
    Ok(Facilitator {
        id: row.get(0)?,
        name: row.get(1)?,
        comment: row.get(2)?,
        created_at: row.get(3)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{configure_sqlite_connection, init_schema};

    fn setup_test_db() -> Arc<Mutex<Connection>> {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        Arc::new(Mutex::new(conn))
    }

    fn facilitator(name: &str) -> NewFacilitator {
        NewFacilitator {
            name: name.to_string(),
            comment: None,
        }
    }

    #[test]
    fn test_name_lookup_is_case_insensitive() {
        let repo = FacilitatorRepository::from_connection(setup_test_db());
        repo.insert(&facilitator("John Mollel")).unwrap();

        assert!(repo.find_by_name_ci("john mollel").unwrap().is_some());
        assert!(repo.name_exists_ci("JOHN MOLLEL", None).unwrap());
        assert!(!repo.name_exists_ci("Jane", None).unwrap());
    }

    #[test]
    fn test_overview_counts_courses() {
        let db = setup_test_db();
        let repo = FacilitatorRepository::from_connection(db.clone());
        let id = repo.insert(&facilitator("John Mollel")).unwrap();
        repo.insert(&facilitator("Jane Kessy")).unwrap();

        {
            let conn = db.lock().unwrap();
            conn.execute(
                "INSERT INTO courses (name, code, facilitator_id, created_at)
                 VALUES ('Databases', 'DB101', ?1, ?2)",
                params![id, Utc::now()],
            )
            .unwrap();
            conn.execute(
                "INSERT INTO courses (name, code, facilitator_id, created_at)
                 VALUES ('Networks', 'NW102', ?1, ?2)",
                params![id, Utc::now()],
            )
            .unwrap();
        }

        let mut overview = repo.list_overview().unwrap();
        overview.sort_by(|a, b| a.name.cmp(&b.name));
        assert_eq!(overview.len(), 2);
        assert_eq!(overview[0].name, "Jane Kessy");
        assert_eq!(overview[0].courses_count, 0);
        assert_eq!(overview[1].courses_count, 2);
    }

    #[test]
    fn test_delete_many_and_all() {
        let repo = FacilitatorRepository::from_connection(setup_test_db());
        let a = repo.insert(&facilitator("A")).unwrap();
        let b = repo.insert(&facilitator("B")).unwrap();
        repo.insert(&facilitator("C")).unwrap();

        assert_eq!(repo.delete_many(&[a, b, 999]).unwrap(), 2);
        assert_eq!(repo.count().unwrap(), 1);
        assert_eq!(repo.delete_all().unwrap(), 1);
        assert_eq!(repo.count().unwrap(), 0);
    }
}
