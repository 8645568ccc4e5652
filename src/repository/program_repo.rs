// ==========================================
// Campus Records - program repository
// ==========================================
// Data access for the programs table. No business
// logic here; uniqueness semantics live in the API
// services, this layer only answers the questions.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::program::Program;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Utc;
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

/// Column values for a not-yet-persisted program (bulk import path).
#[derive(Debug, Clone)]
pub struct NewProgram {
    pub name: String,
    pub abbrev: String,
    pub comment: Option<String>,
}

pub struct ProgramRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ProgramRepository {
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

    pub fn insert(&self, program: &NewProgram) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO programs (name, abbrev, comment, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![program.name, program.abbrev, program.comment, Utc::now()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update(
        &self,
        id: i64,
        name: &str,
        abbrev: &str,
        comment: Option<&str>,
    ) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "UPDATE programs SET name = ?1, abbrev = ?2, comment = ?3 WHERE id = ?4",
            params![name, abbrev, comment, id],
        )?;
        Ok(rows)
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Program>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, abbrev, comment, created_at FROM programs WHERE id = ?1",
        )?;
        match stmt.query_row(params![id], map_row) {
            Ok(program) => Ok(Some(program)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Case-insensitive lookup by abbreviation (import path).
    pub fn find_by_abbrev_ci(&self, abbrev: &str) -> RepositoryResult<Option<Program>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, abbrev, comment, created_at FROM programs WHERE LOWER(abbrev) = LOWER(?1)",
        )?;
        match stmt.query_row(params![abbrev], map_row) {
            Ok(program) => Ok(Some(program)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Case-insensitive duplicate check, optionally ignoring one id
    /// (the record being updated).
    pub fn abbrev_exists_ci(&self, abbrev: &str, exclude_id: Option<i64>) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM programs WHERE LOWER(abbrev) = LOWER(?1) AND id != ?2",
            params![abbrev, exclude_id.unwrap_or(-1)],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn delete_by_id(&self, id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute("DELETE FROM programs WHERE id = ?1", params![id])?;
        Ok(rows)
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM programs", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Full collection for the data table, name order.
    pub fn list_all(&self) -> RepositoryResult<Vec<Program>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, abbrev, comment, created_at FROM programs ORDER BY name",
        )?;
        let programs = stmt
            .query_map([], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(programs)
    }

    /// Transactional bulk insert (import path). Rows are pre-validated
    /// by the caller; any row failure rolls the batch back.
    pub fn bulk_insert(&self, programs: &[NewProgram]) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let mut count = 0;
        for program in programs {
            tx.execute(
                "INSERT INTO programs (name, abbrev, comment, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![program.name, program.abbrev, program.comment, Utc::now()],
            )?;
            count += 1;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(count)
    }
}

fn map_row(row: &Row<'_>) -> SqliteResult<Program> {
    Ok(Program {
        id: row.get(0)?,
        name: row.get(1)?,
        abbrev: row.get(2)?,
        comment: row.get(3)?,
        created_at: row.get(4)?,
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

    fn new_program(name: &str, abbrev: &str) -> NewProgram {
        NewProgram {
            name: name.to_string(),
            abbrev: abbrev.to_string(),
            comment: None,
        }
    }

    #[test]
    fn test_insert_and_find() {
        let repo = ProgramRepository::from_connection(setup_test_db());
        let id = repo.insert(&new_program("Computer Science", "CS")).unwrap();

        let found = repo.find_by_id(id).unwrap().unwrap();
        assert_eq!(found.name, "Computer Science");
        assert_eq!(found.abbrev, "CS");

        assert!(repo.find_by_id(id + 1).unwrap().is_none());
    }

    #[test]
    fn test_abbrev_lookup_is_case_insensitive() {
        let repo = ProgramRepository::from_connection(setup_test_db());
        repo.insert(&new_program("Computer Science", "CS")).unwrap();

        assert!(repo.find_by_abbrev_ci("cs").unwrap().is_some());
        assert!(repo.abbrev_exists_ci("Cs", None).unwrap());
        assert!(!repo.abbrev_exists_ci("EE", None).unwrap());
    }

    #[test]
    fn test_abbrev_exists_excludes_own_id() {
        let repo = ProgramRepository::from_connection(setup_test_db());
        let id = repo.insert(&new_program("Computer Science", "CS")).unwrap();

        assert!(!repo.abbrev_exists_ci("CS", Some(id)).unwrap());
        assert!(repo.abbrev_exists_ci("CS", None).unwrap());
    }

    #[test]
    fn test_bulk_insert_and_list() {
        let repo = ProgramRepository::from_connection(setup_test_db());
        let inserted = repo
            .bulk_insert(&[new_program("Zoology", "ZO"), new_program("Accounting", "ACC")])
            .unwrap();
        assert_eq!(inserted, 2);

        let all = repo.list_all().unwrap();
        assert_eq!(all.len(), 2);
        // name order
        assert_eq!(all[0].name, "Accounting");
        assert_eq!(repo.count().unwrap(), 2);
    }

    #[test]
    fn test_delete() {
        let repo = ProgramRepository::from_connection(setup_test_db());
        let id = repo.insert(&new_program("Computer Science", "CS")).unwrap();

        assert_eq!(repo.delete_by_id(id).unwrap(), 1);
        assert_eq!(repo.delete_by_id(id).unwrap(), 0);
    }
}
