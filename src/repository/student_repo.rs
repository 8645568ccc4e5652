// ==========================================
// Campus Records - student repository
// ==========================================
// Data access for the students table, including the
// joined overview rows (program display) consumed by
// the students data table and roster lookups for the
// cover-page builder.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::student::Student;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

/// Column values for a not-yet-persisted student (bulk import path).
#[derive(Debug, Clone)]
pub struct NewStudent {
    pub fullname: String,
    pub regnumber: String,
    pub program_id: Option<i64>,
}

/// Student row joined with program fields for listing.
///
/// `program_display` is "ABBR: Name" or None when the student
/// has no program.
#[derive(Debug, Clone)]
pub struct StudentOverview {
    pub id: i64,
    pub fullname: String,
    pub regnumber: String,
    pub program_id: Option<i64>,
    pub program_display: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub struct StudentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StudentRepository {
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

    pub fn insert(&self, student: &NewStudent) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO students (fullname, regnumber, program_id, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![student.fullname, student.regnumber, student.program_id, Utc::now()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update(
        &self,
        id: i64,
        fullname: &str,
        regnumber: &str,
        program_id: Option<i64>,
    ) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "UPDATE students SET fullname = ?1, regnumber = ?2, program_id = ?3 WHERE id = ?4",
            params![fullname, regnumber, program_id, id],
        )?;
        Ok(rows)
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Student>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, fullname, regnumber, program_id, created_at FROM students WHERE id = ?1",
        )?;
        match stmt.query_row(params![id], map_row) {
            Ok(student) => Ok(Some(student)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn regnumber_exists_ci(
        &self,
        regnumber: &str,
        exclude_id: Option<i64>,
    ) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM students WHERE LOWER(regnumber) = LOWER(?1) AND id != ?2",
            params![regnumber, exclude_id.unwrap_or(-1)],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn delete_by_id(&self, id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute("DELETE FROM students WHERE id = ?1", params![id])?;
        Ok(rows)
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM students", [], |row| row.get(0))?;
        Ok(count)
    }

    /// All students ordered by full name (selection lists).
    pub fn list_all(&self) -> RepositoryResult<Vec<Student>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, fullname, regnumber, program_id, created_at FROM students ORDER BY fullname",
        )?;
        let students = stmt
            .query_map([], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(students)
    }

    /// Roster rows for a stored cover-page student id list.
    pub fn find_by_ids(&self, ids: &[i64]) -> RepositoryResult<Vec<Student>> {
        let mut students = Vec::with_capacity(ids.len());
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, fullname, regnumber, program_id, created_at FROM students WHERE id = ?1",
        )?;
        for id in ids {
            match stmt.query_row(params![id], map_row) {
                Ok(student) => students.push(student),
                Err(rusqlite::Error::QueryReturnedNoRows) => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(students)
    }

    /// Joined overview rows for the data table.
    pub fn list_overview(&self) -> RepositoryResult<Vec<StudentOverview>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT s.id, s.fullname, s.regnumber, s.program_id,
                   CASE WHEN p.id IS NULL THEN NULL ELSE p.abbrev || ': ' || p.name END,
                   s.created_at
            FROM students s
            LEFT JOIN programs p ON p.id = s.program_id
            "#,
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(StudentOverview {
                    id: row.get(0)?,
                    fullname: row.get(1)?,
                    regnumber: row.get(2)?,
                    program_id: row.get(3)?,
                    program_display: row.get(4)?,
                    created_at: row.get(5)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    /// Transactional bulk insert (import path, pre-validated rows).
    pub fn bulk_insert(&self, students: &[NewStudent]) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let mut count = 0;
        for student in students {
            tx.execute(
                "INSERT INTO students (fullname, regnumber, program_id, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![student.fullname, student.regnumber, student.program_id, Utc::now()],
            )?;
            count += 1;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(count)
    }
}

fn map_row(row: &Row<'_>) -> SqliteResult<Student> {
    Ok(Student {
        id: row.get(0)?,
        fullname: row.get(1)?,
        regnumber: row.get(2)?,
        program_id: row.get(3)?,
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

    fn insert_program(db: &Arc<Mutex<Connection>>, name: &str, abbrev: &str) -> i64 {
        let conn = db.lock().unwrap();
        conn.execute(
            "INSERT INTO programs (name, abbrev, created_at) VALUES (?1, ?2, ?3)",
            params![name, abbrev, Utc::now()],
        )
        .unwrap();
        conn.last_insert_rowid()
    }

    fn student(fullname: &str, regnumber: &str, program_id: Option<i64>) -> NewStudent {
        NewStudent {
            fullname: fullname.to_string(),
            regnumber: regnumber.to_string(),
            program_id,
        }
    }

    #[test]
    fn test_regnumber_check_is_case_insensitive() {
        let repo = StudentRepository::from_connection(setup_test_db());
        let id = repo.insert(&student("Asha Juma", "REG-001", None)).unwrap();

        assert!(repo.regnumber_exists_ci("reg-001", None).unwrap());
        assert!(!repo.regnumber_exists_ci("reg-001", Some(id)).unwrap());
        assert!(!repo.regnumber_exists_ci("REG-002", None).unwrap());
    }

    #[test]
    fn test_overview_builds_program_display() {
        let db = setup_test_db();
        let prog = insert_program(&db, "Computer Science", "CS");
        let repo = StudentRepository::from_connection(db);

        repo.insert(&student("Asha Juma", "REG-001", Some(prog))).unwrap();
        repo.insert(&student("Neema Paul", "REG-002", None)).unwrap();

        let mut overview = repo.list_overview().unwrap();
        overview.sort_by(|a, b| a.regnumber.cmp(&b.regnumber));
        assert_eq!(
            overview[0].program_display.as_deref(),
            Some("CS: Computer Science")
        );
        assert!(overview[1].program_display.is_none());
    }

    #[test]
    fn test_find_by_ids_skips_missing() {
        let repo = StudentRepository::from_connection(setup_test_db());
        let a = repo.insert(&student("Asha Juma", "REG-001", None)).unwrap();
        let b = repo.insert(&student("Neema Paul", "REG-002", None)).unwrap();

        let found = repo.find_by_ids(&[a, 999, b]).unwrap();
        assert_eq!(found.len(), 2);
    }
}
