// ==========================================
// Campus Records - course repository
// ==========================================
// Data access for the courses table: CRUD, joined
// overview rows for the data table, and the bulk
// facilitator transfer used by the reassignment tool.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::course::Course;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

/// Column values for a not-yet-persisted course (bulk import path).
#[derive(Debug, Clone)]
pub struct NewCourse {
    pub name: String,
    pub code: String,
    pub facilitator_id: Option<i64>,
}

/// Course row joined with its facilitator name for listing.
#[derive(Debug, Clone)]
pub struct CourseOverview {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub facilitator_id: Option<i64>,
    pub facilitator_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub struct CourseRepository {
    conn: Arc<Mutex<Connection>>,
}

impl CourseRepository {
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

    pub fn insert(&self, course: &NewCourse) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO courses (name, code, facilitator_id, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![course.name, course.code, course.facilitator_id, Utc::now()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn update(
        &self,
        id: i64,
        name: &str,
        code: &str,
        facilitator_id: Option<i64>,
    ) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "UPDATE courses SET name = ?1, code = ?2, facilitator_id = ?3 WHERE id = ?4",
            params![name, code, facilitator_id, id],
        )?;
        Ok(rows)
    }

    pub fn find_by_id(&self, id: i64) -> RepositoryResult<Option<Course>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, code, facilitator_id, created_at FROM courses WHERE id = ?1",
        )?;
        match stmt.query_row(params![id], map_row) {
            Ok(course) => Ok(Some(course)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Case-insensitive lookup by code (cover-page and import paths).
    pub fn find_by_code_ci(&self, code: &str) -> RepositoryResult<Option<Course>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, code, facilitator_id, created_at FROM courses WHERE LOWER(code) = LOWER(?1)",
        )?;
        match stmt.query_row(params![code], map_row) {
            Ok(course) => Ok(Some(course)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn code_exists_ci(&self, code: &str, exclude_id: Option<i64>) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM courses WHERE LOWER(code) = LOWER(?1) AND id != ?2",
            params![code, exclude_id.unwrap_or(-1)],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn delete_by_id(&self, id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute("DELETE FROM courses WHERE id = ?1", params![id])?;
        Ok(rows)
    }

    pub fn delete_many(&self, ids: &[i64]) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        let mut deleted = 0;
        for id in ids {
            deleted += tx.execute("DELETE FROM courses WHERE id = ?1", params![id])?;
        }
        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(deleted)
    }

    pub fn delete_all(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute("DELETE FROM courses", [])?;
        Ok(rows)
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM courses", [], |row| row.get(0))?;
        Ok(count)
    }

    /// All courses ordered by name (selection lists).
    pub fn list_all(&self) -> RepositoryResult<Vec<Course>> {
        let conn = self.get_conn()?;
        let mut stmt = conn
            .prepare("SELECT id, name, code, facilitator_id, created_at FROM courses ORDER BY name")?;
        let courses = stmt
            .query_map([], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(courses)
    }

    /// Joined overview rows for the data table.
    pub fn list_overview(&self) -> RepositoryResult<Vec<CourseOverview>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT c.id, c.name, c.code, c.facilitator_id, f.name, c.created_at
            FROM courses c
            LEFT JOIN facilitators f ON f.id = c.facilitator_id
            "#,
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(CourseOverview {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    code: row.get(2)?,
                    facilitator_id: row.get(3)?,
                    facilitator_name: row.get(4)?,
                    created_at: row.get(5)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    /// Move every course from one facilitator to another.
    ///
    /// # Arguments
    /// - `from`: source facilitator id, None meaning the unassigned pool
    /// - `to`: target facilitator id, None meaning unassign
    ///
    /// # Returns
    /// - Ok(rows): number of courses moved
    pub fn transfer_facilitator(
        &self,
        from: Option<i64>,
        to: Option<i64>,
    ) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = match from {
            Some(from_id) => conn.execute(
                "UPDATE courses SET facilitator_id = ?1 WHERE facilitator_id = ?2",
                params![to, from_id],
            )?,
            None => conn.execute(
                "UPDATE courses SET facilitator_id = ?1 WHERE facilitator_id IS NULL",
                params![to],
            )?,
        };
        Ok(rows)
    }

    /// Transactional bulk insert (import path, pre-validated rows).
    pub fn bulk_insert(&self, courses: &[NewCourse]) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let mut count = 0;
        for course in courses {
            tx.execute(
                "INSERT INTO courses (name, code, facilitator_id, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![course.name, course.code, course.facilitator_id, Utc::now()],
            )?;
            count += 1;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;
        Ok(count)
    }
}

fn map_row(row: &Row<'_>) -> SqliteResult<Course> {
    Ok(Course {
        id: row.get(0)?,
        name: row.get(1)?,
        code: row.get(2)?,
        facilitator_id: row.get(3)?,
        created_at: row.get(4)?,
    })
}
