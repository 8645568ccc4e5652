// ==========================================
// Campus Records - stationery repository
// ==========================================
// Data access for the question bank and saved
// cover pages. Stream and student id lists are
// stored as JSON text columns.
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::stationery::{CoverPage, Question};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Utc;
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex};

/// Column values for a not-yet-persisted cover page.
#[derive(Debug, Clone)]
pub struct NewCoverPage {
    pub task: String,
    pub groupno: i64,
    pub submitdate: Option<String>,
    pub streams: Vec<String>,
    pub students: Vec<i64>,
    pub show_table: bool,
    pub program_id: Option<i64>,
    pub course_id: Option<i64>,
    pub question: Option<String>,
}

pub struct StationeryRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StationeryRepository {
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

    // ==========================================
    // Question bank
    // ==========================================

    pub fn insert_question(&self, content: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO questions (content, created_at) VALUES (?1, ?2)",
            params![content, Utc::now()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn question_exists_ci(&self, content: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM questions WHERE LOWER(content) = LOWER(?1)",
            params![content],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    pub fn delete_question(&self, id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute("DELETE FROM questions WHERE id = ?1", params![id])?;
        Ok(rows)
    }

    /// All saved questions, newest first.
    pub fn list_questions(&self) -> RepositoryResult<Vec<Question>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, content, created_at FROM questions ORDER BY created_at DESC, id DESC",
        )?;
        let questions = stmt
            .query_map([], |row| {
                Ok(Question {
                    id: row.get(0)?,
                    content: row.get(1)?,
                    created_at: row.get(2)?,
                })
            })?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(questions)
    }

    // ==========================================
    // Cover pages
    // ==========================================

    pub fn insert_page(&self, page: &NewCoverPage) -> RepositoryResult<i64> {
        let streams = serde_json::to_string(&page.streams)
            .map_err(|e| RepositoryError::InternalError(e.to_string()))?;
        let students = serde_json::to_string(&page.students)
            .map_err(|e| RepositoryError::InternalError(e.to_string()))?;

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO cover_pages (
                task, groupno, submitdate, streams, students,
                show_table, program_id, course_id, question, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                page.task,
                page.groupno,
                page.submitdate,
                streams,
                students,
                page.show_table,
                page.program_id,
                page.course_id,
                page.question,
                Utc::now(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn find_page_by_id(&self, id: i64) -> RepositoryResult<Option<CoverPage>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, task, groupno, submitdate, streams, students,
                   show_table, program_id, course_id, question, created_at
            FROM cover_pages WHERE id = ?1
            "#,
        )?;
        match stmt.query_row(params![id], map_page_row) {
            Ok(page) => Ok(Some(page)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn delete_page(&self, id: i64) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let rows = conn.execute("DELETE FROM cover_pages WHERE id = ?1", params![id])?;
        Ok(rows)
    }

    /// All saved pages, newest first.
    pub fn list_pages(&self) -> RepositoryResult<Vec<CoverPage>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, task, groupno, submitdate, streams, students,
                   show_table, program_id, course_id, question, created_at
            FROM cover_pages ORDER BY created_at DESC, id DESC
            "#,
        )?;
        let pages = stmt
            .query_map([], map_page_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(pages)
    }
}

fn map_page_row(row: &Row<'_>) -> SqliteResult<CoverPage> {
    let streams_json: Option<String> = row.get(4)?;
    let students_json: Option<String> = row.get(5)?;

    // Unreadable JSON degrades to an empty list rather than failing the row.
    let streams = streams_json
        .as_deref()
        .and_then(|v| serde_json::from_str(v).ok())
        .unwrap_or_default();
    let students = students_json
        .as_deref()
        .and_then(|v| serde_json::from_str(v).ok())
        .unwrap_or_default();

    Ok(CoverPage {
        id: row.get(0)?,
        task: row.get(1)?,
        groupno: row.get(2)?,
        submitdate: row.get(3)?,
        streams,
        students,
        show_table: row.get(6)?,
        program_id: row.get(7)?,
        course_id: row.get(8)?,
        question: row.get(9)?,
        created_at: row.get(10)?,
    })
}
