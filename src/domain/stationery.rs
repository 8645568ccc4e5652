// ==========================================
// Campus Records - stationery entities
// ==========================================
// Cover-page documents and the saved question bank
// used by the cover-page builder.
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Saved assignment/exam question text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Saved cover-page document.
///
/// Streams and student ids are stored as JSON arrays; program and
/// course are optional references resolved at load time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverPage {
    pub id: i64,
    pub task: String,
    pub groupno: i64,
    pub submitdate: Option<String>,
    pub streams: Vec<String>,
    pub students: Vec<i64>,
    pub show_table: bool,
    pub program_id: Option<i64>,
    pub course_id: Option<i64>,
    pub question: Option<String>,
    pub created_at: DateTime<Utc>,
}
