// ==========================================
// Campus Records - course entity
// ==========================================
// Maps to the courses table. Deleting a facilitator
// leaves the course unassigned (FK ON DELETE SET NULL).
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Taught course. Code is unique case-insensitively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub name: String,
    pub code: String,
    pub facilitator_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}
