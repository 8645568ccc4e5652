// ==========================================
// Campus Records - student entity
// ==========================================
// Maps to the students table. Deleting a program
// leaves the student unattached (FK ON DELETE SET NULL).
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Registered student. Registration number is unique
/// case-insensitively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    pub fullname: String,
    pub regnumber: String,
    pub program_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}
