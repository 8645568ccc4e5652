// ==========================================
// Campus Records - program entity
// ==========================================
// Maps to the programs table. Abbreviation is
// unique case-insensitively (enforced by services).
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Academic program (e.g. "BSc Computer Science", abbrev "CS").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Program {
    pub id: i64,
    pub name: String,
    pub abbrev: String,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}
