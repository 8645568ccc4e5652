// ==========================================
// Campus Records - facilitator entity
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Course facilitator. Name is unique case-insensitively
/// (enforced by services, not by the schema).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Facilitator {
    pub id: i64,
    pub name: String,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}
