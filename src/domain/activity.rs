// ==========================================
// Campus Records - activity audit entity
// ==========================================
// Every mutation and every table export writes one
// of these. Read back by the dashboard (most recent
// first) and never updated.
// ==========================================

use crate::domain::types::ActivityCategory;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One audit log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: i64,
    pub categ: String,
    pub title: Option<String>,
    pub detail: String,
    pub created_at: DateTime<Utc>,
}

impl Activity {
    /// Build a new (not yet persisted) entry. The id is assigned on insert.
    pub fn new(categ: ActivityCategory, title: &str, detail: &str) -> Self {
        Self {
            id: 0,
            categ: categ.as_str().to_string(),
            title: Some(title.to_string()),
            detail: detail.to_string(),
            created_at: Utc::now(),
        }
    }

    /// Category of this entry, unknown values defaulting per dashboard rules.
    pub fn category(&self) -> ActivityCategory {
        ActivityCategory::parse_or_default(&self.categ)
    }
}
