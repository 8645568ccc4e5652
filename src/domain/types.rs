// ==========================================
// Campus Records - shared domain types
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// ActivityCategory - audit log categories
// ==========================================
// One category per managed entity; the dashboard
// maps each to a display style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityCategory {
    Student,
    Course,
    Facilitator,
    Program,
}

impl ActivityCategory {
    /// Stable string form stored in the activities table.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityCategory::Student => "student",
            ActivityCategory::Course => "course",
            ActivityCategory::Facilitator => "facilitator",
            ActivityCategory::Program => "program",
        }
    }

    /// Parse a stored category. Unknown values fall back to Student,
    /// matching the dashboard's default styling rule.
    pub fn parse_or_default(value: &str) -> Self {
        match value {
            "course" => ActivityCategory::Course,
            "facilitator" => ActivityCategory::Facilitator,
            "program" => ActivityCategory::Program,
            _ => ActivityCategory::Student,
        }
    }

    /// Dashboard display style (color + icon class).
    pub fn style(&self) -> CategoryStyle {
        match self {
            ActivityCategory::Student => CategoryStyle {
                color: "blue",
                icon: "fas fa-user-graduate",
            },
            ActivityCategory::Course => CategoryStyle {
                color: "yellow",
                icon: "fas fa-book-open",
            },
            ActivityCategory::Facilitator => CategoryStyle {
                color: "green",
                icon: "fas fa-chalkboard-user",
            },
            ActivityCategory::Program => CategoryStyle {
                color: "black",
                icon: "fas fa-graduation-cap",
            },
        }
    }
}

/// Display style for a dashboard activity entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStyle {
    pub color: &'static str,
    pub icon: &'static str,
}
