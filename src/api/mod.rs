// ==========================================
// Campus Records - API layer
// ==========================================
// One service per entity: validation, audit writes,
// table configuration, and row serialization live
// here; repositories stay dumb.
// ==========================================

pub mod error;
pub mod import;
pub mod pagination;

pub mod course_api;
pub mod dashboard_api;
pub mod facilitator_api;
pub mod program_api;
pub mod stationery_api;
pub mod student_api;

pub use course_api::{CourseApi, CourseRequest, CourseRow};
pub use dashboard_api::{ActivityView, DashboardApi, DashboardSummary};
pub use error::{ApiError, ApiResult};
pub use facilitator_api::{FacilitatorApi, FacilitatorRequest, FacilitatorRow};
pub use import::{ImportReport, SkippedRow, SpreadsheetImport};
pub use pagination::{paginate, PaginationMeta};
pub use program_api::{ProgramApi, ProgramRequest, ProgramRow};
pub use stationery_api::{
    CoverPageInfo, CoverPageRequest, SectionPage, StationeryApi, StationerySection,
};
pub use student_api::{StudentApi, StudentRequest, StudentRow};

use serde::{Deserialize, Serialize};

/// What the portal shows after a create/update/delete: a flag and a
/// user-facing message. Validation failures are outcomes, not errors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub success: bool,
    pub message: String,
}

impl ActionOutcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Target of a batch delete: explicit ids, or the whole table.
#[derive(Debug, Clone, Deserialize)]
pub enum DeleteSelection {
    All,
    Ids(Vec<i64>),
}
