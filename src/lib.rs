// ==========================================
// Campus Records - core library
// ==========================================
// Campus records administration portal: students,
// courses, programs, facilitators, and cover-page
// stationery over SQLite, with server-side data
// tables and bulk spreadsheet import.
// ==========================================

// ==========================================
// module declarations
// ==========================================

// domain layer - entities and shared types
pub mod domain;

// repository layer - data access
pub mod repository;

// table layer - the generic data-table pager
pub mod table;

// importer layer - spreadsheet parsing
pub mod importer;

// configuration layer
pub mod config;

// database infrastructure (connection init, schema bootstrap)
pub mod db;

// logging setup
pub mod logging;

// API layer - entity services
pub mod api;

// application layer - wiring
pub mod app;

// ==========================================
// re-exports
// ==========================================

pub use api::{
    ActionOutcome, CourseApi, DashboardApi, DeleteSelection, FacilitatorApi, ImportReport,
    ProgramApi, SpreadsheetImport, StationeryApi, StudentApi,
};
pub use app::{get_default_db_path, AppState};
pub use domain::types::ActivityCategory;
pub use table::{process, RowSerializer, TableConfig, TableQuery, TableResponse};

/// Crate version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Display name of the portal.
pub const APP_NAME: &str = "Campus Records";
