// ==========================================
// Campus Records - application state
// ==========================================
// Wires every repository and API service over one
// shared SQLite connection, and resolves the default
// database location.
// ==========================================

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::api::{
    CourseApi, DashboardApi, FacilitatorApi, ProgramApi, StationeryApi, StudentApi,
};
use crate::config::ConfigManager;
use crate::db::{configure_sqlite_connection, init_schema};
use crate::repository::{
    ActivityRepository, CourseRepository, FacilitatorRepository, ProgramRepository,
    StationeryRepository, StudentRepository,
};

/// Shared state of a running portal process: one connection, one
/// instance of every service.
pub struct AppState {
    pub db_path: String,

    pub student_api: Arc<StudentApi>,
    pub course_api: Arc<CourseApi>,
    pub program_api: Arc<ProgramApi>,
    pub facilitator_api: Arc<FacilitatorApi>,
    pub stationery_api: Arc<StationeryApi>,
    pub dashboard_api: Arc<DashboardApi>,

    pub activity_repo: Arc<ActivityRepository>,
    pub config: Arc<ConfigManager>,
}

impl AppState {
    /// Open (or create) the database, bootstrap the schema, and build
    /// every service over the shared connection.
    pub fn new(db_path: String) -> Result<Self, String> {
        tracing::info!(db_path = %db_path, "initializing application state");

        let conn =
            Connection::open(&db_path).map_err(|e| format!("cannot open database: {}", e))?;
        configure_sqlite_connection(&conn)
            .map_err(|e| format!("cannot configure database: {}", e))?;
        init_schema(&conn).map_err(|e| format!("cannot initialize schema: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        let student_repo = Arc::new(StudentRepository::from_connection(conn.clone()));
        let course_repo = Arc::new(CourseRepository::from_connection(conn.clone()));
        let program_repo = Arc::new(ProgramRepository::from_connection(conn.clone()));
        let facilitator_repo = Arc::new(FacilitatorRepository::from_connection(conn.clone()));
        let stationery_repo = Arc::new(StationeryRepository::from_connection(conn.clone()));
        let activity_repo = Arc::new(ActivityRepository::from_connection(conn.clone()));
        let config = Arc::new(ConfigManager::from_connection(conn));

        let student_api = Arc::new(StudentApi::new(
            student_repo.clone(),
            program_repo.clone(),
            activity_repo.clone(),
            config.clone(),
        ));
        let course_api = Arc::new(CourseApi::new(
            course_repo.clone(),
            facilitator_repo.clone(),
            activity_repo.clone(),
            config.clone(),
        ));
        let program_api = Arc::new(ProgramApi::new(
            program_repo.clone(),
            activity_repo.clone(),
            config.clone(),
        ));
        let facilitator_api = Arc::new(FacilitatorApi::new(
            facilitator_repo.clone(),
            activity_repo.clone(),
            config.clone(),
        ));
        let stationery_api = Arc::new(StationeryApi::new(
            stationery_repo,
            student_repo.clone(),
            program_repo.clone(),
            course_repo.clone(),
            facilitator_repo.clone(),
            config.clone(),
        ));
        let dashboard_api = Arc::new(DashboardApi::new(
            student_repo,
            course_repo,
            program_repo,
            facilitator_repo,
            activity_repo.clone(),
            config.clone(),
        ));

        Ok(Self {
            db_path,
            student_api,
            course_api,
            program_api,
            facilitator_api,
            stationery_api,
            dashboard_api,
            activity_repo,
            config,
        })
    }
}

/// Resolve the database file location.
///
/// `CAMPUS_RECORDS_DB` wins when set (debugging, tests, CI); otherwise
/// the platform data directory, falling back to the working directory.
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    if let Ok(path) = std::env::var("CAMPUS_RECORDS_DB") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./campus_records.db");
    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("campus-records");
        std::fs::create_dir_all(&dir).ok();
        path = dir.join("campus_records.db");
    }

    path.to_string_lossy().to_string()
}
