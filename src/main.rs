// ==========================================
// Campus Records - main entry
// ==========================================

use campus_records::app::{get_default_db_path, AppState};

fn main() {
    campus_records::logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} v{}", campus_records::APP_NAME, campus_records::VERSION);
    tracing::info!("==================================================");

    let db_path = get_default_db_path();
    tracing::info!(db_path = %db_path, "using database");

    let state = match AppState::new(db_path) {
        Ok(state) => state,
        Err(e) => {
            tracing::error!(error = %e, "failed to initialize application state");
            std::process::exit(1);
        }
    };

    match state.dashboard_api.summary() {
        Ok(summary) => {
            tracing::info!(
                students = summary.students,
                courses = summary.courses,
                programs = summary.programs,
                facilitators = summary.facilitators,
                "records summary"
            );
            for activity in &summary.recent_activities {
                tracing::info!(
                    categ = %activity.categ,
                    at = %activity.created_at,
                    "{}",
                    activity.detail
                );
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to load dashboard summary");
            std::process::exit(1);
        }
    }
}
