// ==========================================
// Campus Records - application layer
// ==========================================

pub mod state;

pub use state::{get_default_db_path, AppState};
