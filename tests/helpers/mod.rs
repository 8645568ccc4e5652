// ==========================================
// Campus Records - integration test helpers
// ==========================================

#![allow(dead_code)]

use campus_records::app::AppState;
use std::collections::HashMap;
use tempfile::TempDir;

/// A full portal over a throwaway database file.
pub struct TestPortal {
    pub state: AppState,
    _dir: TempDir,
}

pub fn setup_portal() -> TestPortal {
    campus_records::logging::init_test();
    let dir = TempDir::new().expect("temp dir");
    let db_path = dir.path().join("campus_records_test.db");
    let state = AppState::new(db_path.to_string_lossy().to_string()).expect("app state");
    TestPortal { state, _dir: dir }
}

/// Build a form-encoded table request map.
pub fn table_form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
