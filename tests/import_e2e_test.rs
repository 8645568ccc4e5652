// ==========================================
// Bulk import end-to-end tests
// ==========================================
// CSV uploads flowing through parsing, row
// validation, reference resolution, and the
// transactional insert, against a real database.
// ==========================================

mod helpers;

use campus_records::api::SpreadsheetImport;
use helpers::setup_portal;
use std::io::Write;
use tempfile::NamedTempFile;

fn csv_file(lines: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(".csv").unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
    file
}

#[tokio::test]
async fn test_chained_imports_resolve_references() {
    let portal = setup_portal();

    let programs = csv_file(&[
        "Name,Abbrev,Comment",
        "Computer Science,CS,day programme",
        "Electrical Engineering,EE,",
    ]);
    let report = portal
        .state
        .program_api
        .import_from_file(programs.path())
        .await
        .unwrap();
    assert!(report.success);
    assert_eq!(report.created, 2);
    assert!(!report.batch_id.is_empty());

    let students = csv_file(&[
        "Fullname,Regnumber,Program",
        "Asha Juma,REG-001,cs",
        "Neema Paul,REG-002,ee",
        "Juma Said,REG-003,UNKNOWN",
    ]);
    let report = portal
        .state
        .student_api
        .import_from_file(students.path())
        .await
        .unwrap();
    assert_eq!(report.created, 3);

    let summary = portal.state.dashboard_api.summary().unwrap();
    assert_eq!(summary.students, 3);
    assert_eq!(summary.programs, 2);
}

#[tokio::test]
async fn test_skipped_rows_carry_sheet_positions() {
    let portal = setup_portal();

    let students = csv_file(&[
        "Fullname,Regnumber,Program",
        "Asha Juma,REG-001,",
        "Al,REG-002,",
        "Neema Paul,RE,",
        "Other Person,reg-001,",
    ]);
    let report = portal
        .state
        .student_api
        .import_from_file(students.path())
        .await
        .unwrap();

    assert_eq!(report.created, 1);
    assert_eq!(report.skipped.len(), 3);
    assert!(!report.success);
    let rows: Vec<_> = report.skipped.iter().map(|s| s.row).collect();
    assert_eq!(rows, vec![3, 4, 5]);
    assert!(report.skipped[2].reason.contains("duplicate"));
    assert!(report.message.contains("3 row(s) skipped"));
}

#[tokio::test]
async fn test_reimport_skips_existing_records() {
    let portal = setup_portal();

    let facilitators = csv_file(&["Name,Comment", "John Mollel,", "Jane Kessy,evening"]);
    let first = portal
        .state
        .facilitator_api
        .import_from_file(facilitators.path())
        .await
        .unwrap();
    assert_eq!(first.created, 2);

    let second = portal
        .state
        .facilitator_api
        .import_from_file(facilitators.path())
        .await
        .unwrap();
    assert_eq!(second.created, 0);
    assert_eq!(second.skipped.len(), 2);
    assert!(!second.success);
}

#[tokio::test]
async fn test_unsupported_extension_is_an_error() {
    let portal = setup_portal();
    let file = NamedTempFile::with_suffix(".pdf").unwrap();

    let result = portal.state.program_api.import_from_file(file.path()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_row_cap_is_enforced() {
    let portal = setup_portal();
    portal
        .state
        .config
        .set_value("import.max_rows", "2")
        .unwrap();

    let programs = csv_file(&[
        "Name,Abbrev,Comment",
        "Computer Science,CS,",
        "Electrical Engineering,EE,",
        "Zoology,ZO,",
    ]);
    let result = portal
        .state
        .program_api
        .import_from_file(programs.path())
        .await;
    assert!(result.is_err());
}
