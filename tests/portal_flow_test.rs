// ==========================================
// Portal business-flow tests
// ==========================================
// Full scenarios across services: CRUD with
// validation, facilitator transfer, batch delete,
// cover-page building, and the dashboard feed.
// ==========================================

mod helpers;

use campus_records::api::{
    CourseRequest, CoverPageRequest, DeleteSelection, FacilitatorRequest, ProgramRequest,
    StationerySection, StudentRequest,
};
use helpers::setup_portal;

#[test]
fn test_course_lifecycle_with_transfer() {
    let portal = setup_portal();
    let api = &portal.state.course_api;

    portal
        .state
        .facilitator_api
        .create(&FacilitatorRequest {
            name: "John Mollel".to_string(),
            comment: None,
        })
        .unwrap();
    portal
        .state
        .facilitator_api
        .create(&FacilitatorRequest {
            name: "Jane Kessy".to_string(),
            comment: None,
        })
        .unwrap();

    assert!(api
        .create(&CourseRequest {
            name: "Databases".to_string(),
            code: "DB101".to_string(),
            facilitator_id: Some(1),
        })
        .unwrap()
        .success);
    assert!(api
        .create(&CourseRequest {
            name: "Networks".to_string(),
            code: "NW102".to_string(),
            facilitator_id: Some(1),
        })
        .unwrap()
        .success);

    // duplicate code, case-insensitive
    let outcome = api
        .create(&CourseRequest {
            name: "Databases II".to_string(),
            code: "db101".to_string(),
            facilitator_id: None,
        })
        .unwrap();
    assert!(!outcome.success);

    let outcome = api.transfer_facilitator(1, 2).unwrap();
    assert!(outcome.success);
    assert!(outcome.message.starts_with("2 course(s)"));

    let outcome = api.delete_multiple(&DeleteSelection::All).unwrap();
    assert!(outcome.success);
    assert!(!api.delete_multiple(&DeleteSelection::All).unwrap().success);
}

#[test]
fn test_student_validation_and_update() {
    let portal = setup_portal();
    let api = &portal.state.student_api;

    assert!(!api
        .create(&StudentRequest {
            fullname: "Al".to_string(),
            regnumber: "REG-001".to_string(),
            program_id: None,
        })
        .unwrap()
        .success);

    assert!(api
        .create(&StudentRequest {
            fullname: "  Asha Juma  ".to_string(),
            regnumber: "REG-001".to_string(),
            program_id: None,
        })
        .unwrap()
        .success);

    // updating with its own regnumber is fine
    let outcome = api
        .update(
            1,
            &StudentRequest {
                fullname: "Asha J. Juma".to_string(),
                regnumber: "REG-001".to_string(),
                program_id: None,
            },
        )
        .unwrap();
    assert!(outcome.success, "{}", outcome.message);

    assert!(api.delete(1).unwrap().success);
    assert!(!api.delete(1).unwrap().success);
}

#[test]
fn test_cover_page_flow() {
    let portal = setup_portal();

    portal
        .state
        .program_api
        .create(&ProgramRequest {
            name: "Computer Science".to_string(),
            abbrev: "CS".to_string(),
            comment: None,
        })
        .unwrap();
    portal
        .state
        .facilitator_api
        .create(&FacilitatorRequest {
            name: "John Mollel".to_string(),
            comment: None,
        })
        .unwrap();
    portal
        .state
        .course_api
        .create(&CourseRequest {
            name: "Databases".to_string(),
            code: "DB101".to_string(),
            facilitator_id: Some(1),
        })
        .unwrap();
    portal
        .state
        .student_api
        .create(&StudentRequest {
            fullname: "Asha Juma".to_string(),
            regnumber: "REG-001".to_string(),
            program_id: Some(1),
        })
        .unwrap();

    let stationery = &portal.state.stationery_api;
    assert!(stationery.save_question("Discuss normal forms.").unwrap().success);

    let outcome = stationery
        .save_cover_page(&CoverPageRequest {
            task: "Group Assignment 1".to_string(),
            groupno: "4".to_string(),
            submitdate: "2026-09-01".to_string(),
            program: "cs".to_string(),
            course: "DB101".to_string(),
            question: "Discuss normal forms.".to_string(),
            streams: "A,B".to_string(),
            students: "1".to_string(),
            show_table: true,
        })
        .unwrap();
    assert!(outcome.success, "{}", outcome.message);

    let pages = stationery.section(StationerySection::Pages, "", "1").unwrap();
    assert_eq!(pages.pagination.total_count, 1);
    let page_id = pages.items[0]["id"].as_i64().unwrap();

    let info = stationery.load_saved_page_info(page_id).unwrap().unwrap();
    assert_eq!(info.program, "Computer Science");
    assert_eq!(info.facilitator, "John Mollel");
    assert_eq!(info.groupno, 4);
    assert_eq!(info.students[0].fullname, "Asha Juma");
    assert!(info.show_table);

    assert!(stationery.delete_page(page_id).unwrap().success);
    assert!(stationery.load_saved_page_info(page_id).unwrap().is_none());
}

#[test]
fn test_dashboard_reflects_mutations() {
    let portal = setup_portal();

    portal
        .state
        .program_api
        .create(&ProgramRequest {
            name: "Computer Science".to_string(),
            abbrev: "CS".to_string(),
            comment: None,
        })
        .unwrap();
    portal
        .state
        .student_api
        .create(&StudentRequest {
            fullname: "Asha Juma".to_string(),
            regnumber: "REG-001".to_string(),
            program_id: Some(1),
        })
        .unwrap();

    let summary = portal.state.dashboard_api.summary().unwrap();
    assert_eq!(summary.programs, 1);
    assert_eq!(summary.students, 1);
    assert_eq!(summary.recent_activities.len(), 2);
    // newest first: the student creation
    assert_eq!(summary.recent_activities[0].categ, "student");
    assert_eq!(summary.recent_activities[0].color, "blue");
    assert_eq!(summary.recent_activities[1].categ, "program");
    assert_eq!(summary.recent_activities[1].color, "black");
}
