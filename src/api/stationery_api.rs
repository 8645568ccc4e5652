// ==========================================
// Campus Records - stationery API
// ==========================================
// Cover-page builder: saved questions, saved pages,
// and the paginated selection panels. Form fields
// arrive as plain strings; "" and "N/A" both mean
// "not supplied".
// ==========================================

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::api::error::ApiResult;
use crate::api::pagination::{paginate, PaginationMeta};
use crate::api::ActionOutcome;
use crate::config::ConfigManager;
use crate::repository::{
    CourseRepository, FacilitatorRepository, NewCoverPage, ProgramRepository,
    StationeryRepository, StudentRepository,
};

/// Form payload for saving a cover page.
#[derive(Debug, Clone, Deserialize)]
pub struct CoverPageRequest {
    pub task: String,
    pub groupno: String,
    pub submitdate: String,
    /// Program abbreviation.
    pub program: String,
    /// Course code.
    pub course: String,
    pub question: String,
    /// Comma-separated stream labels.
    pub streams: String,
    /// Comma-separated student ids.
    pub students: String,
    pub show_table: bool,
}

/// Roster line resolved from a stored student id list.
#[derive(Debug, Clone, Serialize)]
pub struct StudentRosterRow {
    pub id: i64,
    pub fullname: String,
    pub regnumber: String,
}

/// A saved page with its display fields resolved.
#[derive(Debug, Clone, Serialize)]
pub struct CoverPageInfo {
    pub id: i64,
    pub task: String,
    pub groupno: i64,
    pub submitdate: String,
    pub program: String,
    pub course: String,
    pub facilitator: String,
    pub question: String,
    pub streams: Vec<String>,
    pub students: Vec<StudentRosterRow>,
    pub show_table: bool,
}

/// The selection panels of the builder page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationerySection {
    Students,
    Programs,
    Courses,
    Questions,
    Pages,
}

/// One paginated panel: serialized items plus pagination facts.
#[derive(Debug, Serialize)]
pub struct SectionPage {
    pub items: Vec<serde_json::Value>,
    pub pagination: PaginationMeta,
}

pub struct StationeryApi {
    stationery_repo: Arc<StationeryRepository>,
    student_repo: Arc<StudentRepository>,
    program_repo: Arc<ProgramRepository>,
    course_repo: Arc<CourseRepository>,
    facilitator_repo: Arc<FacilitatorRepository>,
    config: Arc<ConfigManager>,
}

impl StationeryApi {
    pub fn new(
        stationery_repo: Arc<StationeryRepository>,
        student_repo: Arc<StudentRepository>,
        program_repo: Arc<ProgramRepository>,
        course_repo: Arc<CourseRepository>,
        facilitator_repo: Arc<FacilitatorRepository>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            stationery_repo,
            student_repo,
            program_repo,
            course_repo,
            facilitator_repo,
            config,
        }
    }

    // ==========================================
    // Question bank
    // ==========================================

    /// An already-saved duplicate counts as success; the copy is
    /// simply not inserted again.
    pub fn save_question(&self, content: &str) -> ApiResult<ActionOutcome> {
        let content = content.trim();
        if content.len() < 5 {
            return Ok(ActionOutcome::fail(
                "Question must be at least 5 characters long.",
            ));
        }
        if self.stationery_repo.question_exists_ci(content)? {
            return Ok(ActionOutcome::ok("Question already saved."));
        }

        self.stationery_repo.insert_question(content)?;
        Ok(ActionOutcome::ok("Question saved successfully."))
    }

    pub fn delete_question(&self, id: i64) -> ApiResult<ActionOutcome> {
        if self.stationery_repo.delete_question(id)? == 0 {
            return Ok(ActionOutcome::fail("Question not found."));
        }
        Ok(ActionOutcome::ok("Question deleted successfully."))
    }

    // ==========================================
    // Saved pages
    // ==========================================

    pub fn save_cover_page(&self, request: &CoverPageRequest) -> ApiResult<ActionOutcome> {
        let task = request.task.trim();
        if task.len() < 3 {
            return Ok(ActionOutcome::fail(
                "Task name must be at least 3 characters long.",
            ));
        }

        let program_id = match normalize(&request.program) {
            Some(abbrev) => self.program_repo.find_by_abbrev_ci(&abbrev)?.map(|p| p.id),
            None => None,
        };
        let course_id = match normalize(&request.course) {
            Some(code) => self.course_repo.find_by_code_ci(&code)?.map(|c| c.id),
            None => None,
        };

        let streams = request
            .streams
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        let students = request
            .students
            .split(',')
            .filter_map(|s| s.trim().parse::<i64>().ok())
            .collect();

        let id = self.stationery_repo.insert_page(&NewCoverPage {
            task: task.to_string(),
            groupno: request.groupno.trim().parse().unwrap_or(0),
            submitdate: normalize(&request.submitdate),
            streams,
            students,
            show_table: request.show_table,
            program_id,
            course_id,
            question: normalize(&request.question),
        })?;
        info!(page_id = id, "cover page saved");
        Ok(ActionOutcome::ok("Cover page saved successfully."))
    }

    pub fn delete_page(&self, id: i64) -> ApiResult<ActionOutcome> {
        if self.stationery_repo.delete_page(id)? == 0 {
            return Ok(ActionOutcome::fail("Cover page not found."));
        }
        Ok(ActionOutcome::ok("Cover page deleted successfully."))
    }

    /// Resolve a saved page for rendering. Missing references come
    /// back as "N/A" rather than errors.
    pub fn load_saved_page_info(&self, id: i64) -> ApiResult<Option<CoverPageInfo>> {
        let Some(page) = self.stationery_repo.find_page_by_id(id)? else {
            return Ok(None);
        };

        let program = match page.program_id {
            Some(program_id) => self.program_repo.find_by_id(program_id)?.map(|p| p.name),
            None => None,
        };

        let mut course_name = None;
        let mut facilitator_name = None;
        if let Some(course_id) = page.course_id {
            if let Some(course) = self.course_repo.find_by_id(course_id)? {
                if let Some(facilitator_id) = course.facilitator_id {
                    facilitator_name = self
                        .facilitator_repo
                        .find_by_id(facilitator_id)?
                        .map(|f| f.name);
                }
                course_name = Some(course.name);
            }
        }

        let students = self
            .student_repo
            .find_by_ids(&page.students)?
            .into_iter()
            .map(|s| StudentRosterRow {
                id: s.id,
                fullname: s.fullname,
                regnumber: s.regnumber,
            })
            .collect();

        Ok(Some(CoverPageInfo {
            id: page.id,
            task: page.task,
            groupno: page.groupno,
            submitdate: page.submitdate.unwrap_or_else(not_available),
            program: program.unwrap_or_else(not_available),
            course: course_name.unwrap_or_else(not_available),
            facilitator: facilitator_name.unwrap_or_else(not_available),
            question: page.question.unwrap_or_else(not_available),
            streams: page.streams,
            students,
            show_table: page.show_table,
        }))
    }

    // ==========================================
    // Selection panels
    // ==========================================

    /// One paginated panel, searched then windowed. The page size is
    /// the configured default table page length.
    pub fn section(
        &self,
        section: StationerySection,
        search: &str,
        page: &str,
    ) -> ApiResult<SectionPage> {
        let per_page = self.config.default_page_length()?.max(1) as usize;
        let needle = search.trim().to_lowercase();
        let matches = |haystacks: &[&str]| {
            needle.is_empty() || haystacks.iter().any(|h| h.to_lowercase().contains(&needle))
        };

        let items: Vec<serde_json::Value> = match section {
            StationerySection::Students => self
                .student_repo
                .list_all()?
                .into_iter()
                .filter(|s| matches(&[&s.fullname, &s.regnumber]))
                .map(|s| json!({"id": s.id, "fullname": s.fullname, "regnumber": s.regnumber}))
                .collect(),
            StationerySection::Programs => self
                .program_repo
                .list_all()?
                .into_iter()
                .filter(|p| matches(&[&p.name, &p.abbrev]))
                .map(|p| json!({"id": p.id, "name": p.name, "abbrev": p.abbrev}))
                .collect(),
            StationerySection::Courses => self
                .course_repo
                .list_all()?
                .into_iter()
                .filter(|c| matches(&[&c.name, &c.code]))
                .map(|c| json!({"id": c.id, "name": c.name, "code": c.code}))
                .collect(),
            StationerySection::Questions => self
                .stationery_repo
                .list_questions()?
                .into_iter()
                .filter(|q| matches(&[&q.content]))
                .map(|q| json!({"id": q.id, "content": q.content}))
                .collect(),
            StationerySection::Pages => self
                .stationery_repo
                .list_pages()?
                .into_iter()
                .filter(|p| matches(&[&p.task]))
                .map(|p| {
                    json!({
                        "id": p.id,
                        "task": p.task,
                        "groupno": p.groupno,
                        "created_at": p.created_at.to_rfc3339(),
                    })
                })
                .collect(),
        };

        let (items, pagination) = paginate(items, page, per_page);
        Ok(SectionPage { items, pagination })
    }
}

fn normalize(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("n/a") {
        None
    } else {
        Some(value.to_string())
    }
}

fn not_available() -> String {
    "N/A".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{configure_sqlite_connection, init_schema};
    use crate::repository::{NewCourse, NewFacilitator, NewProgram, NewStudent};
    use rusqlite::Connection;
    use std::sync::Mutex;

    fn setup_api() -> StationeryApi {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        let conn = Arc::new(Mutex::new(conn));
        StationeryApi::new(
            Arc::new(StationeryRepository::from_connection(conn.clone())),
            Arc::new(StudentRepository::from_connection(conn.clone())),
            Arc::new(ProgramRepository::from_connection(conn.clone())),
            Arc::new(CourseRepository::from_connection(conn.clone())),
            Arc::new(FacilitatorRepository::from_connection(conn.clone())),
            Arc::new(ConfigManager::from_connection(conn)),
        )
    }

    fn blank_page_request(task: &str) -> CoverPageRequest {
        CoverPageRequest {
            task: task.to_string(),
            groupno: String::new(),
            submitdate: "N/A".to_string(),
            program: String::new(),
            course: String::new(),
            question: String::new(),
            streams: String::new(),
            students: String::new(),
            show_table: false,
        }
    }

    #[test]
    fn test_duplicate_question_reported_as_success() {
        let api = setup_api();
        assert!(api.save_question("Discuss normal forms.").unwrap().success);

        let outcome = api.save_question("DISCUSS NORMAL FORMS.").unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.message, "Question already saved.");
        assert_eq!(api.stationery_repo.list_questions().unwrap().len(), 1);

        assert!(!api.save_question("Why?").unwrap().success);
    }

    #[test]
    fn test_save_page_parses_lists_and_defaults() {
        let api = setup_api();
        let mut request = blank_page_request("Group Assignment 1");
        request.groupno = "seven".to_string();
        request.streams = " A , B ,,C ".to_string();
        request.students = "1, x, 3".to_string();

        assert!(api.save_cover_page(&request).unwrap().success);

        let pages = api.stationery_repo.list_pages().unwrap();
        assert_eq!(pages[0].groupno, 0);
        assert_eq!(pages[0].streams, vec!["A", "B", "C"]);
        assert_eq!(pages[0].students, vec![1, 3]);
        assert!(pages[0].submitdate.is_none());
    }

    #[test]
    fn test_load_saved_page_resolves_references() {
        let api = setup_api();
        let facil = api
            .facilitator_repo
            .insert(&NewFacilitator {
                name: "John Mollel".to_string(),
                comment: None,
            })
            .unwrap();
        api.program_repo
            .insert(&NewProgram {
                name: "Computer Science".to_string(),
                abbrev: "CS".to_string(),
                comment: None,
            })
            .unwrap();
        api.course_repo
            .insert(&NewCourse {
                name: "Databases".to_string(),
                code: "DB101".to_string(),
                facilitator_id: Some(facil),
            })
            .unwrap();
        let student = api
            .student_repo
            .insert(&NewStudent {
                fullname: "Asha Juma".to_string(),
                regnumber: "REG-001".to_string(),
                program_id: None,
            })
            .unwrap();

        let mut request = blank_page_request("Group Assignment 1");
        request.program = "cs".to_string();
        request.course = "db101".to_string();
        request.students = student.to_string();
        assert!(api.save_cover_page(&request).unwrap().success);

        let page_id = api.stationery_repo.list_pages().unwrap()[0].id;
        let info = api.load_saved_page_info(page_id).unwrap().unwrap();
        assert_eq!(info.program, "Computer Science");
        assert_eq!(info.course, "Databases");
        assert_eq!(info.facilitator, "John Mollel");
        assert_eq!(info.question, "N/A");
        assert_eq!(info.students.len(), 1);
        assert_eq!(info.students[0].regnumber, "REG-001");

        assert!(api.load_saved_page_info(page_id + 1).unwrap().is_none());
    }

    #[test]
    fn test_section_search_and_pagination() {
        let api = setup_api();
        api.config
            .set_value(crate::config::config_manager::KEY_DEFAULT_PAGE_LENGTH, "5")
            .unwrap();
        for i in 0..12 {
            api.student_repo
                .insert(&NewStudent {
                    fullname: format!("Student {:02}", i),
                    regnumber: format!("REG-{:03}", i),
                    program_id: None,
                })
                .unwrap();
        }

        let page = api.section(StationerySection::Students, "", "2").unwrap();
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.pagination.total_pages, 3);
        assert_eq!(page.pagination.current_page, 2);

        let page = api
            .section(StationerySection::Students, "reg-011", "1")
            .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.pagination.total_count, 1);
    }
}
