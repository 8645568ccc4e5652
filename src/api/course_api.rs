// ==========================================
// Campus Records - course API
// ==========================================
// Course CRUD, batch delete, facilitator transfer,
// data table, and bulk import. Validation: name and
// code >= 3 chars, code unique case-insensitively.
// ==========================================

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::api::error::{ApiError, ApiResult};
use crate::api::import::{ImportReport, SkippedRow, SpreadsheetImport};
use crate::api::{ActionOutcome, DeleteSelection};
use crate::config::ConfigManager;
use crate::domain::types::ActivityCategory;
use crate::importer::UniversalFileParser;
use crate::repository::{
    ActivityRepository, CourseOverview, CourseRepository, FacilitatorRepository, NewCourse,
};
use crate::table::{
    process, ColumnSpec, FieldValue, FilterKind, RowSerializer, SortKind, SortSpec, TableConfig,
    TableQuery, TableResponse,
};

/// Form payload for create/update.
#[derive(Debug, Clone, Deserialize)]
pub struct CourseRequest {
    pub name: String,
    pub code: String,
    pub facilitator_id: Option<i64>,
}

/// Row shape consumed by the courses table widget.
#[derive(Debug, Serialize)]
pub struct CourseRow {
    pub position: usize,
    pub id: i64,
    pub name: String,
    pub code: String,
    pub facilitator: String,
    pub created_at: String,
}

struct CourseRowSerializer;

impl RowSerializer<CourseOverview> for CourseRowSerializer {
    type Row = CourseRow;

    fn row(&self, record: &CourseOverview, position: usize) -> CourseRow {
        CourseRow {
            position,
            id: record.id,
            name: record.name.clone(),
            code: record.code.clone(),
            facilitator: record
                .facilitator_name
                .clone()
                .unwrap_or_else(|| "N/A".to_string()),
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

fn field_name(c: &CourseOverview) -> FieldValue {
    FieldValue::Text(c.name.clone())
}
fn field_code(c: &CourseOverview) -> FieldValue {
    FieldValue::Text(c.code.clone())
}
fn field_facilitator_id(c: &CourseOverview) -> FieldValue {
    FieldValue::from_opt_number(c.facilitator_id)
}
fn field_facilitator_name(c: &CourseOverview) -> FieldValue {
    FieldValue::from_opt_text(c.facilitator_name.as_deref())
}
fn field_created_at(c: &CourseOverview) -> FieldValue {
    FieldValue::Number(c.created_at.timestamp() as f64)
}

pub struct CourseApi {
    course_repo: Arc<CourseRepository>,
    facilitator_repo: Arc<FacilitatorRepository>,
    activity_repo: Arc<ActivityRepository>,
    config: Arc<ConfigManager>,
}

impl CourseApi {
    pub fn new(
        course_repo: Arc<CourseRepository>,
        facilitator_repo: Arc<FacilitatorRepository>,
        activity_repo: Arc<ActivityRepository>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            course_repo,
            facilitator_repo,
            activity_repo,
            config,
        }
    }

    fn validate(&self, request: &CourseRequest, exclude_id: Option<i64>) -> ApiResult<Option<String>> {
        let name = request.name.trim();
        let code = request.code.trim();

        if name.len() < 3 {
            return Ok(Some(
                "Course name must be at least 3 characters long.".to_string(),
            ));
        }
        if code.len() < 3 {
            return Ok(Some(
                "Course code must be at least 3 characters long.".to_string(),
            ));
        }
        if self.course_repo.code_exists_ci(code, exclude_id)? {
            return Ok(Some("A course with this code already exists.".to_string()));
        }
        if let Some(facilitator_id) = request.facilitator_id {
            if self.facilitator_repo.find_by_id(facilitator_id)?.is_none() {
                return Ok(Some("Selected facilitator not found.".to_string()));
            }
        }
        Ok(None)
    }

    pub fn create(&self, request: &CourseRequest) -> ApiResult<ActionOutcome> {
        if let Some(message) = self.validate(request, None)? {
            return Ok(ActionOutcome::fail(message));
        }

        let name = request.name.trim().to_string();
        self.course_repo.insert(&NewCourse {
            name: name.clone(),
            code: request.code.trim().to_string(),
            facilitator_id: request.facilitator_id,
        })?;
        self.activity_repo.record(
            ActivityCategory::Course,
            "New course added",
            &format!("Course '{}' was added.", name),
        )?;
        info!(course = %name, "course created");
        Ok(ActionOutcome::ok("Course saved successfully."))
    }

    pub fn update(&self, id: i64, request: &CourseRequest) -> ApiResult<ActionOutcome> {
        if self.course_repo.find_by_id(id)?.is_none() {
            return Ok(ActionOutcome::fail("Course not found."));
        }
        if let Some(message) = self.validate(request, Some(id))? {
            return Ok(ActionOutcome::fail(message));
        }

        let name = request.name.trim();
        self.course_repo
            .update(id, name, request.code.trim(), request.facilitator_id)?;
        self.activity_repo.record(
            ActivityCategory::Course,
            "Course updated",
            &format!("Course '{}' was updated.", name),
        )?;
        Ok(ActionOutcome::ok("Course updated successfully."))
    }

    pub fn delete(&self, id: i64) -> ApiResult<ActionOutcome> {
        let Some(course) = self.course_repo.find_by_id(id)? else {
            return Ok(ActionOutcome::fail("Course not found."));
        };

        self.course_repo.delete_by_id(id)?;
        self.activity_repo.record(
            ActivityCategory::Course,
            "Course deleted",
            &format!("Course '{}' was deleted.", course.name),
        )?;
        Ok(ActionOutcome::ok("Course deleted successfully."))
    }

    /// Delete a selection of courses, or every one of them.
    pub fn delete_multiple(&self, selection: &DeleteSelection) -> ApiResult<ActionOutcome> {
        let deleted = match selection {
            DeleteSelection::All => {
                if self.course_repo.count()? == 0 {
                    return Ok(ActionOutcome::fail("There are no courses to delete."));
                }
                self.course_repo.delete_all()?
            }
            DeleteSelection::Ids(ids) => {
                if ids.is_empty() {
                    return Ok(ActionOutcome::fail("No courses selected."));
                }
                self.course_repo.delete_many(ids)?
            }
        };

        self.activity_repo.record(
            ActivityCategory::Course,
            "Courses deleted",
            &format!("{} course(s) were deleted.", deleted),
        )?;
        Ok(ActionOutcome::ok(format!(
            "{} course(s) deleted successfully.",
            deleted
        )))
    }

    /// Move every course from one facilitator to another.
    ///
    /// Id 0 stands for the unassigned pool on either side.
    pub fn transfer_facilitator(&self, from_id: i64, to_id: i64) -> ApiResult<ActionOutcome> {
        if from_id == to_id {
            return Ok(ActionOutcome::fail(
                "Source and target facilitators are the same.",
            ));
        }
        for id in [from_id, to_id] {
            if id != 0 && self.facilitator_repo.find_by_id(id)?.is_none() {
                return Ok(ActionOutcome::fail("Facilitator not found."));
            }
        }

        let from = (from_id != 0).then_some(from_id);
        let to = (to_id != 0).then_some(to_id);
        let moved = self.course_repo.transfer_facilitator(from, to)?;

        self.activity_repo.record(
            ActivityCategory::Course,
            "Courses transferred",
            &format!("{} course(s) were moved to another facilitator.", moved),
        )?;
        Ok(ActionOutcome::ok(format!(
            "{} course(s) transferred successfully.",
            moved
        )))
    }

    /// Serve one data-table request over the joined overview rows.
    ///
    /// Column 3 filters by facilitator id (exact, "n/a" for unassigned)
    /// but sorts by facilitator name.
    pub fn table(&self, form: &HashMap<String, String>) -> ApiResult<TableResponse<CourseRow>> {
        let query = TableQuery::from_form(form);
        let records = self.course_repo.list_overview()?;

        let config = TableConfig::new(SortSpec::raw(field_created_at), |c: &CourseOverview| c.id)
            .search(field_name)
            .search(field_code)
            .search(field_facilitator_name)
            .column(1, ColumnSpec::new(field_name, FilterKind::Contains))
            .column(2, ColumnSpec::new(field_code, FilterKind::Contains))
            .column(
                3,
                ColumnSpec::new(field_facilitator_id, FilterKind::Exact)
                    .with_sort(field_facilitator_name, SortKind::CaseInsensitive),
            );

        let page = process(&query, records, &config);
        if page.export {
            self.activity_repo.record(
                ActivityCategory::Course,
                "Courses exported",
                "Courses data was exported.",
            )?;
        }
        Ok(page.into_response(&CourseRowSerializer))
    }
}

#[async_trait]
impl SpreadsheetImport for CourseApi {
    /// Sheet columns: name, code, facilitator name. Unknown facilitator
    /// names leave the course unassigned.
    async fn import_from_file(&self, file_path: &Path) -> ApiResult<ImportReport> {
        let rows = UniversalFileParser.parse(file_path)?;
        let max_rows = self.config.import_max_rows()? as usize;
        if rows.len() > max_rows {
            return Err(ApiError::ImportError(format!(
                "sheet has {} data rows, the limit is {}",
                rows.len(),
                max_rows
            )));
        }

        let mut valid = Vec::new();
        let mut skipped = Vec::new();
        let mut seen_codes: Vec<String> = Vec::new();

        for row in &rows {
            let name = row.cell(0).unwrap_or("").trim();
            let code = row.cell(1).unwrap_or("").trim();

            if name.len() < 3 {
                skipped.push(SkippedRow {
                    row: row.row_number,
                    reason: "name shorter than 3 characters".to_string(),
                });
                continue;
            }
            if code.len() < 3 {
                skipped.push(SkippedRow {
                    row: row.row_number,
                    reason: "code shorter than 3 characters".to_string(),
                });
                continue;
            }
            let code_lower = code.to_lowercase();
            if seen_codes.contains(&code_lower) || self.course_repo.code_exists_ci(code, None)? {
                skipped.push(SkippedRow {
                    row: row.row_number,
                    reason: format!("duplicate code '{}'", code),
                });
                continue;
            }

            let facilitator_id = match row.cell(2) {
                Some(facilitator_name) => self
                    .facilitator_repo
                    .find_by_name_ci(facilitator_name)?
                    .map(|f| f.id),
                None => None,
            };

            seen_codes.push(code_lower);
            valid.push(NewCourse {
                name: name.to_string(),
                code: code.to_string(),
                facilitator_id,
            });
        }

        let created = if valid.is_empty() {
            0
        } else {
            self.course_repo.bulk_insert(&valid).map_err(|e| {
                error!(error = %e, "course import failed");
                e
            })?
        };

        if created > 0 {
            self.activity_repo.record(
                ActivityCategory::Course,
                "Courses imported",
                &format!("{} course(s) were imported.", created),
            )?;
        }

        Ok(ImportReport::new("course", created, skipped))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{configure_sqlite_connection, init_schema};
    use rusqlite::Connection;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    fn setup_api() -> CourseApi {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        let conn = Arc::new(Mutex::new(conn));
        CourseApi::new(
            Arc::new(CourseRepository::from_connection(conn.clone())),
            Arc::new(FacilitatorRepository::from_connection(conn.clone())),
            Arc::new(ActivityRepository::from_connection(conn.clone())),
            Arc::new(ConfigManager::from_connection(conn)),
        )
    }

    fn add_facilitator(api: &CourseApi, name: &str) -> i64 {
        api.facilitator_repo
            .insert(&crate::repository::NewFacilitator {
                name: name.to_string(),
                comment: None,
            })
            .unwrap()
    }

    fn request(name: &str, code: &str, facilitator_id: Option<i64>) -> CourseRequest {
        CourseRequest {
            name: name.to_string(),
            code: code.to_string(),
            facilitator_id,
        }
    }

    #[test]
    fn test_create_rejects_unknown_facilitator() {
        let api = setup_api();
        let outcome = api.create(&request("Databases", "DB101", Some(42))).unwrap();
        assert!(!outcome.success);
        assert!(outcome.message.contains("facilitator"));
    }

    #[test]
    fn test_transfer_rejects_same_source_and_target() {
        let api = setup_api();
        let facil = add_facilitator(&api, "John Mollel");

        assert!(!api.transfer_facilitator(facil, facil).unwrap().success);
        assert!(!api.transfer_facilitator(facil, 999).unwrap().success);
    }

    #[test]
    fn test_transfer_from_unassigned_pool() {
        let api = setup_api();
        let facil = add_facilitator(&api, "John Mollel");
        api.create(&request("Databases", "DB101", None)).unwrap();
        api.create(&request("Networks", "NW102", None)).unwrap();

        let outcome = api.transfer_facilitator(0, facil).unwrap();
        assert!(outcome.success);
        assert!(outcome.message.starts_with("2 course(s)"));
    }

    #[test]
    fn test_table_filters_unassigned_with_na() {
        let api = setup_api();
        let facil = add_facilitator(&api, "John Mollel");
        api.create(&request("Databases", "DB101", Some(facil))).unwrap();
        api.create(&request("Networks", "NW102", None)).unwrap();

        let mut form = HashMap::new();
        form.insert("columns[3][search][value]".to_string(), "n/a".to_string());

        let response = api.table(&form).unwrap();
        assert_eq!(response.records_filtered, 1);
        assert_eq!(response.data[0].code, "NW102");
        assert_eq!(response.data[0].facilitator, "N/A");
    }

    #[test]
    fn test_table_sorts_by_facilitator_name_on_id_column() {
        let api = setup_api();
        let zed = add_facilitator(&api, "Zed Omary");
        let ann = add_facilitator(&api, "ann Kessy");
        api.create(&request("Databases", "DB101", Some(zed))).unwrap();
        api.create(&request("Networks", "NW102", Some(ann))).unwrap();

        let mut form = HashMap::new();
        form.insert("order[0][column]".to_string(), "3".to_string());
        form.insert("order[0][dir]".to_string(), "asc".to_string());

        let response = api.table(&form).unwrap();
        assert_eq!(response.data[0].facilitator, "ann Kessy");
    }

    #[tokio::test]
    async fn test_import_resolves_facilitator_by_name() {
        let api = setup_api();
        add_facilitator(&api, "John Mollel");

        let mut file = NamedTempFile::with_suffix(".csv").unwrap();
        writeln!(file, "Name,Code,Facilitator").unwrap();
        writeln!(file, "Databases,DB101,john mollel").unwrap();
        writeln!(file, "Networks,NW102,Nobody Known").unwrap();

        let report = api.import_from_file(file.path()).await.unwrap();
        assert_eq!(report.created, 2);
        assert!(report.success);

        let overview = api.course_repo.list_overview().unwrap();
        let db = overview.iter().find(|c| c.code == "DB101").unwrap();
        let nw = overview.iter().find(|c| c.code == "NW102").unwrap();
        assert_eq!(db.facilitator_name.as_deref(), Some("John Mollel"));
        assert!(nw.facilitator_id.is_none());
    }
}
