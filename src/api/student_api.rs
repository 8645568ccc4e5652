// ==========================================
// Campus Records - student API
// ==========================================
// Student CRUD, data table, and bulk import.
// Validation: fullname and regnumber >= 3 chars,
// regnumber unique case-insensitively.
// ==========================================

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::api::error::{ApiError, ApiResult};
use crate::api::import::{ImportReport, SkippedRow, SpreadsheetImport};
use crate::api::ActionOutcome;
use crate::config::ConfigManager;
use crate::domain::types::ActivityCategory;
use crate::importer::UniversalFileParser;
use crate::repository::{
    ActivityRepository, NewStudent, ProgramRepository, StudentOverview, StudentRepository,
};
use crate::table::{
    process, ColumnSpec, FieldValue, FilterKind, RowSerializer, SortSpec, TableConfig, TableQuery,
    TableResponse,
};

/// Form payload for create/update.
#[derive(Debug, Clone, Deserialize)]
pub struct StudentRequest {
    pub fullname: String,
    pub regnumber: String,
    pub program_id: Option<i64>,
}

/// Row shape consumed by the students table widget.
#[derive(Debug, Serialize)]
pub struct StudentRow {
    pub position: usize,
    pub id: i64,
    pub fullname: String,
    pub regnumber: String,
    pub program: String,
    pub created_at: String,
}

struct StudentRowSerializer;

impl RowSerializer<StudentOverview> for StudentRowSerializer {
    type Row = StudentRow;

    fn row(&self, record: &StudentOverview, position: usize) -> StudentRow {
        StudentRow {
            position,
            id: record.id,
            fullname: record.fullname.clone(),
            regnumber: record.regnumber.clone(),
            program: record
                .program_display
                .clone()
                .unwrap_or_else(|| "N/A".to_string()),
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

fn field_fullname(s: &StudentOverview) -> FieldValue {
    FieldValue::Text(s.fullname.clone())
}
fn field_regnumber(s: &StudentOverview) -> FieldValue {
    FieldValue::Text(s.regnumber.clone())
}
fn field_program_display(s: &StudentOverview) -> FieldValue {
    FieldValue::from_opt_text(s.program_display.as_deref())
}

pub struct StudentApi {
    student_repo: Arc<StudentRepository>,
    program_repo: Arc<ProgramRepository>,
    activity_repo: Arc<ActivityRepository>,
    config: Arc<ConfigManager>,
}

impl StudentApi {
    pub fn new(
        student_repo: Arc<StudentRepository>,
        program_repo: Arc<ProgramRepository>,
        activity_repo: Arc<ActivityRepository>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            student_repo,
            program_repo,
            activity_repo,
            config,
        }
    }

    fn validate(&self, request: &StudentRequest, exclude_id: Option<i64>) -> ApiResult<Option<String>> {
        let fullname = request.fullname.trim();
        let regnumber = request.regnumber.trim();

        if fullname.len() < 3 {
            return Ok(Some(
                "Fullname must be at least 3 characters long.".to_string(),
            ));
        }
        if regnumber.len() < 3 {
            return Ok(Some(
                "Registration number must be at least 3 characters long.".to_string(),
            ));
        }
        if self.student_repo.regnumber_exists_ci(regnumber, exclude_id)? {
            return Ok(Some(
                "A student with this registration number already exists.".to_string(),
            ));
        }
        if let Some(program_id) = request.program_id {
            if self.program_repo.find_by_id(program_id)?.is_none() {
                return Ok(Some("Selected program not found.".to_string()));
            }
        }
        Ok(None)
    }

    pub fn create(&self, request: &StudentRequest) -> ApiResult<ActionOutcome> {
        if let Some(message) = self.validate(request, None)? {
            return Ok(ActionOutcome::fail(message));
        }

        let fullname = request.fullname.trim().to_string();
        self.student_repo.insert(&NewStudent {
            fullname: fullname.clone(),
            regnumber: request.regnumber.trim().to_string(),
            program_id: request.program_id,
        })?;
        self.activity_repo.record(
            ActivityCategory::Student,
            "New student added",
            &format!("Student '{}' was added.", fullname),
        )?;
        info!(student = %fullname, "student created");
        Ok(ActionOutcome::ok("Student saved successfully."))
    }

    pub fn update(&self, id: i64, request: &StudentRequest) -> ApiResult<ActionOutcome> {
        if self.student_repo.find_by_id(id)?.is_none() {
            return Ok(ActionOutcome::fail("Student not found."));
        }
        if let Some(message) = self.validate(request, Some(id))? {
            return Ok(ActionOutcome::fail(message));
        }

        let fullname = request.fullname.trim();
        self.student_repo.update(
            id,
            fullname,
            request.regnumber.trim(),
            request.program_id,
        )?;
        self.activity_repo.record(
            ActivityCategory::Student,
            "Student updated",
            &format!("Student '{}' was updated.", fullname),
        )?;
        Ok(ActionOutcome::ok("Student updated successfully."))
    }

    pub fn delete(&self, id: i64) -> ApiResult<ActionOutcome> {
        let Some(student) = self.student_repo.find_by_id(id)? else {
            return Ok(ActionOutcome::fail("Student not found."));
        };

        self.student_repo.delete_by_id(id)?;
        self.activity_repo.record(
            ActivityCategory::Student,
            "Student deleted",
            &format!("Student '{}' was deleted.", student.fullname),
        )?;
        Ok(ActionOutcome::ok("Student deleted successfully."))
    }

    /// Serve one data-table request over the joined overview rows.
    ///
    /// Filtering column 3 with "n/a" selects students without a program.
    pub fn table(&self, form: &HashMap<String, String>) -> ApiResult<TableResponse<StudentRow>> {
        let query = TableQuery::from_form(form);
        let records = self.student_repo.list_overview()?;

        let config = TableConfig::new(
            SortSpec::case_insensitive(field_fullname),
            |s: &StudentOverview| s.id,
        )
        .search(field_fullname)
        .search(field_regnumber)
        .search(field_program_display)
        .column(1, ColumnSpec::new(field_fullname, FilterKind::Contains))
        .column(2, ColumnSpec::new(field_regnumber, FilterKind::Contains))
        .column(3, ColumnSpec::new(field_program_display, FilterKind::Contains));

        let page = process(&query, records, &config);
        if page.export {
            self.activity_repo.record(
                ActivityCategory::Student,
                "Students exported",
                "Students data was exported.",
            )?;
        }
        Ok(page.into_response(&StudentRowSerializer))
    }
}

#[async_trait]
impl SpreadsheetImport for StudentApi {
    /// Sheet columns: fullname, regnumber, program abbrev. Unknown
    /// abbreviations leave the student without a program.
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
        let mut seen_regnumbers: Vec<String> = Vec::new();

        for row in &rows {
            let fullname = row.cell(0).unwrap_or("").trim();
            let regnumber = row.cell(1).unwrap_or("").trim();

            if fullname.len() < 3 {
                skipped.push(SkippedRow {
                    row: row.row_number,
                    reason: "fullname shorter than 3 characters".to_string(),
                });
                continue;
            }
            if regnumber.len() < 3 {
                skipped.push(SkippedRow {
                    row: row.row_number,
                    reason: "registration number shorter than 3 characters".to_string(),
                });
                continue;
            }
            let regnumber_lower = regnumber.to_lowercase();
            if seen_regnumbers.contains(&regnumber_lower)
                || self.student_repo.regnumber_exists_ci(regnumber, None)?
            {
                skipped.push(SkippedRow {
                    row: row.row_number,
                    reason: format!("duplicate registration number '{}'", regnumber),
                });
                continue;
            }

            let program_id = match row.cell(2) {
                Some(abbrev) => self.program_repo.find_by_abbrev_ci(abbrev)?.map(|p| p.id),
                None => None,
            };

            seen_regnumbers.push(regnumber_lower);
            valid.push(NewStudent {
                fullname: fullname.to_string(),
                regnumber: regnumber.to_string(),
                program_id,
            });
        }

        let created = if valid.is_empty() {
            0
        } else {
            self.student_repo.bulk_insert(&valid).map_err(|e| {
                error!(error = %e, "student import failed");
                e
            })?
        };

        if created > 0 {
            self.activity_repo.record(
                ActivityCategory::Student,
                "Students imported",
                &format!("{} student(s) were imported.", created),
            )?;
        }

        Ok(ImportReport::new("student", created, skipped))
    }
}
