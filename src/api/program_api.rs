// ==========================================
// Campus Records - program API
// ==========================================
// Program CRUD, data table, and bulk import.
// Validation: name >= 3 chars, abbreviation required
// and unique case-insensitively.
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
use crate::domain::program::Program;
use crate::domain::types::ActivityCategory;
use crate::importer::UniversalFileParser;
use crate::repository::{ActivityRepository, NewProgram, ProgramRepository};
use crate::table::{
    process, ColumnSpec, FieldValue, FilterKind, RowSerializer, SortSpec, TableConfig,
    TableQuery, TableResponse,
};

/// Form payload for create/update.
#[derive(Debug, Clone, Deserialize)]
pub struct ProgramRequest {
    pub name: String,
    pub abbrev: String,
    pub comment: Option<String>,
}

/// Row shape consumed by the programs table widget.
#[derive(Debug, Serialize)]
pub struct ProgramRow {
    pub position: usize,
    pub id: i64,
    pub name: String,
    pub abbrev: String,
    pub comment: Option<String>,
    pub created_at: String,
}

struct ProgramRowSerializer;

impl RowSerializer<Program> for ProgramRowSerializer {
    type Row = ProgramRow;

    fn row(&self, record: &Program, position: usize) -> ProgramRow {
        ProgramRow {
            position,
            id: record.id,
            name: record.name.clone(),
            abbrev: record.abbrev.clone(),
            comment: record.comment.clone(),
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

fn field_name(p: &Program) -> FieldValue {
    FieldValue::Text(p.name.clone())
}
fn field_abbrev(p: &Program) -> FieldValue {
    FieldValue::Text(p.abbrev.clone())
}
fn field_comment(p: &Program) -> FieldValue {
    FieldValue::from_opt_text(p.comment.as_deref())
}

pub struct ProgramApi {
    program_repo: Arc<ProgramRepository>,
    activity_repo: Arc<ActivityRepository>,
    config: Arc<ConfigManager>,
}

impl ProgramApi {
    pub fn new(
        program_repo: Arc<ProgramRepository>,
        activity_repo: Arc<ActivityRepository>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            program_repo,
            activity_repo,
            config,
        }
    }

    fn validate(&self, request: &ProgramRequest, exclude_id: Option<i64>) -> ApiResult<Option<String>> {
        let name = request.name.trim();
        let abbrev = request.abbrev.trim();

        if name.len() < 3 {
            return Ok(Some(
                "Program name must be at least 3 characters long.".to_string(),
            ));
        }
        if abbrev.is_empty() {
            return Ok(Some("Abbreviation is required.".to_string()));
        }
        if self.program_repo.abbrev_exists_ci(abbrev, exclude_id)? {
            return Ok(Some(
                "A program with this abbreviation already exists.".to_string(),
            ));
        }
        Ok(None)
    }

    pub fn create(&self, request: &ProgramRequest) -> ApiResult<ActionOutcome> {
        if let Some(message) = self.validate(request, None)? {
            return Ok(ActionOutcome::fail(message));
        }

        let name = request.name.trim().to_string();
        self.program_repo.insert(&NewProgram {
            name: name.clone(),
            abbrev: request.abbrev.trim().to_string(),
            comment: normalize_comment(request.comment.as_deref()),
        })?;
        self.activity_repo.record(
            ActivityCategory::Program,
            "New program added",
            &format!("Program '{}' was added.", name),
        )?;
        info!(program = %name, "program created");
        Ok(ActionOutcome::ok("Program saved successfully."))
    }

    pub fn update(&self, id: i64, request: &ProgramRequest) -> ApiResult<ActionOutcome> {
        if self.program_repo.find_by_id(id)?.is_none() {
            return Ok(ActionOutcome::fail("Program not found."));
        }
        if let Some(message) = self.validate(request, Some(id))? {
            return Ok(ActionOutcome::fail(message));
        }

        let name = request.name.trim();
        self.program_repo.update(
            id,
            name,
            request.abbrev.trim(),
            normalize_comment(request.comment.as_deref()).as_deref(),
        )?;
        self.activity_repo.record(
            ActivityCategory::Program,
            "Program updated",
            &format!("Program '{}' was updated.", name),
        )?;
        Ok(ActionOutcome::ok("Program updated successfully."))
    }

    pub fn delete(&self, id: i64) -> ApiResult<ActionOutcome> {
        let Some(program) = self.program_repo.find_by_id(id)? else {
            return Ok(ActionOutcome::fail("Program not found."));
        };

        self.program_repo.delete_by_id(id)?;
        self.activity_repo.record(
            ActivityCategory::Program,
            "Program deleted",
            &format!("Program '{}' was deleted.", program.name),
        )?;
        Ok(ActionOutcome::ok("Program deleted successfully."))
    }

    /// Serve one data-table request. Export mode (length < 0) returns
    /// everything and leaves an audit entry.
    pub fn table(&self, form: &HashMap<String, String>) -> ApiResult<TableResponse<ProgramRow>> {
        let query = TableQuery::from_form(form);
        let records = self.program_repo.list_all()?;

        let config = TableConfig::new(SortSpec::case_insensitive(field_name), |p: &Program| p.id)
            .search(field_name)
            .search(field_abbrev)
            .search(field_comment)
            .column(1, ColumnSpec::new(field_name, FilterKind::Contains))
            .column(2, ColumnSpec::new(field_abbrev, FilterKind::Contains))
            .column(3, ColumnSpec::new(field_comment, FilterKind::Contains));

        let page = process(&query, records, &config);
        if page.export {
            self.activity_repo.record(
                ActivityCategory::Program,
                "Programs exported",
                "Programs data was exported.",
            )?;
        }
        Ok(page.into_response(&ProgramRowSerializer))
    }
}

#[async_trait]
impl SpreadsheetImport for ProgramApi {
    /// Sheet columns: name, abbrev, comment.
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
        let mut seen_abbrevs: Vec<String> = Vec::new();

        for row in &rows {
            let name = row.cell(0).unwrap_or("").trim();
            let abbrev = row.cell(1).unwrap_or("").trim();

            if name.len() < 3 {
                skipped.push(SkippedRow {
                    row: row.row_number,
                    reason: "name shorter than 3 characters".to_string(),
                });
                continue;
            }
            if abbrev.is_empty() {
                skipped.push(SkippedRow {
                    row: row.row_number,
                    reason: "abbreviation missing".to_string(),
                });
                continue;
            }
            let abbrev_lower = abbrev.to_lowercase();
            if seen_abbrevs.contains(&abbrev_lower)
                || self.program_repo.abbrev_exists_ci(abbrev, None)?
            {
                skipped.push(SkippedRow {
                    row: row.row_number,
                    reason: format!("duplicate abbreviation '{}'", abbrev),
                });
                continue;
            }

            seen_abbrevs.push(abbrev_lower);
            valid.push(NewProgram {
                name: name.to_string(),
                abbrev: abbrev.to_string(),
                comment: row.cell(2).map(|c| c.to_string()),
            });
        }

        let created = if valid.is_empty() {
            0
        } else {
            self.program_repo.bulk_insert(&valid).map_err(|e| {
                error!(error = %e, "program import failed");
                e
            })?
        };

        if created > 0 {
            self.activity_repo.record(
                ActivityCategory::Program,
                "Programs imported",
                &format!("{} program(s) were imported.", created),
            )?;
        }

        Ok(ImportReport::new("program", created, skipped))
    }
}

fn normalize_comment(comment: Option<&str>) -> Option<String> {
    comment
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}
