// ==========================================
// Campus Records - facilitator API
// ==========================================
// Facilitator CRUD, batch delete, data table, and
// bulk import. Validation: name >= 3 chars, unique
// case-insensitively.
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
    ActivityRepository, FacilitatorOverview, FacilitatorRepository, NewFacilitator,
};
use crate::table::{
    process, ColumnSpec, FieldValue, FilterKind, RowSerializer, SortKind, SortSpec, TableConfig,
    TableQuery, TableResponse,
};

/// Form payload for create/update.
#[derive(Debug, Clone, Deserialize)]
pub struct FacilitatorRequest {
    pub name: String,
    pub comment: Option<String>,
}

/// Row shape consumed by the facilitators table widget.
#[derive(Debug, Serialize)]
pub struct FacilitatorRow {
    pub position: usize,
    pub id: i64,
    pub name: String,
    pub courses_count: i64,
    pub comment: Option<String>,
    pub created_at: String,
}

struct FacilitatorRowSerializer;

impl RowSerializer<FacilitatorOverview> for FacilitatorRowSerializer {
    type Row = FacilitatorRow;

    fn row(&self, record: &FacilitatorOverview, position: usize) -> FacilitatorRow {
        FacilitatorRow {
            position,
            id: record.id,
            name: record.name.clone(),
            courses_count: record.courses_count,
            comment: record.comment.clone(),
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

fn field_id(f: &FacilitatorOverview) -> FieldValue {
    FieldValue::Number(f.id as f64)
}
fn field_name(f: &FacilitatorOverview) -> FieldValue {
    FieldValue::Text(f.name.clone())
}
fn field_courses_count(f: &FacilitatorOverview) -> FieldValue {
    FieldValue::Number(f.courses_count as f64)
}
fn field_comment(f: &FacilitatorOverview) -> FieldValue {
    FieldValue::from_opt_text(f.comment.as_deref())
}

pub struct FacilitatorApi {
    facilitator_repo: Arc<FacilitatorRepository>,
    activity_repo: Arc<ActivityRepository>,
    config: Arc<ConfigManager>,
}

impl FacilitatorApi {
    pub fn new(
        facilitator_repo: Arc<FacilitatorRepository>,
        activity_repo: Arc<ActivityRepository>,
        config: Arc<ConfigManager>,
    ) -> Self {
        Self {
            facilitator_repo,
            activity_repo,
            config,
        }
    }

    fn validate(
        &self,
        request: &FacilitatorRequest,
        exclude_id: Option<i64>,
    ) -> ApiResult<Option<String>> {
        let name = request.name.trim();
        if name.len() < 3 {
            return Ok(Some(
                "Facilitator name must be at least 3 characters long.".to_string(),
            ));
        }
        if self.facilitator_repo.name_exists_ci(name, exclude_id)? {
            return Ok(Some(
                "A facilitator with this name already exists.".to_string(),
            ));
        }
        Ok(None)
    }

    pub fn create(&self, request: &FacilitatorRequest) -> ApiResult<ActionOutcome> {
        if let Some(message) = self.validate(request, None)? {
            return Ok(ActionOutcome::fail(message));
        }

        let name = request.name.trim().to_string();
        self.facilitator_repo.insert(&NewFacilitator {
            name: name.clone(),
            comment: normalize_comment(request.comment.as_deref()),
        })?;
        self.activity_repo.record(
            ActivityCategory::Facilitator,
            "New facilitator added",
            &format!("Facilitator '{}' was added.", name),
        )?;
        info!(facilitator = %name, "facilitator created");
        Ok(ActionOutcome::ok("Facilitator saved successfully."))
    }

    pub fn update(&self, id: i64, request: &FacilitatorRequest) -> ApiResult<ActionOutcome> {
        if self.facilitator_repo.find_by_id(id)?.is_none() {
            return Ok(ActionOutcome::fail("Facilitator not found."));
        }
        if let Some(message) = self.validate(request, Some(id))? {
            return Ok(ActionOutcome::fail(message));
        }

        let name = request.name.trim();
        self.facilitator_repo.update(
            id,
            name,
            normalize_comment(request.comment.as_deref()).as_deref(),
        )?;
        self.activity_repo.record(
            ActivityCategory::Facilitator,
            "Facilitator updated",
            &format!("Facilitator '{}' was updated.", name),
        )?;
        Ok(ActionOutcome::ok("Facilitator updated successfully."))
    }

    pub fn delete(&self, id: i64) -> ApiResult<ActionOutcome> {
        let Some(facilitator) = self.facilitator_repo.find_by_id(id)? else {
            return Ok(ActionOutcome::fail("Facilitator not found."));
        };

        self.facilitator_repo.delete_by_id(id)?;
        self.activity_repo.record(
            ActivityCategory::Facilitator,
            "Facilitator deleted",
            &format!("Facilitator '{}' was deleted.", facilitator.name),
        )?;
        Ok(ActionOutcome::ok("Facilitator deleted successfully."))
    }

    /// Delete a selection of facilitators, or every one of them.
    pub fn delete_multiple(&self, selection: &DeleteSelection) -> ApiResult<ActionOutcome> {
        let deleted = match selection {
            DeleteSelection::All => {
                if self.facilitator_repo.count()? == 0 {
                    return Ok(ActionOutcome::fail("There are no facilitators to delete."));
                }
                self.facilitator_repo.delete_all()?
            }
            DeleteSelection::Ids(ids) => {
                if ids.is_empty() {
                    return Ok(ActionOutcome::fail("No facilitators selected."));
                }
                self.facilitator_repo.delete_many(ids)?
            }
        };

        self.activity_repo.record(
            ActivityCategory::Facilitator,
            "Facilitators deleted",
            &format!("{} facilitator(s) were deleted.", deleted),
        )?;
        Ok(ActionOutcome::ok(format!(
            "{} facilitator(s) deleted successfully.",
            deleted
        )))
    }

    /// Serve one data-table request over the joined overview rows.
    pub fn table(&self, form: &HashMap<String, String>) -> ApiResult<TableResponse<FacilitatorRow>> {
        let query = TableQuery::from_form(form);
        let records = self.facilitator_repo.list_overview()?;

        let config = TableConfig::new(
            SortSpec::case_insensitive(field_name),
            |f: &FacilitatorOverview| f.id,
        )
        .search(field_name)
        .search(field_comment)
        .column(
            0,
            ColumnSpec::new(field_id, FilterKind::Exact).with_sort(field_id, SortKind::Raw),
        )
        .column(1, ColumnSpec::new(field_name, FilterKind::Contains))
        .column(
            2,
            ColumnSpec::new(field_courses_count, FilterKind::Numeric)
                .with_sort(field_courses_count, SortKind::Raw),
        )
        .column(3, ColumnSpec::new(field_comment, FilterKind::Contains));

        let page = process(&query, records, &config);
        if page.export {
            self.activity_repo.record(
                ActivityCategory::Facilitator,
                "Facilitators exported",
                "Facilitators data was exported.",
            )?;
        }
        Ok(page.into_response(&FacilitatorRowSerializer))
    }
}

#[async_trait]
impl SpreadsheetImport for FacilitatorApi {
    /// Sheet columns: name, comment.
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
        let mut seen_names: Vec<String> = Vec::new();

        for row in &rows {
            let name = row.cell(0).unwrap_or("").trim();

            if name.len() < 3 {
                skipped.push(SkippedRow {
                    row: row.row_number,
                    reason: "name shorter than 3 characters".to_string(),
                });
                continue;
            }
            let name_lower = name.to_lowercase();
            if seen_names.contains(&name_lower)
                || self.facilitator_repo.name_exists_ci(name, None)?
            {
                skipped.push(SkippedRow {
                    row: row.row_number,
                    reason: format!("duplicate name '{}'", name),
                });
                continue;
            }

            seen_names.push(name_lower);
            valid.push(NewFacilitator {
                name: name.to_string(),
                comment: row.cell(1).map(|c| c.to_string()),
            });
        }

        let created = if valid.is_empty() {
            0
        } else {
            self.facilitator_repo.bulk_insert(&valid).map_err(|e| {
                error!(error = %e, "facilitator import failed");
                e
            })?
        };

        if created > 0 {
            self.activity_repo.record(
                ActivityCategory::Facilitator,
                "Facilitators imported",
                &format!("{} facilitator(s) were imported.", created),
            )?;
        }

        Ok(ImportReport::new("facilitator", created, skipped))
    }
}

fn normalize_comment(comment: Option<&str>) -> Option<String> {
    comment
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{configure_sqlite_connection, init_schema};
    use rusqlite::Connection;
    use std::sync::Mutex;

    fn setup_api() -> FacilitatorApi {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        let conn = Arc::new(Mutex::new(conn));
        FacilitatorApi::new(
            Arc::new(FacilitatorRepository::from_connection(conn.clone())),
            Arc::new(ActivityRepository::from_connection(conn.clone())),
            Arc::new(ConfigManager::from_connection(conn)),
        )
    }

    fn request(name: &str) -> FacilitatorRequest {
        FacilitatorRequest {
            name: name.to_string(),
            comment: Some("  ".to_string()),
        }
    }

    #[test]
    fn test_blank_comment_stored_as_null() {
        let api = setup_api();
        assert!(api.create(&request("John Mollel")).unwrap().success);

        let found = api.facilitator_repo.find_by_name_ci("john mollel").unwrap().unwrap();
        assert!(found.comment.is_none());
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let api = setup_api();
        api.create(&request("John Mollel")).unwrap();

        let outcome = api.create(&request("JOHN MOLLEL")).unwrap();
        assert!(!outcome.success);
    }

    #[test]
    fn test_delete_multiple_on_empty_table_fails() {
        let api = setup_api();

        let outcome = api.delete_multiple(&DeleteSelection::All).unwrap();
        assert!(!outcome.success);

        let outcome = api.delete_multiple(&DeleteSelection::Ids(vec![])).unwrap();
        assert!(!outcome.success);
    }

    #[test]
    fn test_table_numeric_filter_on_courses_count() {
        let api = setup_api();
        api.create(&request("John Mollel")).unwrap();
        api.create(&request("Jane Kessy")).unwrap();

        let mut form = HashMap::new();
        form.insert("columns[2][search][value]".to_string(), "0".to_string());
        let response = api.table(&form).unwrap();
        assert_eq!(response.records_filtered, 2);

        let mut form = HashMap::new();
        form.insert("columns[2][search][value]".to_string(), "1-".to_string());
        let response = api.table(&form).unwrap();
        assert_eq!(response.records_filtered, 0);
    }
}
