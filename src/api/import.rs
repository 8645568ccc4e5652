// ==========================================
// Campus Records - spreadsheet import contract
// ==========================================
// Shared shapes for the per-entity bulk imports.
// Each service parses the uploaded sheet, validates
// row by row, skips bad rows with a reason, and
// inserts the survivors in one transaction.
// ==========================================

use crate::api::error::ApiResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

/// A row the import refused, with the sheet position the
/// uploader can check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkippedRow {
    pub row: usize,
    pub reason: String,
}

/// Outcome of one bulk import.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    /// True only when rows were created and nothing was skipped.
    pub success: bool,
    pub message: String,
    pub batch_id: String,
    pub created: usize,
    pub skipped: Vec<SkippedRow>,
}

impl ImportReport {
    /// # Arguments
    /// - `noun`: singular entity name used in the summary message
    pub fn new(noun: &str, created: usize, skipped: Vec<SkippedRow>) -> Self {
        let mut message = format!("Imported {} {}(s) successfully.", created, noun);
        if !skipped.is_empty() {
            message.push_str(&format!(" {} row(s) skipped.", skipped.len()));
        }
        Self {
            success: created > 0 && skipped.is_empty(),
            message,
            batch_id: Uuid::new_v4().to_string(),
            created,
            skipped,
        }
    }
}

/// Bulk import from an uploaded .xlsx/.xls/.csv file.
#[async_trait]
pub trait SpreadsheetImport {
    /// Parse, validate row by row, and insert the valid rows
    /// transactionally. Invalid rows are reported, never fatal.
    async fn import_from_file(&self, file_path: &Path) -> ApiResult<ImportReport>;
}
