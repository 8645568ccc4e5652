// ==========================================
// Campus Records - import module
// ==========================================
// File parsing for spreadsheet uploads. Row-level
// validation and persistence live with each entity
// service in the api layer.
// ==========================================

pub mod error;
pub mod file_parser;

pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser, FileParser, SheetRow, UniversalFileParser};
