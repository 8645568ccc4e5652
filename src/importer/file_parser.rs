// ==========================================
// Campus Records - upload file parsers
// ==========================================
// Turns an uploaded spreadsheet into positional rows.
// Supports: Excel (.xlsx/.xls) / CSV (.csv)
//
// The first worksheet row is treated as a header and
// skipped; fully blank rows are skipped. Row numbers
// are 1-based positions in the sheet so skip reports
// match what the uploader sees in their file.
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook, Reader, Xlsx};
use csv::ReaderBuilder;
use std::fs::File;
use std::path::Path;

/// One data row of an uploaded sheet, cells in column order.
#[derive(Debug, Clone)]
pub struct SheetRow {
    /// 1-based row position in the source file (header included).
    pub row_number: usize,
    pub cells: Vec<String>,
}

impl SheetRow {
    /// Trimmed cell at `index`, None when the column is absent or blank.
    pub fn cell(&self, index: usize) -> Option<&str> {
        self.cells
            .get(index)
            .map(|c| c.as_str())
            .filter(|c| !c.is_empty())
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|c| c.is_empty())
    }
}

// ==========================================
// FileParser trait
// ==========================================
pub trait FileParser: Send + Sync {
    /// Parse the file into data rows, header and blank rows removed.
    fn parse_rows(&self, file_path: &Path) -> ImportResult<Vec<SheetRow>>;
}

// ==========================================
// CSV parser
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_rows(&self, file_path: &Path) -> ImportResult<Vec<SheetRow>> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }

        let file = File::open(file_path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(file);

        let mut rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            let row = SheetRow {
                // +2: 1-based, and the header row is row 1
                row_number: idx + 2,
                cells: record.iter().map(|c| c.trim().to_string()).collect(),
            };
            if row.is_blank() {
                continue;
            }
            rows.push(row);
        }

        Ok(rows)
    }
}

// ==========================================
// Excel parser
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_rows(&self, file_path: &Path) -> ImportResult<Vec<SheetRow>> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }

        let mut workbook: Xlsx<_> = open_workbook(file_path)
            .map_err(|e: calamine::XlsxError| ImportError::ExcelParseError(e.to_string()))?;

        let sheet_names = workbook.sheet_names();
        let sheet_name = sheet_names
            .first()
            .cloned()
            .ok_or_else(|| ImportError::EmptyWorksheet(file_path.display().to_string()))?;

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;

        let mut rows = Vec::new();
        // skip(1): the header row
        for (idx, data_row) in range.rows().enumerate().skip(1) {
            let row = SheetRow {
                row_number: idx + 1,
                cells: data_row
                    .iter()
                    .map(|cell| cell.to_string().trim().to_string())
                    .collect(),
            };
            if row.is_blank() {
                continue;
            }
            rows.push(row);
        }

        Ok(rows)
    }
}

// ==========================================
// Universal parser (dispatch by extension)
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    pub fn parse<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<Vec<SheetRow>> {
        let path = file_path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => CsvParser.parse_rows(path),
            "xlsx" | "xls" => ExcelParser.parse_rows(path),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_csv_parser_skips_header_row() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "Name,Abbrev,Comment").unwrap();
        writeln!(temp_file, "Computer Science,CS,").unwrap();
        writeln!(temp_file, "Electrical Engineering,EE,evening").unwrap();

        let rows = CsvParser.parse_rows(temp_file.path()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row_number, 2);
        assert_eq!(rows[0].cell(0), Some("Computer Science"));
        assert_eq!(rows[0].cell(2), None);
        assert_eq!(rows[1].cell(2), Some("evening"));
    }

    #[test]
    fn test_csv_parser_skips_blank_rows() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "Name,Abbrev").unwrap();
        writeln!(temp_file, "Computer Science,CS").unwrap();
        writeln!(temp_file, ",").unwrap();
        writeln!(temp_file, "Zoology,ZO").unwrap();

        let rows = CsvParser.parse_rows(temp_file.path()).unwrap();

        assert_eq!(rows.len(), 2);
        // row numbers still reflect sheet positions
        assert_eq!(rows[1].row_number, 4);
    }

    #[test]
    fn test_csv_parser_file_not_found() {
        let result = CsvParser.parse_rows(Path::new("does_not_exist.csv"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_universal_parser_rejects_unknown_extension() {
        let result = UniversalFileParser.parse("upload.pdf");
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
    }
}
