// ==========================================
// Campus Records - table request parameters
// ==========================================
// Parses the form-encoded parameter map sent by the
// client table widget:
//   draw, start, length, search[value],
//   columns[<i>][search][value],
//   order[0][column], order[0][dir]
// Malformed integers never raise; they fall back to
// the documented defaults.
// ==========================================

use std::collections::{BTreeMap, HashMap};

/// Page length used when the request carries none.
pub const DEFAULT_PAGE_LENGTH: i64 = 10;

/// Sort direction. Anything other than the literal "desc" is ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    fn parse(value: Option<&String>) -> Self {
        match value.map(|v| v.as_str()) {
            Some("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        }
    }
}

/// One parsed table request.
///
/// `length < 0` means export mode: return every matching row unpaged.
#[derive(Debug, Clone)]
pub struct TableQuery {
    /// Opaque round-trip token echoed back unchanged.
    pub draw: i64,
    /// Pagination offset.
    pub start: usize,
    /// Page size; negative requests the full filtered set.
    pub length: i64,
    /// Global free-text search, already trimmed.
    pub global_search: String,
    /// Per-column filter values keyed by column index, already trimmed.
    /// Empty values are not stored.
    pub column_search: BTreeMap<usize, String>,
    /// Sort column index.
    pub order_column: usize,
    /// Sort direction.
    pub order_dir: SortDirection,
}

impl TableQuery {
    /// Parse a form-encoded parameter map.
    ///
    /// Defaults on missing/malformed values: draw=1, start=0,
    /// length=DEFAULT_PAGE_LENGTH, order column=1, direction=asc.
    pub fn from_form(form: &HashMap<String, String>) -> Self {
        let draw = parse_int(form.get("draw"), 1);
        let start = parse_int(form.get("start"), 0).max(0) as usize;
        let length = parse_int(form.get("length"), DEFAULT_PAGE_LENGTH);
        let order_column = parse_int(form.get("order[0][column]"), 1).max(0) as usize;
        let order_dir = SortDirection::parse(form.get("order[0][dir]"));

        let global_search = form
            .get("search[value]")
            .map(|v| v.trim().to_string())
            .unwrap_or_default();

        let mut column_search = BTreeMap::new();
        for (key, value) in form {
            if let Some(index) = column_search_index(key) {
                let value = value.trim();
                if !value.is_empty() {
                    column_search.insert(index, value.to_string());
                }
            }
        }

        Self {
            draw,
            start,
            length,
            global_search,
            column_search,
            order_column,
            order_dir,
        }
    }

    /// Whether this request asks for the full filtered set (length < 0).
    pub fn is_export(&self) -> bool {
        self.length < 0
    }
}

impl Default for TableQuery {
    fn default() -> Self {
        Self {
            draw: 1,
            start: 0,
            length: DEFAULT_PAGE_LENGTH,
            global_search: String::new(),
            column_search: BTreeMap::new(),
            order_column: 1,
            order_dir: SortDirection::Asc,
        }
    }
}

fn parse_int(value: Option<&String>, default: i64) -> i64 {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(default)
}

/// Extract N from "columns[N][search][value]".
fn column_search_index(key: &str) -> Option<usize> {
    let rest = key.strip_prefix("columns[")?;
    let end = rest.find(']')?;
    let index = rest[..end].parse::<usize>().ok()?;
    if &rest[end..] == "][search][value]" {
        Some(index)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_on_empty_form() {
        let q = TableQuery::from_form(&HashMap::new());
        assert_eq!(q.draw, 1);
        assert_eq!(q.start, 0);
        assert_eq!(q.length, DEFAULT_PAGE_LENGTH);
        assert_eq!(q.order_column, 1);
        assert_eq!(q.order_dir, SortDirection::Asc);
        assert!(q.global_search.is_empty());
        assert!(q.column_search.is_empty());
    }

    #[test]
    fn test_malformed_integers_default_silently() {
        let q = TableQuery::from_form(&form(&[
            ("draw", "seven"),
            ("start", ""),
            ("length", "10x"),
            ("order[0][column]", "?"),
        ]));
        assert_eq!(q.draw, 1);
        assert_eq!(q.start, 0);
        assert_eq!(q.length, 10);
        assert_eq!(q.order_column, 1);
    }

    #[test]
    fn test_full_request_parses() {
        let q = TableQuery::from_form(&form(&[
            ("draw", "7"),
            ("start", "20"),
            ("length", "25"),
            ("search[value]", "  abc "),
            ("columns[1][search][value]", " jane "),
            ("columns[3][search][value]", "   "),
            ("order[0][column]", "2"),
            ("order[0][dir]", "desc"),
        ]));
        assert_eq!(q.draw, 7);
        assert_eq!(q.start, 20);
        assert_eq!(q.length, 25);
        assert_eq!(q.global_search, "abc");
        assert_eq!(q.column_search.get(&1).map(String::as_str), Some("jane"));
        // blank column values are dropped, not stored
        assert!(!q.column_search.contains_key(&3));
        assert_eq!(q.order_column, 2);
        assert_eq!(q.order_dir, SortDirection::Desc);
    }

    #[test]
    fn test_export_mode() {
        let q = TableQuery::from_form(&form(&[("length", "-1")]));
        assert!(q.is_export());
    }

    #[test]
    fn test_unrelated_bracket_keys_ignored() {
        let q = TableQuery::from_form(&form(&[
            ("columns[2][data]", "name"),
            ("columns[x][search][value]", "oops"),
        ]));
        assert!(q.column_search.is_empty());
    }
}
