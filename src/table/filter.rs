// ==========================================
// Campus Records - column filter strategies
// ==========================================
// A closed set of filter kinds selected per configured
// column. Filter values are compiled once per request
// into a strategy, then applied to typed field values.
// ==========================================
// Constraint: a malformed numeric filter value drops
// the filter, it never fails the request.
// ==========================================

/// Typed view of one record field.
///
/// Accessors return this instead of exposing field names, so the
/// processor stays compile-time checked against the record type.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Null,
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Accessor helper for optional text columns.
    pub fn from_opt_text(value: Option<&str>) -> Self {
        match value {
            Some(v) => FieldValue::Text(v.to_string()),
            None => FieldValue::Null,
        }
    }

    /// Accessor helper for optional numeric columns (ids, counts).
    pub fn from_opt_number(value: Option<i64>) -> Self {
        match value {
            Some(v) => FieldValue::Number(v as f64),
            None => FieldValue::Null,
        }
    }

    fn text_form(&self) -> Option<String> {
        match self {
            FieldValue::Null => None,
            FieldValue::Number(n) => Some(format_number(*n)),
            FieldValue::Text(t) => Some(t.clone()),
        }
    }

    /// Case-insensitive substring test; Null never matches.
    pub fn contains_ci(&self, needle_lower: &str) -> bool {
        self.text_form()
            .map(|t| t.to_lowercase().contains(needle_lower))
            .unwrap_or(false)
    }
}

/// Integral numbers render without a trailing ".0" so id columns
/// behave like text ids in substring and equality matches.
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// Typed field accessor: the compile-time-checked replacement for
/// field-path strings.
pub type FieldAccessor<T> = fn(&T) -> FieldValue;

/// Filter kind configured per column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Case-insensitive substring (text columns).
    Contains,
    /// Equality (ids, foreign keys, flags).
    Exact,
    /// Numeric equality or one-sided range:
    /// "10-" means at least 10, "-10" means at most 10.
    Numeric,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RangeOp {
    AtLeast,
    AtMost,
    Equal,
}

/// Compiled filter, ready to run against field values.
#[derive(Debug, Clone)]
pub(crate) enum FilterStrategy {
    /// The literal value "n/a" asks for rows where the field is null,
    /// whatever the configured kind.
    IsNull,
    Contains { needle_lower: String },
    Exact { raw: String, number: Option<f64> },
    Numeric { op: RangeOp, bound: f64 },
}

impl FilterStrategy {
    /// Compile a filter value. Returns None when the value is blank or,
    /// for the numeric kind, unparseable - in both cases no filter applies.
    pub fn build(kind: FilterKind, raw_value: &str) -> Option<Self> {
        let value = raw_value.trim();
        if value.is_empty() {
            return None;
        }
        if value.eq_ignore_ascii_case("n/a") {
            return Some(FilterStrategy::IsNull);
        }

        match kind {
            FilterKind::Contains => Some(FilterStrategy::Contains {
                needle_lower: value.to_lowercase(),
            }),
            FilterKind::Exact => Some(FilterStrategy::Exact {
                raw: value.to_string(),
                number: value.parse::<f64>().ok(),
            }),
            FilterKind::Numeric => Self::build_numeric(value),
        }
    }

    fn build_numeric(value: &str) -> Option<Self> {
        // Thousands separators are presentation noise.
        let cleaned = value.replace(',', "");

        let (op, number_part) = if cleaned.starts_with('-') && !cleaned.ends_with('-') {
            (RangeOp::AtMost, &cleaned[1..])
        } else if cleaned.ends_with('-') && !cleaned.starts_with('-') {
            (RangeOp::AtLeast, &cleaned[..cleaned.len() - 1])
        } else {
            (RangeOp::Equal, cleaned.as_str())
        };

        number_part
            .parse::<f64>()
            .ok()
            .map(|bound| FilterStrategy::Numeric { op, bound })
    }

    /// Apply the compiled filter to one field value.
    pub fn matches(&self, field: &FieldValue) -> bool {
        match self {
            FilterStrategy::IsNull => matches!(field, FieldValue::Null),

            FilterStrategy::Contains { needle_lower } => field.contains_ci(needle_lower),

            FilterStrategy::Exact { raw, number } => match field {
                FieldValue::Null => false,
                FieldValue::Text(t) => t == raw,
                FieldValue::Number(n) => number.map(|v| v == *n).unwrap_or(false),
            },

            FilterStrategy::Numeric { op, bound } => {
                let value = match field {
                    FieldValue::Number(n) => Some(*n),
                    FieldValue::Text(t) => t.replace(',', "").parse::<f64>().ok(),
                    FieldValue::Null => None,
                };
                match value {
                    None => false,
                    Some(v) => match op {
                        RangeOp::AtLeast => v >= *bound,
                        RangeOp::AtMost => v <= *bound,
                        RangeOp::Equal => v == *bound,
                    },
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_value_builds_no_filter() {
        assert!(FilterStrategy::build(FilterKind::Contains, "   ").is_none());
        assert!(FilterStrategy::build(FilterKind::Numeric, "").is_none());
    }

    #[test]
    fn test_na_selects_null_for_every_kind() {
        for kind in [FilterKind::Contains, FilterKind::Exact, FilterKind::Numeric] {
            let f = FilterStrategy::build(kind, "N/A").unwrap();
            assert!(f.matches(&FieldValue::Null), "kind {:?}", kind);
            assert!(!f.matches(&FieldValue::Text("n/a".to_string())));
            assert!(!f.matches(&FieldValue::Number(0.0)));
        }
    }

    #[test]
    fn test_contains_is_case_insensitive() {
        let f = FilterStrategy::build(FilterKind::Contains, "ALI").unwrap();
        assert!(f.matches(&FieldValue::Text("alice".to_string())));
        assert!(f.matches(&FieldValue::Text("Kalinga".to_string())));
        assert!(!f.matches(&FieldValue::Text("Bob".to_string())));
        assert!(!f.matches(&FieldValue::Null));
    }

    #[test]
    fn test_exact_matches_text_and_number() {
        let f = FilterStrategy::build(FilterKind::Exact, "12").unwrap();
        assert!(f.matches(&FieldValue::Number(12.0)));
        assert!(f.matches(&FieldValue::Text("12".to_string())));
        assert!(!f.matches(&FieldValue::Number(120.0)));

        let g = FilterStrategy::build(FilterKind::Exact, "active").unwrap();
        assert!(g.matches(&FieldValue::Text("active".to_string())));
        assert!(!g.matches(&FieldValue::Text("Active".to_string())));
        assert!(!g.matches(&FieldValue::Number(1.0)));
    }

    #[test]
    fn test_numeric_range_suffix_and_prefix() {
        let at_least = FilterStrategy::build(FilterKind::Numeric, "10-").unwrap();
        assert!(at_least.matches(&FieldValue::Number(10.0)));
        assert!(at_least.matches(&FieldValue::Number(99.0)));
        assert!(!at_least.matches(&FieldValue::Number(9.9)));

        let at_most = FilterStrategy::build(FilterKind::Numeric, "-10").unwrap();
        assert!(at_most.matches(&FieldValue::Number(10.0)));
        assert!(at_most.matches(&FieldValue::Number(-5.0)));
        assert!(!at_most.matches(&FieldValue::Number(10.5)));

        let exact = FilterStrategy::build(FilterKind::Numeric, "10").unwrap();
        assert!(exact.matches(&FieldValue::Number(10.0)));
        assert!(!exact.matches(&FieldValue::Number(11.0)));
    }

    #[test]
    fn test_numeric_strips_thousands_separators() {
        let f = FilterStrategy::build(FilterKind::Numeric, "1,500-").unwrap();
        assert!(f.matches(&FieldValue::Number(1500.0)));
        assert!(!f.matches(&FieldValue::Number(1499.0)));
    }

    #[test]
    fn test_malformed_numeric_drops_filter() {
        assert!(FilterStrategy::build(FilterKind::Numeric, "ten").is_none());
        assert!(FilterStrategy::build(FilterKind::Numeric, "-").is_none());
        assert!(FilterStrategy::build(FilterKind::Numeric, "1-2").is_none());
    }

    #[test]
    fn test_number_text_form_has_no_decimal_tail() {
        assert!(FieldValue::Number(42.0).contains_ci("42"));
        assert!(!FieldValue::Number(42.0).contains_ci("42.0"));
    }
}
