// ==========================================
// Campus Records - table processor
// ==========================================
// The generic pager: count, filter, sort, slice.
// Callers supply a TableConfig describing which
// accessors are searchable/filterable/sortable and
// a RowSerializer shaping the output rows.
// ==========================================

use crate::table::filter::{FieldAccessor, FieldValue, FilterKind, FilterStrategy};
use crate::table::params::{SortDirection, TableQuery};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// How a column's sort key compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKind {
    /// Lexicographic on the lowercased text form (names, codes).
    CaseInsensitive,
    /// Raw value order (numbers, ISO dates).
    Raw,
}

/// One configured table column: how it filters and how it sorts.
pub struct ColumnSpec<T> {
    filter: FieldAccessor<T>,
    filter_kind: FilterKind,
    sort: FieldAccessor<T>,
    sort_kind: SortKind,
}

impl<T> ColumnSpec<T> {
    /// Column whose sort field equals its filter field.
    pub fn new(filter: FieldAccessor<T>, filter_kind: FilterKind) -> Self {
        Self {
            filter,
            filter_kind,
            sort: filter,
            sort_kind: SortKind::CaseInsensitive,
        }
    }

    /// Override the sort field/behaviour (e.g. filter by facilitator id,
    /// sort by facilitator name).
    pub fn with_sort(mut self, sort: FieldAccessor<T>, sort_kind: SortKind) -> Self {
        self.sort = sort;
        self.sort_kind = sort_kind;
        self
    }

    fn sort_spec(&self) -> SortSpec<T> {
        SortSpec {
            field: self.sort,
            kind: self.sort_kind,
        }
    }
}

/// A sort field plus its comparison behaviour.
pub struct SortSpec<T> {
    pub field: FieldAccessor<T>,
    pub kind: SortKind,
}

// Manual impls: fn pointers are Copy whatever T is.
impl<T> Clone for SortSpec<T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for SortSpec<T> {}

impl<T> SortSpec<T> {
    pub fn case_insensitive(field: FieldAccessor<T>) -> Self {
        Self {
            field,
            kind: SortKind::CaseInsensitive,
        }
    }

    pub fn raw(field: FieldAccessor<T>) -> Self {
        Self {
            field,
            kind: SortKind::Raw,
        }
    }
}

/// Per-entity table configuration.
///
/// The fallback sort is required up front: there is no implicit
/// "first text column" default.
pub struct TableConfig<T> {
    global_search: Vec<FieldAccessor<T>>,
    columns: BTreeMap<usize, ColumnSpec<T>>,
    default_sort: SortSpec<T>,
    tie_break: fn(&T) -> i64,
}

impl<T> TableConfig<T> {
    /// # Arguments
    /// - `default_sort`: applied when the requested order index is unmapped
    /// - `tie_break`: primary id accessor; equal sort keys order by id
    ///   ascending, so pages are deterministic
    pub fn new(default_sort: SortSpec<T>, tie_break: fn(&T) -> i64) -> Self {
        Self {
            global_search: Vec::new(),
            columns: BTreeMap::new(),
            default_sort,
            tie_break,
        }
    }

    /// Add a field to the global-search disjunction (order preserved).
    pub fn search(mut self, field: FieldAccessor<T>) -> Self {
        self.global_search.push(field);
        self
    }

    /// Map a column index to its filter/sort behaviour.
    pub fn column(mut self, index: usize, spec: ColumnSpec<T>) -> Self {
        self.columns.insert(index, spec);
        self
    }
}

/// One processed page: counts plus the records of the requested window.
pub struct TablePage<T> {
    pub draw: i64,
    pub records_total: usize,
    pub records_filtered: usize,
    pub rows: Vec<T>,
    /// Offset the window started at (used for 1-based row numbering).
    pub start: usize,
    /// True when the request asked for the full set (length < 0).
    pub export: bool,
}

/// Shapes records into client-facing rows. Implemented once per entity.
pub trait RowSerializer<T> {
    type Row: Serialize;

    /// # Arguments
    /// - `record`: the paged record
    /// - `position`: 1-based display position within the filtered set
    fn row(&self, record: &T, position: usize) -> Self::Row;
}

/// Wire shape consumed by the client table widget.
#[derive(Debug, Serialize)]
pub struct TableResponse<R: Serialize> {
    pub draw: i64,
    #[serde(rename = "recordsTotal")]
    pub records_total: usize,
    #[serde(rename = "recordsFiltered")]
    pub records_filtered: usize,
    pub data: Vec<R>,
}

impl<T> TablePage<T> {
    /// Serialize the page with the entity's row shape.
    pub fn into_response<S: RowSerializer<T>>(self, serializer: &S) -> TableResponse<S::Row> {
        let start = self.start;
        let data = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, record)| serializer.row(record, start + i + 1))
            .collect();

        TableResponse {
            draw: self.draw,
            records_total: self.records_total,
            records_filtered: self.records_filtered,
            data,
        }
    }
}

/// Run one table request against a record collection.
///
/// 1. count the unfiltered collection
/// 2. global search: OR of case-insensitive substring matches
/// 3. column filters: AND of per-column strategies (blank values skip,
///    malformed numeric values drop that filter)
/// 4. count the filtered collection
/// 5. sort by the ordered column (fallback when unmapped), ties by id asc
/// 6. slice [start, start+length), or everything in export mode
pub fn process<T>(query: &TableQuery, records: Vec<T>, config: &TableConfig<T>) -> TablePage<T> {
    let records_total = records.len();

    let mut filtered = records;

    if !query.global_search.is_empty() && !config.global_search.is_empty() {
        let needle = query.global_search.to_lowercase();
        filtered.retain(|record| {
            config
                .global_search
                .iter()
                .any(|field| field(record).contains_ci(&needle))
        });
    }

    for (index, spec) in &config.columns {
        let Some(value) = query.column_search.get(index) else {
            continue;
        };
        let Some(strategy) = FilterStrategy::build(spec.filter_kind, value) else {
            continue;
        };
        let field = spec.filter;
        filtered.retain(|record| strategy.matches(&field(record)));
    }

    let records_filtered = filtered.len();

    let sort = config
        .columns
        .get(&query.order_column)
        .map(|spec| spec.sort_spec())
        .unwrap_or(config.default_sort);
    sort_records(&mut filtered, &sort, query.order_dir, config.tie_break);

    let rows = if query.is_export() {
        filtered
    } else {
        filtered
            .into_iter()
            .skip(query.start)
            .take(query.length.max(0) as usize)
            .collect()
    };

    TablePage {
        draw: query.draw,
        records_total,
        records_filtered,
        rows,
        start: query.start,
        export: query.is_export(),
    }
}

fn sort_records<T>(
    records: &mut [T],
    sort: &SortSpec<T>,
    direction: SortDirection,
    tie_break: fn(&T) -> i64,
) {
    let field = sort.field;
    let kind = sort.kind;

    records.sort_by(|a, b| {
        let primary = compare_values(&field(a), &field(b), kind);
        let primary = match direction {
            SortDirection::Asc => primary,
            SortDirection::Desc => primary.reverse(),
        };
        // Deterministic pages: equal keys order by id ascending either way.
        primary.then_with(|| tie_break(a).cmp(&tie_break(b)))
    });
}

/// Null sorts before numbers, numbers before text.
fn compare_values(a: &FieldValue, b: &FieldValue, kind: SortKind) -> Ordering {
    match (a, b) {
        (FieldValue::Null, FieldValue::Null) => Ordering::Equal,
        (FieldValue::Null, _) => Ordering::Less,
        (_, FieldValue::Null) => Ordering::Greater,
        (FieldValue::Number(x), FieldValue::Number(y)) => x.total_cmp(y),
        (FieldValue::Number(_), FieldValue::Text(_)) => Ordering::Less,
        (FieldValue::Text(_), FieldValue::Number(_)) => Ordering::Greater,
        (FieldValue::Text(x), FieldValue::Text(y)) => match kind {
            SortKind::CaseInsensitive => x.to_lowercase().cmp(&y.to_lowercase()),
            SortKind::Raw => x.cmp(y),
        },
    }
}
