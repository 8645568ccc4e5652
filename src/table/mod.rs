// ==========================================
// Campus Records - tabular query processing
// ==========================================
// Server-side engine for the data table widgets:
// reads pagination/search/sort parameters from a
// request, applies them to a record collection and
// produces one page plus counts.
// ==========================================
// Constraint: generic over the record type; field
// access only through typed accessors, never through
// field-name strings.
// ==========================================

pub mod filter;
pub mod params;
pub mod processor;

pub use filter::{FieldAccessor, FieldValue, FilterKind};
pub use params::{SortDirection, TableQuery, DEFAULT_PAGE_LENGTH};
pub use processor::{
    process, ColumnSpec, RowSerializer, SortKind, SortSpec, TableConfig, TablePage, TableResponse,
};
