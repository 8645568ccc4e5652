// ==========================================
// Campus Records - section paginator
// ==========================================
// The lighter pager used by the stationery builder
// panels: page-number pagination over an already
// filtered collection. Out-of-range page numbers
// clamp to the last page; unparseable ones fall
// back to page 1.
// ==========================================

use serde::Serialize;

/// Pagination facts returned next to every section page.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PaginationMeta {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_count: usize,
    pub per_page: usize,
    pub has_next: bool,
    pub has_previous: bool,
    /// 1-based index of the first item on the page (0 when empty).
    pub start_index: usize,
    /// 1-based index of the last item on the page.
    pub end_index: usize,
}

/// Window `items` to the requested page.
///
/// # Arguments
/// - `page`: raw page parameter as received, parsed leniently
/// - `per_page`: must be >= 1
pub fn paginate<T>(items: Vec<T>, page: &str, per_page: usize) -> (Vec<T>, PaginationMeta) {
    let per_page = per_page.max(1);
    let total_count = items.len();
    let total_pages = total_count.div_ceil(per_page).max(1);

    let requested = page.trim().parse::<usize>().unwrap_or(1).max(1);
    let current_page = requested.min(total_pages);

    let start = (current_page - 1) * per_page;
    let end = (start + per_page).min(total_count);

    let page_items: Vec<T> = items
        .into_iter()
        .skip(start)
        .take(per_page)
        .collect();

    let meta = PaginationMeta {
        current_page,
        total_pages,
        total_count,
        per_page,
        has_next: current_page < total_pages,
        has_previous: current_page > 1,
        start_index: if page_items.is_empty() { 0 } else { start + 1 },
        end_index: end,
    };

    (page_items, meta)
}
