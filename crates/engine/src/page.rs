//! Page arithmetic for the filtered view.

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Snapshot handed to the pagination hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_records: usize,
    pub page_size: usize,
}

impl PaginationInfo {
    pub fn new(current_page: usize, page_size: usize, total_records: usize) -> Self {
        Self {
            current_page,
            total_pages: total_pages(total_records, page_size),
            total_records,
            page_size,
        }
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }
}

/// `ceil(total_records / page_size)`; zero records means zero pages.
pub fn total_pages(total_records: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total_records.div_ceil(page_size)
}

/// Index range of `page` (1-based) clamped to `total_records`.
///
/// Pages past the end yield an empty range.
pub fn page_range(page: usize, page_size: usize, total_records: usize) -> Range<usize> {
    let start = page.saturating_sub(1).saturating_mul(page_size).min(total_records);
    let end = start.saturating_add(page_size).min(total_records);
    start..end
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(5, 0), 0);
    }

    #[test]
    fn test_page_range_partial_last_page() {
        assert_eq!(page_range(1, 10, 25), 0..10);
        assert_eq!(page_range(2, 10, 25), 10..20);
        assert_eq!(page_range(3, 10, 25), 20..25);
        assert_eq!(page_range(4, 10, 25), 25..25);
        assert_eq!(page_range(1, 10, 0), 0..0);
    }

    #[test]
    fn test_pagination_info_serializes_camel_case() {
        let info = PaginationInfo::new(2, 10, 25);
        assert_eq!(info.total_pages, 3);
        assert!(info.has_previous());
        assert!(info.has_next());

        let json = serde_json::to_value(info).unwrap();
        assert_eq!(json["currentPage"], 2);
        assert_eq!(json["totalPages"], 3);
        assert_eq!(json["totalRecords"], 25);
        assert_eq!(json["pageSize"], 10);
    }
}
