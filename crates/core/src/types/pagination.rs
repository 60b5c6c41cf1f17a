//! Page metadata for catalog listings.
//!
//! The Bling API never reports a total count, so page metadata is estimated
//! from how full the fetched page was. `total_pages` in particular is a
//! heuristic: it only ever claims one more page than the current one.

use serde::{Deserialize, Serialize};

/// Pagination metadata returned alongside a page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// Current page (1-indexed).
    pub page: u32,
    /// Requested page size.
    pub limit: u32,
    /// Number of items returned on this page.
    pub total: usize,
    /// Estimated page count (`page + 1` while more pages may exist).
    pub total_pages: u32,
    /// Whether the upstream page was full.
    pub has_more: bool,
}

impl Pagination {
    /// Estimate pagination from page fullness.
    ///
    /// `fetched` is the raw upstream page length; `returned` is the number of
    /// items left after any client-side filtering. `has_more` depends only on
    /// `fetched`, so a page thinned out by filtering still advertises a next
    /// page.
    #[must_use]
    pub const fn estimate(page: u32, limit: u32, fetched: usize, returned: usize) -> Self {
        let has_more = fetched >= limit as usize;
        Self {
            page,
            limit,
            total: returned,
            total_pages: if has_more { page.saturating_add(1) } else { page },
            has_more,
        }
    }

    /// Pagination for listings where the number of items on the page is the
    /// only count available.
    ///
    /// `total_pages` is `ceil(total / limit)`, at least the current page.
    #[must_use]
    pub fn from_count(page: u32, limit: u32, total: usize) -> Self {
        let limit_len = usize::try_from(limit.max(1)).unwrap_or(usize::MAX);
        let pages = u32::try_from(total.div_ceil(limit_len)).unwrap_or(u32::MAX);
        let has_more = total >= limit_len;
        Self {
            page,
            limit,
            total,
            total_pages: pages.max(1),
            has_more,
        }
    }
}

/// A page of items with its pagination metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// Items on this page.
    pub data: Vec<T>,
    /// Page metadata.
    pub pagination: Pagination,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_full_page_has_more() {
        let p = Pagination::estimate(1, 30, 30, 30);
        assert!(p.has_more);
        assert_eq!(p.total_pages, 2);
        assert_eq!(p.total, 30);
    }

    #[test]
    fn test_short_page_is_last() {
        let p = Pagination::estimate(3, 30, 12, 12);
        assert!(!p.has_more);
        assert_eq!(p.total_pages, 3);
    }

    #[test]
    fn test_filtered_page_keeps_has_more() {
        // 30 fetched, 10 survived the price filter
        let p = Pagination::estimate(1, 30, 30, 10);
        assert!(p.has_more);
        assert_eq!(p.total, 10);
        assert_eq!(p.total_pages, 2);
    }

    #[test]
    fn test_total_pages_tracks_has_more() {
        for page in 1..5 {
            for fetched in [0, 5, 29, 30, 31] {
                let p = Pagination::estimate(page, 30, fetched, fetched);
                let expected = if p.has_more { page + 1 } else { page };
                assert_eq!(p.total_pages, expected);
                assert_eq!(p.has_more, fetched >= 30);
            }
        }
    }

    #[test]
    fn test_from_count_rounds_up() {
        let p = Pagination::from_count(1, 100, 250);
        assert_eq!(p.total_pages, 3);
        let p = Pagination::from_count(1, 100, 100);
        assert_eq!(p.total_pages, 1);
        assert!(p.has_more);
        let p = Pagination::from_count(1, 100, 0);
        assert_eq!(p.total_pages, 1);
        assert!(!p.has_more);
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(Pagination::estimate(1, 2, 2, 2)).unwrap();
        assert_eq!(json["totalPages"], 2);
        assert_eq!(json["hasMore"], true);
    }
}
