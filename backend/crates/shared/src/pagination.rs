//! Pagination primitives
//!
//! ページ番号方式のページネーション。
//! レスポンスは `{count, next, previous, results}` の形で返す。

use serde::{Deserialize, Serialize};

/// Default number of items per page
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Upper bound for `page_size`
pub const MAX_PAGE_SIZE: u32 = 100;

/// Raw query parameters (`?page=2&page_size=20`)
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl PageQuery {
    /// 範囲外の値は丸める（page は 1 以上、page_size は 1..=MAX_PAGE_SIZE）
    pub fn resolve(self) -> PageRequest {
        let page = self.page.unwrap_or(1).max(1);
        let size = self
            .page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        PageRequest { page, size }
    }
}

/// Resolved page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        PageQuery {
            page: Some(page),
            page_size: Some(size),
        }
        .resolve()
    }

    /// SQL `LIMIT`
    #[inline]
    pub fn limit(&self) -> i64 {
        i64::from(self.size)
    }

    /// SQL `OFFSET`
    #[inline]
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.size)
    }

    /// Slice an in-memory collection the same way the SQL window would
    pub fn slice<T: Clone>(&self, items: &[T]) -> Vec<T> {
        items
            .iter()
            .skip(self.offset() as usize)
            .take(self.size as usize)
            .cloned()
            .collect()
    }
}

/// One page of results
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub count: u64,
    pub next: Option<u32>,
    pub previous: Option<u32>,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(results: Vec<T>, count: u64, request: PageRequest) -> Self {
        let seen = u64::from(request.page) * u64::from(request.size);
        Self {
            count,
            next: (seen < count).then_some(request.page + 1),
            previous: (request.page > 1).then_some(request.page - 1),
            results,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            count: self.count,
            next: self.next,
            previous: self.previous,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_defaults_and_clamps() {
        let req = PageQuery::default().resolve();
        assert_eq!(req, PageRequest { page: 1, size: DEFAULT_PAGE_SIZE });

        let req = PageQuery { page: Some(0), page_size: Some(1000) }.resolve();
        assert_eq!(req.page, 1);
        assert_eq!(req.size, MAX_PAGE_SIZE);
    }

    #[test]
    fn test_offset_and_limit() {
        let req = PageRequest::new(3, 20);
        assert_eq!(req.limit(), 20);
        assert_eq!(req.offset(), 40);
    }

    #[test]
    fn test_page_links() {
        let first = Page::new(vec![1, 2], 5, PageRequest::new(1, 2));
        assert_eq!(first.next, Some(2));
        assert_eq!(first.previous, None);

        let last = Page::new(vec![5], 5, PageRequest::new(3, 2));
        assert_eq!(last.next, None);
        assert_eq!(last.previous, Some(2));
    }

    #[test]
    fn test_slice_matches_window() {
        let items: Vec<u32> = (1..=7).collect();
        assert_eq!(PageRequest::new(2, 3).slice(&items), vec![4, 5, 6]);
        assert!(PageRequest::new(4, 3).slice(&items).is_empty());
    }

    #[test]
    fn test_map_keeps_links() {
        let page = Page::new(vec![1, 2], 4, PageRequest::new(1, 2)).map(|n| n * 10);
        assert_eq!(page.results, vec![10, 20]);
        assert_eq!(page.next, Some(2));
    }
}
