//! Pagination utilities for service layer
//!
//! `Pagination` covers page/limit listings, `Window` the skip/limit ones used by admin screens.
use serde::Serialize;

/// Pagination parameters
#[derive(Clone, Copy, Debug)]
pub struct Pagination {
    /// 1-based page index
    pub page: u32,
    /// items per page
    pub per_page: u32,
}

impl Pagination {
    /// Clamp to sane defaults and convert to `u64`
    pub fn normalize(self) -> (u64, u64) {
        let page = if self.page == 0 { 1 } else { self.page };
        let per_page = self.per_page.clamp(1, 100);
        ((page - 1) as u64, per_page as u64)
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { page: 1, per_page: 20 } }
}

/// Pagination block echoed back to clients.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub struct PageInfo {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub pages: u64,
}

impl PageInfo {
    pub fn new(page_idx: u64, limit: u64, total: u64) -> Self {
        let pages = if limit == 0 { 0 } else { total.div_ceil(limit) };
        Self { page: page_idx + 1, limit, total, pages }
    }
}

/// Offset window (`skip`, `limit`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    pub limit: u64,
    pub skip: u64,
}

impl Window {
    pub fn new(limit: Option<u64>, skip: Option<u64>, default_limit: u64) -> Self {
        let limit = limit.unwrap_or(default_limit).clamp(1, 500);
        Self { limit, skip: skip.unwrap_or(0) }
    }
}

#[cfg(test)]
mod tests {
    use super::{PageInfo, Pagination, Window};

    #[test]
    fn normalize_clamps_zero_to_defaults() {
        let (idx, per) = Pagination { page: 0, per_page: 0 }.normalize();
        assert_eq!(idx, 0);
        assert_eq!(per, 1);
    }

    #[test]
    fn normalize_clamps_upper_bound() {
        let (idx, per) = Pagination { page: 5, per_page: 1000 }.normalize();
        assert_eq!(idx, 4);
        assert_eq!(per, 100);
    }

    #[test]
    fn page_info_rounds_pages_up() {
        assert_eq!(PageInfo::new(0, 10, 21), PageInfo { page: 1, limit: 10, total: 21, pages: 3 });
        assert_eq!(PageInfo::new(0, 10, 0).pages, 0);
    }

    #[test]
    fn window_defaults_and_clamps() {
        assert_eq!(Window::new(None, None, 10), Window { limit: 10, skip: 0 });
        assert_eq!(Window::new(Some(0), Some(5), 10), Window { limit: 1, skip: 5 });
        assert_eq!(Window::new(Some(10_000), None, 10).limit, 500);
    }
}
