/// Page-number pagination for list endpoints
///
/// Query params are `page` (1-based) and `limit` (page size, default 6,
/// capped at 100). Paginated responses use the `{ count, results }`
/// envelope.

use serde::{Deserialize, Serialize};

/// Default page size
pub const DEFAULT_PAGE_SIZE: i64 = 6;

/// Maximum accepted page size
pub const MAX_PAGE_SIZE: i64 = 100;

/// Pagination query parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    /// 1-based page number
    pub page: Option<i64>,

    /// Page size
    pub limit: Option<i64>,
}

impl PageParams {
    /// Effective page size
    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }

    /// Row offset for the effective page
    pub fn offset(&self) -> i64 {
        let page = self.page.unwrap_or(1).max(1);
        (page - 1) * self.limit()
    }
}

/// Paginated response envelope
#[derive(Debug, Serialize)]
pub struct Page<T> {
    /// Total number of matching rows, across all pages
    pub count: i64,

    /// Rows of the requested page
    pub results: Vec<T>,
}
