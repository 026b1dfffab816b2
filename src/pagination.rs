//! Page arithmetic shared by the paginated endpoints.

use serde::{Deserialize, Serialize};

/// Hard cap on page size for every paginated endpoint.
pub const MAX_LIMIT: i64 = 100;

/// Parses a numeric query value the lenient way: missing, unparsable or zero
/// yields `None` so the caller falls back to its default.
pub fn parse_param(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .filter(|n| *n != 0)
}

/// Resolves a requested page size: default when absent or not positive,
/// then capped at [`MAX_LIMIT`].
pub fn clamp_limit(raw: Option<&str>, default: i64) -> i64 {
    parse_param(raw)
        .filter(|n| *n > 0)
        .unwrap_or(default)
        .min(MAX_LIMIT)
}

/// `ceil(total_items / limit)`; zero items means zero pages.
pub fn total_pages(total_items: i64, limit: i64) -> i64 {
    if limit <= 0 || total_items <= 0 {
        return 0;
    }
    (total_items + limit - 1) / limit
}

/// Page number and size resolved from a query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    /// Keeps the page exactly as requested (negatives included); callers that
    /// validate the range reject it themselves.
    pub fn from_params(page: Option<&str>, limit: Option<&str>, default_limit: i64) -> Self {
        Self {
            page: parse_param(page).unwrap_or(1),
            limit: clamp_limit(limit, default_limit),
        }
    }

    /// Same as [`PageRequest::from_params`] but never below page 1.
    pub fn from_params_at_least_first(
        page: Option<&str>,
        limit: Option<&str>,
        default_limit: i64,
    ) -> Self {
        let mut request = Self::from_params(page, limit, default_limit);
        request.page = request.page.max(1);
        request
    }

    /// Rows to skip. Saturates at `i64::MAX` (a valid Postgres OFFSET) so an
    /// absurdly large page still yields an empty page, and never goes negative.
    pub fn offset(&self) -> i64 {
        self.page
            .saturating_sub(1)
            .saturating_mul(self.limit)
            .max(0)
    }
}

/// Pagination envelope returned next to `data`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub page: i64,
    pub limit: i64,
    pub total_items: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl PageMeta {
    pub fn new(request: PageRequest, total_items: i64) -> Self {
        let total_pages = total_pages(total_items, request.limit);
        Self {
            page: request.page,
            limit: request.limit,
            total_items,
            total_pages,
            has_next: request.page < total_pages,
            has_previous: request.page > 1,
        }
    }
}
