//! Offset pagination query parameters and response envelope.

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};
use utoipa::{IntoParams, ToSchema};

/// Default page size when the client doesn't send `limit`.
pub const DEFAULT_LIMIT: i64 = 10;
/// Largest page size a client can request; anything above is clamped down.
pub const MAX_LIMIT: i64 = 100;

/// Pagination query parameters.
///
/// Query strings arrive as text, so both fields parse through
/// [`DisplayFromStr`]: `?page=abc` is a deserialization failure (400), not a
/// silent fallback to the default.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[serde(default)]
pub struct PageQuery {
    /// 1-based page number
    #[param(default = 1, minimum = 1)]
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub page: Option<i64>,
    /// Page size, clamped to 1..=100
    #[param(default = 10, minimum = 1, maximum = 100)]
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub limit: Option<i64>,
}

impl PageQuery {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }

    /// Rows to skip before the requested page starts.
    pub fn skip(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}

/// Pagination block included with every list response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PageMeta {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    #[serde(rename = "totalPages")]
    pub total_pages: i64,
}

/// Envelope for paginated list responses.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaginatedResponse<T: ToSchema> {
    pub items: Vec<T>,
    pub pagination: PageMeta,
}

impl<T: ToSchema> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, query: &PageQuery, total: i64) -> Self {
        let limit = query.limit();
        Self {
            items,
            pagination: PageMeta {
                page: query.page(),
                limit,
                total,
                // ceil(total / limit); limit is always >= 1 here
                total_pages: (total + limit - 1) / limit,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: Option<i64>, limit: Option<i64>) -> PageQuery {
        PageQuery { page, limit }
    }

    #[test]
    fn defaults_apply_when_absent() {
        let q = query(None, None);
        assert_eq!(q.page(), 1);
        assert_eq!(q.limit(), DEFAULT_LIMIT);
        assert_eq!(q.skip(), 0);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        assert_eq!(query(Some(0), None).page(), 1);
        assert_eq!(query(Some(-5), None).page(), 1);
        assert_eq!(query(None, Some(0)).limit(), 1);
        assert_eq!(query(None, Some(5000)).limit(), MAX_LIMIT);
    }

    #[test]
    fn skip_is_derived_from_clamped_values() {
        let q = query(Some(3), Some(25));
        assert_eq!(q.skip(), 50);
    }

    #[test]
    fn non_numeric_page_is_rejected() {
        let err = serde_urlencoded::from_str::<PageQuery>("page=abc");
        assert!(err.is_err());
        let err = serde_urlencoded::from_str::<PageQuery>("limit=ten");
        assert!(err.is_err());
    }

    #[test]
    fn numeric_strings_parse() {
        let q: PageQuery = serde_urlencoded::from_str("page=2&limit=50").unwrap();
        assert_eq!(q.page(), 2);
        assert_eq!(q.limit(), 50);
    }

    #[test]
    fn total_pages_rounds_up() {
        let q = query(Some(1), Some(10));
        let page: PaginatedResponse<i32> = PaginatedResponse::new(vec![], &q, 31);
        assert_eq!(page.pagination.total_pages, 4);
        assert_eq!(page.pagination.total, 31);
        let empty: PaginatedResponse<i32> = PaginatedResponse::new(vec![], &q, 0);
        assert_eq!(empty.pagination.total_pages, 0);
    }
}
