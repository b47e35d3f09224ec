use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Defaults and bounds applied to `page`/`limit` query parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaginationConfig {
    pub default_page: i64,
    pub default_limit: i64,
    pub max_limit: i64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        PaginationConfig {
            default_page: DEFAULT_PAGE,
            default_limit: DEFAULT_LIMIT,
            max_limit: MAX_LIMIT,
        }
    }
}

impl PaginationConfig {
    /// Fills in defaults, then clamps `page` to at least 1 and `limit` to
    /// `1..=max_limit`.
    pub fn resolve(&self, page: Option<i64>, limit: Option<i64>) -> PageRequest {
        let page = page.unwrap_or(self.default_page).max(1);
        let limit = limit
            .unwrap_or(self.default_limit)
            .clamp(1, self.max_limit.max(1));
        PageRequest { page, limit }
    }
}

/// A resolved, always-valid page window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    limit: i64,
}

impl PageRequest {
    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    /// Number of rows to skip: `(page - 1) * limit`.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn meta(&self, total: i64) -> Pagination {
        Pagination {
            total,
            page: self.page,
            limit: self.limit,
            total_pages: total_pages(total, self.limit),
        }
    }
}

/// `ceil(total / limit)`, zero when there is nothing to page through.
pub fn total_pages(total: i64, limit: i64) -> i64 {
    if total <= 0 || limit <= 0 {
        return 0;
    }
    (total - 1) / limit + 1
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn defaults_apply_when_params_are_absent() {
        let request = PaginationConfig::default().resolve(None, None);
        assert_eq!(request.page(), 1);
        assert_eq!(request.limit(), 10);
        assert_eq!(request.offset(), 0);
    }

    #[rstest]
    #[case(Some(0), Some(10), 1, 10)]
    #[case(Some(-3), Some(10), 1, 10)]
    #[case(Some(2), Some(0), 2, 1)]
    #[case(Some(2), Some(-5), 2, 1)]
    #[case(Some(2), Some(1_000), 2, 100)]
    #[case(Some(4), Some(25), 4, 25)]
    fn out_of_range_values_are_clamped(
        #[case] page: Option<i64>,
        #[case] limit: Option<i64>,
        #[case] expected_page: i64,
        #[case] expected_limit: i64,
    ) {
        let request = PaginationConfig::default().resolve(page, limit);
        assert_eq!((request.page(), request.limit()), (expected_page, expected_limit));
    }

    #[test]
    fn configured_defaults_are_used() {
        let config = PaginationConfig {
            default_page: 1,
            default_limit: 25,
            max_limit: 50,
        };
        assert_eq!(config.resolve(None, None).limit(), 25);
        assert_eq!(config.resolve(None, Some(80)).limit(), 50);
    }

    #[test]
    fn offset_skips_previous_pages() {
        let request = PaginationConfig::default().resolve(Some(3), Some(20));
        assert_eq!(request.offset(), 40);
    }

    #[test]
    fn huge_pages_do_not_overflow() {
        let request = PaginationConfig::default().resolve(Some(i64::MAX), Some(100));
        assert_eq!(request.offset(), i64::MAX);
    }

    #[rstest]
    #[case(0, 10, 0)]
    #[case(1, 10, 1)]
    #[case(10, 10, 1)]
    #[case(11, 10, 2)]
    #[case(25, 7, 4)]
    fn total_pages_rounds_up(#[case] total: i64, #[case] limit: i64, #[case] expected: i64) {
        assert_eq!(total_pages(total, limit), expected);
    }

    #[test]
    fn meta_serializes_camel_case() {
        let meta = PaginationConfig::default().resolve(Some(2), Some(10)).meta(21);
        let json = serde_json::to_value(meta).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "total": 21, "page": 2, "limit": 10, "totalPages": 3 })
        );
    }
}
