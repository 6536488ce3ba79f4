//! Pagination for list endpoints.
//!
//! Lists accept either `limit` + `offset` or `limit` + `page`. When `page`
//! is given it wins over `offset`. `limit` is clamped to [1, 100] and
//! defaults to 10.
//!
//! ```ignore
//! async fn list(Query(filters): Query<StudentFilterParams>) -> Result<Json<Paginated<Student>>, AppError> {
//!     let limit = filters.pagination.limit();
//!     let offset = filters.pagination.offset();
//!     let rows = fetch(limit, offset).await?;
//!     let total = count().await?;
//!     Ok(Json(Paginated::new(rows, total, &filters.pagination)))
//! }
//! ```

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::serde::deserialize_optional_i64;

/// Metadata about a paginated response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaginationMeta {
    /// Total number of items across all pages
    pub total: i64,
    /// Maximum items per page (the limit that was applied)
    pub limit: i64,
    /// Number of items skipped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<i64>,
    /// Current page number (only present if page-based pagination was used)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    /// Whether there are more items after this page
    pub has_more: bool,
}

impl PaginationMeta {
    pub fn new(total: i64, params: &PaginationParams) -> Self {
        let limit = params.limit();
        let offset = params.offset();
        Self {
            total,
            limit,
            offset: Some(offset),
            page: params.page(),
            has_more: offset + limit < total,
        }
    }
}

/// Query parameters for pagination.
#[derive(Debug, Clone, Hash, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    /// Maximum number of items to return (1-100, default: 10)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub limit: Option<i64>,
    /// Number of items to skip (default: 0, ignored if `page` is set)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub offset: Option<i64>,
    /// Page number (1-indexed)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            limit: Some(10),
            offset: Some(0),
            page: None,
        }
    }
}

impl PaginationParams {
    #[must_use]
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(10).clamp(1, 100)
    }

    #[must_use]
    pub fn offset(&self) -> i64 {
        if let Some(page) = self.page {
            let page = page.max(1);
            (page - 1) * self.limit()
        } else {
            self.offset.unwrap_or(0).max(0)
        }
    }

    #[must_use]
    pub fn page(&self) -> Option<i64> {
        self.page.map(|p| p.max(1))
    }
}

/// Response envelope for list endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PaginationMeta,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, total: i64, params: &PaginationParams) -> Self {
        Self {
            data,
            meta: PaginationMeta::new(total, params),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(limit: Option<i64>, offset: Option<i64>, page: Option<i64>) -> PaginationParams {
        PaginationParams {
            limit,
            offset,
            page,
        }
    }

    #[test]
    fn test_defaults() {
        let p = PaginationParams::default();
        assert_eq!(p.limit(), 10);
        assert_eq!(p.offset(), 0);
        assert_eq!(p.page(), None);

        let empty = params(None, None, None);
        assert_eq!(empty.limit(), 10);
        assert_eq!(empty.offset(), 0);
    }

    #[test]
    fn test_limit_clamping() {
        assert_eq!(params(Some(0), None, None).limit(), 1);
        assert_eq!(params(Some(-10), None, None).limit(), 1);
        assert_eq!(params(Some(100), None, None).limit(), 100);
        assert_eq!(params(Some(150), None, None).limit(), 100);
    }

    #[test]
    fn test_negative_offset_is_zero() {
        assert_eq!(params(Some(10), Some(-5), None).offset(), 0);
    }

    #[test]
    fn test_page_takes_precedence_over_offset() {
        let p = params(Some(20), Some(5), Some(3));
        assert_eq!(p.offset(), 40);
        assert_eq!(p.page(), Some(3));
    }

    #[test]
    fn test_page_zero_is_first_page() {
        let p = params(Some(10), None, Some(0));
        assert_eq!(p.offset(), 0);
        assert_eq!(p.page(), Some(1));
    }

    #[test]
    fn test_meta_has_more() {
        let p = params(Some(10), Some(0), None);
        assert!(PaginationMeta::new(25, &p).has_more);

        let p = params(Some(10), Some(20), None);
        let meta = PaginationMeta::new(25, &p);
        assert!(!meta.has_more);
        assert_eq!(meta.offset, Some(20));

        let p = params(Some(10), None, Some(3));
        assert!(!PaginationMeta::new(30, &p).has_more);
    }

    #[test]
    fn test_query_string_with_empty_values() {
        let p: PaginationParams = serde_json::from_str(r#"{"limit": "", "page": "2"}"#).unwrap();
        assert_eq!(p.limit(), 10);
        assert_eq!(p.offset(), 10);
    }

    #[test]
    fn test_meta_serialization_skips_absent_page() {
        let meta = PaginationMeta::new(5, &params(Some(10), None, None));
        let json = serde_json::to_value(&meta).unwrap();
        assert!(json.get("page").is_none());
        assert_eq!(json["total"], 5);
        assert_eq!(json["has_more"], false);
    }
}
