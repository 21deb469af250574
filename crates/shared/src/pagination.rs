//! Offset-based pagination utilities.

use serde::{Deserialize, Deserializer, Serialize};

/// Page size used when the caller does not supply one.
pub const DEFAULT_LIMIT: i64 = 10;

/// Largest page size a caller may request.
pub const MAX_LIMIT: i64 = 100;

/// Normalized page request. Construct with [`PageRequest::new`] so the
/// bounds always hold: `page >= 1` and `1 <= limit <= max_limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    limit: i64,
}

impl PageRequest {
    /// Clamps raw query values using the default page size.
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self::with_default_limit(page, limit, DEFAULT_LIMIT)
    }

    /// Clamps raw query values, substituting `default_limit` when no limit was given.
    pub fn with_default_limit(page: Option<i64>, limit: Option<i64>, default_limit: i64) -> Self {
        let page = page.unwrap_or(1).max(1);
        let limit = limit.unwrap_or(default_limit).clamp(1, MAX_LIMIT);
        Self { page, limit }
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    /// Number of rows skipped before this page.
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Builds the response metadata once the total is known.
    pub fn meta(&self, total: i64) -> PaginationMeta {
        PaginationMeta {
            page: self.page,
            limit: self.limit,
            total,
            pages: total_pages(total, self.limit),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Pagination block returned alongside list results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

/// `ceil(total / limit)`, zero for an empty result.
pub fn total_pages(total: i64, limit: i64) -> i64 {
    if total <= 0 || limit <= 0 {
        return 0;
    }
    (total + limit - 1) / limit
}

/// Reads an optional integer query parameter.
///
/// Empty or non-numeric input (`?page=`, `?limit=abc`) yields `None`
/// instead of failing the whole query, leaving the default to the caller.
///
/// # Example
///
/// ```ignore
/// #[derive(Deserialize)]
/// struct Query {
///     #[serde(default, deserialize_with = "shared::pagination::deserialize_optional_i64")]
///     page: Option<i64>,
/// }
/// ```
pub fn deserialize_optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| value.trim().parse::<i64>().ok()))
}
