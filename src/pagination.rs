use serde::{Deserialize, Serialize};

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    10
}

/// Query parameters shared by every listing endpoint. `search` is an
/// optional case-insensitive substring over name/email.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchFilter {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub search: Option<String>,
}

impl Default for SearchFilter {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
            search: None,
        }
    }
}

impl SearchFilter {
    /// Page clamped to >= 1.
    pub fn page(&self) -> i64 {
        self.page.max(1)
    }

    /// Limit clamped to >= 1.
    pub fn limit(&self) -> i64 {
        self.limit.max(1)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }

    /// Non-empty trimmed search term, if one was supplied.
    pub fn search(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Response envelope `{items, total, page, limit}` used by every listing.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, total: i64, filter: &SearchFilter) -> Self {
        Self {
            items,
            total,
            page: filter.page(),
            limit: filter.limit(),
        }
    }
}
