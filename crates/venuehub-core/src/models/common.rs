use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

pub const DEFAULT_PAGE_LIMIT: i64 = 50;
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Query parameters shared by every admin list endpoint.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Case-insensitive substring filter
    pub search: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListParams {
    pub fn limit(&self) -> i64 {
        self.limit
            .unwrap_or(DEFAULT_PAGE_LIMIT)
            .clamp(1, MAX_PAGE_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    /// Trimmed search term, `None` when blank.
    pub fn search(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Paginated list envelope.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, params: &ListParams) -> Self {
        Self {
            items,
            total,
            limit: params.limit(),
            offset: params.offset(),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            limit: self.limit,
            offset: self.offset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_and_clamps() {
        assert_eq!(ListParams::default().limit(), DEFAULT_PAGE_LIMIT);
        let params = ListParams {
            limit: Some(1000),
            offset: Some(-5),
            ..Default::default()
        };
        assert_eq!(params.limit(), MAX_PAGE_LIMIT);
        assert_eq!(params.offset(), 0);
        let params = ListParams {
            limit: Some(0),
            ..Default::default()
        };
        assert_eq!(params.limit(), 1);
    }

    #[test]
    fn blank_search_is_ignored() {
        let params = ListParams {
            search: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(params.search(), None);
        let params = ListParams {
            search: Some(" turf ".to_string()),
            ..Default::default()
        };
        assert_eq!(params.search(), Some("turf"));
    }
}
