use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::{IntoParams, ToSchema};

pub const DEFAULT_PAGE_SIZE: i64 = 100;
pub const MAX_PAGE_SIZE: i64 = 1000;

/// Query string accepted by every list endpoint. Numbers are kept as text so
/// that garbage falls back to the defaults instead of failing the request.
#[derive(Deserialize, IntoParams, Default, Debug)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Page number, starting at 1
    pub page: Option<String>,
    /// Items per page (default 100, at most 1000)
    pub per_page: Option<String>,
    /// Named query mode, e.g. `by-building-and-not-check-out`
    pub term: Option<String>,
    /// JSON object with filter values
    pub filters: Option<String>,
}

impl ListParams {
    pub fn pages(&self, total_count: i64) -> Pages {
        Pages::new(
            parse_or(self.page.as_deref(), 1),
            parse_or(self.per_page.as_deref(), DEFAULT_PAGE_SIZE),
            total_count,
        )
    }

    pub fn term(&self) -> &str {
        self.term.as_deref().unwrap_or_default()
    }

    /// Filters decoded from JSON. Anything that is not a JSON object is ignored.
    pub fn filters(&self) -> Map<String, Value> {
        self.filters
            .as_deref()
            .and_then(|raw| serde_json::from_str::<Map<String, Value>>(raw).ok())
            .unwrap_or_default()
    }
}

fn parse_or(value: Option<&str>, default: i64) -> i64 {
    value
        .and_then(|v| v.trim().parse::<i64>().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pages {
    pub page: i64,
    pub per_page: i64,
    pub page_count: i64,
    pub total_count: i64,
}

impl Pages {
    pub fn new(page: i64, per_page: i64, total_count: i64) -> Self {
        let per_page = match per_page {
            p if p <= 0 => DEFAULT_PAGE_SIZE,
            p if p > MAX_PAGE_SIZE => MAX_PAGE_SIZE,
            p => p,
        };
        let page_count = (total_count + per_page - 1) / per_page;
        let page = page.min(page_count).max(1);
        Self {
            page,
            per_page,
            page_count,
            total_count,
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }

    pub fn limit(&self) -> i64 {
        self.per_page
    }

    pub fn with_items<T>(self, items: Vec<T>) -> Page<T> {
        Page {
            page: self.page,
            per_page: self.per_page,
            page_count: self.page_count,
            total_count: self.total_count,
            items,
        }
    }
}

/// Envelope returned by list endpoints.
#[derive(Serialize, ToSchema, Debug)]
pub struct Page<T> {
    pub page: i64,
    pub per_page: i64,
    pub page_count: i64,
    pub total_count: i64,
    pub items: Vec<T>,
}
