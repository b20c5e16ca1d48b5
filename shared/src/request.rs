//! Request types for the shared crate
//!
//! Query-string building for list endpoints. Absent values never reach the
//! wire: `None` and empty strings are dropped instead of being rendered as
//! literal text.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date format expected by the statistics and admin endpoints
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Ordered query parameters, possibly containing absent values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, Option<String>)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a parameter. `None` is recorded and filtered out later.
    pub fn with<V: ToString>(mut self, key: &str, value: Option<V>) -> Self {
        self.push(key, value);
        self
    }

    pub fn push<V: ToString>(&mut self, key: &str, value: Option<V>) {
        self.pairs
            .push((key.to_string(), value.map(|v| v.to_string())));
    }

    /// Extend with every pair of another parameter set
    pub fn merge(mut self, other: QueryParams) -> Self {
        self.pairs.extend(other.pairs);
        self
    }

    /// Parameters that will actually be sent
    pub fn present(&self) -> Vec<(&str, &str)> {
        self.pairs
            .iter()
            .filter_map(|(k, v)| match v.as_deref() {
                Some(v) if !v.is_empty() => Some((k.as_str(), v)),
                _ => None,
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.present().is_empty()
    }

    /// URL-encoded query string without the leading `?`
    pub fn to_query_string(&self) -> String {
        serde_urlencoded::to_string(self.present()).unwrap_or_default()
    }

    /// Append the query string to an endpoint path
    pub fn apply_to(&self, endpoint: &str) -> String {
        let query = self.to_query_string();
        if query.is_empty() {
            endpoint.to_string()
        } else {
            format!("{}?{}", endpoint, query)
        }
    }
}

/// Book listing filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub page: Option<u32>,
    pub size: Option<u32>,
}

impl BookQuery {
    /// Explicitly paged listing starting from the first page
    pub fn paged(size: u32) -> Self {
        Self {
            page: Some(0),
            size: Some(size),
            ..Default::default()
        }
    }

    pub fn category(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            ..Default::default()
        }
    }

    pub fn to_params(&self) -> QueryParams {
        QueryParams::new()
            .with("search", self.search.as_deref())
            .with("category", self.category.as_deref())
            .with("page", self.page)
            .with("size", self.size)
    }
}

/// Customer order listing filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub status: Option<String>,
}

impl OrderQuery {
    pub fn to_params(&self) -> QueryParams {
        QueryParams::new()
            .with("page", self.page)
            .with("size", self.size)
            .with("status", self.status.as_deref())
    }
}

/// Inclusive date window
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date: Some(start_date),
            end_date: Some(end_date),
        }
    }

    pub fn to_params(&self) -> QueryParams {
        QueryParams::new()
            .with("startDate", self.start_date.map(|d| d.format(DATE_FORMAT)))
            .with("endDate", self.end_date.map(|d| d.format(DATE_FORMAT)))
    }
}

/// Admin order listing filters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminOrderQuery {
    pub range: DateRange,
    pub status: Option<String>,
    pub keyword: Option<String>,
}

impl AdminOrderQuery {
    pub fn to_params(&self) -> QueryParams {
        self.range.to_params().merge(
            QueryParams::new()
                .with("status", self.status.as_deref())
                .with("keyword", self.keyword.as_deref()),
        )
    }
}

/// Granularity of the sales trend report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SalesPeriod {
    #[default]
    Day,
    Week,
    Month,
    Year,
}

impl SalesPeriod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SalesPeriod::Day => "day",
            SalesPeriod::Week => "week",
            SalesPeriod::Month => "month",
            SalesPeriod::Year => "year",
        }
    }
}
