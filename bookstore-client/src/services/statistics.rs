// bookstore-client/src/services/statistics.rs
// 统计服务 - 报表结构由后端决定，原样返回 JSON

use std::sync::Arc;

use serde_json::Value;
use shared::{DateRange, QueryParams, SalesPeriod};

use crate::error::ClientResult;
use crate::http::HttpClient;
use crate::normalize::unwrap_list;

#[derive(Debug, Clone)]
pub struct StatisticsService {
    http: Arc<dyn HttpClient>,
}

impl StatisticsService {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }

    async fn report(&self, endpoint: &str, params: QueryParams) -> ClientResult<Value> {
        Ok(self.http.get(endpoint, &params).await?.unwrap_or(Value::Null))
    }

    /// Per-book sales rows
    pub async fn book_sales(&self, range: DateRange) -> ClientResult<Vec<Value>> {
        let value = self
            .http
            .get("/admin/statistics/book-sales", &range.to_params())
            .await?;
        Ok(unwrap_list(value))
    }

    /// Per-user spending rows
    pub async fn user_consumption(&self, range: DateRange) -> ClientResult<Vec<Value>> {
        let value = self
            .http
            .get("/admin/statistics/user-consumption", &range.to_params())
            .await?;
        Ok(unwrap_list(value))
    }

    pub async fn order_stats(&self, range: DateRange) -> ClientResult<Value> {
        self.report("/admin/statistics/orders", range.to_params()).await
    }

    pub async fn personal_stats(&self, user_id: i64, range: DateRange) -> ClientResult<Value> {
        self.report(&format!("/users/{}/statistics", user_id), range.to_params())
            .await
    }

    pub async fn platform_stats(&self, range: DateRange) -> ClientResult<Value> {
        self.report("/admin/statistics/platform", range.to_params()).await
    }

    pub async fn sales_trends(&self, period: SalesPeriod, range: DateRange) -> ClientResult<Value> {
        let params = QueryParams::new()
            .with("period", Some(period.as_str()))
            .merge(range.to_params());
        self.report("/admin/statistics/sales-trends", params).await
    }
}
