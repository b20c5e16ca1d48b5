// bookstore-client/src/services/order.rs
// 订单服务 - 下单、订单查询与状态流转

use std::sync::Arc;

use serde_json::Value;
use shared::models::{
    CheckoutRequest, Order, OrderCreated, OrderStatus, ReceiverInfo, StatusChange,
};
use shared::{AdminOrderQuery, OrderQuery, QueryParams};

use crate::error::{ClientError, ClientResult};
use crate::http::{HttpClient, to_body};
use crate::normalize::{list_of, object_of};
use crate::session::SessionStore;

const ORDER_FAILED_MESSAGE: &str = "订单创建失败";

#[derive(Debug, Clone)]
pub struct OrderService {
    http: Arc<dyn HttpClient>,
    session: SessionStore,
}

impl OrderService {
    pub fn new(http: Arc<dyn HttpClient>, session: SessionStore) -> Self {
        Self { http, session }
    }

    fn orders_path(&self) -> ClientResult<String> {
        Ok(format!("/users/{}/orders", self.session.require_user_id()?))
    }

    // ========== Customer ==========

    /// Check out the given cart items
    ///
    /// Blank receiver fields are replaced by defaults. Any response that is
    /// not an explicit `success: false` counts as a created order.
    pub async fn create_order(
        &self,
        cart_item_ids: Vec<i64>,
        receiver: ReceiverInfo,
    ) -> ClientResult<OrderCreated> {
        let path = self.orders_path()?;
        let request = CheckoutRequest::new(cart_item_ids, receiver);
        tracing::info!(items = ?request.cart_item_ids, "Creating order");

        let result = self.http.post(&path, to_body(&request)?).await?;
        let created = order_created(result)?;
        tracing::info!(data = ?created.data, "Order created");
        Ok(created)
    }

    pub async fn get_orders(&self, query: &OrderQuery) -> ClientResult<Vec<Order>> {
        let path = self.orders_path()?;
        let orders: Vec<Order> = list_of(self.http.get(&path, &query.to_params()).await?);
        tracing::debug!(count = orders.len(), "Fetched orders");
        Ok(orders)
    }

    pub async fn get_order(&self, order_id: i64) -> ClientResult<Order> {
        let path = format!("{}/{}", self.orders_path()?, order_id);
        object_of(self.http.get(&path, &QueryParams::new()).await?, "order")
    }

    pub async fn update_order_status(&self, order_id: i64, status: OrderStatus) -> ClientResult<()> {
        let path = format!("{}/{}/status", self.orders_path()?, order_id);
        tracing::info!(order_id, %status, "Updating order status");
        self.http.put(&path, to_body(&StatusChange { status })?).await?;
        Ok(())
    }

    pub async fn cancel_order(&self, order_id: i64) -> ClientResult<()> {
        self.update_order_status(order_id, OrderStatus::Cancelled).await
    }

    /// Confirm receipt
    pub async fn confirm_order(&self, order_id: i64) -> ClientResult<()> {
        self.update_order_status(order_id, OrderStatus::Completed).await
    }

    /// Backend-defined order counters for the current user
    pub async fn get_order_stats(&self) -> ClientResult<Value> {
        let path = format!("{}/stats", self.orders_path()?);
        Ok(self
            .http
            .get(&path, &QueryParams::new())
            .await?
            .unwrap_or(Value::Null))
    }

    // ========== Admin ==========

    pub async fn get_all_orders(&self, query: &AdminOrderQuery) -> ClientResult<Vec<Order>> {
        Ok(list_of(self.http.get("/admin/orders", &query.to_params()).await?))
    }

    pub async fn get_order_for_admin(&self, order_id: i64) -> ClientResult<Order> {
        let value = self
            .http
            .get(&format!("/admin/orders/{}", order_id), &QueryParams::new())
            .await?;
        object_of(value, "order")
    }

    pub async fn update_order_status_for_admin(
        &self,
        order_id: i64,
        status: OrderStatus,
    ) -> ClientResult<()> {
        tracing::info!(order_id, %status, "Updating order status (admin)");
        self.http
            .put(
                &format!("/admin/orders/{}/status", order_id),
                to_body(&StatusChange { status })?,
            )
            .await?;
        Ok(())
    }
}

/// Interpret an order-creation response
fn order_created(result: Option<Value>) -> ClientResult<OrderCreated> {
    let value = match result {
        None | Some(Value::Null) => return Ok(OrderCreated::new(None)),
        Some(value) => value,
    };

    match value {
        Value::Object(mut map) => {
            if let Some(success) = map.get("success") {
                if success.as_bool() == Some(false) {
                    let message = map
                        .get("message")
                        .and_then(Value::as_str)
                        .filter(|m| !m.is_empty())
                        .unwrap_or(ORDER_FAILED_MESSAGE);
                    return Err(ClientError::Api(message.to_string()));
                }
                let mut created = OrderCreated::new(map.remove("data").filter(|d| !d.is_null()));
                if let Some(Value::String(message)) = map.remove("message") {
                    if !message.is_empty() {
                        created.message = message;
                    }
                }
                return Ok(created);
            }
            if let Some(data) = map.remove("data") {
                return Ok(OrderCreated::new(Some(data)));
            }
            if map.is_empty() {
                Ok(OrderCreated::new(None))
            } else {
                Ok(OrderCreated::new(Some(Value::Object(map))))
            }
        }
        Value::Array(items) if items.is_empty() => Ok(OrderCreated::new(None)),
        value @ (Value::Array(_) | Value::String(_) | Value::Number(_)) => {
            Ok(OrderCreated::new(Some(value)))
        }
        _ => Ok(OrderCreated::new(None)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shared::models::ORDER_CREATED_MESSAGE;

    #[test]
    fn test_bare_values_count_as_success() {
        let created = order_created(Some(json!(1))).unwrap();
        assert!(created.success);
        assert_eq!(created.data, Some(json!(1)));
        assert_eq!(created.message, ORDER_CREATED_MESSAGE);

        let created = order_created(Some(json!("ORD-42"))).unwrap();
        assert_eq!(created.data, Some(json!("ORD-42")));

        assert_eq!(order_created(None).unwrap().data, None);
        assert_eq!(order_created(Some(json!({}))).unwrap().data, None);
    }

    #[test]
    fn test_object_shapes() {
        let created = order_created(Some(json!({"data": {"id": 9}}))).unwrap();
        assert_eq!(created.data, Some(json!({"id": 9})));

        let created = order_created(Some(json!({"orderId": 9}))).unwrap();
        assert_eq!(created.data, Some(json!({"orderId": 9})));

        let created =
            order_created(Some(json!({"success": "yes", "data": 3, "message": "已下单"}))).unwrap();
        assert_eq!(created.data, Some(json!(3)));
        assert_eq!(created.message, "已下单");
    }

    #[test]
    fn test_explicit_failure() {
        let err = order_created(Some(json!({"success": false, "message": "库存不足"}))).unwrap_err();
        assert!(matches!(err, ClientError::Api(ref m) if m == "库存不足"));

        let err = order_created(Some(json!({"success": false}))).unwrap_err();
        assert!(matches!(err, ClientError::Api(ref m) if m == ORDER_FAILED_MESSAGE));
    }
}
