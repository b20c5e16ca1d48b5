//! Order Model

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub const DEFAULT_RECEIVER_NAME: &str = "默认收货人";
pub const DEFAULT_RECEIVER_PHONE: &str = "13800000000";
pub const DEFAULT_RECEIVER_ADDRESS: &str = "默认地址";
pub const ORDER_CREATED_MESSAGE: &str = "订单创建成功";

/// Order status
///
/// The backend stores display strings. Values outside the known vocabulary
/// are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    /// 待发货
    PendingShipment,
    /// 已发货
    Shipped,
    /// 已完成
    Completed,
    /// 已取消
    Cancelled,
    Other(String),
}

impl OrderStatus {
    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::PendingShipment => "待发货",
            OrderStatus::Shipped => "已发货",
            OrderStatus::Completed => "已完成",
            OrderStatus::Cancelled => "已取消",
            OrderStatus::Other(s) => s,
        }
    }

    /// Whether the order can still be cancelled by the customer
    pub fn is_cancellable(&self) -> bool {
        matches!(self, OrderStatus::PendingShipment)
    }
}

/// Missing status reads as an empty `Other`
impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Other(String::new())
    }
}

impl From<String> for OrderStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "待发货" => OrderStatus::PendingShipment,
            "已发货" => OrderStatus::Shipped,
            "已完成" => OrderStatus::Completed,
            "已取消" => OrderStatus::Cancelled,
            _ => OrderStatus::Other(s),
        }
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order line
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItem {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub book_id: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub quantity: u32,
    /// Unit price in currency unit
    #[serde(default)]
    pub price: f64,
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    #[serde(default)]
    pub order_time: Option<String>,
    /// Total in currency unit
    #[serde(default)]
    pub total_amount: f64,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub items: Vec<OrderLineItem>,
    #[serde(default)]
    pub receiver_name: Option<String>,
    #[serde(default)]
    pub receiver_phone: Option<String>,
    #[serde(default)]
    pub receiver_address: Option<String>,
    #[serde(default)]
    pub remark: Option<String>,
}

/// Receiver details entered at checkout; blanks fall back to defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiverInfo {
    pub receiver_name: Option<String>,
    pub receiver_phone: Option<String>,
    pub receiver_address: Option<String>,
    pub remark: Option<String>,
}

/// Checkout payload sent to `POST /users/{id}/orders`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub cart_item_ids: Vec<i64>,
    pub receiver_name: String,
    pub receiver_phone: String,
    pub receiver_address: String,
    pub remark: String,
}

impl CheckoutRequest {
    pub fn new(cart_item_ids: Vec<i64>, receiver: ReceiverInfo) -> Self {
        fn or_default(value: Option<String>, default: &str) -> String {
            value
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        }

        Self {
            cart_item_ids,
            receiver_name: or_default(receiver.receiver_name, DEFAULT_RECEIVER_NAME),
            receiver_phone: or_default(receiver.receiver_phone, DEFAULT_RECEIVER_PHONE),
            receiver_address: or_default(receiver.receiver_address, DEFAULT_RECEIVER_ADDRESS),
            remark: receiver.remark.unwrap_or_default(),
        }
    }
}

/// Normalized outcome of an order creation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderCreated {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    pub message: String,
}

impl OrderCreated {
    pub fn new(data: Option<Value>) -> Self {
        Self {
            success: true,
            data,
            message: ORDER_CREATED_MESSAGE.to_string(),
        }
    }
}

/// Status change payload, shared by order, book and user status endpoints
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusChange<S> {
    pub status: S,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_order_status_round_trip_keeps_unknown() {
        let status: OrderStatus = serde_json::from_value(json!("已发货")).unwrap();
        assert_eq!(status, OrderStatus::Shipped);

        let status: OrderStatus = serde_json::from_value(json!("退款中")).unwrap();
        assert_eq!(status, OrderStatus::Other("退款中".to_string()));
        assert_eq!(serde_json::to_value(&status).unwrap(), json!("退款中"));
    }

    #[test]
    fn test_checkout_defaults() {
        let req = CheckoutRequest::new(
            vec![1, 2],
            ReceiverInfo {
                receiver_name: Some("  ".to_string()),
                receiver_phone: Some("13911112222".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(req.receiver_name, DEFAULT_RECEIVER_NAME);
        assert_eq!(req.receiver_phone, "13911112222");
        assert_eq!(req.receiver_address, DEFAULT_RECEIVER_ADDRESS);
        assert_eq!(req.remark, "");

        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body["cartItemIds"], json!([1, 2]));
    }

    #[test]
    fn test_order_deserialize_minimal() {
        let order: Order = serde_json::from_value(json!({
            "id": 7,
            "orderTime": "2024-05-01 10:00:00",
            "totalAmount": 88.5,
            "status": "待发货",
            "items": [{"bookId": 1, "title": "围城", "quantity": 1, "price": 88.5}]
        }))
        .unwrap();
        assert!(order.status.is_cancellable());
        assert_eq!(order.items[0].book_id, Some(1));
    }

    #[test]
    fn test_order_without_status_is_kept() {
        let order: Order = serde_json::from_value(json!({"id": 9, "totalAmount": 12.0})).unwrap();
        assert_eq!(order.status, OrderStatus::Other(String::new()));
        assert!(!order.status.is_cancellable());
    }
}
