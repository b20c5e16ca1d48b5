//! Book Model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Book lifecycle status
///
/// Older backend records carry no status at all; see [`Book::effective_status`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookStatus {
    #[default]
    Available,
    OutOfStock,
    Discontinued,
}

impl BookStatus {
    pub const ALL: [BookStatus; 3] = [
        BookStatus::Available,
        BookStatus::OutOfStock,
        BookStatus::Discontinued,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BookStatus::Available => "AVAILABLE",
            BookStatus::OutOfStock => "OUT_OF_STOCK",
            BookStatus::Discontinued => "DISCONTINUED",
        }
    }
}

impl fmt::Display for BookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected status value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("无效的状态值: {0}，有效状态: AVAILABLE, OUT_OF_STOCK, DISCONTINUED")]
pub struct InvalidBookStatus(pub String);

impl FromStr for BookStatus {
    type Err = InvalidBookStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BookStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| InvalidBookStatus(s.to_string()))
    }
}

/// Book entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    /// Price in currency unit
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub stock: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<BookStatus>,
}

impl Book {
    /// Status with the absent case folded into `AVAILABLE`
    pub fn effective_status(&self) -> BookStatus {
        self.status.unwrap_or_default()
    }

    /// Sold out but still advertised as available
    pub fn needs_out_of_stock_mark(&self) -> bool {
        self.stock == 0 && self.effective_status() == BookStatus::Available
    }

    pub fn is_purchasable(&self) -> bool {
        self.stock > 0 && self.effective_status() == BookStatus::Available
    }
}

/// Create book payload (admin)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookCreate {
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub price: f64,
    pub stock: i64,
    pub publisher: Option<String>,
    pub cover_image: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<i64>,
}

/// Update book payload (admin)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
}

/// One entry of a batch stock update
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StockUpdate {
    pub book_id: i64,
    pub stock: i64,
}

/// Result of a single-book stock check
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StockCheck {
    /// Whether the check flipped the book to `OUT_OF_STOCK`
    pub auto_updated: bool,
    pub status: BookStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_absent_status_is_available() {
        let book: Book = serde_json::from_value(json!({
            "id": 3, "title": "三体", "author": "刘慈欣", "price": 23.0, "stock": 0
        }))
        .unwrap();
        assert_eq!(book.status, None);
        assert_eq!(book.effective_status(), BookStatus::Available);
        assert!(book.needs_out_of_stock_mark());
        assert!(!book.is_purchasable());
    }

    #[test]
    fn test_out_of_stock_does_not_need_mark() {
        let book: Book = serde_json::from_value(json!({
            "id": 3, "stock": 0, "status": "OUT_OF_STOCK", "coverImage": "a.png"
        }))
        .unwrap();
        assert_eq!(book.cover_image.as_deref(), Some("a.png"));
        assert!(!book.needs_out_of_stock_mark());
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("OUT_OF_STOCK".parse::<BookStatus>(), Ok(BookStatus::OutOfStock));
        assert!("SOLD_OUT".parse::<BookStatus>().is_err());
        assert!("available".parse::<BookStatus>().is_err());
    }
}
