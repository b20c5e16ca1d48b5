//! Cart Model
//!
//! The backend has answered cart reads with two shapes over time: a wrapper
//! `{id, quantity, book}` and a flat book record carrying `quantity`. Both
//! deserialize into the single canonical [`CartItem`]. The presence of a
//! `book` key selects the wrapper shape, so a broken wrapped item is an error
//! rather than a flat record.

use super::book::Book;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Cart line (canonical shape)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(try_from = "Value")]
pub struct CartItem {
    /// Cart item id (flat records reuse the book id)
    pub id: i64,
    pub quantity: u32,
    pub book: Book,
}

impl CartItem {
    pub fn book_id(&self) -> i64 {
        self.book.id
    }

    pub fn subtotal(&self) -> f64 {
        self.book.price * f64::from(self.quantity)
    }
}

#[derive(Deserialize)]
struct WrappedCartItem {
    id: i64,
    #[serde(default = "default_quantity")]
    quantity: u32,
    book: Book,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FlatCartItem {
    #[serde(default)]
    cart_item_id: Option<i64>,
    #[serde(default = "default_quantity")]
    quantity: u32,
    #[serde(flatten)]
    book: Book,
}

fn default_quantity() -> u32 {
    1
}

impl TryFrom<Value> for CartItem {
    type Error = serde_json::Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        if value.get("book").is_some() {
            let WrappedCartItem { id, quantity, book } = serde_json::from_value(value)?;
            return Ok(CartItem { id, quantity, book });
        }

        let flat: FlatCartItem = serde_json::from_value(value)?;
        Ok(CartItem {
            id: flat.cart_item_id.unwrap_or(flat.book.id),
            quantity: flat.quantity,
            book: flat.book,
        })
    }
}

/// Add-to-cart payload
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartAdd {
    pub book_id: i64,
    pub quantity: u32,
}

/// Quantity change payload
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QuantityUpdate {
    pub quantity: u32,
}

/// Batch removal payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartBatchDelete {
    pub cart_item_ids: Vec<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wrapped_and_flat_shapes_agree() {
        let wrapped: CartItem = serde_json::from_value(json!({
            "id": 11,
            "quantity": 2,
            "book": {"id": 1, "title": "红楼梦", "price": 59.9, "stock": 8}
        }))
        .unwrap();
        assert_eq!(wrapped.id, 11);
        assert_eq!(wrapped.book_id(), 1);
        assert_eq!(wrapped.quantity, 2);

        let flat: CartItem = serde_json::from_value(json!({
            "id": 1, "title": "红楼梦", "price": 59.9, "stock": 8, "quantity": 2
        }))
        .unwrap();
        assert_eq!(flat.id, 1);
        assert_eq!(flat.book.title, "红楼梦");
        assert_eq!(flat.quantity, 2);
        assert!((flat.subtotal() - 119.8).abs() < 1e-9);
    }

    #[test]
    fn test_flat_shape_with_cart_item_id() {
        let flat: CartItem = serde_json::from_value(json!({
            "id": 1, "cartItemId": 40, "title": "活着", "quantity": 1
        }))
        .unwrap();
        assert_eq!(flat.id, 40);
        assert_eq!(flat.book_id(), 1);
    }

    #[test]
    fn test_broken_wrapped_item_is_rejected() {
        let unknown_status = serde_json::from_value::<CartItem>(json!({
            "id": 11,
            "quantity": 2,
            "book": {"id": 1, "title": "红楼梦", "status": "PRESALE"}
        }));
        assert!(unknown_status.is_err());

        let missing_book_id = serde_json::from_value::<CartItem>(json!({
            "id": 11,
            "quantity": 2,
            "book": {"title": "红楼梦"}
        }));
        assert!(missing_book_id.is_err());
    }
}
