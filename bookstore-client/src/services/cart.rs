// bookstore-client/src/services/cart.rs
// 购物车服务 - 所有接口都在当前用户下

use std::sync::Arc;

use shared::QueryParams;
use shared::models::{CartAdd, CartBatchDelete, CartItem, QuantityUpdate};

use crate::error::ClientResult;
use crate::http::{HttpClient, to_body};
use crate::normalize::list_of;
use crate::session::SessionStore;

#[derive(Debug, Clone)]
pub struct CartService {
    http: Arc<dyn HttpClient>,
    session: SessionStore,
}

impl CartService {
    pub fn new(http: Arc<dyn HttpClient>, session: SessionStore) -> Self {
        Self { http, session }
    }

    fn cart_path(&self) -> ClientResult<String> {
        Ok(format!("/users/{}/cart", self.session.require_user_id()?))
    }

    /// Cart contents; flat and wrapped item shapes both land as [`CartItem`]
    pub async fn get_cart(&self) -> ClientResult<Vec<CartItem>> {
        let path = self.cart_path()?;
        let items: Vec<CartItem> = list_of(self.http.get(&path, &QueryParams::new()).await?);
        tracing::debug!(count = items.len(), "Fetched cart");
        Ok(items)
    }

    pub async fn add_to_cart(&self, book_id: i64, quantity: u32) -> ClientResult<()> {
        let path = self.cart_path()?;
        tracing::info!(book_id, quantity, "Adding to cart");
        self.http
            .post(&path, to_body(&CartAdd { book_id, quantity })?)
            .await?;
        Ok(())
    }

    pub async fn update_quantity(&self, cart_item_id: i64, quantity: u32) -> ClientResult<()> {
        let path = format!("{}/{}", self.cart_path()?, cart_item_id);
        tracing::info!(cart_item_id, quantity, "Updating cart quantity");
        self.http.put(&path, to_body(&QuantityUpdate { quantity })?).await?;
        Ok(())
    }

    pub async fn remove_item(&self, cart_item_id: i64) -> ClientResult<()> {
        let path = format!("{}/{}", self.cart_path()?, cart_item_id);
        tracing::info!(cart_item_id, "Removing cart item");
        self.http.delete(&path).await?;
        Ok(())
    }

    pub async fn clear_cart(&self) -> ClientResult<()> {
        let path = self.cart_path()?;
        tracing::info!("Clearing cart");
        self.http.delete(&path).await?;
        Ok(())
    }

    pub async fn remove_items(&self, cart_item_ids: &[i64]) -> ClientResult<()> {
        let path = format!("{}/batch-delete", self.cart_path()?);
        tracing::info!(count = cart_item_ids.len(), "Removing cart items");
        let body = to_body(&CartBatchDelete {
            cart_item_ids: cart_item_ids.to_vec(),
        })?;
        self.http.post(&path, body).await?;
        Ok(())
    }
}
