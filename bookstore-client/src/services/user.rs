// bookstore-client/src/services/user.rs
// 用户服务 - 个人资料、收藏与管理员用户维护

use std::sync::Arc;

use serde_json::Value;
use shared::models::{AdminUserUpdate, Favorite, FavoriteAdd, ProfileUpdate, StatusChange, UserProfile, UserStatus};
use shared::{DateRange, QueryParams};

use crate::error::ClientResult;
use crate::http::{HttpClient, to_body};
use crate::normalize::{list_of, object_of};

#[derive(Debug, Clone)]
pub struct UserService {
    http: Arc<dyn HttpClient>,
}

impl UserService {
    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self { http }
    }

    pub async fn get_profile(&self, user_id: i64) -> ClientResult<UserProfile> {
        let value = self
            .http
            .get(&format!("/users/{}", user_id), &QueryParams::new())
            .await?;
        object_of(value, "user profile")
    }

    /// Save profile changes; returns the stored profile when the backend sends one back
    pub async fn update_profile(
        &self,
        user_id: i64,
        update: &ProfileUpdate,
    ) -> ClientResult<Option<UserProfile>> {
        tracing::info!(user_id, "Updating profile");
        let value = self
            .http
            .put(&format!("/users/{}", user_id), to_body(update)?)
            .await?;
        Ok(value.and_then(|v| serde_json::from_value(v).ok()))
    }

    pub async fn get_favorites(&self, user_id: i64) -> ClientResult<Vec<Favorite>> {
        let value = self
            .http
            .get(&format!("/users/{}/favorites", user_id), &QueryParams::new())
            .await?;
        Ok(list_of(value))
    }

    pub async fn add_favorite(&self, user_id: i64, book_id: i64) -> ClientResult<()> {
        tracing::info!(user_id, book_id, "Adding favorite");
        self.http
            .post(
                &format!("/users/{}/favorites", user_id),
                to_body(&FavoriteAdd { book_id })?,
            )
            .await?;
        Ok(())
    }

    pub async fn remove_favorite(&self, user_id: i64, book_id: i64) -> ClientResult<()> {
        tracing::info!(user_id, book_id, "Removing favorite");
        self.http
            .delete(&format!("/users/{}/favorites/{}", user_id, book_id))
            .await?;
        Ok(())
    }

    pub async fn get_personal_stats(&self, user_id: i64, range: DateRange) -> ClientResult<Value> {
        let value = self
            .http
            .get(&format!("/users/{}/statistics", user_id), &range.to_params())
            .await?;
        Ok(value.unwrap_or(Value::Null))
    }

    // ========== Admin ==========

    pub async fn get_all_users(&self) -> ClientResult<Vec<UserProfile>> {
        let users: Vec<UserProfile> = list_of(self.http.get("/admin/users", &QueryParams::new()).await?);
        tracing::debug!(count = users.len(), "Fetched users");
        Ok(users)
    }

    pub async fn update_user_status(&self, user_id: i64, status: UserStatus) -> ClientResult<()> {
        tracing::info!(user_id, ?status, "Updating user status");
        self.http
            .put(
                &format!("/admin/users/{}/status", user_id),
                to_body(&StatusChange { status })?,
            )
            .await?;
        Ok(())
    }

    pub async fn update_user(&self, user_id: i64, update: &AdminUserUpdate) -> ClientResult<()> {
        tracing::info!(user_id, "Updating user (admin)");
        self.http
            .put(&format!("/admin/users/{}", user_id), to_body(update)?)
            .await?;
        Ok(())
    }
}
