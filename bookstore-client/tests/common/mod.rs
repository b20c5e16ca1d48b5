// bookstore-client/tests/common/mod.rs
// 集成测试公共工具 - wiremock 后端与已登录会话

#![allow(dead_code)]

use std::sync::Arc;

use bookstore_client::shared::ApiResponse;
use bookstore_client::shared::models::UserProfile;
use bookstore_client::{ClientConfig, MemoryNavigator, Services, SessionStore};
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const USER_ID: i64 = 7;

/// Mock backend plus a client wired to it
pub struct Harness {
    pub server: MockServer,
    pub config: ClientConfig,
    pub session: SessionStore,
    pub navigator: Arc<MemoryNavigator>,
    pub services: Services,
}

impl Harness {
    pub async fn start() -> Self {
        Self::start_with(|config| config).await
    }

    pub async fn start_with(customize: impl FnOnce(ClientConfig) -> ClientConfig) -> Self {
        let server = MockServer::start().await;
        let config = customize(ClientConfig::new(format!("{}/api", server.uri())));
        let session = SessionStore::in_memory();
        let navigator = Arc::new(MemoryNavigator::new("/books"));
        let services = Services::connect(&config, session.clone(), navigator.clone())
            .expect("client should build");
        Self {
            server,
            config,
            session,
            navigator,
            services,
        }
    }

    /// Store a session for [`USER_ID`] without going through the backend
    pub fn login(&self) {
        self.session.set_session(&user(USER_ID)).unwrap();
    }

    pub async fn requests_to(&self, endpoint: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path() == endpoint)
            .count()
    }
}

pub fn user(id: i64) -> UserProfile {
    serde_json::from_value(json!({
        "id": id,
        "username": "reader",
        "name": "读者",
        "email": "reader@example.com",
        "role": "USER",
        "status": "ACTIVE"
    }))
    .unwrap()
}

pub fn book(id: i64, stock: i64, status: &str) -> Value {
    json!({
        "id": id,
        "title": format!("图书 {}", id),
        "author": "作者",
        "price": 39.5,
        "stock": stock,
        "status": status
    })
}

/// `{success: true, data, message}`
pub fn envelope(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(ApiResponse::ok_with_message(data, "操作成功"))
}

/// `{success: false, message}` with the given HTTP status
pub fn failure(status: u16, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(ApiResponse::<Value>::error(message))
}

pub async fn mount_get(server: &MockServer, endpoint: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(endpoint))
        .respond_with(response)
        .mount(server)
        .await;
}

/// Successful responses for every resource the state container loads
pub async fn mount_all_resources(server: &MockServer) {
    mount_get(server, "/api/books", envelope(json!([book(1, 5, "AVAILABLE"), book(2, 3, "AVAILABLE")]))).await;
    mount_get(
        server,
        "/api/users/7/cart",
        envelope(json!([{"id": 11, "quantity": 2, "book": book(1, 5, "AVAILABLE")}])),
    )
    .await;
    mount_get(
        server,
        "/api/users/7/orders",
        envelope(json!({"orders": [{"id": 100, "status": "待发货", "totalAmount": 79.0}]})),
    )
    .await;
    mount_get(server, "/api/users/7/favorites", envelope(json!([{"id": 2, "title": "图书 2", "author": "作者"}]))).await;
    mount_get(server, "/api/users/7", envelope(json!({"id": 7, "name": "读者", "email": "reader@example.com"}))).await;
}
