// bookstore-client/tests/http_client.rs
// HTTP 客户端集成测试 - 信封解析、401 处理、请求头与查询参数

mod common;

use bookstore_client::http::{HttpClient, USER_ID_HEADER};
use bookstore_client::navigator::Navigator;
use bookstore_client::shared::{BookQuery, QueryParams};
use bookstore_client::ClientError;
use common::{Harness, USER_ID, book, envelope, failure, mount_get};
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn test_unauthorized_clears_session_and_redirects() {
    let h = Harness::start().await;
    h.login();
    mount_get(&h.server, "/api/users/7/cart", ResponseTemplate::new(401)).await;

    let err = h.services.cart.get_cart().await.unwrap_err();

    assert!(matches!(err, ClientError::Unauthorized));
    assert!(!h.session.is_authenticated());
    assert!(h.session.current_user().is_none());
    assert_eq!(h.navigator.current_path(), "/login");
}

#[tokio::test]
async fn test_unauthorized_on_login_route_does_not_navigate() {
    let h = Harness::start_with(|c| c.with_login_route("/books")).await;
    h.login();
    mount_get(&h.server, "/api/books", ResponseTemplate::new(401)).await;

    let err = h.services.books.get_all_books().await.unwrap_err();

    assert!(matches!(err, ClientError::Unauthorized));
    assert!(!h.session.is_authenticated());
    assert_eq!(h.navigator.history(), vec!["/books".to_string()]);
}

#[tokio::test]
async fn test_envelope_failure_surfaces_message() {
    let h = Harness::start().await;
    mount_get(&h.server, "/api/books/9", failure(200, "图书不存在")).await;

    let err = h.services.books.get_book(9).await.unwrap_err();
    assert!(matches!(err, ClientError::Api(ref m) if m == "图书不存在"));
}

#[tokio::test]
async fn test_bare_json_is_returned_as_is() {
    let h = Harness::start().await;
    mount_get(
        &h.server,
        "/api/books/3",
        ResponseTemplate::new(200).set_body_json(book(3, 4, "AVAILABLE")),
    )
    .await;

    let book = h.services.books.get_book(3).await.unwrap();
    assert_eq!(book.id, 3);
    assert_eq!(book.stock, 4);
}

#[tokio::test]
async fn test_non_json_response_is_empty() {
    let h = Harness::start().await;
    mount_get(&h.server, "/api/books", ResponseTemplate::new(200).set_body_string("<html></html>")).await;

    let value = h.services.books.get_all_books().await.unwrap();
    assert!(value.is_empty());
}

#[tokio::test]
async fn test_malformed_json_is_invalid_response() {
    let h = Harness::start().await;
    mount_get(
        &h.server,
        "/api/books",
        ResponseTemplate::new(200).set_body_raw("{oops", "application/json"),
    )
    .await;

    let err = h.services.books.get_all_books().await.unwrap_err();
    assert!(matches!(err, ClientError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_http_error_uses_body_message() {
    let h = Harness::start().await;
    mount_get(
        &h.server,
        "/api/books",
        ResponseTemplate::new(500).set_body_json(json!({"message": "服务器内部错误"})),
    )
    .await;
    mount_get(&h.server, "/api/books/available", ResponseTemplate::new(503)).await;

    let err = h.services.books.get_all_books().await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(err.to_string(), "服务器内部错误");

    let err = h.services.books.get_available_books().await.unwrap_err();
    assert_eq!(err.to_string(), "HTTP错误: 503");
}

#[tokio::test]
async fn test_user_id_header_sent_when_logged_in() {
    let h = Harness::start().await;
    Mock::given(method("GET"))
        .and(path("/api/books/categories"))
        .and(header(USER_ID_HEADER, USER_ID.to_string().as_str()))
        .respond_with(envelope(json!(["小说", "历史"])))
        .expect(1)
        .mount(&h.server)
        .await;

    // anonymous call does not match the header matcher
    let err = h.services.books.get_categories().await.unwrap_err();
    assert_eq!(err.status(), Some(404));

    h.login();
    let categories = h.services.books.get_categories().await.unwrap();
    assert_eq!(categories, vec!["小说".to_string(), "历史".to_string()]);
}

#[tokio::test]
async fn test_absent_query_params_are_stripped() {
    let h = Harness::start().await;
    mount_get(&h.server, "/api/books", envelope(json!([]))).await;

    let query = BookQuery {
        search: Some(String::new()),
        category: None,
        page: Some(0),
        size: Some(10),
    };
    h.services.books.get_books(&query).await.unwrap();

    let requests = h.server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.query(), Some("page=0&size=10"));
}

#[tokio::test]
async fn test_raw_requests_skip_envelope_and_teardown() {
    let h = Harness::start().await;
    h.login();
    mount_get(&h.server, "/api/auth/validate", failure(401, "expired")).await;

    let http = bookstore_client::NetworkHttpClient::new(&h.config, h.session.clone(), h.navigator.clone())
        .unwrap();
    let raw = http
        .send_raw(reqwest::Method::GET, "/auth/validate", None)
        .await
        .unwrap();

    assert_eq!(raw.status.as_u16(), 401);
    assert_eq!(raw.message(), Some("expired"));
    assert!(h.session.is_authenticated());

    // the enveloped path on the same client does tear down
    let err = http.get("/auth/validate", &QueryParams::new()).await.unwrap_err();
    assert!(matches!(err, ClientError::Unauthorized));
    assert!(!h.session.is_authenticated());
}

#[tokio::test]
async fn test_header_overrides_replace_defaults() {
    let h = Harness::start().await;
    h.login();
    Mock::given(method("GET"))
        .and(path("/api/books/categories"))
        .and(header(USER_ID_HEADER, "99"))
        .and(header("accept", "application/vnd.bookstore+json"))
        .and(header("x-request-source", "storefront"))
        .respond_with(envelope(json!(["小说"])))
        .expect(1)
        .mount(&h.server)
        .await;

    let mut overrides = HeaderMap::new();
    overrides.insert(USER_ID_HEADER, HeaderValue::from_static("99"));
    overrides.insert(ACCEPT, HeaderValue::from_static("application/vnd.bookstore+json"));
    overrides.insert("x-request-source", HeaderValue::from_static("storefront"));

    let http = bookstore_client::NetworkHttpClient::new(&h.config, h.session.clone(), h.navigator.clone())
        .unwrap();
    let data = http
        .request_with_headers(reqwest::Method::GET, "/books/categories", None, overrides)
        .await
        .unwrap();

    assert_eq!(data, Some(json!(["小说"])));
}
