//! HTTP client for the bookstore REST API
//!
//! Every call carries JSON headers, the session cookie jar and, when a user is
//! stored, an `X-User-Id` header. Responses are unwrapped from the
//! `{success, data, message}` envelope when present. A 401 tears the session
//! down and sends the navigator to the login route before the error returns.
//! Callers may pass header overrides; they replace defaults of the same name.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap};
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use shared::{Envelope, QueryParams};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::navigator::Navigator;
use crate::session::SessionStore;

/// Header carrying the session user id
pub const USER_ID_HEADER: &str = "X-User-Id";

/// Unprocessed response, for flows that interpret status and body themselves
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    /// Parsed body when the response was JSON
    pub body: Option<Value>,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// `success` field of an envelope body
    pub fn envelope_success(&self) -> bool {
        self.body
            .as_ref()
            .and_then(|b| b.get("success"))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// `message` field of the body, if any
    pub fn message(&self) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|b| b.get("message"))
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
    }

    /// First present, non-null field among `keys`
    pub fn field(&self, keys: &[&str]) -> Option<&Value> {
        let body = self.body.as_ref()?;
        keys.iter()
            .filter_map(|k| body.get(*k))
            .find(|v| !v.is_null())
    }
}

/// Serialize a request payload
pub fn to_body<B: Serialize>(body: &B) -> ClientResult<Value> {
    Ok(serde_json::to_value(body)?)
}

/// HTTP 客户端 trait
///
/// `request` returns `None` when the response carried no JSON payload
/// (non-JSON content type, `null`, or an envelope without data).
#[async_trait]
pub trait HttpClient: Send + Sync + std::fmt::Debug {
    /// Enveloped request with `headers` layered over the defaults
    async fn request_with_headers(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
        headers: HeaderMap,
    ) -> ClientResult<Option<Value>>;

    async fn request(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
    ) -> ClientResult<Option<Value>> {
        self.request_with_headers(method, endpoint, body, HeaderMap::new())
            .await
    }

    /// Send without envelope unwrapping or 401 handling
    async fn send_raw(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
    ) -> ClientResult<RawResponse>;

    async fn get(&self, endpoint: &str, params: &QueryParams) -> ClientResult<Option<Value>> {
        let url = params.apply_to(endpoint);
        self.request(Method::GET, &url, None).await
    }

    async fn post(&self, endpoint: &str, body: Value) -> ClientResult<Option<Value>> {
        self.request(Method::POST, endpoint, Some(body)).await
    }

    async fn put(&self, endpoint: &str, body: Value) -> ClientResult<Option<Value>> {
        self.request(Method::PUT, endpoint, Some(body)).await
    }

    async fn delete(&self, endpoint: &str) -> ClientResult<Option<Value>> {
        self.request(Method::DELETE, endpoint, None).await
    }
}

/// 网络 HTTP 客户端
#[derive(Debug, Clone)]
pub struct NetworkHttpClient {
    client: Client,
    base_url: String,
    session: SessionStore,
    navigator: Arc<dyn Navigator>,
    login_route: String,
}

impl NetworkHttpClient {
    pub fn new(
        config: &ClientConfig,
        session: SessionStore,
        navigator: Arc<dyn Navigator>,
    ) -> ClientResult<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
            navigator,
            login_route: config.login_route.clone(),
        })
    }

    /// 获取基础 URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    fn build(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&Value>,
        overrides: HeaderMap,
    ) -> reqwest::RequestBuilder {
        let url = self.url(endpoint);
        tracing::debug!(%method, %url, "API request");

        let mut req = self
            .client
            .request(method, &url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json");
        if let Some(user_id) = self.session.current_user_id() {
            req = req.header(USER_ID_HEADER, user_id.to_string());
        }
        if let Some(body) = body {
            req = req.json(body);
        }
        if !overrides.is_empty() {
            req = req.headers(overrides);
        }
        req
    }

    /// Clear local auth and bounce to the login route
    fn handle_unauthorized(&self) {
        tracing::warn!("Unauthorized response, clearing session");
        self.session.clear();
        if self.navigator.current_path() != self.login_route {
            self.navigator.navigate(&self.login_route);
        }
    }

    async fn handle_response(&self, response: reqwest::Response) -> ClientResult<Option<Value>> {
        let status = response.status();
        tracing::debug!(status = status.as_u16(), "API response");

        if !status.is_success() {
            if status == StatusCode::UNAUTHORIZED {
                self.handle_unauthorized();
                return Err(ClientError::Unauthorized);
            }
            let text = response.text().await.unwrap_or_default();
            let message = error_message(status, &text);
            tracing::warn!(status = status.as_u16(), %message, "HTTP error");
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        if !is_json(&response) {
            tracing::warn!(
                content_type = ?response.headers().get(CONTENT_TYPE),
                "Non-JSON response"
            );
            return Ok(None);
        }

        let bytes = response.bytes().await?;
        let body: Value = serde_json::from_slice(&bytes)
            .map_err(|e| ClientError::InvalidResponse(format!("malformed JSON body: {}", e)))?;
        unwrap_envelope(body)
    }
}

#[async_trait]
impl HttpClient for NetworkHttpClient {
    async fn request_with_headers(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
        headers: HeaderMap,
    ) -> ClientResult<Option<Value>> {
        let response = self
            .build(method, endpoint, body.as_ref(), headers)
            .send()
            .await?;
        self.handle_response(response).await
    }

    async fn send_raw(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
    ) -> ClientResult<RawResponse> {
        let response = self
            .build(method, endpoint, body.as_ref(), HeaderMap::new())
            .send()
            .await?;
        let status = response.status();
        let json = is_json(&response);
        let bytes = response.bytes().await?;
        let body = if json {
            serde_json::from_slice(&bytes).ok()
        } else {
            None
        };
        Ok(RawResponse { status, body })
    }
}

fn is_json(response: &reqwest::Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"))
}

/// Message from a JSON error body, else a generic status text
fn error_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_owned))
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| format!("HTTP错误: {}", status.as_u16()))
}

/// Apply envelope rules to a parsed success body
pub fn unwrap_envelope(body: Value) -> ClientResult<Option<Value>> {
    match Envelope::inspect(body) {
        Envelope::Success(data) => Ok(data),
        Envelope::Failure(message) => Err(ClientError::Api(message)),
        Envelope::Bare(Value::Null) => Ok(None),
        Envelope::Bare(value) => Ok(Some(value)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unwrap_envelope() {
        assert_eq!(
            unwrap_envelope(json!({"success": true, "data": {"id": 1}})).unwrap(),
            Some(json!({"id": 1}))
        );
        assert_eq!(unwrap_envelope(json!(null)).unwrap(), None);
        assert_eq!(unwrap_envelope(json!([1, 2])).unwrap(), Some(json!([1, 2])));

        let err = unwrap_envelope(json!({"success": false, "message": "图书不存在"})).unwrap_err();
        assert!(matches!(err, ClientError::Api(ref m) if m == "图书不存在"));
    }

    #[test]
    fn test_error_message() {
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, r#"{"message":"库存不足"}"#),
            "库存不足"
        );
        assert_eq!(
            error_message(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>"),
            "HTTP错误: 500"
        );
        assert_eq!(error_message(StatusCode::NOT_FOUND, r#"{"message":""}"#), "HTTP错误: 404");
    }

    #[test]
    fn test_raw_response_helpers() {
        let raw = RawResponse {
            status: StatusCode::OK,
            body: Some(json!({"success": true, "data": null, "user": {"id": 1}, "message": ""})),
        };
        assert!(raw.envelope_success());
        assert_eq!(raw.message(), None);
        assert_eq!(raw.field(&["data", "user"]), Some(&json!({"id": 1})));
    }
}
