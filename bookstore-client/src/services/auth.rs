// bookstore-client/src/services/auth.rs
// 认证服务 - 登录 / 注册 / 登出 / 会话校验

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde_json::Value;
use shared::models::{LoginRequest, RegisterRequest, UserProfile};

use crate::error::{ACCOUNT_DISABLED_MESSAGE, ClientError, ClientResult};
use crate::http::{HttpClient, RawResponse, to_body};
use crate::session::SessionStore;

const REGISTER_FAILED_MESSAGE: &str = "注册失败";

/// Markers in a login failure message that point at a disabled account
const DISABLED_MARKERS: &[&str] = &["禁用", "disabled", "DISABLED", "INACTIVE", "管理员"];

/// Auth endpoints are called without envelope/401 processing: a failed login
/// must not bounce the user back to the page they are already on.
#[derive(Debug, Clone)]
pub struct AuthService {
    http: Arc<dyn HttpClient>,
    session: SessionStore,
}

impl AuthService {
    pub fn new(http: Arc<dyn HttpClient>, session: SessionStore) -> Self {
        Self { http, session }
    }

    /// Log in and persist the session
    pub async fn login(&self, username: &str, password: &str) -> ClientResult<UserProfile> {
        tracing::info!(username, "Logging in");
        let body = to_body(&LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        })?;
        let resp = self.http.send_raw(Method::POST, "/auth/login", Some(body)).await?;

        if !(resp.is_success() && resp.envelope_success()) {
            return Err(login_failure(&resp));
        }

        let user = user_from(&resp)
            .ok_or_else(|| ClientError::InvalidResponse("login response carries no user".into()))?;
        if user.is_disabled() {
            tracing::warn!(user_id = user.id, status = ?user.status, "Login refused for disabled account");
            return Err(ClientError::AccountDisabled(ACCOUNT_DISABLED_MESSAGE.to_string()));
        }

        self.session.set_session(&user)?;
        tracing::info!(user_id = user.id, "Login succeeded");
        Ok(user)
    }

    /// Register a new account; returns the backend message
    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<String> {
        tracing::info!(username = %request.username, "Registering");
        let resp = self
            .http
            .send_raw(Method::POST, "/auth/register", Some(to_body(request)?))
            .await?;

        if resp.is_success() && resp.envelope_success() {
            Ok(resp.message().unwrap_or_default().to_string())
        } else {
            Err(ClientError::Api(
                resp.message().unwrap_or(REGISTER_FAILED_MESSAGE).to_string(),
            ))
        }
    }

    /// Log out remotely (best effort) and always clear the local session
    pub async fn logout(&self) {
        if let Err(e) = self.http.send_raw(Method::POST, "/auth/logout", None).await {
            tracing::warn!(error = %e, "Logout request failed, clearing local session anyway");
        }
        self.session.clear();
    }

    /// Ask the backend whether the session is still valid
    ///
    /// - `Ok(true)`: valid; the stored user is refreshed
    /// - `Ok(false)`: rejected (401 or `success: false`); the session is cleared
    /// - `Err`: endpoint unreachable or misbehaving; the session is untouched
    pub async fn validate_session(&self) -> ClientResult<bool> {
        let resp = self.http.send_raw(Method::GET, "/auth/validate", None).await?;

        if resp.status == StatusCode::UNAUTHORIZED {
            self.session.clear();
            return Ok(false);
        }
        if !resp.is_success() {
            return Err(ClientError::Status {
                status: resp.status.as_u16(),
                message: format!("session validation unavailable: HTTP {}", resp.status.as_u16()),
            });
        }
        if resp.body.is_none() {
            return Err(ClientError::InvalidResponse(
                "session validation returned no JSON".into(),
            ));
        }

        match user_from(&resp).filter(|_| resp.envelope_success()) {
            Some(user) => {
                self.session.refresh_user(&user)?;
                Ok(true)
            }
            None => {
                self.session.clear();
                Ok(false)
            }
        }
    }

    pub fn current_user(&self) -> Option<UserProfile> {
        self.session.current_user()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }
}

/// User from `data`, falling back to `user`
fn user_from(resp: &RawResponse) -> Option<UserProfile> {
    let value: &Value = resp.field(&["data", "user"])?;
    serde_json::from_value(value.clone())
        .map_err(|e| tracing::warn!(error = %e, "Unreadable user in auth response"))
        .ok()
}

fn login_failure(resp: &RawResponse) -> ClientError {
    // server trouble says nothing about the credentials
    if resp.status.is_server_error() {
        tracing::warn!(status = resp.status.as_u16(), "Login failed on the server side");
        return ClientError::Status {
            status: resp.status.as_u16(),
            message: resp
                .message()
                .map(str::to_owned)
                .unwrap_or_else(|| format!("HTTP错误: {}", resp.status.as_u16())),
        };
    }
    if resp.body.is_none() && resp.is_success() {
        return ClientError::InvalidResponse("login response is not JSON".into());
    }

    let message = resp.message().unwrap_or_default();
    let disabled = resp.status == StatusCode::FORBIDDEN
        || DISABLED_MARKERS.iter().any(|m| message.contains(m));

    if disabled {
        tracing::warn!(status = resp.status.as_u16(), message, "Login refused: account disabled");
        let message = if message.is_empty() {
            ACCOUNT_DISABLED_MESSAGE
        } else {
            message
        };
        ClientError::AccountDisabled(message.to_string())
    } else {
        tracing::info!(status = resp.status.as_u16(), "Login refused: bad credentials");
        ClientError::InvalidCredentials
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(status: u16, body: Value) -> RawResponse {
        RawResponse {
            status: StatusCode::from_u16(status).unwrap(),
            body: Some(body),
        }
    }

    #[test]
    fn test_login_failure_classification() {
        let err = login_failure(&raw(403, json!({"success": false})));
        assert!(matches!(err, ClientError::AccountDisabled(ref m) if m == ACCOUNT_DISABLED_MESSAGE));

        let err = login_failure(&raw(200, json!({"success": false, "message": "账户已被禁用"})));
        assert!(matches!(err, ClientError::AccountDisabled(ref m) if m == "账户已被禁用"));

        let err = login_failure(&raw(400, json!({"success": false, "message": "密码错误"})));
        assert!(matches!(err, ClientError::InvalidCredentials));
    }

    #[test]
    fn test_login_failure_server_side_is_not_credentials() {
        let err = login_failure(&RawResponse {
            status: StatusCode::BAD_GATEWAY,
            body: None,
        });
        assert!(matches!(err, ClientError::Status { status: 502, ref message } if message == "HTTP错误: 502"));

        let err = login_failure(&raw(500, json!({"success": false, "message": "数据库不可用"})));
        assert!(matches!(err, ClientError::Status { status: 500, ref message } if message == "数据库不可用"));

        let err = login_failure(&RawResponse {
            status: StatusCode::OK,
            body: None,
        });
        assert!(matches!(err, ClientError::InvalidResponse(_)));
    }

    #[test]
    fn test_user_from_prefers_data() {
        let resp = raw(200, json!({"success": true, "data": {"id": 1}, "user": {"id": 2}}));
        assert_eq!(user_from(&resp).map(|u| u.id), Some(1));

        let resp = raw(200, json!({"success": true, "user": {"id": 2}}));
        assert_eq!(user_from(&resp).map(|u| u.id), Some(2));
    }
}
