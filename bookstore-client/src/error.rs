//! Client error types

use thiserror::Error;

/// Default message for a rejected login that is not an account problem
pub const INVALID_CREDENTIALS_MESSAGE: &str = "用户名或密码不正确，请检查输入";
/// Default message for a disabled account
pub const ACCOUNT_DISABLED_MESSAGE: &str = "账户已被禁用，请联系管理员";

/// Client error type
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport failure (connection refused, timeout, TLS, ...)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx HTTP status
    #[error("{message}")]
    Status { status: u16, message: String },

    /// Envelope reported `success: false`
    #[error("{0}")]
    Api(String),

    /// Response body did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Session rejected by the backend (HTTP 401)
    #[error("未授权访问，请重新登录")]
    Unauthorized,

    /// Login refused because the account is disabled
    #[error("{0}")]
    AccountDisabled(String),

    /// Login refused for wrong username or password
    #[error("{}", INVALID_CREDENTIALS_MESSAGE)]
    InvalidCredentials,

    /// A user-scoped call was made without a session
    #[error("用户未登录")]
    NotLoggedIn,

    /// Client-side precondition failed before any request was sent
    #[error("Validation error: {0}")]
    Validation(String),

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Session storage I/O failed
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// HTTP status associated with the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Unauthorized => Some(401),
            ClientError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Errors that mean the user has to (re)authenticate
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            ClientError::Unauthorized
                | ClientError::AccountDisabled(_)
                | ClientError::InvalidCredentials
                | ClientError::NotLoggedIn
        )
    }

    /// Errors raised before anything was sent over the wire
    pub fn is_precondition(&self) -> bool {
        matches!(self, ClientError::NotLoggedIn | ClientError::Validation(_))
    }
}

impl From<shared::models::InvalidBookStatus> for ClientError {
    fn from(err: shared::models::InvalidBookStatus) -> Self {
        ClientError::Validation(err.to_string())
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
