//! Client configuration

use std::path::PathBuf;

use crate::error::{ClientError, ClientResult};

/// Client configuration for connecting to the bookstore backend
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | BOOKSTORE_API_URL | http://localhost:8080/api | 后端 API 根地址 |
/// | BOOKSTORE_TIMEOUT_SECS | 30 | 请求超时(秒) |
/// | BOOKSTORE_LOGIN_ROUTE | /login | 401 时跳转的登录页路径 |
/// | BOOKSTORE_PAGE_SIZE | 100 | 图书列表备用查询的分页大小 |
/// | BOOKSTORE_SESSION_FILE | (未设置) | 会话持久化文件，未设置时仅保存在内存 |
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API base URL, including the `/api` prefix
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Route the navigator is sent to when the session is rejected
    pub login_route: String,

    /// Page size used by the fallback book listing
    pub fallback_page_size: u32,

    /// JSON file backing the session storage
    pub session_file: Option<PathBuf>,
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: 30,
            login_route: "/login".to_string(),
            fallback_page_size: 100,
            session_file: None,
        }
    }

    /// 从环境变量加载配置 (先读取 .env，不存在时忽略)
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        let defaults = Self::default();
        Self {
            base_url: std::env::var("BOOKSTORE_API_URL").unwrap_or(defaults.base_url),
            timeout: std::env::var("BOOKSTORE_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.timeout),
            login_route: std::env::var("BOOKSTORE_LOGIN_ROUTE").unwrap_or(defaults.login_route),
            fallback_page_size: std::env::var("BOOKSTORE_PAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.fallback_page_size),
            session_file: std::env::var("BOOKSTORE_SESSION_FILE")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        }
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout = seconds;
        self
    }

    /// Set the login route
    pub fn with_login_route(mut self, route: impl Into<String>) -> Self {
        self.login_route = route.into();
        self
    }

    /// Set the fallback page size
    pub fn with_fallback_page_size(mut self, size: u32) -> Self {
        self.fallback_page_size = size;
        self
    }

    /// Persist the session to a JSON file
    pub fn with_session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_file = Some(path.into());
        self
    }

    /// Check the configuration before building clients from it
    pub fn validate(&self) -> ClientResult<()> {
        let url = self.base_url.trim();
        if url.is_empty() {
            return Err(ClientError::Config("base_url is empty".into()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ClientError::Config(format!(
                "base_url must use http or https: {}",
                url
            )));
        }
        if self.timeout == 0 {
            return Err(ClientError::Config("timeout must be positive".into()));
        }
        if !self.login_route.starts_with('/') {
            return Err(ClientError::Config(format!(
                "login_route must be an absolute path: {}",
                self.login_route
            )));
        }
        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:8080/api")
    }
}
