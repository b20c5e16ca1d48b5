//! Domain services
//!
//! One thin wrapper per backend resource. Services shape requests and
//! normalize responses; errors propagate untouched to the caller.

mod auth;
mod book;
mod cart;
mod order;
mod statistics;
mod user;

pub use auth::AuthService;
pub use book::BookService;
pub use cart::CartService;
pub use order::OrderService;
pub use statistics::StatisticsService;
pub use user::UserService;

use std::sync::Arc;

use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::http::{HttpClient, NetworkHttpClient};
use crate::navigator::Navigator;
use crate::session::SessionStore;

/// Every service over one HTTP client and session
#[derive(Debug, Clone)]
pub struct Services {
    pub auth: AuthService,
    pub books: BookService,
    pub cart: CartService,
    pub orders: OrderService,
    pub users: UserService,
    pub statistics: StatisticsService,
    session: SessionStore,
}

impl Services {
    pub fn new(http: Arc<dyn HttpClient>, session: SessionStore) -> Self {
        Self {
            auth: AuthService::new(http.clone(), session.clone()),
            books: BookService::new(http.clone()),
            cart: CartService::new(http.clone(), session.clone()),
            orders: OrderService::new(http.clone(), session.clone()),
            users: UserService::new(http.clone()),
            statistics: StatisticsService::new(http),
            session,
        }
    }

    /// Build the network client from `config` and wire every service to it
    pub fn connect(
        config: &ClientConfig,
        session: SessionStore,
        navigator: Arc<dyn Navigator>,
    ) -> ClientResult<Self> {
        let http = NetworkHttpClient::new(config, session.clone(), navigator)?;
        tracing::info!(base_url = %http.base_url(), "Bookstore client ready");
        Ok(Self::new(Arc::new(http), session))
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }
}
