//! Bookstore Client - typed client for the bookstore REST backend
//!
//! Layers, leaves first:
//! - [`http`]: envelope-aware HTTP client with 401 session teardown
//! - [`session`]: persisted identity of the logged-in user
//! - [`services`]: one wrapper per backend resource
//! - [`state`]: in-memory mirror of the user's data, refreshed after mutations
//! - [`guard`]: session gate for protected views

pub mod config;
pub mod error;
pub mod guard;
pub mod http;
pub mod logger;
pub mod navigator;
pub mod normalize;
pub mod services;
pub mod session;
pub mod state;

pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use guard::{GuardState, RouteGuard};
pub use http::{HttpClient, NetworkHttpClient};
pub use navigator::{MemoryNavigator, Navigator};
pub use services::Services;
pub use session::{SessionEvent, SessionStore};
pub use state::{AppData, AppState, CartAction, FavoriteAction, LoadReport, Phase, Resource, StateEvent};

// Re-export shared types for convenience
pub use shared;
