//! Shared types for the bookstore client
//!
//! Domain models, the response envelope and query-string types used by
//! `bookstore-client`.

pub mod models;
pub mod request;
pub mod response;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use models::*;
pub use request::{AdminOrderQuery, BookQuery, DateRange, OrderQuery, QueryParams, SalesPeriod};
pub use response::{ApiResponse, Envelope};
