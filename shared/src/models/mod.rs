//! Data models
//!
//! Shapes consumed from the bookstore REST backend (camelCase JSON).
//! All IDs are `i64`.

pub mod book;
pub mod cart;
pub mod favorite;
pub mod order;
pub mod user;

// Re-exports
pub use book::*;
pub use cart::*;
pub use favorite::*;
pub use order::*;
pub use user::*;
