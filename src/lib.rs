//! Cartoon Catalog Library
//!
//! An in-memory cartoon catalog served over a small REST API with search,
//! filtering, sorting and pagination.

pub mod api;
pub mod core;
pub mod store;

// Re-export commonly used types
pub use api::ApiServer;
pub use crate::core::{Config, ListQuery, PageResult};
pub use store::{Cartoon, CartoonStore, Repository};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Result type alias for the library
pub type Result<T> = anyhow::Result<T>;
