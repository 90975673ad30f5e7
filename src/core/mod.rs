//! Core application layer
//!
//! This module provides:
//! - The list query pipeline (filter, sort, search, paginate)
//! - Configuration management
//! - Structured logging system
//! - Error handling and type system

pub mod config;
pub mod error;
pub mod logging;
pub mod query;

pub use config::Config;
pub use error::{CatalogError, ErrorResponse, Result};
pub use logging::Logger;
pub use query::{ListQuery, PageResult, SortDirection, SortSpec};
