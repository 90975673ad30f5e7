//! REST API module
//!
//! This module provides the HTTP server and REST API endpoints including:
//! - Catalog routing and request handling
//! - API key middleware
//! - Rate limiting and security headers
//! - Response envelopes

pub mod server;
pub mod routes;
pub mod middleware;
pub mod handlers;
pub mod models;

pub use server::ApiServer;
pub use middleware::{request_id_middleware, RequestId, REQUEST_ID_HEADER};
