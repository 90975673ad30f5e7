//! Record store module
//!
//! This module owns the in-memory catalog:
//! - Cartoon data model
//! - Repository trait and the in-memory store
//! - Dataset loading at startup

pub mod dataset;
pub mod models;
pub mod repository;

pub use models::{Cartoon, FieldValue, Genre};
pub use repository::{CartoonStore, Repository};
