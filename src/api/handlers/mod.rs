pub mod cartoons;
pub mod system;

pub use cartoons::*;
pub use system::*;

use crate::store::CartoonStore;
use std::sync::Arc;

/// Shared application state for handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<CartoonStore>,
}

impl AppState {
    pub fn new(store: Arc<CartoonStore>) -> Self {
        Self { store }
    }
}
