pub mod auth;
pub mod rate_limit;
pub mod security;
pub mod trace;

pub use auth::*;
pub use rate_limit::*;
pub use security::*;
pub use trace::*;
