use serde::{Deserialize, Serialize};

/// Response for the liveness endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always "ok" while the process serves requests
    pub status: String,
    /// Crate version
    pub version: String,
    /// Number of cartoons currently in the catalog
    pub cartoons: usize,
    /// Time of the check, RFC 3339
    pub timestamp: String,
}
