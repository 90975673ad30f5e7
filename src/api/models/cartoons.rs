use crate::core::query::PageResult;
use crate::store::Cartoon;
use serde::{Deserialize, Serialize};

pub const LIST_MESSAGE: &str = "Cartoons retrieved successfully!";
pub const FOUND_MESSAGE: &str = "cartoon retrieved successfully!";
pub const NOT_FOUND_MESSAGE: &str = "cartoon not found!";
pub const REMOVED_MESSAGE: &str = "cartoon removed successfully!";
pub const DELETE_NOT_FOUND_MESSAGE: &str = "cartoon not found with given id!";

/// Response for `GET /cartoons`
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartoonListResponse {
    pub message: String,
    /// Matches after filtering and search, ignoring pagination
    pub total_cartoons: usize,
    pub page: usize,
    pub limit: usize,
    pub has_next: bool,
    pub has_previous: bool,
    pub success: bool,
    pub data: Vec<Cartoon>,
}

impl From<PageResult> for CartoonListResponse {
    fn from(result: PageResult) -> Self {
        Self {
            message: LIST_MESSAGE.to_string(),
            total_cartoons: result.total,
            page: result.page,
            limit: result.limit,
            has_next: result.has_next,
            has_previous: result.has_previous,
            success: true,
            data: result.items,
        }
    }
}

/// Response for `GET /cartoons/:id`
#[derive(Debug, Serialize, Deserialize)]
pub struct CartoonResponse {
    pub success: bool,
    pub data: Cartoon,
    pub message: String,
}

impl From<Cartoon> for CartoonResponse {
    fn from(cartoon: Cartoon) -> Self {
        Self {
            success: true,
            data: cartoon,
            message: FOUND_MESSAGE.to_string(),
        }
    }
}

/// Response for `DELETE /cartoons/:id`
///
/// `cartoons` is the whole remaining catalog, not a page of it.
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteCartoonResponse {
    pub message: String,
    pub cartoons: Vec<Cartoon>,
}

impl DeleteCartoonResponse {
    pub fn new(remaining: Vec<Cartoon>) -> Self {
        Self {
            message: REMOVED_MESSAGE.to_string(),
            cartoons: remaining,
        }
    }
}
