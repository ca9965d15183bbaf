//! Request DTOs for Web API.

use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

/// Upper bound accepted for `limit`.
pub const MAX_LIST_LIMIT: usize = 10_000;

/// Query parameters for listings.
#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Maximum number of entries to return.
    #[validate(range(min = 1, max = MAX_LIST_LIMIT, message = "limit must be between 1 and 10000"))]
    pub limit: Option<usize>,
}
