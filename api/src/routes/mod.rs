use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod health_check;
pub mod openapi;
pub mod sync;

/// Body of every error response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorMessage {
    #[schema(example = "Job not found")]
    pub detail: String,
}
