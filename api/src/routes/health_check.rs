use actix_web::{Responder, get, web::Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthCheckResponse {
    #[schema(example = "ok")]
    pub status: String,
}

/// Liveness check. Always answers `{"status": "ok"}`.
#[utoipa::path(
    responses(
        (status = 200, description = "Service is alive", body = HealthCheckResponse)
    ),
    tag = "Health"
)]
#[get("/")]
pub async fn health_check() -> impl Responder {
    Json(HealthCheckResponse {
        status: "ok".to_string(),
    })
}
