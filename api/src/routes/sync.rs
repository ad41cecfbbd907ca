use actix_web::{
    HttpResponse, Responder, ResponseError, get,
    http::StatusCode,
    post,
    web::{Data, Json, Path},
};
use chrono::{DateTime, Utc};
use feed::types::{JobId, JobRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;

use crate::routes::ErrorMessage;
use crate::service::{SyncService, SyncServiceError};

#[derive(Debug, Error)]
pub enum SyncJobError {
    #[error("Job not found")]
    JobNotFound(JobId),

    #[error(transparent)]
    SyncService(#[from] SyncServiceError),
}

impl SyncJobError {
    pub fn to_message(&self) -> String {
        match self {
            // Store failures stay in the logs.
            SyncJobError::SyncService(_) => "internal server error".to_string(),
            e => e.to_string(),
        }
    }
}

impl ResponseError for SyncJobError {
    fn status_code(&self) -> StatusCode {
        match self {
            SyncJobError::JobNotFound(_) => StatusCode::NOT_FOUND,
            SyncJobError::SyncService(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let SyncJobError::SyncService(err) = self {
            error!(error = %err, "sync job request failed");
        }

        HttpResponse::build(self.status_code()).json(ErrorMessage {
            detail: self.to_message(),
        })
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StartSyncResponse {
    #[schema(example = "1b4e28ba-2fa1-11d2-883f-0016d3cca427")]
    pub job_id: String,
    #[schema(example = "started")]
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReadSyncJobResponse {
    #[schema(example = "success")]
    pub status: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    #[schema(example = "completed")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Row counts of a completed sync, or `{"status": "locked"}`.
    #[schema(value_type = Option<Object>)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

impl From<JobRecord> for ReadSyncJobResponse {
    fn from(record: JobRecord) -> Self {
        Self {
            status: record.status.to_string(),
            created_at: record.created_at,
            started_at: record.started_at,
            finished_at: record.finished_at,
            step: record.step,
            error: record.error,
            result: record.result,
        }
    }
}

/// Starts a feed sync in the background and returns its job id for polling.
#[utoipa::path(
    responses(
        (status = 200, description = "Sync job scheduled", body = StartSyncResponse),
        (status = 500, description = "Internal server error", body = ErrorMessage)
    ),
    tag = "Sync"
)]
#[post("/sync")]
pub async fn start_sync(
    sync_service: Data<dyn SyncService>,
) -> Result<impl Responder, SyncJobError> {
    let job_id = sync_service.start_job().await?;

    Ok(Json(StartSyncResponse {
        job_id: job_id.to_string(),
        status: "started".to_string(),
    }))
}

/// Returns the record of a sync job.
#[utoipa::path(
    params(
        ("job_id" = String, Path, description = "Id returned when the job was started")
    ),
    responses(
        (status = 200, description = "Sync job found", body = ReadSyncJobResponse),
        (status = 404, description = "Sync job unknown or expired", body = ErrorMessage),
        (status = 500, description = "Internal server error", body = ErrorMessage)
    ),
    tag = "Sync"
)]
#[get("/sync/{job_id}")]
pub async fn read_sync_job(
    sync_service: Data<dyn SyncService>,
    job_id: Path<String>,
) -> Result<impl Responder, SyncJobError> {
    let job_id = JobId::from(job_id.into_inner());
    let record = sync_service
        .read_job(&job_id)
        .await?
        .ok_or(SyncJobError::JobNotFound(job_id))?;

    Ok(Json(ReadSyncJobResponse::from(record)))
}
