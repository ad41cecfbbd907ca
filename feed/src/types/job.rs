use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::bail;
use crate::error::{ErrorKind, FeedError, FeedResult};

const STATUS_FIELD: &str = "status";
const CREATED_AT_FIELD: &str = "created_at";
const STARTED_AT_FIELD: &str = "started_at";
const FINISHED_AT_FIELD: &str = "finished_at";
const STEP_FIELD: &str = "step";
const ERROR_FIELD: &str = "error";
const RESULT_FIELD: &str = "result";

/// Opaque identifier of a sync job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for JobId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state of a sync job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Running,
    Success,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Running => "running",
            JobStatus::Success => "success",
            JobStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Success | JobStatus::Failed)
    }

    /// Returns whether a job may move from `self` to `next`.
    ///
    /// Allowed: pending → running, running → success, running → failed.
    pub fn can_transition_to(&self, next: JobStatus) -> bool {
        matches!(
            (self, next),
            (JobStatus::Pending, JobStatus::Running)
                | (JobStatus::Running, JobStatus::Success)
                | (JobStatus::Running, JobStatus::Failed)
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(JobStatus::Pending),
            "running" => Ok(JobStatus::Running),
            "success" => Ok(JobStatus::Success),
            "failed" => Ok(JobStatus::Failed),
            other => bail!(
                ErrorKind::DeserializationError,
                "Unknown job status",
                other
            ),
        }
    }
}

/// Stored state of a sync job, as returned to pollers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobRecord {
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    /// Last phase the job reached, e.g. `syncing products`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}

impl JobRecord {
    /// Fields of a freshly created job.
    pub(crate) fn pending_fields(created_at: DateTime<Utc>) -> Vec<(String, String)> {
        vec![
            (STATUS_FIELD.to_string(), JobStatus::Pending.to_string()),
            (CREATED_AT_FIELD.to_string(), created_at.to_rfc3339()),
        ]
    }

    /// Rebuilds a record from its stored fields, decoding `result` from JSON text.
    pub(crate) fn from_fields(mut fields: HashMap<String, String>) -> FeedResult<Self> {
        let Some(status) = fields.remove(STATUS_FIELD) else {
            bail!(
                ErrorKind::DeserializationError,
                "Job record has no status"
            );
        };
        let Some(created_at) = fields.remove(CREATED_AT_FIELD) else {
            bail!(
                ErrorKind::DeserializationError,
                "Job record has no creation time"
            );
        };

        let result = match fields.remove(RESULT_FIELD) {
            Some(result) => Some(serde_json::from_str(&result)?),
            None => None,
        };

        Ok(Self {
            status: status.parse()?,
            created_at: parse_timestamp(&created_at)?,
            started_at: fields
                .remove(STARTED_AT_FIELD)
                .as_deref()
                .map(parse_timestamp)
                .transpose()?,
            finished_at: fields
                .remove(FINISHED_AT_FIELD)
                .as_deref()
                .map(parse_timestamp)
                .transpose()?,
            step: fields.remove(STEP_FIELD),
            error: fields.remove(ERROR_FIELD),
            result,
        })
    }
}

fn parse_timestamp(value: &str) -> FeedResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|err| {
            crate::feed_error!(
                ErrorKind::DeserializationError,
                "Job record has an invalid timestamp",
                format!("{value}: {err}")
            )
        })
}

/// Partial update of a job record. Only the fields that are set are written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobUpdate {
    pub status: Option<JobStatus>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub step: Option<String>,
    pub error: Option<String>,
    pub result: Option<Value>,
}

impl JobUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: JobStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn started_at(mut self, started_at: DateTime<Utc>) -> Self {
        self.started_at = Some(started_at);
        self
    }

    pub fn finished_at(mut self, finished_at: DateTime<Utc>) -> Self {
        self.finished_at = Some(finished_at);
        self
    }

    pub fn step(mut self, step: impl Into<String>) -> Self {
        self.step = Some(step.into());
        self
    }

    pub fn error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn result(mut self, result: Value) -> Self {
        self.result = Some(result);
        self
    }

    /// Encodes the set fields for storage. `result` is stored as JSON text.
    pub(crate) fn into_fields(self) -> FeedResult<Vec<(String, String)>> {
        let mut fields = Vec::with_capacity(6);

        if let Some(status) = self.status {
            fields.push((STATUS_FIELD.to_string(), status.to_string()));
        }
        if let Some(started_at) = self.started_at {
            fields.push((STARTED_AT_FIELD.to_string(), started_at.to_rfc3339()));
        }
        if let Some(finished_at) = self.finished_at {
            fields.push((FINISHED_AT_FIELD.to_string(), finished_at.to_rfc3339()));
        }
        if let Some(step) = self.step {
            fields.push((STEP_FIELD.to_string(), step));
        }
        if let Some(error) = self.error {
            fields.push((ERROR_FIELD.to_string(), error));
        }
        if let Some(result) = self.result {
            fields.push((RESULT_FIELD.to_string(), serde_json::to_string(&result)?));
        }

        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn only_forward_transitions_are_allowed() {
        assert!(JobStatus::Pending.can_transition_to(JobStatus::Running));
        assert!(JobStatus::Running.can_transition_to(JobStatus::Success));
        assert!(JobStatus::Running.can_transition_to(JobStatus::Failed));

        assert!(!JobStatus::Pending.can_transition_to(JobStatus::Success));
        assert!(!JobStatus::Success.can_transition_to(JobStatus::Running));
        assert!(!JobStatus::Failed.can_transition_to(JobStatus::Failed));
        assert!(!JobStatus::Running.can_transition_to(JobStatus::Running));
    }

    #[test]
    fn update_fields_round_trip_into_a_record() {
        let created_at = Utc::now();
        let mut fields: HashMap<String, String> =
            JobRecord::pending_fields(created_at).into_iter().collect();
        let update = JobUpdate::new()
            .status(JobStatus::Success)
            .step("completed")
            .result(json!({"inserted": 1, "updated": 2, "deleted": 3}));
        fields.extend(update.into_fields().unwrap());

        let record = JobRecord::from_fields(fields).unwrap();

        assert_eq!(record.status, JobStatus::Success);
        assert_eq!(record.created_at.timestamp(), created_at.timestamp());
        assert_eq!(record.step.as_deref(), Some("completed"));
        assert_eq!(record.result.unwrap()["updated"], 2);
        assert!(record.error.is_none());
    }

    #[test]
    fn unset_fields_are_omitted_from_json() {
        let record = JobRecord {
            status: JobStatus::Pending,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
            step: None,
            error: None,
            result: None,
        };

        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["status"], "pending");
        assert!(value.get("result").is_none());
        assert!(value.get("created_at").is_some());
    }

    #[test]
    fn unknown_status_is_rejected() {
        let fields = HashMap::from([
            ("status".to_string(), "paused".to_string()),
            ("created_at".to_string(), Utc::now().to_rfc3339()),
        ]);

        let err = JobRecord::from_fields(fields).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::DeserializationError);
    }
}
