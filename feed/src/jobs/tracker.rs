use std::time::Duration;

use chrono::Utc;
use tracing::debug;

use crate::bail;
use crate::error::{ErrorKind, FeedResult};
use crate::store::KeyValueStore;
use crate::types::{JobId, JobRecord, JobUpdate};

/// Persists the lifecycle of sync jobs in the key-value store.
///
/// Each job is a hash under `{key_prefix}:{job_id}` that expires a fixed time
/// after creation. Updates never extend that expiry.
#[derive(Debug, Clone)]
pub struct JobTracker<S> {
    store: S,
    key_prefix: String,
    ttl: Duration,
}

impl<S> JobTracker<S>
where
    S: KeyValueStore,
{
    pub fn new(store: S, key_prefix: impl Into<String>, ttl: Duration) -> Self {
        Self {
            store,
            key_prefix: key_prefix.into(),
            ttl,
        }
    }

    fn key(&self, job_id: &JobId) -> String {
        format!("{}:{}", self.key_prefix, job_id)
    }

    /// Records a new pending job.
    pub async fn create(&self, job_id: &JobId) -> FeedResult<()> {
        let fields = JobRecord::pending_fields(Utc::now());
        self.store
            .hash_set(&self.key(job_id), fields, self.ttl)
            .await?;
        debug!(%job_id, "created sync job");

        Ok(())
    }

    /// Merges `update` into the job's record.
    ///
    /// Fails with [`ErrorKind::InvalidState`] when the job does not exist or
    /// the update moves it along a transition its state does not allow.
    pub async fn update(&self, job_id: &JobId, update: JobUpdate) -> FeedResult<()> {
        let Some(current) = self.get(job_id).await? else {
            bail!(
                ErrorKind::InvalidState,
                "Sync job does not exist",
                job_id
            );
        };

        if let Some(next) = update.status {
            if next == current.status && current.status.is_terminal() {
                bail!(
                    ErrorKind::InvalidState,
                    "Sync job already finished",
                    format!("{job_id}: {}", current.status)
                );
            }
            if next != current.status && !current.status.can_transition_to(next) {
                bail!(
                    ErrorKind::InvalidState,
                    "Illegal sync job transition",
                    format!("{job_id}: {} -> {next}", current.status)
                );
            }
        }

        // The job may expire after the read above; the store never recreates it.
        let updated = self
            .store
            .hash_update(&self.key(job_id), update.into_fields()?)
            .await?;
        if !updated {
            bail!(
                ErrorKind::InvalidState,
                "Sync job does not exist",
                job_id
            );
        }

        Ok(())
    }

    /// Returns the job's record, or `None` when it is unknown or has expired.
    pub async fn get(&self, job_id: &JobId) -> FeedResult<Option<JobRecord>> {
        let fields = self.store.hash_get_all(&self.key(job_id)).await?;
        if fields.is_empty() {
            return Ok(None);
        }

        JobRecord::from_fields(fields).map(Some)
    }
}
