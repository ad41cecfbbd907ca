use std::sync::Arc;

use async_trait::async_trait;
use feed::error::FeedError;
use feed::jobs::{JobTracker, run_sync_job};
use feed::reconcile::Reconcile;
use feed::store::KeyValueStore;
use feed::types::{JobId, JobRecord};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum SyncServiceError {
    #[error(transparent)]
    Feed(#[from] FeedError),
}

/// Starts tracked sync jobs and reads their records.
#[async_trait]
pub trait SyncService: Send + Sync {
    /// Creates a pending job and schedules its reconciliation in the background.
    ///
    /// Returns once the job record exists, before the reconciliation runs.
    async fn start_job(&self) -> Result<JobId, SyncServiceError>;

    /// Returns the job's record, or `None` when it is unknown or expired.
    async fn read_job(&self, job_id: &JobId) -> Result<Option<JobRecord>, SyncServiceError>;
}

/// [`SyncService`] running jobs as Tokio tasks against a shared reconciler.
pub struct FeedSyncService<R, S> {
    reconciler: Arc<R>,
    tracker: JobTracker<S>,
}

impl<R, S> FeedSyncService<R, S> {
    pub fn new(reconciler: Arc<R>, tracker: JobTracker<S>) -> Self {
        Self {
            reconciler,
            tracker,
        }
    }
}

#[async_trait]
impl<R, S> SyncService for FeedSyncService<R, S>
where
    R: Reconcile + Send + Sync + 'static,
    S: KeyValueStore + Clone + Send + Sync + 'static,
{
    async fn start_job(&self) -> Result<JobId, SyncServiceError> {
        let job_id = JobId::generate();
        self.tracker.create(&job_id).await?;

        let reconciler = self.reconciler.clone();
        let tracker = self.tracker.clone();
        let task_job_id = job_id.clone();
        tokio::spawn(async move {
            // Failures are recorded on the job by the runner.
            if let Err(err) = run_sync_job(reconciler.as_ref(), &tracker, &task_job_id).await {
                warn!(job_id = %task_job_id, error = %err, "sync job ended with an error");
            }
        });
        info!(%job_id, "sync job scheduled");

        Ok(job_id)
    }

    async fn read_job(&self, job_id: &JobId) -> Result<Option<JobRecord>, SyncServiceError> {
        Ok(self.tracker.get(job_id).await?)
    }
}
