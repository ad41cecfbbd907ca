use chrono::Utc;
use tracing::{error, info};

use crate::error::FeedResult;
use crate::jobs::JobTracker;
use crate::reconcile::Reconcile;
use crate::store::KeyValueStore;
use crate::types::{JobId, JobStatus, JobUpdate, ReconcileOutcome};

const STEP_STARTING: &str = "starting";
const STEP_SYNCING: &str = "syncing products";
const STEP_COMPLETED: &str = "completed";
const STEP_LOCKED: &str = "locked";

/// Runs one reconciliation for an already created job, recording its progress.
///
/// The job moves to `running`, then to `success` with the outcome as its
/// result, or to `failed` with the error message. A run that found the sync
/// lock held still succeeds, with step `locked`. Errors are returned after
/// they have been recorded.
pub async fn run_sync_job<R, S>(
    reconciler: &R,
    tracker: &JobTracker<S>,
    job_id: &JobId,
) -> FeedResult<ReconcileOutcome>
where
    R: Reconcile,
    S: KeyValueStore,
{
    tracker
        .update(
            job_id,
            JobUpdate::new()
                .status(JobStatus::Running)
                .started_at(Utc::now())
                .step(STEP_STARTING),
        )
        .await?;
    info!(%job_id, "sync job started");

    tracker
        .update(job_id, JobUpdate::new().step(STEP_SYNCING))
        .await?;

    let outcome = match reconciler.reconcile().await {
        Ok(outcome) => outcome,
        Err(err) => {
            let update = JobUpdate::new()
                .status(JobStatus::Failed)
                .error(err.message())
                .finished_at(Utc::now());
            if let Err(record_err) = tracker.update(job_id, update).await {
                error!(%job_id, error = %record_err, "failed to record sync job failure");
            }
            error!(%job_id, error = %err, "sync job failed");

            return Err(err);
        }
    };

    let result = serde_json::to_value(outcome)?;
    let step = match outcome {
        ReconcileOutcome::Completed(_) => STEP_COMPLETED,
        ReconcileOutcome::Locked => STEP_LOCKED,
    };
    tracker
        .update(
            job_id,
            JobUpdate::new()
                .status(JobStatus::Success)
                .finished_at(Utc::now())
                .step(step)
                .result(result),
        )
        .await?;
    info!(%job_id, step, "sync job finished");

    Ok(outcome)
}
