use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{error, info};

use crate::concurrency::shutdown::ShutdownRx;
use crate::reconcile::Reconcile;
use crate::types::ReconcileOutcome;

/// Handle of a running [`SyncScheduler`].
#[derive(Debug)]
pub struct SyncSchedulerHandle {
    join_handle: JoinHandle<()>,
}

impl SyncSchedulerHandle {
    /// Waits for the scheduler to stop after shutdown was signalled.
    pub async fn wait(self) {
        if let Err(err) = self.join_handle.await {
            error!(error = %err, "sync scheduler task panicked");
        }
    }
}

/// Runs a reconciliation on a fixed interval until shutdown.
///
/// The first run happens one interval after start. Scheduled runs bypass job
/// tracking: outcomes and failures are only logged.
pub struct SyncScheduler<R> {
    reconciler: Arc<R>,
    period: Duration,
    shutdown_rx: ShutdownRx,
}

impl<R> SyncScheduler<R>
where
    R: Reconcile + Send + Sync + 'static,
{
    pub fn new(reconciler: Arc<R>, period: Duration, shutdown_rx: ShutdownRx) -> Self {
        Self {
            reconciler,
            period,
            shutdown_rx,
        }
    }

    /// Starts the scheduler in a background task.
    pub fn start(self) -> SyncSchedulerHandle {
        let join_handle = tokio::spawn(self.run());
        SyncSchedulerHandle { join_handle }
    }

    async fn run(self) {
        info!(interval_secs = self.period.as_secs(), "starting sync scheduler");

        let mut ticker = interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown_rx.wait_for_shutdown() => {
                    info!("sync scheduler shutting down");
                    return;
                }
                _ = ticker.tick() => {
                    self.run_once().await;
                }
            }
        }
    }

    async fn run_once(&self) {
        match self.reconciler.reconcile().await {
            Ok(ReconcileOutcome::Completed(summary)) => info!(
                inserted = summary.inserted,
                updated = summary.updated,
                deleted = summary.deleted,
                "scheduled feed sync completed"
            ),
            Ok(ReconcileOutcome::Locked) => {
                info!("scheduled feed sync skipped, another sync holds the lock")
            }
            Err(err) => error!(error = %err, "scheduled feed sync failed"),
        }
    }
}
