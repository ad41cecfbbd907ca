use std::time::Duration;

use config::shared::{FeedConfig, SyncConfig};

use crate::catalog::memory::MemoryCatalog;
use crate::destination::memory::MemoryDestination;
use crate::jobs::JobTracker;
use crate::lock::SyncLock;
use crate::mapping::RowMapper;
use crate::reconcile::Reconciler;
use crate::store::memory::MemoryStore;

pub type MemoryReconciler = Reconciler<MemoryCatalog, MemoryDestination, MemoryStore>;

/// A reconciler and job tracker wired to in-memory collaborators.
///
/// The collaborators are clones sharing state with the ones wired in, so a
/// test can seed and inspect them while the pipeline runs.
pub struct MemoryPipeline {
    pub catalog: MemoryCatalog,
    pub destination: MemoryDestination,
    pub store: MemoryStore,
    pub sync: SyncConfig,
}

impl MemoryPipeline {
    pub fn new(catalog: MemoryCatalog, destination: MemoryDestination) -> Self {
        Self {
            catalog,
            destination,
            store: MemoryStore::new(),
            sync: SyncConfig::default(),
        }
    }

    pub fn reconciler(&self) -> MemoryReconciler {
        let lock = SyncLock::new(
            self.store.clone(),
            self.sync.lock_key.clone(),
            Duration::from_secs(self.sync.lock_ttl_secs),
        );

        Reconciler::new(
            self.catalog.clone(),
            self.destination.clone(),
            lock,
            RowMapper::new(FeedConfig::default()),
        )
    }

    pub fn tracker(&self) -> JobTracker<MemoryStore> {
        JobTracker::new(
            self.store.clone(),
            self.sync.job_key_prefix.clone(),
            Duration::from_secs(self.sync.job_ttl_secs),
        )
    }
}
