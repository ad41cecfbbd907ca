//! Reconciliation of the catalog into the feed sheet.
//!
//! One pass reads both sides, plans every insert, update and delete up front,
//! then applies them: inserts in a single append, updates one row at a time,
//! and deletes last, from the bottom row up so that each delete leaves the
//! positions of the remaining stale rows unchanged. The whole pass runs under
//! the sync lock.

use std::collections::HashSet;
use std::future::Future;

use tracing::{error, info, warn};

use crate::bail;
use crate::catalog::CatalogReader;
use crate::destination::{Destination, DestinationIndex, build_index};
use crate::error::{ErrorKind, FeedResult};
use crate::lock::SyncLock;
use crate::mapping::RowMapper;
use crate::store::KeyValueStore;
use crate::types::{Product, ProductId, ReconcileOutcome, SyncSummary};

/// Entry point shared by the HTTP-triggered jobs and the recurring scheduler.
pub trait Reconcile {
    /// Runs one reconciliation, or reports [`ReconcileOutcome::Locked`] without
    /// touching the feed when another run holds the sync lock.
    fn reconcile(&self) -> impl Future<Output = FeedResult<ReconcileOutcome>> + Send;
}

/// Row operations computed from one snapshot of the catalog and the feed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncPlan {
    /// New rows, in catalog order.
    pub inserts: Vec<Vec<String>>,
    /// Rewritten rows with their sheet row, in catalog order.
    pub updates: Vec<(u32, Vec<String>)>,
    /// Sheet rows of products no longer active, bottom row first.
    pub deletes: Vec<u32>,
}

impl SyncPlan {
    /// Plans the operations turning the indexed feed into `products`.
    ///
    /// Each product is mapped against `headers`. Products already in `existing`
    /// become updates, the rest inserts. A product id seen twice keeps its first
    /// occurrence. Indexed rows whose id is not among the products are deleted.
    pub fn build(
        mapper: &RowMapper,
        headers: &[String],
        existing: &DestinationIndex,
        products: &[Product],
    ) -> Self {
        let mut plan = SyncPlan::default();
        let mut active: HashSet<&ProductId> = HashSet::with_capacity(products.len());

        for product in products {
            if !active.insert(&product.id) {
                warn!(id = %product.id, "skipping duplicate product id from catalog");
                continue;
            }

            let row = mapper.build_row(product, headers);
            match existing.get(&product.id) {
                Some(&position) => plan.updates.push((position, row)),
                None => plan.inserts.push(row),
            }
        }

        plan.deletes = existing
            .iter()
            .filter(|(id, _)| !active.contains(id))
            .map(|(_, &position)| position)
            .collect();
        plan.deletes.sort_unstable_by(|a, b| b.cmp(a));

        plan
    }

    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty() && self.updates.is_empty() && self.deletes.is_empty()
    }
}

/// Reconciles a catalog into a destination under a [`SyncLock`].
#[derive(Debug)]
pub struct Reconciler<C, D, S> {
    catalog: C,
    destination: D,
    lock: SyncLock<S>,
    mapper: RowMapper,
}

impl<C, D, S> Reconciler<C, D, S>
where
    C: CatalogReader,
    D: Destination,
    S: KeyValueStore,
{
    pub fn new(catalog: C, destination: D, lock: SyncLock<S>, mapper: RowMapper) -> Self {
        Self {
            catalog,
            destination,
            lock,
            mapper,
        }
    }

    /// Reads both sides and applies the resulting plan. Expects the lock to be held.
    async fn sync(&self) -> FeedResult<SyncSummary> {
        let headers = self.destination.read_header_row().await?;
        if headers.is_empty() {
            bail!(
                ErrorKind::DestinationSchemaError,
                "Feed sheet has no header row"
            );
        }

        let records = self.destination.read_records().await?;
        let existing = build_index(&headers, &records)?;
        let next_row = records.last().map_or(2, |record| record.row + 1);
        let products = self.catalog.read_active_products().await?;

        let plan = SyncPlan::build(&self.mapper, &headers, &existing, &products);
        if plan.is_empty() {
            info!("feed sheet is empty and so is the catalog, nothing to sync");
            return Ok(SyncSummary::default());
        }
        info!(
            products = products.len(),
            existing_rows = existing.len(),
            inserts = plan.inserts.len(),
            updates = plan.updates.len(),
            deletes = plan.deletes.len(),
            next_row,
            "computed feed sync plan"
        );

        self.apply(plan, next_row).await
    }

    async fn apply(&self, plan: SyncPlan, next_row: u32) -> FeedResult<SyncSummary> {
        let mut summary = SyncSummary::default();

        if !plan.inserts.is_empty() {
            let inserted = plan.inserts.len() as u64;
            self.destination.append_rows(next_row, plan.inserts).await?;
            summary.inserted = inserted;
        }

        for (position, row) in plan.updates {
            self.destination.update_row(position, row).await?;
            summary.updated += 1;
        }

        for position in plan.deletes {
            self.destination.delete_row(position).await?;
            summary.deleted += 1;
        }

        Ok(summary)
    }
}

impl<C, D, S> Reconcile for Reconciler<C, D, S>
where
    C: CatalogReader + Sync,
    D: Destination + Sync,
    S: KeyValueStore + Sync,
{
    async fn reconcile(&self) -> FeedResult<ReconcileOutcome> {
        let Some(token) = self.lock.acquire().await? else {
            info!(lock = %self.lock.key(), "feed sync already running, skipping");
            return Ok(ReconcileOutcome::Locked);
        };

        info!("starting feed sync");
        let result = self.sync().await;

        match self.lock.release(&token).await {
            Ok(true) => {}
            Ok(false) => warn!(lock = %self.lock.key(), "sync lock expired before release"),
            Err(err) => error!(lock = %self.lock.key(), error = %err, "failed to release sync lock"),
        }

        match result {
            Ok(summary) => {
                info!(
                    inserted = summary.inserted,
                    updated = summary.updated,
                    deleted = summary.deleted,
                    "feed sync completed"
                );
                Ok(ReconcileOutcome::Completed(summary))
            }
            Err(err) => {
                warn!(error = %err, "feed sync failed");
                Err(err)
            }
        }
    }
}
