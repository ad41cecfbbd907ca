use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Counts of the row operations one reconciliation applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSummary {
    pub inserted: u64,
    pub updated: u64,
    /// Number of stale rows actually deleted.
    pub deleted: u64,
}

/// Result of a reconciliation attempt.
///
/// Serializes to the summary counts, or to `{"status": "locked"}` when another
/// run held the sync lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Completed(SyncSummary),
    Locked,
}

impl ReconcileOutcome {
    pub fn is_locked(&self) -> bool {
        matches!(self, ReconcileOutcome::Locked)
    }
}

impl Serialize for ReconcileOutcome {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            ReconcileOutcome::Completed(summary) => summary.serialize(serializer),
            ReconcileOutcome::Locked => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("status", "locked")?;
                map.end()
            }
        }
    }
}
