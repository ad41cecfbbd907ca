use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use crate::error::FeedResult;

/// Key-value store holding the sync lock and job records.
///
/// Keys hold either a plain value or a hash of fields. Expired keys behave as
/// if they were never written.
pub trait KeyValueStore {
    /// Sets `key` to `value` with an expiry unless the key already exists.
    ///
    /// Returns `true` when this call created the key.
    fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> impl Future<Output = FeedResult<bool>> + Send;

    /// Deletes `key` only if it currently holds `value`, as a single atomic step.
    ///
    /// Returns `true` when the key was deleted.
    fn delete_if_equals(
        &self,
        key: &str,
        value: &str,
    ) -> impl Future<Output = FeedResult<bool>> + Send;

    /// Writes `fields` into the hash at `key` and sets its expiry to `ttl`.
    fn hash_set(
        &self,
        key: &str,
        fields: Vec<(String, String)>,
        ttl: Duration,
    ) -> impl Future<Output = FeedResult<()>> + Send;

    /// Merges `fields` into the hash at `key` only if the key exists, keeping its expiry.
    ///
    /// The existence check and the write are one atomic step. Returns `false`,
    /// writing nothing, when the key is missing.
    fn hash_update(
        &self,
        key: &str,
        fields: Vec<(String, String)>,
    ) -> impl Future<Output = FeedResult<bool>> + Send;

    /// Reads every field of the hash at `key`. A missing key gives an empty map.
    fn hash_get_all(
        &self,
        key: &str,
    ) -> impl Future<Output = FeedResult<HashMap<String, String>>> + Send;
}
