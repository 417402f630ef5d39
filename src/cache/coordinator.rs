//! Fetch coordination: freshness checks plus in-flight deduplication.
//!
//! `FetchCoordinator` wraps an asynchronous producer per cache key and
//! guarantees at most one in-flight fetch per key; every concurrent
//! requester for that key shares the same underlying operation and result.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use thiserror::Error;
use tracing::debug;

use super::CacheRecord;

/// Error surfaced by a coordinated fetch.
///
/// Clone, so one failure can fan out to every caller attached to the
/// shared in-flight operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Collaborator I/O failure. Stale cached data survives and the next
    /// access past the TTL re-attempts the fetch.
    #[error("transient fetch failure: {0}")]
    Transient(String),

    /// The requested entity does not exist.
    #[error("not found: {0}")]
    NotFound(String),
}

type SharedFetch<T> = Shared<BoxFuture<'static, Result<T, FetchError>>>;

/// A registered in-flight operation. The generation ties each waiter to the
/// exact operation it awaited, so a waiter resuming late cannot apply its
/// result over a newer operation registered under the same key.
struct InFlight<T: Clone> {
    generation: u64,
    fut: SharedFetch<T>,
}

struct Inner<T: Clone> {
    records: HashMap<String, CacheRecord<T>>,
    in_flight: HashMap<String, InFlight<T>>,
    next_generation: u64,
}

/// Freshness cache plus fetch deduplication for one value type.
///
/// All record mutation happens inside [`FetchCoordinator::get_or_fetch`]'s
/// success/failure path or the explicit [`FetchCoordinator::store`] /
/// [`FetchCoordinator::invalidate`] entry points; nothing else writes a
/// record, which is what makes the dedup invariant hold.
pub struct FetchCoordinator<T: Clone> {
    inner: Mutex<Inner<T>>,
}

impl<T: Clone> Default for FetchCoordinator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> FetchCoordinator<T> {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                records: HashMap::new(),
                in_flight: HashMap::new(),
                next_generation: 0,
            }),
        }
    }

    /// The lock is held only across synchronous map operations, never
    /// across an await. A poisoned lock holds no broken invariants here,
    /// so recover the guard rather than propagate the panic.
    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<T> FetchCoordinator<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Return fresh cached data for `key`, or fetch it.
    ///
    /// If the cache entry is valid the data is returned with no I/O. If a
    /// fetch for the key is already in flight, this call attaches to it
    /// instead of starting another: N simultaneous callers for an invalid
    /// key produce exactly one invocation of `fetcher` and all N observe
    /// the identical result.
    ///
    /// On success the record is stamped with the current time; on failure
    /// stale data is preserved, `loading` resets, and the error propagates
    /// to every waiting caller. No retry is scheduled.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        key: &str,
        ttl: Duration,
        fetcher: F,
    ) -> Result<T, FetchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        let (fut, generation) = {
            let mut inner = self.lock();
            if let Some(record) = inner.records.get(key) {
                if record.is_valid(ttl) {
                    if let Some(data) = record.data.clone() {
                        return Ok(data);
                    }
                }
            }
            match inner.in_flight.get(key) {
                Some(existing) => {
                    debug!(key, "attaching to in-flight fetch");
                    (existing.fut.clone(), existing.generation)
                }
                None => {
                    debug!(key, "starting fetch");
                    inner.next_generation += 1;
                    let generation = inner.next_generation;
                    let fut = fetcher().boxed().shared();
                    inner.in_flight.insert(
                        key.to_owned(),
                        InFlight {
                            generation,
                            fut: fut.clone(),
                        },
                    );
                    inner.records.entry(key.to_owned()).or_default().loading = true;
                    (fut, generation)
                }
            }
        };

        let result = fut.await;

        {
            let mut inner = self.lock();
            // The first caller back from this operation applies the result
            // and deregisters the handle, making the write-back idempotent
            // for the remaining waiters. The generation check keeps a waiter
            // that resumes after a newer operation was registered under the
            // same key from touching that operation's handle or record.
            let still_registered = inner
                .in_flight
                .get(key)
                .is_some_and(|f| f.generation == generation);
            if still_registered {
                inner.in_flight.remove(key);
                let record = inner.records.entry(key.to_owned()).or_default();
                match &result {
                    Ok(data) => record.fulfill(data.clone()),
                    Err(e) => {
                        debug!(key, error = %e, "fetch failed, keeping stale data");
                        record.reject();
                    }
                }
            }
        }

        result
    }

    /// Read the current data for `key` without any freshness check or I/O.
    /// Stale data is returned as-is; absent data is `None`.
    pub fn peek(&self, key: &str) -> Option<T> {
        self.lock().records.get(key).and_then(|r| r.data.clone())
    }

    pub fn is_loading(&self, key: &str) -> bool {
        self.lock().records.get(key).map(|r| r.loading).unwrap_or(false)
    }

    /// Store a server-confirmed value for `key`, refreshing the record
    /// exactly as a fulfilled fetch would. Used for mutating calls whose
    /// response is the authoritative updated collection.
    pub fn store(&self, key: &str, data: T) {
        let mut inner = self.lock();
        inner.records.entry(key.to_owned()).or_default().fulfill(data);
    }

    /// Force the next access for `key` to refetch. Stale data stays
    /// readable through [`FetchCoordinator::peek`] until then.
    pub fn invalidate(&self, key: &str) {
        let mut inner = self.lock();
        if let Some(record) = inner.records.get_mut(key) {
            record.last_fetched_timestamp = 0;
        }
    }

    /// Drop every record and in-flight handle, returning to the initial
    /// empty state. Results of fetches still running are discarded on
    /// arrival because their handles are no longer registered.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.records.clear();
        inner.in_flight.clear();
    }
}

// ============================================================================
// Tests
// ============================================================================
