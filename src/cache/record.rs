//! The per-key cache record and its freshness rules.

use std::time::Duration;

use chrono::Utc;

/// A cached value with the bookkeeping needed to answer "is this still
/// fresh". One record exists per logical cache key.
///
/// Invariant: `loading = true` implies exactly one fetch is in flight for
/// the key. Only the coordinator's success/failure path writes these fields.
#[derive(Debug, Clone)]
pub struct CacheRecord<T> {
    pub data: Option<T>,
    /// Epoch milliseconds of the last successful fetch. 0 = never fetched,
    /// so a freshly constructed record is always invalid.
    pub last_fetched_timestamp: i64,
    pub loading: bool,
}

impl<T> Default for CacheRecord<T> {
    fn default() -> Self {
        Self {
            data: None,
            last_fetched_timestamp: 0,
            loading: false,
        }
    }
}

impl<T> CacheRecord<T> {
    /// A record is valid iff the data is present, no fetch is in flight,
    /// and the last fetch is within the freshness window.
    pub fn is_valid(&self, ttl: Duration) -> bool {
        self.is_valid_at(Utc::now().timestamp_millis(), ttl)
    }

    pub(crate) fn is_valid_at(&self, now_ms: i64, ttl: Duration) -> bool {
        !self.loading
            && self.data.is_some()
            && now_ms - self.last_fetched_timestamp < ttl.as_millis() as i64
    }

    /// Apply a successful fetch: store the data and stamp it now.
    pub(crate) fn fulfill(&mut self, data: T) {
        self.data = Some(data);
        self.last_fetched_timestamp = Utc::now().timestamp_millis();
        self.loading = false;
    }

    /// Apply a failed fetch: stale data and its timestamp survive, only the
    /// in-flight marker resets so a later access can retry.
    pub(crate) fn reject(&mut self) {
        self.loading = false;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const TTL: Duration = Duration::from_secs(300);

    #[test]
    fn test_fresh_record_is_invalid() {
        let record: CacheRecord<Vec<u32>> = CacheRecord::default();
        assert!(!record.is_valid(TTL));
    }

    #[test]
    fn test_fulfilled_record_is_valid() {
        let mut record = CacheRecord::default();
        record.fulfill(vec![1, 2, 3]);
        assert!(record.is_valid(TTL));
    }

    #[test]
    fn test_record_expires_after_ttl() {
        let mut record = CacheRecord::default();
        record.fulfill(vec![1]);
        // Backdate past the window
        record.last_fetched_timestamp -= 301_000;
        assert!(!record.is_valid(TTL));

        // Just inside the window
        record.fulfill(vec![1]);
        record.last_fetched_timestamp -= 299_000;
        assert!(record.is_valid(TTL));
    }

    #[test]
    fn test_loading_record_is_invalid() {
        let mut record = CacheRecord::default();
        record.fulfill(vec![1]);
        record.loading = true;
        assert!(!record.is_valid(TTL));
    }

    #[test]
    fn test_reject_preserves_data_and_timestamp() {
        let mut record = CacheRecord::default();
        record.fulfill(vec![7]);
        let stamped = record.last_fetched_timestamp;

        record.loading = true;
        record.reject();

        assert_eq!(record.data, Some(vec![7]));
        assert_eq!(record.last_fetched_timestamp, stamped);
        assert!(!record.loading);
    }
}
