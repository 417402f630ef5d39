//! On-demand, cached-by-hex lookup of which hotspots share a spatial cell.

use std::sync::Arc;
use std::time::Duration;

use crate::api::HotspotClient;
use crate::cache::{FetchCoordinator, FetchError};
use crate::models::Hotspot;

/// Per-hex hotspot buckets, fetched through the coordinator so concurrent
/// lookups of the same cell share one request. A bucket is rebuilt, not
/// merged, whenever its cache entry expires and is refetched.
pub struct HexIndex {
    buckets: FetchCoordinator<Vec<Hotspot>>,
    client: Arc<dyn HotspotClient>,
    ttl: Duration,
}

impl HexIndex {
    pub fn new(client: Arc<dyn HotspotClient>, ttl: Duration) -> Self {
        Self {
            buckets: FetchCoordinator::new(),
            client,
            ttl,
        }
    }

    /// Fetch the bucket for `hex_id` and pick an index into it: the
    /// position of `preferred_address` when present, otherwise 0.
    ///
    /// On failure nothing is applied; the caller keeps its previous hex
    /// selection and surfaces nothing from this layer.
    pub async fn resolve(
        &self,
        hex_id: &str,
        preferred_address: Option<&str>,
    ) -> Result<(Vec<Hotspot>, usize), FetchError> {
        let client = Arc::clone(&self.client);
        let hex = hex_id.to_owned();
        let bucket = self
            .buckets
            .get_or_fetch(hex_id, self.ttl, move || async move {
                client.list_by_hex(&hex).await.map_err(FetchError::from)
            })
            .await?;

        let index = preferred_address
            .and_then(|addr| bucket.iter().position(|h| h.address == addr))
            .unwrap_or(0);

        Ok((bucket, index))
    }

    /// The currently cached bucket for `hex_id`, stale or not, without I/O.
    pub fn peek(&self, hex_id: &str) -> Option<Vec<Hotspot>> {
        self.buckets.peek(hex_id)
    }

    pub fn invalidate(&self, hex_id: &str) {
        self.buckets.invalidate(hex_id);
    }

    pub fn clear(&self) {
        self.buckets.clear();
    }
}

// ============================================================================
// Tests
// ============================================================================
