//! The independently cached entity collections the UI reads.
//!
//! Each collection (owned hotspots, followed hotspots, validators, elected
//! validators, followed validators) is one cache key with its own TTL.
//! Followed collections additionally maintain an address registry so
//! membership checks don't scan the list. Follow/unfollow go through the
//! server and apply only its authoritative response - never speculatively.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use crate::api::HotspotClient;
use crate::cache::{FetchCoordinator, FetchError};
use crate::config::TtlConfig;
use crate::models::{Hotspot, Validator};
use crate::registry::EntityRegistry;

// ============================================================================
// Cache keys
// ============================================================================

const OWNED_HOTSPOTS: &str = "owned_hotspots";
const FOLLOWED_HOTSPOTS: &str = "followed_hotspots";
const MY_VALIDATORS: &str = "my_validators";
const ELECTED_VALIDATORS: &str = "elected_validators";
const FOLLOWED_VALIDATORS: &str = "followed_validators";

/// Store of per-collection caches and follow-state registries.
pub struct CollectionStore {
    client: Arc<dyn HotspotClient>,
    ttl: TtlConfig,
    hotspots: FetchCoordinator<Vec<Hotspot>>,
    validators: FetchCoordinator<Vec<Validator>>,
    followed_hotspot_index: Mutex<EntityRegistry<Hotspot>>,
    followed_validator_index: Mutex<EntityRegistry<Validator>>,
}

impl CollectionStore {
    pub fn new(client: Arc<dyn HotspotClient>, ttl: TtlConfig) -> Self {
        Self {
            client,
            ttl,
            hotspots: FetchCoordinator::new(),
            validators: FetchCoordinator::new(),
            followed_hotspot_index: Mutex::new(EntityRegistry::new()),
            followed_validator_index: Mutex::new(EntityRegistry::new()),
        }
    }

    fn hotspot_index(&self) -> MutexGuard<'_, EntityRegistry<Hotspot>> {
        self.followed_hotspot_index
            .lock()
            .unwrap_or_else(|e| e.into_inner())
    }

    fn validator_index(&self) -> MutexGuard<'_, EntityRegistry<Validator>> {
        self.followed_validator_index
            .lock()
            .unwrap_or_else(|e| e.into_inner())
    }

    // =========================================================================
    // Hotspot collections
    // =========================================================================

    pub async fn owned_hotspots(&self) -> Result<Vec<Hotspot>, FetchError> {
        let client = Arc::clone(&self.client);
        self.hotspots
            .get_or_fetch(OWNED_HOTSPOTS, self.ttl.owned_hotspots(), move || async move {
                client.list_owned().await.map_err(FetchError::from)
            })
            .await
    }

    pub async fn followed_hotspots(&self) -> Result<Vec<Hotspot>, FetchError> {
        let client = Arc::clone(&self.client);
        let list = self
            .hotspots
            .get_or_fetch(
                FOLLOWED_HOTSPOTS,
                self.ttl.followed_hotspots(),
                move || async move { client.list_followed().await.map_err(FetchError::from) },
            )
            .await?;
        self.hotspot_index().rebuild(&list);
        Ok(list)
    }

    pub async fn follow_hotspot(&self, address: &str) -> Result<Vec<Hotspot>, FetchError> {
        let list = self.client.follow_hotspot(address).await?;
        self.apply_followed_hotspots(list.clone());
        Ok(list)
    }

    pub async fn unfollow_hotspot(&self, address: &str) -> Result<Vec<Hotspot>, FetchError> {
        let list = self.client.unfollow_hotspot(address).await?;
        self.apply_followed_hotspots(list.clone());
        Ok(list)
    }

    /// The server's updated followed list refreshes both the cache record
    /// and the membership registry, the same as a fulfilled fetch.
    fn apply_followed_hotspots(&self, list: Vec<Hotspot>) {
        debug!(count = list.len(), "applying followed hotspots");
        self.hotspot_index().rebuild(&list);
        self.hotspots.store(FOLLOWED_HOTSPOTS, list);
    }

    pub fn is_hotspot_followed(&self, address: &str) -> bool {
        self.hotspot_index().contains(address)
    }

    /// Whether the account has anything to show in the list view.
    pub fn has_hotspots(&self) -> bool {
        let owned = self
            .hotspots
            .peek(OWNED_HOTSPOTS)
            .map(|l| !l.is_empty())
            .unwrap_or(false);
        let followed = self
            .hotspots
            .peek(FOLLOWED_HOTSPOTS)
            .map(|l| !l.is_empty())
            .unwrap_or(false);
        owned || followed
    }

    // =========================================================================
    // Validator collections
    // =========================================================================

    pub async fn my_validators(&self) -> Result<Vec<Validator>, FetchError> {
        let client = Arc::clone(&self.client);
        self.validators
            .get_or_fetch(MY_VALIDATORS, self.ttl.my_validators(), move || async move {
                client.list_my_validators().await.map_err(FetchError::from)
            })
            .await
    }

    pub async fn elected_validators(&self) -> Result<Vec<Validator>, FetchError> {
        let client = Arc::clone(&self.client);
        self.validators
            .get_or_fetch(
                ELECTED_VALIDATORS,
                self.ttl.elected_validators(),
                move || async move { client.list_elected().await.map_err(FetchError::from) },
            )
            .await
    }

    pub async fn followed_validators(&self) -> Result<Vec<Validator>, FetchError> {
        let client = Arc::clone(&self.client);
        let list = self
            .validators
            .get_or_fetch(
                FOLLOWED_VALIDATORS,
                self.ttl.followed_validators(),
                move || async move {
                    client
                        .list_followed_validators()
                        .await
                        .map_err(FetchError::from)
                },
            )
            .await?;
        self.validator_index().rebuild(&list);
        Ok(list)
    }

    pub async fn follow_validator(&self, address: &str) -> Result<Vec<Validator>, FetchError> {
        let list = self.client.follow_validator(address).await?;
        self.apply_followed_validators(list.clone());
        Ok(list)
    }

    pub async fn unfollow_validator(&self, address: &str) -> Result<Vec<Validator>, FetchError> {
        let list = self.client.unfollow_validator(address).await?;
        self.apply_followed_validators(list.clone());
        Ok(list)
    }

    fn apply_followed_validators(&self, list: Vec<Validator>) {
        debug!(count = list.len(), "applying followed validators");
        self.validator_index().rebuild(&list);
        self.validators.store(FOLLOWED_VALIDATORS, list);
    }

    pub fn is_validator_followed(&self, address: &str) -> bool {
        self.validator_index().contains(address)
    }

    /// Whether an address is in the current consensus group. Fetches the
    /// elected set through the cache, so repeated checks within the TTL
    /// cost no I/O.
    pub async fn in_consensus(&self, address: &str) -> Result<bool, FetchError> {
        let elected = self.elected_validators().await?;
        Ok(elected.iter().any(|v| v.address == address))
    }

    // =========================================================================
    // Reset
    // =========================================================================

    /// Return every collection and registry to the initial empty state,
    /// e.g. on sign-out.
    pub fn sign_out(&self) {
        self.hotspots.clear();
        self.validators.clear();
        self.hotspot_index().clear();
        self.validator_index().clear();
    }
}

// ============================================================================
// Tests
// ============================================================================
