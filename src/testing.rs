//! Shared test fixtures: a programmable in-memory collaborator and entity
//! builders. Compiled only for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::api::{ApiError, HotspotClient};
use crate::models::{Coordinate, Hotspot, Validator, Witness};

pub fn hotspot(address: &str) -> Hotspot {
    Hotspot {
        address: address.to_string(),
        name: None,
        owner: None,
        lat: None,
        lng: None,
        location_hex: None,
        mode: None,
        listen_addrs: None,
    }
}

/// A hotspot with a valid location asserted in the given hex.
pub fn located_hotspot(address: &str, hex: &str) -> Hotspot {
    let mut h = hotspot(address);
    h.lat = Some(37.7749);
    h.lng = Some(-122.4194);
    h.location_hex = Some(hex.to_string());
    h
}

pub fn witness(address: &str) -> Witness {
    Witness {
        address: address.to_string(),
        name: None,
        lat: None,
        lng: None,
        location_hex: None,
        mode: None,
    }
}

pub fn validator(address: &str) -> Validator {
    Validator {
        address: address.to_string(),
        name: None,
        status: None,
        penalty: None,
        stake_status: None,
        version_heartbeat: None,
        last_heartbeat: None,
    }
}

/// Programmable [`HotspotClient`] with call counters, failure switches,
/// and per-hex gates for exercising overlapping fetches.
#[derive(Default)]
pub struct MockClient {
    owned: Mutex<Vec<Hotspot>>,
    followed: Mutex<Vec<Hotspot>>,
    hex_buckets: Mutex<HashMap<String, Vec<Hotspot>>>,
    by_address: Mutex<HashMap<String, Hotspot>>,
    my_validators: Mutex<Vec<Validator>>,
    elected: Mutex<Vec<Validator>>,
    followed_validators: Mutex<Vec<Validator>>,
    geocode: Mutex<Option<Coordinate>>,
    /// When set for a hex, `list_by_hex` blocks until notified.
    hex_gates: Mutex<HashMap<String, Arc<Notify>>>,
    /// When set, `resolve_geocode` blocks until notified.
    geocode_gate: Mutex<Option<Arc<Notify>>>,

    pub fail_hex: AtomicBool,
    pub fail_geocode: AtomicBool,

    pub owned_calls: AtomicUsize,
    pub followed_calls: AtomicUsize,
    pub hex_calls: AtomicUsize,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_owned(&self, list: Vec<Hotspot>) {
        *self.owned.lock().unwrap() = list;
    }

    pub fn set_followed(&self, list: Vec<Hotspot>) {
        *self.followed.lock().unwrap() = list;
    }

    pub fn set_hex_bucket(&self, hex: &str, bucket: Vec<Hotspot>) {
        self.hex_buckets.lock().unwrap().insert(hex.to_string(), bucket);
    }

    pub fn set_by_address(&self, h: Hotspot) {
        self.by_address.lock().unwrap().insert(h.address.clone(), h);
    }

    pub fn set_elected(&self, list: Vec<Validator>) {
        *self.elected.lock().unwrap() = list;
    }

    pub fn set_followed_validators(&self, list: Vec<Validator>) {
        *self.followed_validators.lock().unwrap() = list;
    }

    pub fn set_geocode(&self, coordinate: Coordinate) {
        *self.geocode.lock().unwrap() = Some(coordinate);
    }

    pub fn gate_hex(&self, hex: &str, gate: Arc<Notify>) {
        self.hex_gates.lock().unwrap().insert(hex.to_string(), gate);
    }

    pub fn gate_geocode(&self, gate: Arc<Notify>) {
        *self.geocode_gate.lock().unwrap() = Some(gate);
    }
}

#[async_trait]
impl HotspotClient for MockClient {
    async fn list_owned(&self) -> Result<Vec<Hotspot>, ApiError> {
        self.owned_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        Ok(self.owned.lock().unwrap().clone())
    }

    async fn list_followed(&self) -> Result<Vec<Hotspot>, ApiError> {
        self.followed_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        Ok(self.followed.lock().unwrap().clone())
    }

    async fn list_by_hex(&self, hex_id: &str) -> Result<Vec<Hotspot>, ApiError> {
        self.hex_calls.fetch_add(1, Ordering::SeqCst);

        let gate = self.hex_gates.lock().unwrap().get(hex_id).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        } else {
            tokio::task::yield_now().await;
        }

        if self.fail_hex.load(Ordering::SeqCst) {
            return Err(ApiError::ServerError("hex fetch failed".to_string()));
        }
        Ok(self
            .hex_buckets
            .lock()
            .unwrap()
            .get(hex_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_by_address(&self, address: &str) -> Result<Hotspot, ApiError> {
        tokio::task::yield_now().await;
        self.by_address
            .lock()
            .unwrap()
            .get(address)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("hotspot: {}", address)))
    }

    async fn list_my_validators(&self) -> Result<Vec<Validator>, ApiError> {
        tokio::task::yield_now().await;
        Ok(self.my_validators.lock().unwrap().clone())
    }

    async fn list_elected(&self) -> Result<Vec<Validator>, ApiError> {
        tokio::task::yield_now().await;
        Ok(self.elected.lock().unwrap().clone())
    }

    async fn list_followed_validators(&self) -> Result<Vec<Validator>, ApiError> {
        tokio::task::yield_now().await;
        Ok(self.followed_validators.lock().unwrap().clone())
    }

    async fn follow_hotspot(&self, _address: &str) -> Result<Vec<Hotspot>, ApiError> {
        tokio::task::yield_now().await;
        Ok(self.followed.lock().unwrap().clone())
    }

    async fn unfollow_hotspot(&self, _address: &str) -> Result<Vec<Hotspot>, ApiError> {
        tokio::task::yield_now().await;
        Ok(self.followed.lock().unwrap().clone())
    }

    async fn follow_validator(&self, _address: &str) -> Result<Vec<Validator>, ApiError> {
        tokio::task::yield_now().await;
        Ok(self.followed_validators.lock().unwrap().clone())
    }

    async fn unfollow_validator(&self, _address: &str) -> Result<Vec<Validator>, ApiError> {
        tokio::task::yield_now().await;
        Ok(self.followed_validators.lock().unwrap().clone())
    }

    async fn resolve_geocode(&self, place_query: &str) -> Result<Coordinate, ApiError> {
        let gate = self.geocode_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        } else {
            tokio::task::yield_now().await;
        }
        if self.fail_geocode.load(Ordering::SeqCst) {
            return Err(ApiError::NotFound(format!("place: {}", place_query)));
        }
        self.geocode
            .lock()
            .unwrap()
            .ok_or_else(|| ApiError::NotFound(format!("place: {}", place_query)))
    }
}
