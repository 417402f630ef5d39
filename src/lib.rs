//! In-memory data layer for a hotspot map application.
//!
//! The map, list, and detail surfaces all render entity collections fetched
//! independently (owned hotspots, followed hotspots, validators, elected
//! validators, per-hex buckets). This crate provides the two pieces of
//! coordination they share:
//!
//! - a freshness-and-deduplication cache ([`cache::FetchCoordinator`]) that
//!   prevents redundant fetches while multiple surfaces request the same
//!   collection concurrently, and
//! - a selection state machine ([`selection::SelectionController`]) that
//!   unifies heterogeneous entity kinds into one authoritative focus
//!   driving all derived view state.
//!
//! The transport is a collaborator behind [`api::HotspotClient`]; the map
//! engine is a collaborator that sends hex-selection events in and takes
//! camera instructions out. Nothing here persists: the cache is in-memory
//! only, and a restart re-fetches everything from empty records.

pub mod api;
pub mod cache;
pub mod collections;
pub mod config;
pub mod hex;
pub mod models;
pub mod registry;
pub mod selection;

#[cfg(test)]
pub(crate) mod testing;

pub use api::{ApiClient, ApiError, HotspotClient};
pub use cache::{CacheRecord, FetchCoordinator, FetchError};
pub use collections::CollectionStore;
pub use config::TtlConfig;
pub use hex::HexIndex;
pub use models::{Coordinate, Entity, Hotspot, HotspotMode, Validator, ValidatorStatus, Witness};
pub use registry::EntityRegistry;
pub use selection::{
    GlobalOption, LayoutHint, MapFilter, SelectionController, SelectionSnapshot, SelectionTarget,
};
