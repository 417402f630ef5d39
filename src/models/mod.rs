//! Data models for the hotspot map data layer.
//!
//! This module contains the data structures representing the entities the
//! map, list, and detail surfaces render:
//!
//! - `Hotspot`, `Witness`: geographic hotspots and their observers
//! - `Validator`: staked validators with heartbeat metadata
//! - `Entity`: the tagged union a selection can focus
//! - `Coordinate`: map centers and geocode results

pub mod entity;
pub mod geo;
pub mod hotspot;
pub mod validator;

pub use entity::Entity;
pub use geo::Coordinate;
pub use hotspot::{Hotspot, HotspotMode, Witness};
pub use validator::{format_heartbeat_version, Validator, ValidatorStatus};
