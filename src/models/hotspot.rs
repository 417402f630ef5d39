//! Domain models for hotspots and witnesses.
//!
//! These types mirror the shapes returned by the entity API,
//! decoupled from any presentation concerns.

use serde::{Deserialize, Serialize};

/// Operating mode of a hotspot on the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HotspotMode {
    Full,
    Light,
    DataOnly,
}

/// A hotspot with its location and network metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotspot {
    pub address: String,
    pub name: Option<String>,
    pub owner: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    /// H3 cell the hotspot is asserted in, if it has a location.
    pub location_hex: Option<String>,
    #[serde(default)]
    pub mode: Option<HotspotMode>,
    /// Multiaddrs the hotspot listens on; used for relay detection.
    #[serde(default)]
    pub listen_addrs: Option<Vec<String>>,
}

impl Hotspot {
    /// A location is valid when both coordinates are asserted and not the
    /// (0, 0) placeholder the API returns for unasserted hotspots.
    pub fn has_valid_location(&self) -> bool {
        match (self.lat, self.lng) {
            (Some(lat), Some(lng)) => lat != 0.0 || lng != 0.0,
            _ => false,
        }
    }

    pub fn is_data_only(&self) -> bool {
        self.mode == Some(HotspotMode::DataOnly)
    }

    /// A hotspot is relayed when it has listen addresses but none of them
    /// is a direct ip4 address.
    pub fn is_relay(&self) -> bool {
        match &self.listen_addrs {
            None => false,
            Some(addrs) => !addrs.is_empty() && !addrs.iter().any(|a| a.contains("ip4")),
        }
    }
}

/// A hotspot as observed witnessing another hotspot's beacons.
/// Same shape subset as [`Hotspot`], reported per-witnessed-hotspot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Witness {
    pub address: String,
    pub name: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub location_hex: Option<String>,
    #[serde(default)]
    pub mode: Option<HotspotMode>,
}

impl Witness {
    pub fn is_data_only(&self) -> bool {
        self.mode == Some(HotspotMode::DataOnly)
    }
}

// ============================================================================
// Tests
// ============================================================================
