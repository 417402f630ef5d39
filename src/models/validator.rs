//! Domain models for validators.

use serde::{Deserialize, Serialize};

/// A validator with its staking and heartbeat metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Validator {
    pub address: String,
    pub name: Option<String>,
    pub status: Option<ValidatorStatus>,
    pub penalty: Option<f64>,
    pub stake_status: Option<String>,
    /// Version encoded as a packed integer, e.g. 1008005 for 1.8.5.
    pub version_heartbeat: Option<u64>,
    pub last_heartbeat: Option<u64>,
}

/// Liveness information reported alongside a validator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorStatus {
    pub online: Option<String>,
    #[serde(default)]
    pub listen_addrs: Option<Vec<String>>,
}

impl Validator {
    pub fn is_online(&self) -> bool {
        self.status
            .as_ref()
            .and_then(|s| s.online.as_deref())
            .map(|o| o == "online")
            .unwrap_or(false)
    }

    pub fn is_unstaked(&self) -> bool {
        self.stake_status.as_deref() == Some("unstaked")
    }

    /// Render the packed version heartbeat as a dotted version string.
    pub fn formatted_version(&self) -> Option<String> {
        self.version_heartbeat.map(format_heartbeat_version)
    }
}

/// Unpack a version heartbeat into `major.minor.patch`.
///
/// The heartbeat encodes the version as a base-10 packed integer with three
/// digits per component, zero-padded to ten digits total.
pub fn format_heartbeat_version(version_heartbeat: u64) -> String {
    let digits = format!("{:010}", version_heartbeat);
    let major: u64 = digits[0..4].parse().unwrap_or(0);
    let minor: u64 = digits[4..7].parse().unwrap_or(0);
    let patch: u64 = digits[7..10].parse().unwrap_or(0);
    format!("{}.{}.{}", major, minor, patch)
}

// ============================================================================
// Tests
// ============================================================================
