//! The heterogeneous entity union behind a selection.

use super::{Hotspot, Validator, Witness};

/// Any entity that can hold the current focus: a geographic hotspot, a
/// witness of a hotspot, or a validator. Dispatch on the variant replaces
/// ad hoc type-guard checks with exhaustive matching.
#[derive(Debug, Clone)]
pub enum Entity {
    Hotspot(Hotspot),
    Witness(Witness),
    Validator(Validator),
}

impl Entity {
    /// Address identity; two entities are the same focus iff their
    /// addresses are equal.
    pub fn address(&self) -> &str {
        match self {
            Entity::Hotspot(h) => &h.address,
            Entity::Witness(w) => &w.address,
            Entity::Validator(v) => &v.address,
        }
    }

    /// H3 cell for location-bearing entities. Validators have no location.
    pub fn location_hex(&self) -> Option<&str> {
        match self {
            Entity::Hotspot(h) => h.location_hex.as_deref(),
            Entity::Witness(w) => w.location_hex.as_deref(),
            Entity::Validator(_) => None,
        }
    }

    pub fn as_hotspot(&self) -> Option<&Hotspot> {
        match self {
            Entity::Hotspot(h) => Some(h),
            _ => None,
        }
    }

    pub fn as_witness(&self) -> Option<&Witness> {
        match self {
            Entity::Witness(w) => Some(w),
            _ => None,
        }
    }

    pub fn as_validator(&self) -> Option<&Validator> {
        match self {
            Entity::Validator(v) => Some(v),
            _ => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
