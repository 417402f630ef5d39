//! Transport collaborators for the data layer.
//!
//! This module defines the `HotspotClient` trait the rest of the crate
//! consumes, the `ApiClient` HTTP implementation, and the `ApiError`
//! taxonomy with its mapping into cache-layer fetch errors.

pub mod client;
pub mod error;

pub use client::{ApiClient, HotspotClient};
pub use error::ApiError;
