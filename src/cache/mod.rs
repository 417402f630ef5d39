//! In-memory freshness caching and fetch deduplication.
//!
//! This module provides the `CacheRecord` freshness rules and the
//! `FetchCoordinator`, which collapses concurrent identical fetch requests
//! into a single underlying operation per cache key.
//!
//! Nothing here persists: a process restart re-fetches everything from
//! empty records.

pub mod coordinator;
pub mod record;

pub use coordinator::{FetchCoordinator, FetchError};
pub use record::CacheRecord;
