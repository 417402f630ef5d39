//! HTTP collaborators for entity collections, follow state, and geocoding.
//!
//! The data layer talks to three backends: the public entity API (hotspots,
//! validators, hex buckets), the wallet API (followed collections, which
//! are per-account and authenticated), and a geocoding service for place
//! search. All three sit behind the [`HotspotClient`] trait so the cache
//! and selection layers stay transport-agnostic.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::models::{Coordinate, Hotspot, Validator};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Base URL for the public entity API (hotspots, validators, hex buckets)
const ENTITY_BASE_URL: &str = "https://api.helium.io/v1";

/// Base URL for the wallet API (per-account follow state)
const WALLET_BASE_URL: &str = "https://wallet.api.helium.systems/api";

/// Base URL for the geocoding service used by place search
const GEOCODE_BASE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// HTTP request timeout in seconds.
/// 30s allows for slow responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

// ============================================================================
// Collaborator trait
// ============================================================================

/// The async collaborators the data layer consumes.
///
/// Each call either returns a collection/entity or fails; the failure
/// semantics (what survives, what retries) live in the cache and selection
/// layers, not here.
#[async_trait]
pub trait HotspotClient: Send + Sync {
    /// Hotspots owned by the account.
    async fn list_owned(&self) -> Result<Vec<Hotspot>, ApiError>;

    /// Hotspots the account follows.
    async fn list_followed(&self) -> Result<Vec<Hotspot>, ApiError>;

    /// All hotspots sharing one H3 cell.
    async fn list_by_hex(&self, hex_id: &str) -> Result<Vec<Hotspot>, ApiError>;

    /// A single hotspot by address (deep links).
    async fn get_by_address(&self, address: &str) -> Result<Hotspot, ApiError>;

    /// Validators owned by the account.
    async fn list_my_validators(&self) -> Result<Vec<Validator>, ApiError>;

    /// The currently elected consensus group.
    async fn list_elected(&self) -> Result<Vec<Validator>, ApiError>;

    /// Validators the account follows.
    async fn list_followed_validators(&self) -> Result<Vec<Validator>, ApiError>;

    /// Follow a hotspot; returns the server's updated followed list.
    async fn follow_hotspot(&self, address: &str) -> Result<Vec<Hotspot>, ApiError>;

    /// Unfollow a hotspot; returns the server's updated followed list.
    async fn unfollow_hotspot(&self, address: &str) -> Result<Vec<Hotspot>, ApiError>;

    /// Follow a validator; returns the server's updated followed list.
    async fn follow_validator(&self, address: &str) -> Result<Vec<Validator>, ApiError>;

    /// Unfollow a validator; returns the server's updated followed list.
    async fn unfollow_validator(&self, address: &str) -> Result<Vec<Validator>, ApiError>;

    /// Resolve a free-form place query to a coordinate.
    async fn resolve_geocode(&self, place_query: &str) -> Result<Coordinate, ApiError>;
}

// ============================================================================
// Wire shapes
// ============================================================================

/// The entity API wraps every payload in a `data` envelope.
#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: GeocodeGeometry,
}

#[derive(Debug, Deserialize)]
struct GeocodeGeometry {
    location: Coordinate,
}

// ============================================================================
// Client
// ============================================================================

/// HTTP implementation of [`HotspotClient`].
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    /// Account whose owned/followed collections are fetched.
    account_address: String,
    /// Bearer token for the wallet API.
    wallet_token: Option<String>,
    /// API key for the geocoding service.
    geocode_key: Option<String>,
}

impl ApiClient {
    pub fn new(account_address: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            account_address: account_address.into(),
            wallet_token: None,
            geocode_key: None,
        })
    }

    /// Set the bearer token for wallet API requests.
    pub fn with_wallet_token(mut self, token: impl Into<String>) -> Self {
        self.wallet_token = Some(token.into());
        self
    }

    /// Set the API key for geocode requests.
    pub fn with_geocode_key(mut self, key: impl Into<String>) -> Self {
        self.geocode_key = Some(key.into());
        self
    }

    fn wallet_headers(&self) -> Result<header::HeaderMap, ApiError> {
        let mut headers = header::HeaderMap::new();
        if let Some(ref token) = self.wallet_token {
            let value = header::HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| ApiError::InvalidResponse(format!("Bad wallet token: {}", e)))?;
            headers.insert(header::AUTHORIZATION, value);
        }
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    /// `Ok(None)` signals a rate limit that the caller should retry.
    async fn check_response_for_retry(
        response: reqwest::Response,
    ) -> Result<Option<reqwest::Response>, ApiError> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status().as_u16() == 429 {
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// GET with bounded retry on 429, exponential backoff between attempts.
    async fn get_with_retry(
        &self,
        url: &str,
        headers: header::HeaderMap,
    ) -> Result<reqwest::Response, ApiError> {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = self
                .client
                .get(url)
                .headers(headers.clone())
                .send()
                .await?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => return Ok(response),
                None => {
                    if retries >= MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited);
                    }
                    debug!(url, retries, backoff_ms, "rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    retries += 1;
                    backoff_ms *= 2;
                }
            }
        }
    }

    /// GET an entity API payload out of its `data` envelope.
    async fn get_entity<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = format!("{}{}", ENTITY_BASE_URL, path);
        let response = self.get_with_retry(&url, header::HeaderMap::new()).await?;
        let envelope: DataEnvelope<T> = response.json().await?;
        Ok(envelope.data)
    }

    /// GET a wallet API payload (no envelope, bearer auth).
    async fn get_wallet<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = format!("{}{}", WALLET_BASE_URL, path);
        let response = self.get_with_retry(&url, self.wallet_headers()?).await?;
        Ok(response.json().await?)
    }

    /// POST or DELETE against the wallet API, returning the updated payload.
    async fn mutate_wallet<T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", WALLET_BASE_URL, path);
        let response = self
            .client
            .request(method, &url)
            .headers(self.wallet_headers()?)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }
}

#[async_trait]
impl HotspotClient for ApiClient {
    async fn list_owned(&self) -> Result<Vec<Hotspot>, ApiError> {
        self.get_entity(&format!("/accounts/{}/hotspots", self.account_address))
            .await
    }

    async fn list_followed(&self) -> Result<Vec<Hotspot>, ApiError> {
        self.get_wallet("/hotspots/follow").await
    }

    async fn list_by_hex(&self, hex_id: &str) -> Result<Vec<Hotspot>, ApiError> {
        self.get_entity(&format!("/hotspots/hex/{}", hex_id)).await
    }

    async fn get_by_address(&self, address: &str) -> Result<Hotspot, ApiError> {
        self.get_entity(&format!("/hotspots/{}", address)).await
    }

    async fn list_my_validators(&self) -> Result<Vec<Validator>, ApiError> {
        self.get_entity(&format!("/accounts/{}/validators", self.account_address))
            .await
    }

    async fn list_elected(&self) -> Result<Vec<Validator>, ApiError> {
        self.get_entity("/validators/elected").await
    }

    async fn list_followed_validators(&self) -> Result<Vec<Validator>, ApiError> {
        self.get_wallet("/validators/follow").await
    }

    async fn follow_hotspot(&self, address: &str) -> Result<Vec<Hotspot>, ApiError> {
        self.mutate_wallet(reqwest::Method::POST, &format!("/hotspots/follow/{}", address))
            .await
    }

    async fn unfollow_hotspot(&self, address: &str) -> Result<Vec<Hotspot>, ApiError> {
        self.mutate_wallet(
            reqwest::Method::DELETE,
            &format!("/hotspots/follow/{}", address),
        )
        .await
    }

    async fn follow_validator(&self, address: &str) -> Result<Vec<Validator>, ApiError> {
        self.mutate_wallet(
            reqwest::Method::POST,
            &format!("/validators/follow/{}", address),
        )
        .await
    }

    async fn unfollow_validator(&self, address: &str) -> Result<Vec<Validator>, ApiError> {
        self.mutate_wallet(
            reqwest::Method::DELETE,
            &format!("/validators/follow/{}", address),
        )
        .await
    }

    async fn resolve_geocode(&self, place_query: &str) -> Result<Coordinate, ApiError> {
        let key = self.geocode_key.as_deref().unwrap_or_default();
        let url = format!(
            "{}?address={}&key={}",
            GEOCODE_BASE_URL,
            urlencode(place_query),
            key
        );
        let response = self.get_with_retry(&url, header::HeaderMap::new()).await?;
        let geocoded: GeocodeResponse = response.json().await?;

        geocoded
            .results
            .into_iter()
            .next()
            .map(|r| r.geometry.location)
            .ok_or_else(|| ApiError::NotFound(format!("place: {}", place_query)))
    }
}

/// Percent-encode a query component. Covers the characters place queries
/// actually contain; anything non-alphanumeric is escaped.
fn urlencode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
