//! Signing-key resolution against the identity pool's JWKS endpoint.
//!
//! Keys are fetched over HTTPS with a bounded timeout and held in a local
//! time-bounded cache; entries are never served past the freshness window.
//! Concurrent refreshes collapse into a single outbound fetch.

use crate::config::Config;
use crate::error::EdgeAuthError;
use arc_swap::ArcSwap;
use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use jsonwebtoken::DecodingKey;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

/// JSON Web Key structure (RSA signing keys only).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jwk {
    /// Key type.
    pub kty: String,
    /// Key identifier.
    pub kid: String,
    /// Key use (sig, enc).
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,
    /// Algorithm.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    /// RSA modulus, base64url.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,
    /// RSA exponent, base64url.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,
}

/// JSON Web Key Set structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwkSet {
    /// Published keys.
    pub keys: Vec<Jwk>,
}

/// Cached keys with their fetch time.
struct CachedKeys {
    keys: HashMap<String, Arc<DecodingKey>>,
    fetched_at: Instant,
}

/// Fetch failure in a `Clone` shape so it can travel through a shared
/// future; rebuilt into a full error per caller.
#[derive(Clone)]
enum FetchError {
    TimedOut,
    Failed(String),
}

/// The inflight refresh future. `Shared` needs a `Clone` output.
type InflightFetch =
    Shared<BoxFuture<'static, Result<Arc<HashMap<String, Arc<DecodingKey>>>, FetchError>>>;

/// Resolves a key identifier from a not-yet-trusted token header to the
/// matching public signing key.
pub struct KeyResolver {
    jwks_url: String,
    ttl: Duration,
    fetch_timeout: Duration,
    cached: ArcSwap<Option<CachedKeys>>,
    inflight: Mutex<Option<InflightFetch>>,
    http_client: reqwest::Client,
}

impl KeyResolver {
    /// Creates a resolver for the configured JWKS endpoint.
    pub fn new(config: &Config) -> Result<Self, EdgeAuthError> {
        let fetch_timeout = Duration::from_secs(config.key_fetch_timeout_secs);
        let http_client = reqwest::Client::builder()
            .timeout(fetch_timeout)
            .build()
            .map_err(|e| EdgeAuthError::from_key_fetch(&e, fetch_timeout))?;

        Ok(Self {
            jwks_url: config.jwks_url_str().to_string(),
            ttl: Duration::from_secs(config.jwks_cache_ttl_seconds),
            fetch_timeout,
            cached: ArcSwap::new(Arc::new(None)),
            inflight: Mutex::new(None),
            http_client,
        })
    }

    /// Resolves a key identifier to its decoding key, refreshing the key
    /// set when the identifier is not in a fresh cache.
    #[instrument(skip(self), fields(kid = %kid))]
    pub async fn get_key(&self, kid: &str) -> Result<Arc<DecodingKey>, EdgeAuthError> {
        if kid.is_empty() {
            return Err(EdgeAuthError::KeyLookup {
                reason: "empty key identifier".to_string(),
            });
        }

        if let Some(key) = self.try_get_cached(kid) {
            return Ok(key);
        }

        let keys = self.refresh_single_flight().await?;

        keys.get(kid).cloned().ok_or_else(|| EdgeAuthError::KeyLookup {
            reason: "key identifier not present in key set".to_string(),
        })
    }

    /// Whether the local cache is missing or past its freshness window.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        let cache = self.cached.load();
        match **cache {
            Some(ref entry) => entry.fetched_at.elapsed() >= self.ttl,
            None => true,
        }
    }

    /// Number of keys currently cached.
    #[must_use]
    pub fn cached_key_count(&self) -> usize {
        let cache = self.cached.load();
        match **cache {
            Some(ref entry) => entry.keys.len(),
            None => 0,
        }
    }

    fn try_get_cached(&self, kid: &str) -> Option<Arc<DecodingKey>> {
        let cache = self.cached.load();
        if let Some(ref entry) = **cache {
            if entry.fetched_at.elapsed() < self.ttl {
                return entry.keys.get(kid).cloned();
            }
        }
        None
    }

    /// Refreshes the key set, collapsing concurrent callers onto one
    /// outbound fetch.
    async fn refresh_single_flight(
        &self,
    ) -> Result<Arc<HashMap<String, Arc<DecodingKey>>>, EdgeAuthError> {
        let mut inflight_guard = self.inflight.lock().await;

        if let Some(ref fut) = *inflight_guard {
            let fut = fut.clone();
            drop(inflight_guard);
            return fut.await.map_err(|e| self.rebuild_fetch_error(e));
        }

        let url = self.jwks_url.clone();
        let client = self.http_client.clone();

        let fut: BoxFuture<'static, Result<Arc<HashMap<String, Arc<DecodingKey>>>, FetchError>> =
            Box::pin(async move {
                info!(url = %url, "fetching key set");

                let response = client.get(&url).send().await.map_err(|e| {
                    if e.is_timeout() {
                        FetchError::TimedOut
                    } else {
                        FetchError::Failed(format!("key set fetch failed: {e}"))
                    }
                })?;

                if !response.status().is_success() {
                    return Err(FetchError::Failed(format!(
                        "key set fetch failed with status {}",
                        response.status()
                    )));
                }

                let jwks: JwkSet = response.json().await.map_err(|e| {
                    if e.is_timeout() {
                        FetchError::TimedOut
                    } else {
                        FetchError::Failed(format!("key set parse failed: {e}"))
                    }
                })?;

                let mut keys = HashMap::new();
                for jwk in &jwks.keys {
                    if let Some(key) = jwk_to_decoding_key(jwk) {
                        keys.insert(jwk.kid.clone(), Arc::new(key));
                    }
                }

                info!(key_count = keys.len(), "key set refreshed");
                Ok(Arc::new(keys))
            });

        let shared_fut = fut.shared();
        *inflight_guard = Some(shared_fut.clone());
        drop(inflight_guard);

        let result = shared_fut.await;
        self.inflight.lock().await.take();

        match result {
            Ok(keys) => {
                self.cached.store(Arc::new(Some(CachedKeys {
                    keys: (*keys).clone(),
                    fetched_at: Instant::now(),
                })));
                Ok(keys)
            }
            Err(e) => Err(self.rebuild_fetch_error(e)),
        }
    }

    fn rebuild_fetch_error(&self, err: FetchError) -> EdgeAuthError {
        match err {
            FetchError::TimedOut => EdgeAuthError::Timeout {
                duration: self.fetch_timeout,
            },
            FetchError::Failed(reason) => EdgeAuthError::KeyLookup { reason },
        }
    }
}

/// Converts an RSA JWK to a decoding key, rejecting anything else.
fn jwk_to_decoding_key(jwk: &Jwk) -> Option<DecodingKey> {
    if jwk.kty != "RSA" {
        warn!(kty = %jwk.kty, kid = %jwk.kid, "unsupported key type in key set");
        return None;
    }

    let n = jwk.n.as_ref()?;
    let e = jwk.e.as_ref()?;

    // 2048-bit floor: the base64url modulus of a 2048-bit key is 342 chars.
    if n.len() < 340 {
        warn!(kid = %jwk.kid, "RSA key below the 2048-bit floor, rejecting");
        return None;
    }

    DecodingKey::from_rsa_components(n, e).ok()
}
