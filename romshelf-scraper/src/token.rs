//! OAuth2 client-credentials token cache.
//!
//! Searches share one bearer token. Readers take the `RwLock` read side; a
//! refresh happens behind a separate `Mutex` and re-checks the cache after
//! acquiring it, so callers racing on an expired token cause one fetch.

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use tokio::time::{Duration, Instant};

use crate::error::ProviderError;
use crate::types::TokenResponse;

/// Tokens this close to expiry are treated as expired.
pub const EXPIRY_BUFFER: Duration = Duration::from_secs(5 * 60);

/// Something that can mint a fresh access token.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn fetch_token(&self) -> Result<TokenResponse, ProviderError>;
}

#[derive(Debug, Clone)]
pub struct CachedToken {
    pub access_token: String,
    pub expires_at: Instant,
}

impl CachedToken {
    pub fn from_response(response: TokenResponse, now: Instant) -> Self {
        Self {
            access_token: response.access_token,
            expires_at: now + Duration::from_secs(response.expires_in),
        }
    }

    /// Usable without refreshing: more than [`EXPIRY_BUFFER`] left.
    pub fn is_fresh(&self, now: Instant) -> bool {
        now + EXPIRY_BUFFER < self.expires_at
    }
}

pub struct TokenManager {
    source: Box<dyn TokenSource>,
    cached: RwLock<Option<CachedToken>>,
    refresh: Mutex<()>,
}

impl TokenManager {
    pub fn new(source: impl TokenSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            cached: RwLock::new(None),
            refresh: Mutex::new(()),
        }
    }

    /// Return a fresh access token, fetching a new one if needed.
    pub async fn access_token(&self) -> Result<String, ProviderError> {
        if let Some(token) = self.fresh_token().await {
            return Ok(token);
        }

        let _guard = self.refresh.lock().await;
        // Another caller may have refreshed while we waited.
        if let Some(token) = self.fresh_token().await {
            return Ok(token);
        }

        let response = self.source.fetch_token().await?;
        if response.access_token.trim().is_empty() {
            return Err(ProviderError::Auth(
                "token endpoint returned an empty access token".to_string(),
            ));
        }
        log::debug!("Obtained access token valid for {}s", response.expires_in);

        let token = CachedToken::from_response(response, Instant::now());
        let access_token = token.access_token.clone();
        *self.cached.write().await = Some(token);
        Ok(access_token)
    }

    /// Drop the cached token if it is still `rejected`, so the next call
    /// re-authenticates. A token refreshed by another caller in the meantime
    /// is kept.
    pub async fn invalidate(&self, rejected: &str) {
        let mut cached = self.cached.write().await;
        if cached
            .as_ref()
            .is_some_and(|t| t.access_token == rejected)
        {
            *cached = None;
        }
    }

    async fn fresh_token(&self) -> Option<String> {
        let now = Instant::now();
        self.cached
            .read()
            .await
            .as_ref()
            .filter(|t| t.is_fresh(now))
            .map(|t| t.access_token.clone())
    }
}
