use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

use romshelf_catalog::MetadataEnvelope;

use crate::credentials::IgdbCredentials;
use crate::error::ProviderError;
use crate::mapping::to_envelope;
use crate::provider::MetadataProvider;
use crate::query::build_search_query;
use crate::systems::{igdb_platform_id, platform_matches};
use crate::token::{TokenManager, TokenSource};
use crate::types::{IgdbGame, TokenResponse};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// The API allows four requests per second.
const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(250);

/// HTTP client for an IGDB-style games API.
pub struct IgdbClient {
    http: reqwest::Client,
    api_url: String,
    client_id: String,
    tokens: TokenManager,
    last_request: Mutex<Instant>,
}

impl IgdbClient {
    pub fn new(creds: IgdbCredentials) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self::with_http(creds, http))
    }

    /// Build a client around an already configured `reqwest::Client`.
    pub fn with_http(creds: IgdbCredentials, http: reqwest::Client) -> Self {
        let tokens = TokenManager::new(HttpTokenSource {
            http: http.clone(),
            token_url: creds.token_url,
            client_id: creds.client_id.clone(),
            client_secret: creds.client_secret,
        });

        Self {
            http,
            api_url: creds.api_url,
            client_id: creds.client_id,
            tokens,
            last_request: Mutex::new(Instant::now() - MIN_REQUEST_INTERVAL),
        }
    }

    /// Search games by title. A platform the systems table knows is filtered
    /// server-side; any other platform name is matched client-side.
    pub async fn search_games(
        &self,
        title: &str,
        platform: Option<&str>,
    ) -> Result<Vec<IgdbGame>, ProviderError> {
        let scoped = platform.and_then(igdb_platform_id);
        let body = build_search_query(title, scoped);
        log::debug!("IGDB query: {}", body);

        let games = self.post_games(&body).await?;
        match (platform, scoped) {
            (Some(name), None) => Ok(filter_by_platform(games, name)),
            _ => Ok(games),
        }
    }

    /// POST a body to `/games`, re-authenticating once if the token is rejected.
    async fn post_games(&self, body: &str) -> Result<Vec<IgdbGame>, ProviderError> {
        let mut retried = false;
        loop {
            let token = self.tokens.access_token().await?;
            self.rate_limit().await;

            let resp = self
                .http
                .post(format!("{}/games", self.api_url))
                .header("Client-ID", &self.client_id)
                .header("Authorization", format!("Bearer {token}"))
                .header("Accept", "application/json")
                .body(body.to_string())
                .send()
                .await?;

            let status = resp.status();
            if status == reqwest::StatusCode::UNAUTHORIZED {
                if retried {
                    return Err(ProviderError::Auth("API rejected a fresh token".to_string()));
                }
                log::debug!("Access token rejected, re-authenticating");
                self.tokens.invalidate(&token).await;
                retried = true;
                continue;
            }
            if status == reqwest::StatusCode::FORBIDDEN {
                return Err(ProviderError::Auth("Client-ID not authorized".to_string()));
            }
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                return Err(ProviderError::RateLimit);
            }

            let text = resp.text().await?;
            if !status.is_success() {
                return Err(ProviderError::ServerError {
                    status: status.as_u16(),
                    message: truncate(&text).to_string(),
                });
            }

            return serde_json::from_str(&text).map_err(|e| {
                ProviderError::Api(format!(
                    "Failed to parse games: {e}. Response: {}",
                    truncate(&text)
                ))
            });
        }
    }

    /// Enforce rate limiting: wait until at least MIN_REQUEST_INTERVAL has
    /// passed since the last API request.
    async fn rate_limit(&self) {
        let mut last = self.last_request.lock().await;
        let elapsed = last.elapsed();
        if elapsed < MIN_REQUEST_INTERVAL {
            tokio::time::sleep(MIN_REQUEST_INTERVAL - elapsed).await;
        }
        *last = Instant::now();
    }
}

#[async_trait]
impl MetadataProvider for IgdbClient {
    async fn search(
        &self,
        title: &str,
        platform: Option<&str>,
    ) -> Result<Vec<MetadataEnvelope>, ProviderError> {
        let games = self.search_games(title, platform).await?;
        Ok(games.iter().map(to_envelope).collect())
    }

    fn name(&self) -> &'static str {
        "igdb"
    }
}

/// Keep games released on a platform matching `platform`.
pub(crate) fn filter_by_platform(games: Vec<IgdbGame>, platform: &str) -> Vec<IgdbGame> {
    games
        .into_iter()
        .filter(|g| g.platforms.iter().any(|p| platform_matches(platform, &p.name)))
        .collect()
}

fn truncate(text: &str) -> &str {
    match text.char_indices().nth(200) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Client-credentials grant against the token endpoint.
struct HttpTokenSource {
    http: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
}

#[async_trait]
impl TokenSource for HttpTokenSource {
    async fn fetch_token(&self) -> Result<TokenResponse, ProviderError> {
        let resp = self
            .http
            .post(&self.token_url)
            .query(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if status.is_client_error() {
            return Err(ProviderError::Auth(format!(
                "token endpoint rejected credentials (HTTP {}): {}",
                status.as_u16(),
                truncate(&text)
            )));
        }
        if !status.is_success() {
            return Err(ProviderError::ServerError {
                status: status.as_u16(),
                message: truncate(&text).to_string(),
            });
        }

        serde_json::from_str(&text).map_err(|e| {
            ProviderError::Auth(format!(
                "Failed to parse token response: {e}. Response: {}",
                truncate(&text)
            ))
        })
    }
}

#[cfg(test)]
#[path = "tests/client_tests.rs"]
mod tests;
