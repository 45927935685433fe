use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use romshelf_scraper::types::TokenResponse;
use romshelf_scraper::{ProviderError, TokenManager, TokenSource};
use tokio::time::Duration;

struct CountingSource {
    calls: Arc<AtomicUsize>,
    expires_in: u64,
    latency: Duration,
}

impl CountingSource {
    fn new(expires_in: u64) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = Self {
            calls: calls.clone(),
            expires_in,
            latency: Duration::from_millis(100),
        };
        (source, calls)
    }
}

#[async_trait]
impl TokenSource for CountingSource {
    async fn fetch_token(&self) -> Result<TokenResponse, ProviderError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.latency).await;
        Ok(TokenResponse {
            access_token: format!("token-{n}"),
            expires_in: self.expires_in,
            token_type: "bearer".to_string(),
        })
    }
}

struct RejectingSource;

#[async_trait]
impl TokenSource for RejectingSource {
    async fn fetch_token(&self) -> Result<TokenResponse, ProviderError> {
        Err(ProviderError::Auth("invalid client secret".to_string()))
    }
}

struct EmptyTokenSource;

#[async_trait]
impl TokenSource for EmptyTokenSource {
    async fn fetch_token(&self) -> Result<TokenResponse, ProviderError> {
        Ok(TokenResponse {
            access_token: String::new(),
            expires_in: 3600,
            token_type: "bearer".to_string(),
        })
    }
}

#[tokio::test(start_paused = true)]
async fn concurrent_callers_share_one_refresh() {
    let (source, calls) = CountingSource::new(3600);
    let manager = Arc::new(TokenManager::new(source));

    let mut handles = Vec::new();
    for _ in 0..10 {
        let manager = manager.clone();
        handles.push(tokio::spawn(async move { manager.access_token().await }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap(), "token-1");
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn token_is_reused_until_inside_expiry_buffer() {
    let (source, calls) = CountingSource::new(600);
    let manager = TokenManager::new(source);

    assert_eq!(manager.access_token().await.unwrap(), "token-1");

    tokio::time::advance(Duration::from_secs(4 * 60)).await;
    assert_eq!(manager.access_token().await.unwrap(), "token-1");
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    // Less than five minutes of validity left: refresh.
    tokio::time::advance(Duration::from_secs(61)).await;
    assert_eq!(manager.access_token().await.unwrap(), "token-2");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn short_lived_token_is_never_cached() {
    let (source, calls) = CountingSource::new(60);
    let manager = TokenManager::new(source);

    manager.access_token().await.unwrap();
    manager.access_token().await.unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn invalidate_forces_refresh() {
    let (source, calls) = CountingSource::new(3600);
    let manager = TokenManager::new(source);

    let rejected = manager.access_token().await.unwrap();
    manager.invalidate(&rejected).await;
    assert_eq!(manager.access_token().await.unwrap(), "token-2");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test(start_paused = true)]
async fn stale_rejection_keeps_refreshed_token() {
    let (source, calls) = CountingSource::new(3600);
    let manager = TokenManager::new(source);

    let first = manager.access_token().await.unwrap();
    manager.invalidate(&first).await;
    assert_eq!(manager.access_token().await.unwrap(), "token-2");

    // A second caller that was also rejected with token-1 reports late.
    manager.invalidate(&first).await;
    assert_eq!(manager.access_token().await.unwrap(), "token-2");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn auth_failure_is_fatal() {
    let manager = TokenManager::new(RejectingSource);
    let err = manager.access_token().await.unwrap_err();
    assert!(err.is_fatal());
}

#[tokio::test]
async fn empty_access_token_is_auth_error() {
    let manager = TokenManager::new(EmptyTokenSource);
    assert!(matches!(
        manager.access_token().await,
        Err(ProviderError::Auth(_))
    ));
}
