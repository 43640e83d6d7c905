//! Catalog access: page fetches and the scrolling pagination protocol.

use std::sync::Arc;

use async_trait::async_trait;
use moka::future::Cache;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, error, instrument, warn};
use url::Url;

use sugar_snap_core::Item;

use crate::config::{ConfigError, FoodServiceConfig, join_endpoint};
use crate::error::{CatalogError, TransportError};

/// How many cached pages to keep before eviction kicks in.
const PAGE_CACHE_CAPACITY: u64 = 1024;

// =============================================================================
// CatalogClient
// =============================================================================

/// Client for the food service catalog.
///
/// Fetches pages of items via `GET /list?page={n}`. Pages are optionally
/// cached in memory (read path only - purchase calls are never cached).
/// Cloning is cheap; all clones share the cache and connection pool.
#[derive(Clone)]
pub struct CatalogClient {
    inner: Arc<CatalogClientInner>,
}

struct CatalogClientInner {
    http: reqwest::Client,
    list_url: Url,
    api_token: Option<SecretString>,
    request_timeout: std::time::Duration,
    page_cache: Option<Cache<u32, Arc<Vec<Item>>>>,
}

impl CatalogClient {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured base URL cannot host endpoints.
    pub fn new(config: &FoodServiceConfig) -> Result<Self, ConfigError> {
        let page_cache = config.page_cache_ttl.map(|ttl| {
            Cache::builder()
                .max_capacity(PAGE_CACHE_CAPACITY)
                .time_to_live(ttl)
                .build()
        });

        Ok(Self {
            inner: Arc::new(CatalogClientInner {
                http: reqwest::Client::new(),
                list_url: join_endpoint(&config.base_url, "list")?,
                api_token: config.api_token.clone(),
                request_timeout: config.request_timeout,
                page_cache,
            }),
        })
    }

    /// Fetch one catalog page.
    ///
    /// The returned sequence preserves server order; an empty sequence
    /// signals end-of-catalog. Concurrent calls with different page indices
    /// are independent; dropping the returned future aborts the in-flight
    /// request.
    ///
    /// # Errors
    ///
    /// Returns an error if the round trip fails, the body does not decode
    /// as an item page, or any item violates the catalog contract. The
    /// whole page is rejected in that case - no partial results.
    #[instrument(skip(self))]
    pub async fn fetch_page(&self, page: u32) -> Result<Vec<Item>, CatalogError> {
        if let Some(cache) = &self.inner.page_cache {
            if let Some(items) = cache.get(&page).await {
                debug!("cache hit for catalog page");
                return Ok(items.as_ref().clone());
            }
        }

        let mut url = self.inner.list_url.clone();
        url.query_pairs_mut().append_pair("page", &page.to_string());

        let mut request = self
            .inner
            .http
            .get(url)
            .timeout(self.inner.request_timeout);
        if let Some(token) = &self.inner.api_token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await.map_err(TransportError::Http)?;
        let status = response.status();
        if !status.is_success() {
            warn!(%status, "food service returned non-success status for catalog page");
            return Err(TransportError::Status(status).into());
        }

        // Read the body as text first for better error diagnostics
        let body = response.text().await.map_err(TransportError::Http)?;
        let items: Vec<Item> = serde_json::from_str(&body).map_err(|e| {
            error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "failed to decode catalog page"
            );
            CatalogError::Decode(e)
        })?;

        validate_page(page, &items)?;
        debug!(items = items.len(), "catalog page fetched");

        if let Some(cache) = &self.inner.page_cache {
            cache.insert(page, Arc::new(items.clone())).await;
        }

        Ok(items)
    }

    /// Invalidate all cached pages.
    pub async fn invalidate_pages(&self) {
        if let Some(cache) = &self.inner.page_cache {
            cache.invalidate_all();
            cache.run_pending_tasks().await;
        }
    }
}

/// Reject pages whose items violate the catalog contract.
fn validate_page(page: u32, items: &[Item]) -> Result<(), CatalogError> {
    for item in items {
        if item.id.is_empty() {
            return Err(CatalogError::InvalidItem {
                page,
                reason: "empty item id".to_string(),
            });
        }
        if item.price.is_negative() {
            return Err(CatalogError::InvalidItem {
                page,
                reason: format!("negative price for item {}", item.id),
            });
        }
    }
    Ok(())
}

// =============================================================================
// PageSource / CatalogPager
// =============================================================================

/// Anything that can serve catalog pages.
///
/// Implemented by [`CatalogClient`] and by scripted fakes in tests, so the
/// pagination protocol can be exercised without a network.
#[async_trait]
pub trait PageSource {
    /// Fetch the page with the given index.
    async fn fetch_page(&self, page: u32) -> Result<Vec<Item>, CatalogError>;
}

#[async_trait]
impl PageSource for CatalogClient {
    async fn fetch_page(&self, page: u32) -> Result<Vec<Item>, CatalogError> {
        Self::fetch_page(self, page).await
    }
}

/// Caller-side pagination state for a scrolling consumer.
///
/// The page index starts at 0 and only advances after a non-empty page is
/// received: an empty page marks the catalog exhausted, and a failed fetch
/// leaves the index where it was so a retry re-requests the same page
/// instead of skipping it.
#[derive(Debug)]
pub struct CatalogPager<S> {
    source: S,
    next_page: u32,
    exhausted: bool,
}

impl<S: PageSource> CatalogPager<S> {
    /// Create a pager starting at page 0.
    pub const fn new(source: S) -> Self {
        Self {
            source,
            next_page: 0,
            exhausted: false,
        }
    }

    /// Fetch the next page.
    ///
    /// Returns an empty sequence once the catalog is exhausted; after that
    /// no further requests are issued.
    ///
    /// # Errors
    ///
    /// Propagates the source's error without advancing the page index.
    pub async fn next_page(&mut self) -> Result<Vec<Item>, CatalogError> {
        if self.exhausted {
            return Ok(Vec::new());
        }

        let items = self.source.fetch_page(self.next_page).await?;
        if items.is_empty() {
            debug!(page = self.next_page, "catalog exhausted");
            self.exhausted = true;
        } else {
            self.next_page += 1;
        }
        Ok(items)
    }

    /// Whether an empty page has been seen.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Number of non-empty pages consumed so far.
    #[must_use]
    pub const fn pages_loaded(&self) -> u32 {
        self.next_page
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use reqwest::StatusCode;
    use rust_decimal::Decimal;
    use sugar_snap_core::{ItemId, Price};

    use super::*;

    fn item(id: &str) -> Item {
        Item {
            id: ItemId::new(id),
            name: None,
            description: None,
            price: Price::new(Decimal::new(500, 1)),
            image_url: format!("http://img.example.com/{id}.png"),
        }
    }

    /// Serves a pre-scripted response per call and records requested pages.
    struct ScriptedSource {
        responses: Mutex<VecDeque<Result<Vec<Item>, CatalogError>>>,
        requested: Mutex<Vec<u32>>,
    }

    impl ScriptedSource {
        fn new(responses: Vec<Result<Vec<Item>, CatalogError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                requested: Mutex::new(Vec::new()),
            }
        }

        fn requested(&self) -> Vec<u32> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PageSource for Arc<ScriptedSource> {
        async fn fetch_page(&self, page: u32) -> Result<Vec<Item>, CatalogError> {
            self.requested.lock().unwrap().push(page);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("script exhausted")
        }
    }

    #[tokio::test]
    async fn test_pager_walks_until_empty_page() {
        let source = Arc::new(ScriptedSource::new(vec![
            Ok(vec![item("a"), item("b")]),
            Ok(vec![item("c")]),
            Ok(Vec::new()),
        ]));
        let mut pager = CatalogPager::new(Arc::clone(&source));

        assert_eq!(pager.next_page().await.unwrap().len(), 2);
        assert_eq!(pager.next_page().await.unwrap().len(), 1);
        assert!(pager.next_page().await.unwrap().is_empty());

        assert!(pager.is_exhausted());
        assert_eq!(pager.pages_loaded(), 2);
        assert_eq!(source.requested(), vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn test_empty_first_page_stops_immediately() {
        let source = Arc::new(ScriptedSource::new(vec![Ok(Vec::new())]));
        let mut pager = CatalogPager::new(Arc::clone(&source));

        assert!(pager.next_page().await.unwrap().is_empty());
        assert_eq!(pager.pages_loaded(), 0);

        // Exhausted pagers answer without touching the source again.
        assert!(pager.next_page().await.unwrap().is_empty());
        assert_eq!(source.requested(), vec![0]);
    }

    #[tokio::test]
    async fn test_failed_fetch_does_not_advance() {
        let source = Arc::new(ScriptedSource::new(vec![
            Err(TransportError::Status(StatusCode::INTERNAL_SERVER_ERROR).into()),
            Ok(vec![item("a")]),
            Ok(Vec::new()),
        ]));
        let mut pager = CatalogPager::new(Arc::clone(&source));

        assert!(pager.next_page().await.is_err());
        assert_eq!(pager.pages_loaded(), 0);
        assert!(!pager.is_exhausted());

        // The retry re-requests the same page index.
        assert_eq!(pager.next_page().await.unwrap().len(), 1);
        assert_eq!(source.requested(), vec![0, 0]);
    }

    #[test]
    fn test_validate_page_rejects_empty_id() {
        let err = validate_page(0, &[item("a"), item("")]).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidItem { page: 0, .. }));
    }

    #[test]
    fn test_validate_page_rejects_negative_price() {
        let mut bad = item("a");
        bad.price = Price::new(Decimal::new(-100, 2));
        let err = validate_page(2, &[bad]).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidItem { page: 2, .. }));
    }
}
