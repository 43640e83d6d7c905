//! Cart ownership and the two-phase purchase transaction.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use url::Url;

use sugar_snap_core::{Cart, CartEntry, CartSummary, EntryId, Item, ItemId};

use crate::config::{ConfigError, FoodServiceConfig, join_endpoint};
use crate::error::{CheckoutError, CheckoutStage, TransportError};

/// Outcome of [`CheckoutCoordinator::add_to_cart`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartReceipt {
    /// Handle for removing the entry later.
    pub entry: EntryId,
    /// Cart aggregate after the mutation - the UI layer's change signal.
    pub summary: CartSummary,
}

// =============================================================================
// CheckoutCoordinator
// =============================================================================

/// Owns the cart and drives the purchase protocol.
///
/// One checkout attempt runs at a time per coordinator; a second call while
/// one is in flight is rejected with [`CheckoutError::InProgress`], never
/// queued. Cart mutations stay available during a checkout - entries added
/// between the prepare and confirm calls are part of the confirmed
/// purchase, since the quantity map is captured when confirm is issued.
///
/// Cloning is cheap; all clones share the same cart and transaction gate.
#[derive(Clone)]
pub struct CheckoutCoordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    http: reqwest::Client,
    prepare_url: Url,
    confirm_url: Url,
    api_token: Option<SecretString>,
    request_timeout: std::time::Duration,
    cart: Mutex<Cart>,
    checkout_in_flight: AtomicBool,
}

impl CheckoutCoordinator {
    /// Create a coordinator with an empty cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured base URL cannot host endpoints.
    pub fn new(config: &FoodServiceConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            inner: Arc::new(CoordinatorInner {
                http: reqwest::Client::new(),
                prepare_url: join_endpoint(&config.base_url, "prepare_buy")?,
                confirm_url: join_endpoint(&config.base_url, "confirm_buy")?,
                api_token: config.api_token.clone(),
                request_timeout: config.request_timeout,
                cart: Mutex::new(Cart::new()),
                checkout_in_flight: AtomicBool::new(false),
            }),
        })
    }

    // =========================================================================
    // Cart mutations (never touch the network)
    // =========================================================================

    /// Append `item` to the cart. Always succeeds; there is no capacity
    /// limit. The item must have been obtained from the catalog.
    pub fn add_to_cart(&self, item: Item) -> CartReceipt {
        let mut cart = self.lock_cart();
        let entry = cart.add(item);
        let summary = cart.summary();
        debug!(%entry, total_items = summary.total_items, "cart entry added");
        CartReceipt { entry, summary }
    }

    /// Remove the entry with the given handle. A missing handle is a
    /// no-op, never an error.
    pub fn remove_from_cart(&self, entry: EntryId) -> CartSummary {
        let mut cart = self.lock_cart();
        let removed = cart.remove(entry);
        let summary = cart.summary();
        debug!(%entry, removed, "cart entry removal requested");
        summary
    }

    /// Current aggregate counts.
    #[must_use]
    pub fn summary(&self) -> CartSummary {
        self.lock_cart().summary()
    }

    /// Current quantity map (item id -> count).
    #[must_use]
    pub fn quantities(&self) -> BTreeMap<ItemId, u64> {
        self.lock_cart().quantities()
    }

    /// Snapshot of the cart entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> Vec<CartEntry> {
        self.lock_cart().entries().to_vec()
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Run one checkout attempt to a terminal state.
    ///
    /// Prepare strictly precedes confirm; the chain is sequential awaits,
    /// no thread ever blocks. On success the cart is cleared. On any
    /// failure the cart is untouched and the caller may retry. There is no
    /// cancellation once started - abandoning a half-done purchase silently
    /// is worse than finishing it.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::InProgress`] if another attempt is in flight.
    /// - [`CheckoutError::EmptyCart`] if there is nothing to buy; no
    ///   network call is made.
    /// - [`CheckoutError::Failed`] naming the stage that failed.
    #[instrument(skip(self))]
    pub async fn checkout(&self) -> Result<(), CheckoutError> {
        let Some(_guard) = CheckoutGuard::acquire(&self.inner.checkout_in_flight) else {
            return Err(CheckoutError::InProgress);
        };

        if self.lock_cart().is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        debug!("preparing purchase");
        self.send_post::<()>(self.inner.prepare_url.clone(), None)
            .await
            .map_err(|source| CheckoutError::Failed {
                stage: CheckoutStage::Prepare,
                source,
            })?;

        // Captured only now: entries added while prepare was in flight are
        // part of the confirmed purchase.
        let quantities = self.lock_cart().quantities();
        debug!(distinct_items = quantities.len(), "confirming purchase");
        self.send_post(self.inner.confirm_url.clone(), Some(&quantities))
            .await
            .map_err(|source| CheckoutError::Failed {
                stage: CheckoutStage::Confirm,
                source,
            })?;

        self.lock_cart().clear();
        info!("purchase confirmed, cart cleared");
        Ok(())
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// POST to a purchase endpoint; response bodies are ignored, only the
    /// round-trip outcome matters.
    async fn send_post<T: Serialize + Sync>(
        &self,
        url: Url,
        body: Option<&T>,
    ) -> Result<(), TransportError> {
        let mut request = self
            .inner
            .http
            .post(url)
            .timeout(self.inner.request_timeout);
        if let Some(token) = &self.inner.api_token {
            request = request.bearer_auth(token.expose_secret());
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(%status, "food service rejected purchase call");
            return Err(TransportError::Status(status));
        }
        Ok(())
    }

    fn lock_cart(&self) -> MutexGuard<'_, Cart> {
        // A poisoned cart mutex only means another thread panicked while
        // holding it; the cart itself is still structurally sound.
        self.inner
            .cart
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// RAII gate for the single in-flight checkout attempt.
///
/// Acquisition flips the flag; dropping the guard resets it on every exit
/// path, so the coordinator always returns to idle.
struct CheckoutGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> CheckoutGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::Acquire, Ordering::Acquire)
            .is_ok()
            .then_some(Self { flag })
    }
}

impl Drop for CheckoutGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use sugar_snap_core::Price;

    use super::*;

    fn coordinator() -> CheckoutCoordinator {
        let config = FoodServiceConfig::new(Url::parse("http://food.example.com").unwrap());
        CheckoutCoordinator::new(&config).unwrap()
    }

    fn item(id: &str) -> Item {
        Item {
            id: ItemId::new(id),
            name: None,
            description: None,
            price: Price::new(Decimal::new(42, 0)),
            image_url: format!("http://img.example.com/{id}.png"),
        }
    }

    #[test]
    fn test_mutations_report_summaries() {
        let coordinator = coordinator();

        let first = coordinator.add_to_cart(item("a"));
        assert_eq!(first.summary.total_items, 1);

        let second = coordinator.add_to_cart(item("a"));
        assert_eq!(second.summary.total_items, 2);
        assert_eq!(second.summary.distinct_items, 1);

        let after_remove = coordinator.remove_from_cart(first.entry);
        assert_eq!(after_remove.total_items, 1);

        // Removing the same handle again is a no-op.
        let after_noop = coordinator.remove_from_cart(first.entry);
        assert_eq!(after_noop, after_remove);
    }

    #[test]
    fn test_clones_share_the_cart() {
        let coordinator = coordinator();
        let clone = coordinator.clone();

        coordinator.add_to_cart(item("a"));
        assert_eq!(clone.summary().total_items, 1);
    }

    #[tokio::test]
    async fn test_empty_cart_checkout_is_rejected_without_network() {
        // The configured host does not exist; reaching the network would
        // surface as a transport failure, not EmptyCart.
        let coordinator = coordinator();
        let result = coordinator.checkout().await;
        assert!(matches!(result, Err(CheckoutError::EmptyCart)));
    }

    #[test]
    fn test_guard_is_exclusive_and_resets_on_drop() {
        let flag = AtomicBool::new(false);

        let guard = CheckoutGuard::acquire(&flag).unwrap();
        assert!(CheckoutGuard::acquire(&flag).is_none());

        drop(guard);
        assert!(CheckoutGuard::acquire(&flag).is_some());
    }
}
