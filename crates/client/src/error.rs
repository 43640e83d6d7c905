//! Error taxonomy for the food service client.
//!
//! Every failure crossing the crate boundary is one of these types; the
//! client never panics on a service misbehavior and never retries on its
//! own - retry policy belongs to the caller.

use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single HTTP round trip to the food service.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request never completed (connection refused, timeout, ...).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("unexpected status: {0}")]
    Status(StatusCode),
}

/// Errors returned by catalog page fetches.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The HTTP round trip failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response body was not a valid item page.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The page decoded but an item violates the catalog contract
    /// (empty id, negative price). The whole page is rejected.
    #[error("invalid item on page {page}: {reason}")]
    InvalidItem {
        /// Index of the rejected page.
        page: u32,
        /// What was wrong with it.
        reason: String,
    },
}

/// Stage of the two-phase purchase protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckoutStage {
    /// `POST /prepare_buy` - reserves purchase intent.
    Prepare,
    /// `POST /confirm_buy` - finalizes with the quantity map.
    Confirm,
}

impl CheckoutStage {
    /// Stable lowercase name, used in logs and error messages.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Prepare => "prepare",
            Self::Confirm => "confirm",
        }
    }
}

impl core::fmt::Display for CheckoutStage {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors returned by checkout attempts.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Another attempt is already in flight on this coordinator. The call
    /// is rejected, never queued.
    #[error("checkout already in progress")]
    InProgress,

    /// The cart holds nothing; no network call was made.
    #[error("cart is empty")]
    EmptyCart,

    /// One of the two purchase calls failed. The cart is left untouched;
    /// a failed confirm does not roll back the prepare side effect.
    #[error("checkout failed at {stage}: {source}")]
    Failed {
        /// Which call failed.
        stage: CheckoutStage,
        /// The underlying transport failure.
        #[source]
        source: TransportError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_status_display() {
        let err = TransportError::Status(StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_string(), "unexpected status: 500 Internal Server Error");
    }

    #[test]
    fn test_catalog_invalid_item_display() {
        let err = CatalogError::InvalidItem {
            page: 3,
            reason: "empty item id".to_string(),
        };
        assert_eq!(err.to_string(), "invalid item on page 3: empty item id");
    }

    #[test]
    fn test_catalog_transport_is_transparent() {
        let err = CatalogError::Transport(TransportError::Status(StatusCode::BAD_GATEWAY));
        assert_eq!(err.to_string(), "unexpected status: 502 Bad Gateway");
    }

    #[test]
    fn test_checkout_stage_names() {
        assert_eq!(CheckoutStage::Prepare.to_string(), "prepare");
        assert_eq!(CheckoutStage::Confirm.to_string(), "confirm");
    }

    #[test]
    fn test_checkout_failed_display() {
        let err = CheckoutError::Failed {
            stage: CheckoutStage::Confirm,
            source: TransportError::Status(StatusCode::SERVICE_UNAVAILABLE),
        };
        assert_eq!(
            err.to_string(),
            "checkout failed at confirm: unexpected status: 503 Service Unavailable"
        );
    }

    #[test]
    fn test_checkout_guard_errors_display() {
        assert_eq!(
            CheckoutError::InProgress.to_string(),
            "checkout already in progress"
        );
        assert_eq!(CheckoutError::EmptyCart.to_string(), "cart is empty");
    }
}
