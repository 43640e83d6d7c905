//! Sugar Snap Client - catalog access and checkout for the food service.
//!
//! # Architecture
//!
//! - [`CatalogClient`] fetches catalog pages over HTTP (`GET /list?page={n}`)
//!   and optionally caches them in memory via `moka`.
//! - [`CatalogPager`] drives the page-by-page protocol for a scrolling
//!   consumer: the page index only advances after a non-empty page, so a
//!   transient failure never skips a page.
//! - [`CheckoutCoordinator`] owns the cart and runs the two-phase purchase
//!   (`POST /prepare_buy`, then `POST /confirm_buy` with the quantity map).
//!
//! All clients are explicitly constructed from a [`FoodServiceConfig`] and
//! cheaply cloneable; there is no process-wide shared instance. Every
//! operation returns a typed result - nothing panics past the crate boundary
//! and no failure is retried automatically.
//!
//! # Example
//!
//! ```rust,ignore
//! use sugar_snap_client::{CatalogClient, CatalogPager, CheckoutCoordinator, FoodServiceConfig};
//!
//! let config = FoodServiceConfig::from_env()?;
//! let catalog = CatalogClient::new(&config)?;
//! let coordinator = CheckoutCoordinator::new(&config)?;
//!
//! let mut pager = CatalogPager::new(catalog);
//! let page = pager.next_page().await?;
//!
//! let receipt = coordinator.add_to_cart(page[0].clone());
//! coordinator.checkout().await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;

pub use catalog::{CatalogClient, CatalogPager, PageSource};
pub use checkout::{CartReceipt, CheckoutCoordinator};
pub use config::{ConfigError, FoodServiceConfig};
pub use error::{CatalogError, CheckoutError, CheckoutStage, TransportError};
