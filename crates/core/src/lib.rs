//! Sugar Snap Core - Shared domain types.
//!
//! This crate provides the types shared across all Sugar Snap components:
//! - `client` - Catalog client and checkout coordinator
//! - `cli` - Command-line tool for browsing and buying
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients. Everything
//! that talks to the food service lives in `sugar-snap-client`; this crate can
//! be used anywhere, including in test doubles.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, prices, catalog items, and the cart

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
