//! Core types for Sugar Snap.
//!
//! This module provides type-safe wrappers for the food-market domain.

pub mod cart;
pub mod id;
pub mod item;
pub mod price;

pub use cart::{Cart, CartEntry, CartSummary};
pub use id::{EntryId, ItemId};
pub use item::Item;
pub use price::Price;
