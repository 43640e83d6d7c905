//! Catalog item as served by the food service.

use serde::{Deserialize, Serialize};

use crate::types::{ItemId, Price};

/// One purchasable item from the catalog.
///
/// Items are immutable once received. `id`, `price`, and `imageURL` are
/// required on the wire; a page containing an item without them fails to
/// decode as a whole. `name` and `description` are optional and default to
/// `None` when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Server-assigned unique identifier.
    pub id: ItemId,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Longer description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Non-negative price.
    pub price: Price,
    /// URI of the item image. Fetching and decoding the image is the UI
    /// layer's business.
    #[serde(rename = "imageURL")]
    pub image_url: String,
}

impl Item {
    /// Display name, falling back to the id.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or_else(|| self.id.as_str())
    }
}
