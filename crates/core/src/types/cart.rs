//! Client-held cart of unconfirmed selections.

use std::collections::BTreeMap;

use crate::types::{EntryId, Item, ItemId};

/// The cart: an ordered multiset of selected items.
///
/// Adding the same item twice produces two entries; aggregation happens in
/// [`Cart::quantities`]. Insertion order is preserved but irrelevant to
/// correctness. Entries must reference items obtained from the catalog,
/// never synthesized ones - the cart cannot check this, callers must.
#[derive(Debug, Clone, Default)]
pub struct Cart {
    entries: Vec<CartEntry>,
    next_entry: u64,
}

/// One entry in the cart: an opaque handle plus the selected item.
#[derive(Debug, Clone, PartialEq)]
pub struct CartEntry {
    /// Handle used to remove this entry.
    pub id: EntryId,
    /// The selected catalog item.
    pub item: Item,
}

/// Aggregate view of the cart, handed to the UI layer after every mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartSummary {
    /// Number of entries (duplicates counted).
    pub total_items: usize,
    /// Number of distinct item ids.
    pub distinct_items: usize,
}

impl CartSummary {
    /// Whether the cart holds nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total_items == 0
    }
}

impl Cart {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry for `item` and return its handle.
    pub fn add(&mut self, item: Item) -> EntryId {
        let id = EntryId::new(self.next_entry);
        self.next_entry += 1;
        self.entries.push(CartEntry { id, item });
        id
    }

    /// Remove the entry with the given handle.
    ///
    /// Returns `true` if an entry was removed; a missing handle is a no-op.
    pub fn remove(&mut self, id: EntryId) -> bool {
        let len_before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() < len_before
    }

    /// Drop all entries. Entry handles are not reused afterwards.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of entries, duplicates counted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cart holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entries in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    /// Aggregate the cart into a quantity map keyed by item id.
    ///
    /// The sum of the counts always equals [`Cart::len`], and the key set
    /// equals the distinct ids present in the cart. This is the exact body
    /// shape of the purchase confirmation request.
    #[must_use]
    pub fn quantities(&self) -> BTreeMap<ItemId, u64> {
        let mut map = BTreeMap::new();
        for entry in &self.entries {
            *map.entry(entry.item.id.clone()).or_insert(0) += 1;
        }
        map
    }

    /// Aggregate counts for the UI layer.
    #[must_use]
    pub fn summary(&self) -> CartSummary {
        CartSummary {
            total_items: self.entries.len(),
            distinct_items: self.quantities().len(),
        }
    }
}
