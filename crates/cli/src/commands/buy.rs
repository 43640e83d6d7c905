//! `ss-cli buy` - fill a cart from the live catalog and purchase it.

use std::collections::BTreeMap;

use sugar_snap_client::{CatalogClient, CatalogPager, CheckoutCoordinator, FoodServiceConfig};
use sugar_snap_core::{Item, ItemId};

/// Resolve the requested ids against the catalog, fill the cart, check out.
///
/// Cart entries may only reference items the service actually listed, so
/// unknown ids fail the command before any purchase call is made.
pub async fn run(
    config: &FoodServiceConfig,
    orders: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut wanted: BTreeMap<ItemId, u64> = BTreeMap::new();
    for arg in orders {
        let (id, count) = parse_order(arg)?;
        *wanted.entry(id).or_insert(0) += count;
    }

    let catalog = CatalogClient::new(config)?;
    let coordinator = CheckoutCoordinator::new(config)?;

    tracing::info!("Resolving {} item id(s) against the catalog...", wanted.len());
    let resolved = resolve_items(catalog, &wanted).await?;

    for (id, count) in &wanted {
        let Some(item) = resolved.get(id) else {
            return Err(format!("item not found in catalog: {id}").into());
        };
        for _ in 0..*count {
            coordinator.add_to_cart(item.clone());
        }
    }

    let summary = coordinator.summary();
    tracing::info!(
        "Checking out {} item(s) ({} distinct)...",
        summary.total_items,
        summary.distinct_items
    );
    coordinator.checkout().await?;
    tracing::info!("Purchase confirmed");
    Ok(())
}

/// Walk the catalog until every wanted id is found or the pages run out.
async fn resolve_items(
    catalog: CatalogClient,
    wanted: &BTreeMap<ItemId, u64>,
) -> Result<BTreeMap<ItemId, Item>, Box<dyn std::error::Error>> {
    let mut resolved = BTreeMap::new();
    let mut pager = CatalogPager::new(catalog);

    while resolved.len() < wanted.len() {
        let items = pager.next_page().await?;
        if items.is_empty() {
            break;
        }
        for item in items {
            if wanted.contains_key(&item.id) {
                resolved.insert(item.id.clone(), item);
            }
        }
    }
    Ok(resolved)
}

/// Parse an `ID=COUNT` argument.
fn parse_order(arg: &str) -> Result<(ItemId, u64), String> {
    let Some((id, count)) = arg.split_once('=') else {
        return Err(format!("expected ID=COUNT, got '{arg}'"));
    };
    let count: u64 = count
        .parse()
        .map_err(|e| format!("invalid count in '{arg}': {e}"))?;
    if id.is_empty() || count == 0 {
        return Err(format!("expected a non-empty id and a positive count in '{arg}'"));
    }
    Ok((ItemId::new(id), count))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_order_valid() {
        let (id, count) = parse_order("borscht-42=2").unwrap();
        assert_eq!(id, ItemId::new("borscht-42"));
        assert_eq!(count, 2);
    }

    #[test]
    fn test_parse_order_rejects_bad_shapes() {
        assert!(parse_order("borscht-42").is_err());
        assert!(parse_order("=2").is_err());
        assert!(parse_order("borscht-42=0").is_err());
        assert!(parse_order("borscht-42=two").is_err());
    }
}
