//! `ss-cli list` - print catalog items.

use sugar_snap_client::{CatalogClient, CatalogPager, FoodServiceConfig};
use sugar_snap_core::Item;

/// Print one page, or walk the catalog page by page until exhausted.
pub async fn run(
    config: &FoodServiceConfig,
    page: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = CatalogClient::new(config)?;

    if let Some(page) = page {
        let items = catalog.fetch_page(page).await?;
        if items.is_empty() {
            tracing::info!("Page {page} is past the end of the catalog");
        }
        print_items(&items);
        return Ok(());
    }

    let mut pager = CatalogPager::new(catalog);
    loop {
        let items = pager.next_page().await?;
        if items.is_empty() {
            break;
        }
        print_items(&items);
    }
    tracing::info!("Listed {} catalog page(s)", pager.pages_loaded());
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_items(items: &[Item]) {
    for item in items {
        println!("{}\t{}\t{}", item.id, item.price, item.display_name());
    }
}
