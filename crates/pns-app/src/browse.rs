//! `storefront browse`

use std::sync::Arc;

use anyhow::{bail, Result};
use chrono::Utc;
use pns_core::share::contact_seller_link;
use pns_core::{
    format_remaining, CarouselContext, CarouselSubscriber, Listing, ListingSource, ShareEnvironment,
    ShareError, SharePlatform, ShareTracker, StorefrontState, LOAD_ERROR_MESSAGE,
};
use pns_data::{CachedSource, CsvListingSource, InMemorySource, PriceRange, StorefrontConfig};
use pns_views::{BrowseSnapshot, BrowseView};
use rand::thread_rng;
use tracing::info;

use crate::sample_data::generate_listings;
use crate::BrowseArgs;

/// Prints share actions instead of opening a browser
struct StdoutShareEnvironment;

impl ShareEnvironment for StdoutShareEnvironment {
    fn open_url(&self, url: &str) -> Result<(), ShareError> {
        println!("  open      {}", url);
        Ok(())
    }

    fn write_clipboard(&self, text: &str) -> Result<(), ShareError> {
        println!("  clipboard {}", text);
        Ok(())
    }
}

/// Logs carousel page flips
struct CarouselLogger;

impl CarouselSubscriber for CarouselLogger {
    fn on_carousel_change(&self, context: &CarouselContext) {
        info!(
            page = context.current_page + 1,
            pages = context.page_count,
            phase = ?context.phase,
            "Carousel changed"
        );
    }
}

fn listing_source(config: &StorefrontConfig, args: &BrowseArgs) -> Arc<dyn ListingSource> {
    let inner: Arc<dyn ListingSource> = match &args.listings {
        Some(path) => Arc::new(CsvListingSource::new(path.clone())),
        None => {
            let listings = generate_listings(&mut thread_rng(), 120, Utc::now());
            Arc::new(
                InMemorySource::new(listings)
                    .with_name("sample")
                    .with_latency(config.fetch_latency),
            )
        }
    };
    Arc::new(CachedSource::new(inner, config.cache_stale_after))
}

pub async fn run(config: &StorefrontConfig, args: BrowseArgs) -> Result<()> {
    let state = StorefrontState::new();
    println!("Loading products...");
    if state.load(listing_source(config, &args)).await.is_err() {
        println!("{}", LOAD_ERROR_MESSAGE);
        bail!("no listings available");
    }

    let view = BrowseView::new(config, args.viewport);
    view.set_listings(state.listings());
    view.set_category(args.category);
    view.set_location(args.location);
    view.set_price_range(PriceRange::from_encoding(&args.price));
    view.set_sort(args.sort);
    if let Some(search) = &args.search {
        view.set_search_input(search.as_str());
        view.flush_search();
    }
    view.select_page(args.page);

    print_snapshot(&view.snapshot());

    if let Some(id) = &args.share {
        share_listing(config, &state, id)?;
    }

    if let Some(duration) = args.rotate_for {
        // Held for the whole rotation; the engine only keeps a weak reference
        let logger: Arc<dyn CarouselSubscriber> = Arc::new(CarouselLogger);
        view.carousel().engine().add_subscriber(logger.clone());
        info!(?duration, "Rotating featured carousel");
        tokio::time::sleep(duration).await;
        drop(logger);
    }

    view.shutdown();
    Ok(())
}

fn print_listing(listing: &Listing) {
    let now = Utc::now();
    println!(
        "  P{:<4} {:<28} {:>16}  {:<10} {:<12} {}",
        listing.link_number,
        listing.title,
        listing.formatted_price(),
        listing.location,
        listing.category.display_name(),
        format_remaining(listing, now).unwrap_or_default(),
    );
}

fn print_snapshot(snapshot: &BrowseSnapshot) {
    if !snapshot.badges.is_empty() {
        let labels: Vec<&str> = snapshot.badges.iter().map(|b| b.label.as_str()).collect();
        println!(
            "Filters ({}): {}",
            snapshot.active_filter_count,
            labels.join(" | ")
        );
    }

    println!(
        "\nFeatured ({} listings, carousel page {}/{})",
        snapshot.featured.len(),
        snapshot.carousel.current_page + 1,
        snapshot.carousel.page_count.max(1),
    );
    snapshot.carousel_items.iter().for_each(print_listing);

    println!("\nAll products");
    if snapshot.page_items.is_empty() {
        println!("  No products found");
    }
    snapshot.page_items.iter().for_each(print_listing);

    println!(
        "\n{} (page {}/{})",
        snapshot.summary,
        snapshot.page_index + 1,
        snapshot.page_count.max(1),
    );
}

fn share_listing(config: &StorefrontConfig, state: &StorefrontState, id: &str) -> Result<()> {
    let listings = state.listings();
    let Some(listing) = listings.iter().find(|l| l.id == id) else {
        bail!("listing '{}' not found", id);
    };

    println!("\nSharing '{}'", listing.title);
    let tracker = ShareTracker::new(config.share_base_url.as_str());
    let env = StdoutShareEnvironment;
    for platform in SharePlatform::ALL {
        // Failures are logged and published by the tracker
        let _ = tracker.share(&env, platform, listing, &state.event_bus);
    }

    match contact_seller_link(listing) {
        Some(link) => println!("  contact   {}", link),
        None => println!("  contact   (seller has no messaging number)"),
    }
    Ok(())
}
