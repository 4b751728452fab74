//! Main listing page: filters, debounced search, grid page and featured carousel

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use pns_core::{
    Breakpoints, CarouselContext, CarouselEngine, CarouselPhase, CarouselRotator, Debouncer,
    Interaction, Listing,
};
use pns_data::{
    query_listings, CategoryFilter, LocationFilter, PriceRange, QueryParams, SortKey,
    StorefrontConfig,
};

/// Which selector a badge clears
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    Category,
    Location,
    Price,
}

/// Clearable badge shown for an active filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterBadge {
    pub kind: FilterKind,
    pub label: String,
}

/// Owned result of one browse evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct BrowseSnapshot {
    pub featured: Vec<Listing>,
    /// Featured listings on the current carousel page
    pub carousel_items: Vec<Listing>,
    pub carousel: CarouselContext,
    pub page_items: Vec<Listing>,
    pub page_index: usize,
    pub page_count: usize,
    pub total_filtered: usize,
    pub total_remaining: usize,
    pub summary: String,
    pub badges: Vec<FilterBadge>,
    pub active_filter_count: usize,
}

/// View model of the listing page.
///
/// Search input is debounced before it reaches the query parameters. Any
/// filter, sort or applied-search change sends the grid back to page 0. The
/// featured subset feeds a [`CarouselRotator`] that pages through it on its
/// own timer. Timers need a tokio runtime and stop when the view is dropped.
pub struct BrowseView {
    listings: RwLock<Arc<Vec<Listing>>>,
    params: RwLock<QueryParams>,
    search_input: RwLock<String>,
    search: Debouncer<String>,
    carousel: CarouselRotator,
    breakpoints: Breakpoints,
    viewport_width: AtomicU32,
}

impl BrowseView {
    pub fn new(config: &StorefrontConfig, viewport_width: u32) -> Arc<Self> {
        let breakpoints = config.carousel.breakpoints;
        let items_per_page = breakpoints.items_per_page(viewport_width);
        let interval = config.carousel_interval();
        let params = QueryParams {
            page_size: config.page_size,
            ..QueryParams::default()
        };
        let search_debounce = config.search_debounce;

        let view = Arc::new_cyclic(|weak: &Weak<BrowseView>| {
            let weak = weak.clone();
            Self {
                listings: RwLock::new(Arc::new(Vec::new())),
                params: RwLock::new(params),
                search_input: RwLock::new(String::new()),
                search: Debouncer::new(search_debounce, move |query: String| {
                    if let Some(view) = weak.upgrade() {
                        view.apply_search(query);
                    }
                }),
                carousel: CarouselRotator::new(Arc::new(CarouselEngine::new(
                    items_per_page,
                    interval,
                ))),
                breakpoints,
                viewport_width: AtomicU32::new(viewport_width),
            }
        });
        view.carousel.configure(items_per_page, 0, interval);
        view
    }

    /// Replace the listing collection (after a load)
    pub fn set_listings(&self, listings: Arc<Vec<Listing>>) {
        let params = self.params.read();
        *self.listings.write() = listings;
        self.apply_featured_count(&params);
    }

    /// Raw text typed into the search box
    pub fn search_input(&self) -> String {
        self.search_input.read().clone()
    }

    /// Record a keystroke; the query is applied after the quiet period
    pub fn set_search_input(&self, text: impl Into<String>) {
        let text = text.into();
        *self.search_input.write() = text.clone();
        self.search.push(text);
    }

    /// Apply pending search input immediately (e.g. on submit)
    pub fn flush_search(&self) {
        self.search.flush();
    }

    pub fn is_search_pending(&self) -> bool {
        self.search.is_pending()
    }

    pub fn set_category(&self, category: CategoryFilter) {
        self.change_filters(|params| params.category = category);
    }

    pub fn set_location(&self, location: LocationFilter) {
        self.change_filters(|params| params.location = location);
    }

    pub fn set_price_range(&self, price_range: PriceRange) {
        self.change_filters(|params| params.price_range = price_range);
    }

    pub fn set_sort(&self, sort: SortKey) {
        self.change_filters(|params| params.sort = sort);
    }

    /// Badge close button
    pub fn clear_filter(&self, kind: FilterKind) {
        self.change_filters(|params| match kind {
            FilterKind::Category => params.category = CategoryFilter::All,
            FilterKind::Location => params.location = LocationFilter::All,
            FilterKind::Price => params.price_range = PriceRange::All,
        });
    }

    pub fn clear_all_filters(&self) {
        self.change_filters(|params| {
            params.category = CategoryFilter::All;
            params.location = LocationFilter::All;
            params.price_range = PriceRange::All;
        });
    }

    /// Grid pagination; the page index is not clamped here
    pub fn select_page(&self, page_index: usize) {
        self.params.write().page_index = page_index;
    }

    pub fn params(&self) -> QueryParams {
        self.params.read().clone()
    }

    /// Badges for every active filter, in selector order
    pub fn badges(&self) -> Vec<FilterBadge> {
        badges_for(&self.params.read())
    }

    pub fn carousel(&self) -> &CarouselRotator {
        &self.carousel
    }

    /// Hover/touch over the featured carousel
    pub fn carousel_interact(&self, interaction: Interaction) -> CarouselPhase {
        self.carousel.interact(interaction)
    }

    /// Viewport resize
    pub fn resize(&self, viewport_width: u32) {
        self.viewport_width.store(viewport_width, Ordering::Relaxed);
        self.carousel.resize(viewport_width, &self.breakpoints);
    }

    pub fn viewport_width(&self) -> u32 {
        self.viewport_width.load(Ordering::Relaxed)
    }

    /// Evaluate the pipeline for the current parameters
    pub fn snapshot(&self) -> BrowseSnapshot {
        let listings = self.listings.read().clone();
        let params = self.params.read().clone();
        let outcome = query_listings(listings.as_slice(), &params);

        let featured: Vec<Listing> = outcome.featured.iter().map(|l| (*l).clone()).collect();
        let carousel_items = self.carousel.engine().page_items(&featured).to_vec();

        BrowseSnapshot {
            carousel_items,
            carousel: self.carousel.engine().get_context(),
            page_items: outcome.page_items.iter().map(|l| (*l).clone()).collect(),
            page_index: outcome.page_index,
            page_count: outcome.page_count,
            total_filtered: outcome.total_filtered,
            total_remaining: outcome.total_remaining,
            summary: outcome.summary(),
            badges: badges_for(&params),
            active_filter_count: params.active_filter_count(),
            featured,
        }
    }

    /// Stop the carousel and drop pending search input (unmount)
    pub fn shutdown(&self) {
        self.search.cancel();
        self.carousel.shutdown();
    }

    fn apply_search(&self, query: String) {
        let query = query.trim().to_string();
        tracing::debug!(query = %query, "Applying search");
        self.change_filters(|params| params.search = query);
    }

    fn change_filters(&self, f: impl FnOnce(&mut QueryParams)) {
        let mut params = self.params.write();
        let before = params.clone();
        f(&mut *params);
        if *params == before {
            return;
        }
        params.page_index = 0;
        self.apply_featured_count(&params);
    }

    /// Feed the featured count for `params` to the carousel.
    ///
    /// Callers hold the `params` lock so concurrent changes reach the
    /// carousel in the order they were made.
    fn apply_featured_count(&self, params: &QueryParams) {
        let featured = {
            let listings = self.listings.read();
            query_listings(listings.as_slice(), params).featured.len()
        };
        self.carousel.set_total_items(featured);
    }
}

fn badges_for(params: &QueryParams) -> Vec<FilterBadge> {
    let mut badges = Vec::new();
    if let CategoryFilter::Only(category) = params.category {
        badges.push(FilterBadge {
            kind: FilterKind::Category,
            label: format!("Category: {}", category.display_name()),
        });
    }
    if let LocationFilter::Only(location) = params.location {
        badges.push(FilterBadge {
            kind: FilterKind::Location,
            label: format!("Location: {}", location.name()),
        });
    }
    if params.price_range.is_active() {
        badges.push(FilterBadge {
            kind: FilterKind::Price,
            label: format!("Price: {}", params.price_range),
        });
    }
    badges
}
