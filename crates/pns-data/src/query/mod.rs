//! Listing query pipeline
//!
//! [`query_listings`] turns a raw collection plus a [`QueryParams`] into the
//! featured subset and one page of the remaining listings. The pipeline is a
//! pure function of its inputs: it never mutates listings and only works with
//! references into the caller's collection.

pub mod filter;
pub mod paginate;
pub mod sort;

use ahash::AHashSet;
use pns_core::Listing;

pub use filter::{CategoryFilter, LocationFilter, PriceRange};
pub use paginate::{page_count, page_slice};
pub use sort::{sort_by_popularity, SortKey};

/// Maximum size of the featured subset
pub const FEATURED_LIMIT: usize = 12;

/// Default number of listings per grid page
pub const DEFAULT_PAGE_SIZE: usize = 12;

/// Filter, sort and pagination parameters of the listing grid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryParams {
    pub category: CategoryFilter,
    pub location: LocationFilter,
    pub price_range: PriceRange,
    /// Free-text query, matched after trimming
    pub search: String,
    pub sort: SortKey,
    /// Zero-based
    pub page_index: usize,
    pub page_size: usize,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            category: CategoryFilter::All,
            location: LocationFilter::All,
            price_range: PriceRange::All,
            search: String::new(),
            sort: SortKey::Newest,
            page_index: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl QueryParams {
    /// Number of non-sentinel selectors (search and sort excluded)
    pub fn active_filter_count(&self) -> usize {
        [
            self.category.is_active(),
            self.location.is_active(),
            self.price_range.is_active(),
        ]
        .into_iter()
        .filter(|active| *active)
        .count()
    }

    /// Trimmed, lowercased search needle; `None` when the query is blank
    fn search_needle(&self) -> Option<String> {
        let trimmed = self.search.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
    }

    fn keeps(&self, listing: &Listing, needle: Option<&str>) -> bool {
        self.category.matches(listing)
            && self.location.matches(listing)
            && self.price_range.matches(listing)
            && needle.map_or(true, |needle| listing.matches_text(needle))
    }
}

/// Result of one pipeline run
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome<'a> {
    /// Top listings by link score from the filtered set
    pub featured: Vec<&'a Listing>,
    /// The requested page of the remaining set
    pub page_items: Vec<&'a Listing>,
    /// Filtered listings, featured included
    pub total_filtered: usize,
    /// Filtered listings not featured
    pub total_remaining: usize,
    pub page_count: usize,
    pub page_index: usize,
}

impl QueryOutcome<'_> {
    /// "Showing X of Y products"
    pub fn summary(&self) -> String {
        format!(
            "Showing {} of {} products",
            self.page_items.len(),
            self.total_remaining
        )
    }

    pub fn is_empty(&self) -> bool {
        self.total_filtered == 0
    }
}

/// Run the listing query pipeline.
///
/// Filters apply in a fixed order (category, location, price range, search),
/// then the active sort key orders the survivors. Featured listings are the
/// top [`FEATURED_LIMIT`] of the filtered set by link score regardless of the
/// sort key; the remaining set keeps the sort order and is paginated.
pub fn query_listings<'a>(listings: &'a [Listing], params: &QueryParams) -> QueryOutcome<'a> {
    let needle = params.search_needle();

    let mut filtered: Vec<&Listing> = listings
        .iter()
        .filter(|listing| params.keeps(listing, needle.as_deref()))
        .collect();

    let mut by_score = filtered.clone();
    sort_by_popularity(&mut by_score);
    by_score.truncate(FEATURED_LIMIT);
    let featured = by_score;

    params.sort.sort(&mut filtered);

    let featured_ids: AHashSet<&str> = featured.iter().map(|l| l.id.as_str()).collect();
    let total_filtered = filtered.len();
    let remaining: Vec<&Listing> = filtered
        .into_iter()
        .filter(|listing| !featured_ids.contains(listing.id.as_str()))
        .collect();

    let page_items = page_slice(&remaining, params.page_index, params.page_size).to_vec();
    let page_count = page_count(remaining.len(), params.page_size);

    tracing::debug!(
        total = listings.len(),
        filtered = total_filtered,
        featured = featured.len(),
        page = params.page_index,
        page_count,
        "Listing query evaluated"
    );

    QueryOutcome {
        featured,
        page_items,
        total_filtered,
        total_remaining: remaining.len(),
        page_count,
        page_index: params.page_index,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pns_core::{Category, Location};

    #[test]
    fn test_active_filter_count_ignores_search_and_sort() {
        let mut params = QueryParams::default();
        assert_eq!(params.active_filter_count(), 0);

        params.search = "phone".to_string();
        params.sort = SortKey::PriceHigh;
        assert_eq!(params.active_filter_count(), 0);

        params.category = CategoryFilter::Only(Category::Home);
        params.location = LocationFilter::Only(Location::Maroua);
        params.price_range = PriceRange::AtLeast { min: 1_000_000 };
        assert_eq!(params.active_filter_count(), 3);
    }
}
