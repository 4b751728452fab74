//! Core functionality for the PushNshop storefront
//!
//! This crate provides the canonical listing record, the featured carousel
//! controller, timer primitives and the shared storefront state.

pub mod carousel;
pub mod events;
pub mod listing;
pub mod schedule;
pub mod share;
pub mod state;

// Re-export commonly used types
pub use carousel::{
    Breakpoints, CarouselContext, CarouselEngine, CarouselPhase, CarouselRotator,
    CarouselSubscriber, Interaction,
};
pub use listing::{
    format_price, format_remaining, Category, Listing, ListingId, ListingMetrics, Location,
    Seller, ShippingOptions,
};
pub use schedule::{Debouncer, ScheduledTask};
pub use share::{ShareEnvironment, ShareError, SharePlatform, ShareTarget, ShareTracker};
pub use source::ListingSource;
pub use state::{LoadStatus, StorefrontState, LOAD_ERROR_MESSAGE};

/// Upstream listing providers
pub mod source {
    use crate::listing::Listing;

    /// Trait for anything that can hand the storefront its listing collection
    #[async_trait::async_trait]
    pub trait ListingSource: Send + Sync {
        /// Fetch the full listing collection
        async fn fetch_listings(&self) -> anyhow::Result<Vec<Listing>>;

        /// Get the source name (file name, "memory", ...)
        fn source_name(&self) -> &str;
    }
}
