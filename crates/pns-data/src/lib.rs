//! Listing data handling for the storefront
//!
//! The query pipeline lives in [`query`]; [`sources`] and [`cache`] feed it.

pub mod cache;
pub mod config;
pub mod query;
pub mod sources;

use thiserror::Error;
use tokio::task::JoinError;

// Re-exports
pub use cache::CachedSource;
pub use config::{CarouselConfig, ConfigError, StorefrontConfig};
pub use query::{
    query_listings, CategoryFilter, LocationFilter, PriceRange, QueryOutcome, QueryParams,
    SortKey, FEATURED_LIMIT,
};
pub use sources::{CsvListingSource, InMemorySource};

/// Errors that can occur while reading listings
#[derive(Error, Debug)]
pub enum ListingError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(String),

    #[error("Malformed listing on line {line}: {message}")]
    MalformedRow { line: u64, message: String },

    #[error("Join error: {0}")]
    Join(#[from] JoinError),
}

impl From<csv::Error> for ListingError {
    fn from(error: csv::Error) -> Self {
        match error.kind() {
            csv::ErrorKind::Io(io_err) => {
                ListingError::Io(std::io::Error::new(io_err.kind(), error.to_string()))
            }
            _ => ListingError::Csv(error.to_string()),
        }
    }
}
