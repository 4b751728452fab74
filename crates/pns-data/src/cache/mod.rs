//! Stale-time caching of listing fetches

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use pns_core::{Listing, ListingSource};
use tokio::time::Instant;

struct CacheEntry {
    fetched_at: Instant,
    listings: Arc<Vec<Listing>>,
}

/// Serves the last successful fetch of the inner source while it is fresh.
///
/// Failed fetches are never cached; the next call goes upstream again.
pub struct CachedSource {
    inner: Arc<dyn ListingSource>,
    stale_after: Duration,
    entry: RwLock<Option<CacheEntry>>,
}

impl CachedSource {
    pub fn new(inner: Arc<dyn ListingSource>, stale_after: Duration) -> Self {
        Self {
            inner,
            stale_after,
            entry: RwLock::new(None),
        }
    }

    /// Cached collection if it is still fresh
    pub fn get_fresh(&self) -> Option<Arc<Vec<Listing>>> {
        let entry = self.entry.read();
        entry
            .as_ref()
            .filter(|e| e.fetched_at.elapsed() < self.stale_after)
            .map(|e| e.listings.clone())
    }

    /// Drop the cached collection
    pub fn invalidate(&self) {
        self.entry.write().take();
    }
}

#[async_trait]
impl ListingSource for CachedSource {
    async fn fetch_listings(&self) -> anyhow::Result<Vec<Listing>> {
        if let Some(listings) = self.get_fresh() {
            tracing::debug!(source = self.inner.source_name(), "Serving cached listings");
            return Ok(listings.as_ref().clone());
        }

        let listings = self.inner.fetch_listings().await?;
        *self.entry.write() = Some(CacheEntry {
            fetched_at: Instant::now(),
            listings: Arc::new(listings.clone()),
        });
        Ok(listings)
    }

    fn source_name(&self) -> &str {
        self.inner.source_name()
    }
}
