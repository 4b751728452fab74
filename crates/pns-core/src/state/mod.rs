use std::sync::Arc;
use parking_lot::RwLock;
use crate::events::EventBus;
use crate::listing::Listing;
use crate::source::ListingSource;

/// Message shown to shoppers when the listing collection cannot be fetched
pub const LOAD_ERROR_MESSAGE: &str = "Error loading products. Please try again later.";

/// Where the listing collection currently stands
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    /// Holds the user-visible message, never the underlying error
    Failed(String),
}

impl LoadStatus {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadStatus::Loading)
    }

    /// User-visible error, if the last load failed
    pub fn error_message(&self) -> Option<&str> {
        match self {
            LoadStatus::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Shared storefront state
pub struct StorefrontState {
    /// The event bus
    pub event_bus: Arc<EventBus>,

    /// The source of the current collection
    pub source: Arc<RwLock<Option<Arc<dyn ListingSource>>>>,

    listings: Arc<RwLock<Arc<Vec<Listing>>>>,
    status: Arc<RwLock<LoadStatus>>,
}

impl StorefrontState {
    /// Create an empty state
    pub fn new() -> Self {
        Self::with_event_bus(Arc::new(EventBus::new()))
    }

    pub fn with_event_bus(event_bus: Arc<EventBus>) -> Self {
        Self {
            event_bus,
            source: Arc::new(RwLock::new(None)),
            listings: Arc::new(RwLock::new(Arc::new(Vec::new()))),
            status: Arc::new(RwLock::new(LoadStatus::Idle)),
        }
    }

    /// Fetch the full collection from a source.
    ///
    /// On failure the previous collection is dropped so no partial or stale
    /// results are shown, and the status carries [`LOAD_ERROR_MESSAGE`].
    pub async fn load(&self, source: Arc<dyn ListingSource>) -> anyhow::Result<()> {
        let source_name = source.source_name().to_string();
        *self.status.write() = LoadStatus::Loading;
        *self.source.write() = Some(source.clone());

        match source.fetch_listings().await {
            Ok(listings) => {
                let listing_count = listings.len();
                *self.listings.write() = Arc::new(listings);
                *self.status.write() = LoadStatus::Loaded;
                tracing::info!(source = %source_name, listing_count, "Listings loaded");

                self.event_bus.publish(crate::events::events::ListingsLoaded {
                    source_name,
                    listing_count,
                });
                Ok(())
            }
            Err(e) => {
                *self.listings.write() = Arc::new(Vec::new());
                *self.status.write() = LoadStatus::Failed(LOAD_ERROR_MESSAGE.to_string());
                tracing::error!(source = %source_name, "Failed to load listings: {:#}", e);

                self.event_bus.publish(crate::events::events::ListingsLoadFailed {
                    source_name,
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Snapshot of the current collection
    pub fn listings(&self) -> Arc<Vec<Listing>> {
        self.listings.read().clone()
    }

    pub fn status(&self) -> LoadStatus {
        self.status.read().clone()
    }

    /// Name of the last source a load was attempted from
    pub fn source_name(&self) -> Option<String> {
        self.source
            .read()
            .as_ref()
            .map(|source| source.source_name().to_string())
    }
}

impl Default for StorefrontState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::events::ListingsLoadFailed;
    use crate::events::handler_from_fn;
    use crate::listing::tests::sample_listing;
    use parking_lot::Mutex;

    struct FixedSource {
        result: Mutex<Option<anyhow::Result<Vec<Listing>>>>,
    }

    impl FixedSource {
        fn new(result: anyhow::Result<Vec<Listing>>) -> Arc<Self> {
            Arc::new(Self {
                result: Mutex::new(Some(result)),
            })
        }
    }

    #[async_trait::async_trait]
    impl ListingSource for FixedSource {
        async fn fetch_listings(&self) -> anyhow::Result<Vec<Listing>> {
            self.result
                .lock()
                .take()
                .unwrap_or_else(|| Err(anyhow::anyhow!("already fetched")))
        }

        fn source_name(&self) -> &str {
            "fixed"
        }
    }

    #[tokio::test]
    async fn test_load_success() {
        let state = StorefrontState::new();
        assert_eq!(state.status(), LoadStatus::Idle);

        let source = FixedSource::new(Ok(vec![sample_listing("1"), sample_listing("2")]));
        state.load(source).await.unwrap();

        assert_eq!(state.status(), LoadStatus::Loaded);
        assert_eq!(state.listings().len(), 2);
        assert_eq!(state.source_name().as_deref(), Some("fixed"));
    }

    #[tokio::test]
    async fn test_failed_load_drops_previous_results() {
        let state = StorefrontState::new();
        let failures = Arc::new(Mutex::new(Vec::new()));
        let sink = failures.clone();
        state
            .event_bus
            .subscribe::<ListingsLoadFailed>(handler_from_fn(move |event| {
                if let Some(e) = event.as_any().downcast_ref::<ListingsLoadFailed>() {
                    sink.lock().push(e.error.clone());
                }
            }));

        state
            .load(FixedSource::new(Ok(vec![sample_listing("1")])))
            .await
            .unwrap();
        let result = state
            .load(FixedSource::new(Err(anyhow::anyhow!("connection reset"))))
            .await;

        assert!(result.is_err());
        assert!(state.listings().is_empty());
        assert_eq!(state.status().error_message(), Some(LOAD_ERROR_MESSAGE));
        assert_eq!(*failures.lock(), vec!["connection reset".to_string()]);
    }
}
