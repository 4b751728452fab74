use async_trait::async_trait;
use pns_core::{Listing, ListingSource};
use std::time::Duration;

/// Fixed listing collection served after a simulated network delay
pub struct InMemorySource {
    name: String,
    listings: Vec<Listing>,
    latency: Duration,
    failure: Option<String>,
}

impl InMemorySource {
    pub fn new(listings: Vec<Listing>) -> Self {
        Self {
            name: "memory".to_string(),
            listings,
            latency: Duration::ZERO,
            failure: None,
        }
    }

    /// Delay every fetch by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Make every fetch fail with `message` (after the latency)
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}

#[async_trait]
impl ListingSource for InMemorySource {
    async fn fetch_listings(&self) -> anyhow::Result<Vec<Listing>> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if let Some(message) = &self.failure {
            anyhow::bail!("{}", message);
        }
        Ok(self.listings.clone())
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_simulated_latency() {
        let source = InMemorySource::new(Vec::new()).with_latency(Duration::from_secs(1));
        let started = Instant::now();
        let listings = source.fetch_listings().await.unwrap();
        assert!(listings.is_empty());
        assert!(started.elapsed() >= Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_failing_source() {
        let source = InMemorySource::new(Vec::new()).failing("backend unavailable");
        let err = source.fetch_listings().await.unwrap_err();
        assert_eq!(err.to_string(), "backend unavailable");
    }
}
