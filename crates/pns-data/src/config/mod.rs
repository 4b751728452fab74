//! Storefront configuration file

mod duration;

use std::path::Path;
use std::time::Duration;

use pns_core::Breakpoints;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::query::DEFAULT_PAGE_SIZE;

/// Errors that can occur while loading the configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config value for '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Featured carousel settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarouselConfig {
    /// Auto-advance period; `null` or zero disables rotation
    #[serde(with = "duration::option")]
    pub interval: Option<Duration>,

    pub breakpoints: Breakpoints,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            interval: Some(Duration::from_secs(5)),
            breakpoints: Breakpoints::default(),
        }
    }
}

/// Storefront settings; every field has a default
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorefrontConfig {
    /// Listings per grid page
    pub page_size: usize,

    /// Quiet period before a search query is applied
    #[serde(with = "duration")]
    pub search_debounce: Duration,

    pub carousel: CarouselConfig,

    /// How long a fetched collection is served from cache
    #[serde(with = "duration")]
    pub cache_stale_after: Duration,

    /// Simulated latency of the in-memory source
    #[serde(with = "duration")]
    pub fetch_latency: Duration,

    /// Origin used to build canonical listing URLs
    pub share_base_url: String,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            search_debounce: Duration::from_millis(500),
            carousel: CarouselConfig::default(),
            cache_stale_after: Duration::from_secs(5 * 60),
            fetch_latency: Duration::from_secs(1),
            share_base_url: "https://pushnshop.cm".to_string(),
        }
    }
}

impl StorefrontConfig {
    /// Load and validate a JSON config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&contents)?;
        tracing::debug!(path = %path.display(), "Loaded storefront config");
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::Invalid {
                field: "page_size",
                reason: "must be at least 1".to_string(),
            });
        }

        let breakpoints = &self.carousel.breakpoints;
        if breakpoints.tablet_min_width > breakpoints.desktop_min_width {
            return Err(ConfigError::Invalid {
                field: "carousel.breakpoints",
                reason: format!(
                    "tablet width {} exceeds desktop width {}",
                    breakpoints.tablet_min_width, breakpoints.desktop_min_width
                ),
            });
        }
        if breakpoints.mobile_items == 0
            || breakpoints.tablet_items == 0
            || breakpoints.desktop_items == 0
        {
            return Err(ConfigError::Invalid {
                field: "carousel.breakpoints",
                reason: "item counts must be at least 1".to_string(),
            });
        }

        if self.share_base_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "share_base_url",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Carousel interval with zero folded into "disabled"
    pub fn carousel_interval(&self) -> Option<Duration> {
        self.carousel.interval.filter(|d| !d.is_zero())
    }
}
