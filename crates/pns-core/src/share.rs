//! Share and contact deep links for listings
//!
//! Building the links is pure; performing them goes through a
//! [`ShareEnvironment`] so a failed share never touches browsing state.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

use ahash::AHashMap;
use parking_lot::RwLock;
use thiserror::Error;

use crate::events::events::{ShareCompleted, ShareFailed};
use crate::events::EventBus;
use crate::listing::Listing;

/// Errors that can occur while sharing a listing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShareError {
    #[error("Failed to open link: {0}")]
    Open(String),

    #[error("Failed to write to clipboard: {0}")]
    Clipboard(String),

    #[error("Another share is already in progress")]
    Busy,
}

/// Where a listing can be shared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SharePlatform {
    WhatsApp,
    Facebook,
    Twitter,
    Clipboard,
}

impl SharePlatform {
    pub const ALL: [SharePlatform; 4] = [
        SharePlatform::WhatsApp,
        SharePlatform::Facebook,
        SharePlatform::Twitter,
        SharePlatform::Clipboard,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            SharePlatform::WhatsApp => "whatsapp",
            SharePlatform::Facebook => "facebook",
            SharePlatform::Twitter => "twitter",
            SharePlatform::Clipboard => "clipboard",
        }
    }
}

impl fmt::Display for SharePlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// What the environment has to do for a share
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareTarget {
    /// Open a deep link in a new window
    OpenUrl(String),
    /// Put text on the system clipboard
    CopyToClipboard(String),
}

/// Outbound effects delegated to the host environment
pub trait ShareEnvironment: Send + Sync {
    fn open_url(&self, url: &str) -> Result<(), ShareError>;
    fn write_clipboard(&self, text: &str) -> Result<(), ShareError>;
}

/// Canonical URL of a listing
pub fn listing_url(base_url: &str, listing: &Listing) -> String {
    format!("{}/product/{}", base_url.trim_end_matches('/'), listing.id)
}

/// Text used when sharing a listing
pub fn share_text(listing: &Listing) -> String {
    format!(
        "Check out this product: {} ({})",
        listing.title,
        listing.formatted_price()
    )
}

/// Build the share action for a platform
pub fn share_target(platform: SharePlatform, listing: &Listing, base_url: &str) -> ShareTarget {
    let url = listing_url(base_url, listing);
    let text = share_text(listing);

    match platform {
        SharePlatform::WhatsApp => ShareTarget::OpenUrl(format!(
            "https://wa.me/?text={}",
            urlencoding::encode(&format!("{} {}", text, url))
        )),
        SharePlatform::Facebook => ShareTarget::OpenUrl(format!(
            "https://www.facebook.com/sharer/sharer.php?u={}",
            urlencoding::encode(&url)
        )),
        SharePlatform::Twitter => ShareTarget::OpenUrl(format!(
            "https://twitter.com/intent/tweet?text={}&url={}",
            urlencoding::encode(&text),
            urlencoding::encode(&url)
        )),
        SharePlatform::Clipboard => ShareTarget::CopyToClipboard(url),
    }
}

/// Deep link that opens a chat with the seller, if the seller has a number
pub fn contact_seller_link(listing: &Listing) -> Option<String> {
    let number = listing.seller.as_ref()?.whatsapp_number.as_deref()?;
    if number.is_empty() {
        return None;
    }
    let message = format!(
        "Hi, I'm interested in your product: {} ({})",
        listing.title,
        listing.formatted_price()
    );
    Some(format!(
        "https://wa.me/{}?text={}",
        number,
        urlencoding::encode(&message)
    ))
}

/// Performs shares and keeps per-platform success counters
pub struct ShareTracker {
    base_url: String,
    counts: RwLock<AHashMap<SharePlatform, u64>>,
    sharing: AtomicBool,
}

impl ShareTracker {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            counts: RwLock::new(AHashMap::new()),
            sharing: AtomicBool::new(false),
        }
    }

    /// Whether a share is in flight
    pub fn is_sharing(&self) -> bool {
        self.sharing.load(Ordering::SeqCst)
    }

    /// Successful shares for a platform
    pub fn count(&self, platform: SharePlatform) -> u64 {
        self.counts.read().get(&platform).copied().unwrap_or(0)
    }

    /// Share a listing; failures are reported on the bus and returned
    pub fn share(
        &self,
        env: &dyn ShareEnvironment,
        platform: SharePlatform,
        listing: &Listing,
        bus: &EventBus,
    ) -> Result<(), ShareError> {
        if self.sharing.swap(true, Ordering::SeqCst) {
            return Err(ShareError::Busy);
        }

        let result = match share_target(platform, listing, &self.base_url) {
            ShareTarget::OpenUrl(url) => env.open_url(&url),
            ShareTarget::CopyToClipboard(text) => env.write_clipboard(&text),
        };
        self.sharing.store(false, Ordering::SeqCst);

        match &result {
            Ok(()) => {
                *self.counts.write().entry(platform).or_insert(0) += 1;
                tracing::debug!(listing = %listing.id, %platform, "Listing shared");
                bus.publish(ShareCompleted {
                    listing_id: listing.id.clone(),
                    platform: platform.id().to_string(),
                });
            }
            Err(e) => {
                tracing::warn!(listing = %listing.id, %platform, "Share failed: {}", e);
                bus.publish(ShareFailed {
                    listing_id: listing.id.clone(),
                    platform: platform.id().to_string(),
                    error: e.to_string(),
                });
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::handler_from_fn;
    use crate::listing::tests::sample_listing;
    use crate::listing::{Seller, ShippingOptions};
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Default)]
    struct RecordingEnv {
        opened: Mutex<Vec<String>>,
        clipboard: Mutex<Option<String>>,
        deny_clipboard: bool,
    }

    impl ShareEnvironment for RecordingEnv {
        fn open_url(&self, url: &str) -> Result<(), ShareError> {
            self.opened.lock().push(url.to_string());
            Ok(())
        }

        fn write_clipboard(&self, text: &str) -> Result<(), ShareError> {
            if self.deny_clipboard {
                return Err(ShareError::Clipboard("permission denied".to_string()));
            }
            *self.clipboard.lock() = Some(text.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_share_targets() {
        let listing = sample_listing("42");
        let base = "https://shop.example/";

        assert_eq!(
            share_target(SharePlatform::Clipboard, &listing, base),
            ShareTarget::CopyToClipboard("https://shop.example/product/42".to_string())
        );
        assert_eq!(
            share_target(SharePlatform::Facebook, &listing, base),
            ShareTarget::OpenUrl(
                "https://www.facebook.com/sharer/sharer.php?u=https%3A%2F%2Fshop.example%2Fproduct%2F42"
                    .to_string()
            )
        );
        match share_target(SharePlatform::Twitter, &listing, base) {
            ShareTarget::OpenUrl(url) => {
                assert!(url.starts_with("https://twitter.com/intent/tweet?text=Check%20out"));
                assert!(url.ends_with("&url=https%3A%2F%2Fshop.example%2Fproduct%2F42"));
            }
            other => panic!("unexpected target {:?}", other),
        }
        match share_target(SharePlatform::WhatsApp, &listing, base) {
            ShareTarget::OpenUrl(url) => {
                assert!(url.starts_with("https://wa.me/?text="));
                assert!(url.contains("150%20000%20FCFA"));
            }
            other => panic!("unexpected target {:?}", other),
        }
    }

    #[test]
    fn test_contact_seller_requires_number() {
        let mut listing = sample_listing("1");
        assert_eq!(contact_seller_link(&listing), None);

        listing.seller = Some(Seller {
            name: "Seller 1".to_string(),
            rating: 4.5,
            response_time: "~5 mins".to_string(),
            whatsapp_number: Some("237612345678".to_string()),
            is_verified: true,
            shipping: ShippingOptions {
                pickup: true,
                shipping: false,
            },
        });
        let link = contact_seller_link(&listing).unwrap();
        assert!(link.starts_with("https://wa.me/237612345678?text=Hi%2C%20I%27m%20interested"));
    }

    #[test]
    fn test_tracker_counts_successes_and_reports_failures() {
        let bus = EventBus::new();
        let failures = Arc::new(Mutex::new(Vec::new()));
        let sink = failures.clone();
        bus.subscribe::<ShareFailed>(handler_from_fn(move |event| {
            if let Some(e) = event.as_any().downcast_ref::<ShareFailed>() {
                sink.lock().push(e.platform.clone());
            }
        }));

        let tracker = ShareTracker::new("https://shop.example");
        let listing = sample_listing("7");
        let env = RecordingEnv {
            deny_clipboard: true,
            ..RecordingEnv::default()
        };

        tracker
            .share(&env, SharePlatform::Facebook, &listing, &bus)
            .unwrap();
        tracker
            .share(&env, SharePlatform::Facebook, &listing, &bus)
            .unwrap();
        let err = tracker
            .share(&env, SharePlatform::Clipboard, &listing, &bus)
            .unwrap_err();

        assert!(matches!(err, ShareError::Clipboard(_)));
        assert_eq!(tracker.count(SharePlatform::Facebook), 2);
        assert_eq!(tracker.count(SharePlatform::Clipboard), 0);
        assert_eq!(env.opened.lock().len(), 2);
        assert_eq!(*failures.lock(), vec!["clipboard".to_string()]);
        assert!(!tracker.is_sharing());
    }

    /// Environment that starts a second share while the first is opening
    struct NestedShareEnv {
        tracker: Arc<ShareTracker>,
        bus: EventBus,
        listing: Listing,
        nested: Mutex<Option<Result<(), ShareError>>>,
    }

    impl ShareEnvironment for NestedShareEnv {
        fn open_url(&self, _url: &str) -> Result<(), ShareError> {
            let result = self
                .tracker
                .share(self, SharePlatform::Twitter, &self.listing, &self.bus);
            *self.nested.lock() = Some(result);
            Ok(())
        }

        fn write_clipboard(&self, _text: &str) -> Result<(), ShareError> {
            Ok(())
        }
    }

    #[test]
    fn test_share_refused_while_another_is_in_flight() {
        let tracker = Arc::new(ShareTracker::new("https://shop.example"));
        let env = NestedShareEnv {
            tracker: tracker.clone(),
            bus: EventBus::new(),
            listing: sample_listing("3"),
            nested: Mutex::new(None),
        };

        tracker
            .share(&env, SharePlatform::Facebook, &env.listing, &env.bus)
            .unwrap();

        assert!(matches!(*env.nested.lock(), Some(Err(ShareError::Busy))));
        assert!(!tracker.is_sharing());
        assert_eq!(tracker.count(SharePlatform::Facebook), 1);
        assert_eq!(tracker.count(SharePlatform::Twitter), 0);

        tracker
            .share(&env, SharePlatform::Clipboard, &env.listing, &env.bus)
            .unwrap();
        assert_eq!(tracker.count(SharePlatform::Clipboard), 1);
    }
}
