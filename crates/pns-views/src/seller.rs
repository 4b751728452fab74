//! Seller dashboard: listing drafts and the seller's own overview

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use pns_core::{Category, Listing, Location, Seller};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::admin::{PaymentStatus, PendingSubmission};

/// Durations a listing slot can be bought for
pub const ALLOWED_DURATIONS_HOURS: [u32; 2] = [24, 48];

/// Validation errors of a listing draft
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    #[error("Title is required")]
    MissingTitle,

    #[error("Price must be greater than zero")]
    ZeroPrice,

    #[error("At least one image is required")]
    NoImages,

    #[error("Unsupported duration of {0} hours (expected 24 or 48)")]
    UnsupportedDuration(u32),
}

/// Where an approved listing is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Placement {
    Featured,
    #[default]
    Standard,
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Placement::Featured => f.write_str("Featured"),
            Placement::Standard => f.write_str("Standard"),
        }
    }
}

/// A listing as entered in the "Add New" form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingDraft {
    pub title: String,
    pub description: String,
    pub price: u64,
    pub currency: String,
    pub category: Category,
    pub location: Location,
    pub images: Vec<String>,
    pub placement: Placement,
    pub duration_hours: u32,
}

impl ListingDraft {
    /// Check the draft; reports the first problem found
    pub fn validate(&self) -> Result<(), DraftError> {
        if self.title.trim().is_empty() {
            return Err(DraftError::MissingTitle);
        }
        if self.price == 0 {
            return Err(DraftError::ZeroPrice);
        }
        if self.images.iter().all(|image| image.trim().is_empty()) {
            return Err(DraftError::NoImages);
        }
        if !ALLOWED_DURATIONS_HOURS.contains(&self.duration_hours) {
            return Err(DraftError::UnsupportedDuration(self.duration_hours));
        }
        Ok(())
    }

    /// `"48 hours"`
    pub fn duration_label(&self) -> String {
        format!("{} hours", self.duration_hours)
    }

    /// Validate and wrap the draft for the approval queue
    pub fn submit(self, seller: Seller, now: DateTime<Utc>) -> Result<PendingSubmission, DraftError> {
        self.validate()?;

        let id = Uuid::new_v4();
        let reference = id.simple().to_string()[..8].to_uppercase();
        tracing::debug!(%id, title = %self.title, "Listing draft submitted");

        Ok(PendingSubmission {
            id,
            draft: self,
            seller,
            status: PaymentStatus::PendingPayment,
            payment_reference: format!("PAY-{}", reference),
            submitted_at: now,
        })
    }
}

/// Dashboard sections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SellerSection {
    #[default]
    Products,
    AddNew,
    Payments,
    Analytics,
}

impl SellerSection {
    pub const ALL: [SellerSection; 4] = [
        SellerSection::Products,
        SellerSection::AddNew,
        SellerSection::Payments,
        SellerSection::Analytics,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            SellerSection::Products => "products",
            SellerSection::AddNew => "add",
            SellerSection::Payments => "payments",
            SellerSection::Analytics => "analytics",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SellerSection::Products => "My Products",
            SellerSection::AddNew => "Add New",
            SellerSection::Payments => "Payments",
            SellerSection::Analytics => "Analytics",
        }
    }
}

impl FromStr for SellerSection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|section| section.id() == s)
            .ok_or_else(|| format!("Unknown seller section '{}'", s))
    }
}

/// Totals over one seller's live listings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SellerOverview {
    pub active_listings: usize,
    pub total_views: u64,
    pub total_likes: u64,
    /// Live listings whose slot runs out within 24 hours
    pub expiring_soon: usize,
}

impl SellerOverview {
    /// Summarise the listings of `seller_name` that have not expired at `now`
    pub fn compute(listings: &[Listing], seller_name: &str, now: DateTime<Utc>) -> Self {
        let soon = Duration::hours(24);
        listings
            .iter()
            .filter(|l| l.seller.as_ref().is_some_and(|s| s.name == seller_name))
            .filter(|l| !l.is_expired(now))
            .fold(Self::default(), |mut overview, listing| {
                overview.active_listings += 1;
                overview.total_views += listing.metrics.views;
                overview.total_likes += listing.metrics.likes;
                if listing.time_remaining(now).is_some_and(|left| left <= soon) {
                    overview.expiring_soon += 1;
                }
                overview
            })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;
    use pns_core::{ListingMetrics, ShippingOptions};

    pub(crate) fn seller(name: &str) -> Seller {
        Seller {
            name: name.to_string(),
            rating: 4.8,
            response_time: "~10 mins".to_string(),
            whatsapp_number: Some("237612345678".to_string()),
            is_verified: true,
            shipping: ShippingOptions {
                pickup: true,
                shipping: true,
            },
        }
    }

    pub(crate) fn draft() -> ListingDraft {
        ListingDraft {
            title: "iPhone 13 Pro".to_string(),
            description: "256GB, Pacific Blue".to_string(),
            price: 450_000,
            currency: "XAF".to_string(),
            category: Category::Electronics,
            location: Location::Douala,
            images: vec!["image1.jpg".to_string()],
            placement: Placement::Featured,
            duration_hours: 48,
        }
    }

    #[test]
    fn test_validation() {
        assert_eq!(draft().validate(), Ok(()));

        let mut bad = draft();
        bad.title = "   ".to_string();
        assert_eq!(bad.validate(), Err(DraftError::MissingTitle));

        let mut bad = draft();
        bad.price = 0;
        assert_eq!(bad.validate(), Err(DraftError::ZeroPrice));

        let mut bad = draft();
        bad.images = vec![String::new()];
        assert_eq!(bad.validate(), Err(DraftError::NoImages));

        let mut bad = draft();
        bad.duration_hours = 72;
        assert_eq!(bad.validate(), Err(DraftError::UnsupportedDuration(72)));
    }

    #[test]
    fn test_submit_creates_pending_submission() {
        let now = Utc.with_ymd_and_hms(2024, 12, 27, 9, 0, 0).unwrap();
        let submission = draft().submit(seller("John Doe"), now).unwrap();
        assert_eq!(submission.status, PaymentStatus::PendingPayment);
        assert!(submission.payment_reference.starts_with("PAY-"));
        assert_eq!(submission.payment_reference.len(), 12);
        assert_eq!(submission.draft.duration_label(), "48 hours");

        let mut bad = draft();
        bad.price = 0;
        assert!(bad.submit(seller("John Doe"), now).is_err());
    }

    #[test]
    fn test_sections() {
        assert_eq!(SellerSection::default(), SellerSection::Products);
        assert_eq!("add".parse::<SellerSection>(), Ok(SellerSection::AddNew));
        assert!("settings".parse::<SellerSection>().is_err());
    }

    #[test]
    fn test_overview_counts_live_listings_of_seller() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let make = |id: &str, name: &str, hours_left: i64, views: u64| Listing {
            id: id.to_string(),
            link_number: 1,
            category: Category::Home,
            location: Location::Bamenda,
            title: "Sofa".to_string(),
            description: String::new(),
            price: 80_000,
            currency: "XAF".to_string(),
            images: Vec::new(),
            approved_at: now - Duration::hours(1),
            expires_at: Some(now + Duration::hours(hours_left)),
            seller: Some(seller(name)),
            metrics: ListingMetrics {
                link_score: 0,
                views,
                likes: 2,
            },
        };
        let listings = vec![
            make("1", "Ama", 10, 100),
            make("2", "Ama", 40, 50),
            make("3", "Ama", -1, 999),
            make("4", "Bea", 10, 7),
        ];

        let overview = SellerOverview::compute(&listings, "Ama", now);
        assert_eq!(
            overview,
            SellerOverview {
                active_listings: 2,
                total_views: 150,
                total_likes: 4,
                expiring_soon: 1,
            }
        );
    }
}
