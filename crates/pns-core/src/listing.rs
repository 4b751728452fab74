//! Listing records shown in the marketplace
//!
//! A [`Listing`] is the single canonical shape of a product/offer. Optional
//! parts of the record (seller block, expiry) are explicit `Option`s.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a listing
pub type ListingId = String;

/// Product categories offered by the storefront
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Electronics,
    Vehicles,
    Property,
    Fashion,
    Home,
    Services,
}

impl Category {
    /// Every category in display order
    pub const ALL: [Category; 6] = [
        Category::Electronics,
        Category::Vehicles,
        Category::Property,
        Category::Fashion,
        Category::Home,
        Category::Services,
    ];

    /// Selector id used in filters and files
    pub fn id(&self) -> &'static str {
        match self {
            Category::Electronics => "electronics",
            Category::Vehicles => "vehicles",
            Category::Property => "property",
            Category::Fashion => "fashion",
            Category::Home => "home",
            Category::Services => "services",
        }
    }

    /// Human readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Electronics => "Electronics & Gadgets",
            Category::Vehicles => "Vehicles",
            Category::Property => "Property",
            Category::Fashion => "Fashion & Beauty",
            Category::Home => "Home & Garden",
            Category::Services => "Services",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .iter()
            .copied()
            .find(|c| c.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown category '{}'", s))
    }
}

/// Cities the storefront operates in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    Douala,
    #[serde(rename = "Yaoundé", alias = "Yaounde")]
    Yaounde,
    Bamenda,
    Bafoussam,
    Garoua,
    Maroua,
}

impl Location {
    /// Every location in display order
    pub const ALL: [Location; 6] = [
        Location::Douala,
        Location::Yaounde,
        Location::Bamenda,
        Location::Bafoussam,
        Location::Garoua,
        Location::Maroua,
    ];

    /// Display name, also used as the selector value
    pub fn name(&self) -> &'static str {
        match self {
            Location::Douala => "Douala",
            Location::Yaounde => "Yaoundé",
            Location::Bamenda => "Bamenda",
            Location::Bafoussam => "Bafoussam",
            Location::Garoua => "Garoua",
            Location::Maroua => "Maroua",
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Location {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        // Accept the unaccented spelling as well
        if s.eq_ignore_ascii_case("yaounde") {
            return Ok(Location::Yaounde);
        }
        Location::ALL
            .iter()
            .copied()
            .find(|l| l.name() == s || l.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown location '{}'", s))
    }
}

/// How a buyer can receive the item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ShippingOptions {
    pub pickup: bool,
    pub shipping: bool,
}

/// Seller information attached to a listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seller {
    /// Display name
    pub name: String,

    /// Average rating (0.0 - 5.0)
    pub rating: f32,

    /// Typical response time, e.g. "~5 mins"
    pub response_time: String,

    /// Messaging-app number, digits only
    pub whatsapp_number: Option<String>,

    /// Whether the seller identity has been verified
    pub is_verified: bool,

    /// Delivery options
    pub shipping: ShippingOptions,
}

/// Popularity and engagement counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ListingMetrics {
    /// Popularity score used for ranking
    pub link_score: u32,
    pub views: u64,
    pub likes: u64,
}

/// A single product/offer in the marketplace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    /// Unique identifier within a collection
    pub id: ListingId,

    /// Display rank ("P12")
    pub link_number: u32,

    pub category: Category,
    pub location: Location,
    pub title: String,
    pub description: String,

    /// Price in whole currency units
    pub price: u64,

    /// ISO currency code
    pub currency: String,

    /// Image references in display order (may be empty)
    pub images: Vec<String>,

    /// When the listing was approved
    pub approved_at: DateTime<Utc>,

    /// When the listing slot runs out
    pub expires_at: Option<DateTime<Utc>>,

    /// Seller block, absent for anonymous listings
    pub seller: Option<Seller>,

    pub metrics: ListingMetrics,
}

impl Listing {
    /// Price rendered with the listing currency
    pub fn formatted_price(&self) -> String {
        format_price(self.price, &self.currency)
    }

    /// Time left before expiry, `None` when there is no expiry or it has passed
    pub fn time_remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        let expires_at = self.expires_at?;
        let remaining = expires_at - now;
        if remaining > Duration::zero() {
            Some(remaining)
        } else {
            None
        }
    }

    /// Whether the expiry has passed
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(self.expires_at, Some(at) if at <= now)
    }

    /// Case-insensitive substring match on title or description
    pub fn matches_text(&self, needle_lower: &str) -> bool {
        self.title.to_lowercase().contains(needle_lower)
            || self.description.to_lowercase().contains(needle_lower)
    }
}

/// Format an amount with thousands grouping, e.g. `150 000 FCFA`
pub fn format_price(amount: u64, currency: &str) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }

    let symbol = match currency {
        "" | "XAF" => "FCFA",
        other => other,
    };
    format!("{} {}", grouped, symbol)
}

/// Countdown label of a listing: `"{h}h {m}m"`, `"Expired"` once the expiry
/// has passed, `None` when the listing has no expiry
pub fn format_remaining(listing: &Listing, now: DateTime<Utc>) -> Option<String> {
    listing.expires_at?;
    Some(match listing.time_remaining(now) {
        Some(d) => format!("{}h {}m", d.num_hours(), d.num_minutes() % 60),
        None => "Expired".to_string(),
    })
}
