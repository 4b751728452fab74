use pns_core::Listing;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;

/// Ordering of the listing grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Most recently approved first
    #[default]
    Newest,
    /// Highest link score first
    Popular,
    PriceLow,
    PriceHigh,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [
        SortKey::Newest,
        SortKey::Popular,
        SortKey::PriceLow,
        SortKey::PriceHigh,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            SortKey::Newest => "newest",
            SortKey::Popular => "popular",
            SortKey::PriceLow => "price-low",
            SortKey::PriceHigh => "price-high",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Newest => "Newest First",
            SortKey::Popular => "Most Popular",
            SortKey::PriceLow => "Price: Low to High",
            SortKey::PriceHigh => "Price: High to Low",
        }
    }

    /// Stable in-place sort; equal keys keep their relative order
    pub fn sort(&self, listings: &mut [&Listing]) {
        match self {
            SortKey::Newest => listings.sort_by_key(|l| Reverse(l.approved_at)),
            SortKey::Popular => sort_by_popularity(listings),
            SortKey::PriceLow => listings.sort_by_key(|l| l.price),
            SortKey::PriceHigh => listings.sort_by_key(|l| Reverse(l.price)),
        }
    }
}

/// Descending link score, stable
pub fn sort_by_popularity(listings: &mut [&Listing]) {
    listings.sort_by_key(|l| Reverse(l.metrics.link_score));
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::ALL
            .into_iter()
            .find(|key| key.id().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown sort key '{}'", s))
    }
}
