//! Filter selectors of the listing grid

use pns_core::{Category, Listing, Location};
use std::fmt;
use std::str::FromStr;

/// Category selector; `all` keeps every listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub const ALL_SENTINEL: &'static str = "all";

    pub fn matches(&self, listing: &Listing) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(category) => listing.category == *category,
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, CategoryFilter::All)
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str(Self::ALL_SENTINEL),
            CategoryFilter::Only(category) => f.write_str(category.id()),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case(Self::ALL_SENTINEL) {
            Ok(CategoryFilter::All)
        } else {
            s.parse().map(CategoryFilter::Only)
        }
    }
}

/// Location selector; `All Locations` keeps every listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LocationFilter {
    #[default]
    All,
    Only(Location),
}

impl LocationFilter {
    pub const ALL_SENTINEL: &'static str = "All Locations";

    pub fn matches(&self, listing: &Listing) -> bool {
        match self {
            LocationFilter::All => true,
            LocationFilter::Only(location) => listing.location == *location,
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, LocationFilter::All)
    }
}

impl fmt::Display for LocationFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationFilter::All => f.write_str(Self::ALL_SENTINEL),
            LocationFilter::Only(location) => f.write_str(location.name()),
        }
    }
}

impl FromStr for LocationFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case(Self::ALL_SENTINEL) || s.eq_ignore_ascii_case("all") {
            Ok(LocationFilter::All)
        } else {
            s.parse().map(LocationFilter::Only)
        }
    }
}

/// Price interval in whole currency units, both bounds inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriceRange {
    #[default]
    All,
    /// `"min-max"`
    Between { min: u64, max: u64 },
    /// `"min+"`
    AtLeast { min: u64 },
}

impl PriceRange {
    /// Ranges offered by the storefront, with their labels
    pub const PRESETS: [(PriceRange, &'static str); 5] = [
        (PriceRange::All, "Any Price"),
        (PriceRange::Between { min: 0, max: 50_000 }, "Under 50,000 FCFA"),
        (
            PriceRange::Between {
                min: 50_000,
                max: 200_000,
            },
            "50k - 200k FCFA",
        ),
        (
            PriceRange::Between {
                min: 200_000,
                max: 1_000_000,
            },
            "200k - 1M FCFA",
        ),
        (PriceRange::AtLeast { min: 1_000_000 }, "Above 1M FCFA"),
    ];

    /// Parse an encoding, treating anything unparseable as [`PriceRange::All`]
    pub fn from_encoding(encoding: &str) -> Self {
        match encoding.parse() {
            Ok(range) => range,
            Err(e) => {
                tracing::debug!("Ignoring price range '{}': {}", encoding, e);
                PriceRange::All
            }
        }
    }

    pub fn contains(&self, price: u64) -> bool {
        match *self {
            PriceRange::All => true,
            PriceRange::Between { min, max } => price >= min && price <= max,
            PriceRange::AtLeast { min } => price >= min,
        }
    }

    pub fn matches(&self, listing: &Listing) -> bool {
        self.contains(listing.price)
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, PriceRange::All)
    }

    /// Preset label, falling back to the encoding for custom ranges
    pub fn label(&self) -> String {
        Self::PRESETS
            .iter()
            .find(|(range, _)| range == self)
            .map(|(_, label)| label.to_string())
            .unwrap_or_else(|| self.to_string())
    }
}

impl fmt::Display for PriceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceRange::All => f.write_str("all"),
            PriceRange::Between { min, max } => write!(f, "{}-{}", min, max),
            PriceRange::AtLeast { min } => write!(f, "{}+", min),
        }
    }
}

impl FromStr for PriceRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(PriceRange::All);
        }

        let parse_bound = |bound: &str| {
            bound
                .trim()
                .parse::<u64>()
                .map_err(|e| format!("invalid bound '{}': {}", bound, e))
        };

        if let Some((min, max)) = s.split_once('-') {
            Ok(PriceRange::Between {
                min: parse_bound(min)?,
                max: parse_bound(max)?,
            })
        } else if let Some(min) = s.strip_suffix('+') {
            Ok(PriceRange::AtLeast {
                min: parse_bound(min)?,
            })
        } else {
            Err(format!("expected 'all', 'min-max' or 'min+', got '{}'", s))
        }
    }
}
