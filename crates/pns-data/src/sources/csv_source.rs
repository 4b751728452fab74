//! Listings stored as a CSV file
//!
//! Expected header row:
//!
//! ```text
//! id,link_number,category,location,title,description,price,currency,images,
//! approved_at,expires_at,link_score,views,likes,seller_name,seller_rating,
//! seller_response_time,seller_whatsapp,seller_verified,pickup,shipping
//! ```
//!
//! `images` is pipe-separated, timestamps are RFC 3339 and every `seller_*`
//! column may be left empty for listings without a seller block.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use csv::ReaderBuilder;
use pns_core::{Listing, ListingMetrics, ListingSource, Seller, ShippingOptions};
use serde::{Deserialize, Serialize};

use crate::ListingError;

const IMAGE_SEPARATOR: char = '|';

/// One CSV row, before validation
#[derive(Debug, Serialize, Deserialize)]
struct ListingRow {
    id: String,
    link_number: u32,
    category: String,
    location: String,
    title: String,
    description: String,
    price: u64,
    currency: String,
    images: String,
    approved_at: String,
    expires_at: Option<String>,
    link_score: u32,
    views: u64,
    likes: u64,
    seller_name: Option<String>,
    seller_rating: Option<f32>,
    seller_response_time: Option<String>,
    seller_whatsapp: Option<String>,
    seller_verified: Option<bool>,
    pickup: Option<bool>,
    shipping: Option<bool>,
}

impl ListingRow {
    fn from_listing(listing: &Listing) -> Self {
        let seller = listing.seller.as_ref();
        Self {
            id: listing.id.clone(),
            link_number: listing.link_number,
            category: listing.category.id().to_string(),
            location: listing.location.name().to_string(),
            title: listing.title.clone(),
            description: listing.description.clone(),
            price: listing.price,
            currency: listing.currency.clone(),
            images: listing.images.join(&IMAGE_SEPARATOR.to_string()),
            approved_at: listing.approved_at.to_rfc3339(),
            expires_at: listing.expires_at.map(|at| at.to_rfc3339()),
            link_score: listing.metrics.link_score,
            views: listing.metrics.views,
            likes: listing.metrics.likes,
            seller_name: seller.map(|s| s.name.clone()),
            seller_rating: seller.map(|s| s.rating),
            seller_response_time: seller.map(|s| s.response_time.clone()),
            seller_whatsapp: seller.and_then(|s| s.whatsapp_number.clone()),
            seller_verified: seller.map(|s| s.is_verified),
            pickup: seller.map(|s| s.shipping.pickup),
            shipping: seller.map(|s| s.shipping.shipping),
        }
    }

    fn into_listing(self, line: u64) -> Result<Listing, ListingError> {
        let malformed = |message: String| ListingError::MalformedRow { line, message };

        let category = self.category.parse().map_err(malformed)?;
        let location = self.location.parse().map_err(malformed)?;
        let approved_at = parse_timestamp(&self.approved_at).map_err(malformed)?;
        let expires_at = match self.expires_at.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(parse_timestamp(raw).map_err(malformed)?),
            _ => None,
        };

        let images = self
            .images
            .split(IMAGE_SEPARATOR)
            .map(str::trim)
            .filter(|image| !image.is_empty())
            .map(str::to_string)
            .collect();

        let seller = match self.seller_name {
            Some(name) if !name.trim().is_empty() => Some(Seller {
                name,
                rating: self.seller_rating.unwrap_or(0.0),
                response_time: self.seller_response_time.unwrap_or_default(),
                whatsapp_number: self.seller_whatsapp.filter(|n| !n.trim().is_empty()),
                is_verified: self.seller_verified.unwrap_or(false),
                shipping: ShippingOptions {
                    pickup: self.pickup.unwrap_or(false),
                    shipping: self.shipping.unwrap_or(false),
                },
            }),
            _ => None,
        };

        Ok(Listing {
            id: self.id,
            link_number: self.link_number,
            category,
            location,
            title: self.title,
            description: self.description,
            price: self.price,
            currency: self.currency,
            images,
            approved_at,
            expires_at,
            seller,
            metrics: ListingMetrics {
                link_score: self.link_score,
                views: self.views,
                likes: self.likes,
            },
        })
    }
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| format!("invalid timestamp '{}': {}", raw, e))
}

/// Read every listing from a CSV file
pub fn read_listings(path: &Path) -> Result<Vec<Listing>, ListingError> {
    let file = File::open(path)?;
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Fields)
        .from_reader(BufReader::new(file));
    let headers = csv_reader.headers()?.clone();

    let mut listings = Vec::new();
    for result in csv_reader.records() {
        let record = result?;
        let line = record.position().map_or(0, |p| p.line());
        let row: ListingRow =
            record
                .deserialize(Some(&headers))
                .map_err(|e| ListingError::MalformedRow {
                    line,
                    message: e.to_string(),
                })?;
        listings.push(row.into_listing(line)?);
    }
    Ok(listings)
}

/// Write listings to a CSV file with a header row
pub fn write_listings(path: &Path, listings: &[Listing]) -> Result<(), ListingError> {
    let mut writer = csv::Writer::from_path(path)?;
    for listing in listings {
        writer.serialize(ListingRow::from_listing(listing))?;
    }
    writer.flush()?;
    Ok(())
}

/// Listing source backed by a CSV file, re-read on every fetch
pub struct CsvListingSource {
    path: PathBuf,
    name: String,
}

impl CsvListingSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self { path, name }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse the file on the blocking pool
    pub async fn load(&self) -> Result<Vec<Listing>, ListingError> {
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || read_listings(&path)).await?
    }
}

#[async_trait]
impl ListingSource for CsvListingSource {
    async fn fetch_listings(&self) -> anyhow::Result<Vec<Listing>> {
        let listings = self.load().await?;
        tracing::debug!(path = %self.path.display(), count = listings.len(), "Read listings from CSV");
        Ok(listings)
    }

    fn source_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pns_core::{Category, Location};
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "id,link_number,category,location,title,description,price,currency,images,approved_at,expires_at,link_score,views,likes,seller_name,seller_rating,seller_response_time,seller_whatsapp,seller_verified,pickup,shipping";

    fn csv_file(rows: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        for row in rows {
            writeln!(file, "{}", row).unwrap();
        }
        file.flush().unwrap();
        file
    }

    #[tokio::test]
    async fn test_reads_rows_with_and_without_seller() {
        let file = csv_file(&[
            "1,1,electronics,Douala,Phone X,Unlocked phone,150000,XAF,/a.jpg|/b.jpg,2024-01-01T10:00:00Z,2024-01-03T10:00:00Z,870,120,14,Ama,4.5,~5 mins,237600000001,true,true,false",
            "2,2,vehicles,Yaounde,Toyota,Clean,4500000,XAF,,2024-01-02T10:00:00+01:00,,10,3,0,,,,,,,",
        ]);

        let source = CsvListingSource::new(file.path());
        let listings = source.fetch_listings().await.unwrap();
        assert_eq!(listings.len(), 2);

        let phone = &listings[0];
        assert_eq!(phone.category, Category::Electronics);
        assert_eq!(phone.images, vec!["/a.jpg", "/b.jpg"]);
        assert_eq!(phone.metrics.link_score, 870);
        let seller = phone.seller.as_ref().unwrap();
        assert_eq!(seller.whatsapp_number.as_deref(), Some("237600000001"));
        assert!(seller.shipping.pickup);

        let car = &listings[1];
        assert_eq!(car.location, Location::Yaounde);
        assert!(car.images.is_empty());
        assert!(car.expires_at.is_none());
        assert!(car.seller.is_none());
        assert_eq!(car.approved_at.to_rfc3339(), "2024-01-02T09:00:00+00:00");
    }

    #[test]
    fn test_malformed_row_reports_line() {
        let file = csv_file(&[
            "1,1,electronics,Douala,A,B,10,XAF,,2024-01-01T00:00:00Z,,0,0,0,,,,,,,",
            "2,2,boats,Douala,A,B,10,XAF,,2024-01-01T00:00:00Z,,0,0,0,,,,,,,",
        ]);

        match read_listings(file.path()) {
            Err(ListingError::MalformedRow { line, message }) => {
                assert_eq!(line, 3);
                assert!(message.contains("boats"));
            }
            other => panic!("expected malformed row, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_listings(&dir.path().join("missing.csv"));
        assert!(matches!(result, Err(ListingError::Io(_))));
    }

    #[test]
    fn test_written_file_reads_back() {
        let file = csv_file(&[
            "7,3,fashion,Garoua,Dress,\"Red, long\",25000,XAF,/d.jpg,2024-02-01T08:30:00Z,,42,9,1,Bea,4.9,~1 hour,,false,true,true",
        ]);
        let listings = read_listings(file.path()).unwrap();

        let out = NamedTempFile::new().unwrap();
        write_listings(out.path(), &listings).unwrap();
        assert_eq!(read_listings(out.path()).unwrap(), listings);
    }
}
