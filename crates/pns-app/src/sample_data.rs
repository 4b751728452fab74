//! Random sample catalogue

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use pns_core::{Category, Listing, ListingMetrics, Location, Seller, ShippingOptions};
use pns_views::{ListingDraft, Placement};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const TITLES: [(Category, &[&str]); 6] = [
    (
        Category::Electronics,
        &["Smartphone", "Laptop", "Bluetooth Speaker", "Smart TV", "Phone Charger"],
    ),
    (Category::Vehicles, &["Toyota Corolla", "Motorbike", "Honda Civic", "Scooter"]),
    (Category::Property, &["2 Bedroom Apartment", "Studio", "Land Plot", "Shop Space"]),
    (Category::Fashion, &["Evening Dress", "Sneakers", "Leather Bag", "Perfume"]),
    (Category::Home, &["Sofa Set", "Dining Table", "Fridge", "Garden Chairs"]),
    (Category::Services, &["Plumbing", "Tutoring", "Photography", "Cleaning"]),
];

fn pick<T: Copy>(rng: &mut impl Rng, items: &[T]) -> T {
    items[rng.gen_range(0..items.len())]
}

fn sample_title(rng: &mut impl Rng, category: Category) -> String {
    let titles = TITLES
        .iter()
        .find(|(c, _)| *c == category)
        .map(|(_, titles)| *titles)
        .unwrap_or(&["Item"]);
    pick(rng, titles).to_string()
}

fn sample_seller(rng: &mut impl Rng, index: usize) -> Seller {
    Seller {
        name: format!("Seller {}", index),
        rating: 4.0 + rng.gen::<f32>(),
        response_time: "~5 mins".to_string(),
        whatsapp_number: Some(format!("2376{:08}", rng.gen_range(0..100_000_000u32))),
        is_verified: rng.gen_bool(0.5),
        shipping: ShippingOptions {
            pickup: true,
            shipping: rng.gen_bool(0.5),
        },
    }
}

/// `count` listings approved within the last week, expiring within 48 hours of `now`
pub fn generate_listings(rng: &mut impl Rng, count: usize, now: DateTime<Utc>) -> Vec<Listing> {
    (1..=count)
        .map(|i| {
            let category = pick(rng, &Category::ALL);
            let title = sample_title(rng, category);
            Listing {
                id: i.to_string(),
                link_number: i as u32,
                category,
                location: pick(rng, &Location::ALL),
                description: format!("{} in good condition, listed by seller {}.", title, i),
                title,
                price: rng.gen_range(100_000..1_100_000),
                currency: "XAF".to_string(),
                images: (0..rng.gen_range(1..=5))
                    .map(|n| format!("/images/{}-{}.jpg", i, n))
                    .collect(),
                approved_at: now - Duration::minutes(rng.gen_range(0..7 * 24 * 60)),
                expires_at: Some(now + Duration::minutes(rng.gen_range(1..48 * 60))),
                seller: rng.gen_bool(0.9).then(|| sample_seller(rng, i)),
                metrics: ListingMetrics {
                    link_score: rng.gen_range(0..100),
                    views: rng.gen_range(0..1000),
                    likes: rng.gen_range(0..100),
                },
            }
        })
        .collect()
}

/// A valid draft as a seller would submit it
pub fn generate_draft(rng: &mut impl Rng) -> ListingDraft {
    let category = pick(rng, &Category::ALL);
    let title = sample_title(rng, category);
    ListingDraft {
        description: format!("Brand new {}, still boxed.", title.to_lowercase()),
        title,
        price: rng.gen_range(10..2_000) * 1_000,
        currency: "XAF".to_string(),
        category,
        location: pick(rng, &Location::ALL),
        images: vec!["image1.jpg".to_string(), "image2.jpg".to_string()],
        placement: if rng.gen_bool(0.5) {
            Placement::Featured
        } else {
            Placement::Standard
        },
        duration_hours: pick(rng, &pns_views::seller::ALLOWED_DURATIONS_HOURS),
    }
}

pub fn generate_seller(rng: &mut impl Rng, index: usize) -> Seller {
    sample_seller(rng, index)
}

/// Generate `count` listings and write them as CSV
pub fn write_sample(output: &Path, count: usize, seed: Option<u64>) -> Result<()> {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    println!("Generating {} listings...", count);
    let listings = generate_listings(&mut rng, count, Utc::now());

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    pns_data::sources::write_listings(output, &listings)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("Wrote {} listings to {}", listings.len(), output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generated_listings_are_valid() {
        let mut rng = StdRng::seed_from_u64(7);
        let now = Utc::now();
        let listings = generate_listings(&mut rng, 120, now);

        assert_eq!(listings.len(), 120);
        assert!(listings.iter().all(|l| !l.images.is_empty()));
        assert!(listings.iter().all(|l| l.approved_at <= now));
        assert!(listings.iter().all(|l| !l.is_expired(now)));
        let ids: HashSet<&str> = listings.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids.len(), 120);
    }

    #[test]
    fn test_generated_drafts_validate() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            assert_eq!(generate_draft(&mut rng).validate(), Ok(()));
        }
    }

    #[test]
    fn test_sample_file_loads_back() {
        let mut rng = StdRng::seed_from_u64(3);
        let listings = generate_listings(&mut rng, 25, Utc::now());
        let file = tempfile::NamedTempFile::new().unwrap();

        pns_data::sources::write_listings(file.path(), &listings).unwrap();
        let loaded = pns_data::sources::read_listings(file.path()).unwrap();
        assert_eq!(loaded.len(), 25);
        assert_eq!(loaded[0].title, listings[0].title);
    }

    #[test]
    fn test_write_sample_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("nested").join("listings.csv");

        write_sample(&output, 10, Some(42)).unwrap();
        assert_eq!(pns_data::sources::read_listings(&output).unwrap().len(), 10);
    }
}
