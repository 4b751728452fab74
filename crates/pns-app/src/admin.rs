//! `storefront admin`

use std::sync::Arc;

use anyhow::{bail, Result};
use chrono::Utc;
use pns_core::events::events::{ListingApproved, ListingRejected};
use pns_core::events::{handler_from_fn, EventBus};
use pns_core::Listing;
use pns_views::{
    AdminError, AdminSection, ApprovalQueue, ApprovalStep, LinkSlotBoard, Placement,
    SellerOverview,
};
use rand::thread_rng;
use tracing::{info, warn};
use uuid::Uuid;

use crate::sample_data::{generate_draft, generate_seller};

fn event_bus() -> Arc<EventBus> {
    let bus = Arc::new(EventBus::new());
    bus.subscribe::<ListingApproved>(handler_from_fn(|event| {
        if let Some(e) = event.as_any().downcast_ref::<ListingApproved>() {
            info!(listing = %e.listing_id, title = %e.title, "Approved listing is live");
        }
    }));
    bus.subscribe::<ListingRejected>(handler_from_fn(|event| {
        if let Some(e) = event.as_any().downcast_ref::<ListingRejected>() {
            info!(listing = %e.listing_id, "Submission rejected");
        }
    }));
    bus
}

/// Press the primary action until the submission is live
fn approve(queue: &mut ApprovalQueue, id: Uuid) -> Result<Listing, AdminError> {
    loop {
        match queue.advance(id, Utc::now())? {
            ApprovalStep::PaymentVerified => continue,
            ApprovalStep::Approved(listing) => return Ok(listing),
        }
    }
}

pub fn run(submissions: usize) -> Result<()> {
    if submissions == 0 {
        bail!("nothing to review");
    }

    let mut rng = thread_rng();
    let mut queue = ApprovalQueue::new(event_bus(), 1);
    let mut board = LinkSlotBoard::default();

    println!("== {} ==", AdminSection::Approvals.label());
    for index in 1..=submissions {
        let seller = generate_seller(&mut rng, index);
        let submission = generate_draft(&mut rng).submit(seller, Utc::now())?;
        println!(
            "  {:<20} {:<10} {:<20} {} [{}]",
            submission.draft.title,
            submission.seller.name,
            submission.placement_label(),
            submission.payment_reference,
            submission.status,
        );
        queue.submit(submission);
    }

    // Every third submission is rejected, the rest go through both review steps
    let reviews: Vec<(Uuid, Placement)> = queue
        .pending()
        .iter()
        .map(|s| (s.id, s.draft.placement))
        .collect();
    let mut live = Vec::new();
    for (index, (id, placement)) in reviews.into_iter().enumerate() {
        if index % 3 == 2 {
            queue.reject(id)?;
            continue;
        }

        let listing = approve(&mut queue, id)?;
        if placement == Placement::Featured {
            match board.assign_first_free(listing.id.clone()) {
                Ok(slot) => info!(slot, listing = %listing.id, "Featured listing placed"),
                Err(e) => warn!(listing = %listing.id, "Featured listing not placed: {}", e),
            }
        }
        live.push(listing);
    }
    println!(
        "\n{} approved, {} rejected, {} pending",
        live.len(),
        submissions - live.len() - queue.len(),
        queue.len()
    );

    println!("\n== {} ==", AdminSection::Links.label());
    for slot in board.slots() {
        match slot.listing_id() {
            Some(id) => {
                let title = live
                    .iter()
                    .find(|l| l.id == id)
                    .map(|l| l.title.as_str())
                    .unwrap_or("?");
                println!("  Link {:<3} {:<20} {} FCFA", slot.number, title, slot.price);
            }
            None => println!("  Link {:<3} {:<20} {} FCFA", slot.number, "Available", slot.price),
        }
    }
    println!(
        "  {} occupied, {} available",
        board.occupied_count(),
        board.available_count()
    );

    println!("\n== {} ==", AdminSection::Analytics.label());
    let now = Utc::now();
    for listing in &live {
        let Some(seller) = &listing.seller else {
            continue;
        };
        let overview = SellerOverview::compute(&live, &seller.name, now);
        println!(
            "  {:<10} {} active, {} expiring within 24h",
            seller.name, overview.active_listings, overview.expiring_soon
        );
    }
    Ok(())
}
