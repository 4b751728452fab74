use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use pns_core::events::events::{ListingApproved, ListingRejected};
use pns_core::events::EventBus;
use pns_core::{Listing, ListingMetrics, Seller};
use uuid::Uuid;

use super::AdminError;
use crate::seller::ListingDraft;

/// Payment state of a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    PendingPayment,
    PaymentVerified,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::PendingPayment => f.write_str("Pending Payment"),
            PaymentStatus::PaymentVerified => f.write_str("Payment Verified"),
        }
    }
}

/// A seller's draft waiting for admin review
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSubmission {
    pub id: Uuid,
    pub draft: ListingDraft,
    pub seller: Seller,
    pub status: PaymentStatus,
    pub payment_reference: String,
    pub submitted_at: DateTime<Utc>,
}

impl PendingSubmission {
    /// Label of the main review button
    pub fn primary_action(&self) -> &'static str {
        match self.status {
            PaymentStatus::PendingPayment => "Verify Payment",
            PaymentStatus::PaymentVerified => "Approve",
        }
    }

    /// `"Featured • 48 hours"`
    pub fn placement_label(&self) -> String {
        format!("{} • {}", self.draft.placement, self.draft.duration_label())
    }
}

/// Result of pressing the primary action
#[derive(Debug, Clone, PartialEq)]
pub enum ApprovalStep {
    PaymentVerified,
    Approved(Listing),
}

/// Submissions awaiting review, in submission order
pub struct ApprovalQueue {
    event_bus: Arc<EventBus>,
    submissions: Vec<PendingSubmission>,
    next_link_number: u32,
}

impl ApprovalQueue {
    /// `next_link_number` is the display rank given to the next approved listing
    pub fn new(event_bus: Arc<EventBus>, next_link_number: u32) -> Self {
        Self {
            event_bus,
            submissions: Vec::new(),
            next_link_number,
        }
    }

    pub fn submit(&mut self, submission: PendingSubmission) {
        tracing::info!(id = %submission.id, title = %submission.draft.title, "Submission queued");
        self.submissions.push(submission);
    }

    pub fn pending(&self) -> &[PendingSubmission] {
        &self.submissions
    }

    pub fn len(&self) -> usize {
        self.submissions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.submissions.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&PendingSubmission> {
        self.submissions.iter().find(|s| s.id == id)
    }

    /// Mark the payment of a submission as received
    pub fn verify_payment(&mut self, id: Uuid) -> Result<(), AdminError> {
        let submission = self.find_mut(id)?;
        if submission.status == PaymentStatus::PaymentVerified {
            return Err(AdminError::PaymentAlreadyVerified(id));
        }
        submission.status = PaymentStatus::PaymentVerified;
        tracing::info!(%id, reference = %submission.payment_reference, "Payment verified");
        Ok(())
    }

    /// Publish a verified submission as a live listing
    pub fn approve(&mut self, id: Uuid, now: DateTime<Utc>) -> Result<Listing, AdminError> {
        let index = self.position(id)?;
        if self.submissions[index].status != PaymentStatus::PaymentVerified {
            return Err(AdminError::PaymentNotVerified(id));
        }
        let submission = self.submissions.remove(index);

        let link_number = self.next_link_number;
        self.next_link_number += 1;

        let draft = submission.draft;
        let listing = Listing {
            id: submission.id.to_string(),
            link_number,
            category: draft.category,
            location: draft.location,
            title: draft.title,
            description: draft.description,
            price: draft.price,
            currency: draft.currency,
            images: draft.images,
            approved_at: now,
            expires_at: Some(now + Duration::hours(i64::from(draft.duration_hours))),
            seller: Some(submission.seller),
            metrics: ListingMetrics::default(),
        };

        tracing::info!(id = %listing.id, link_number, "Listing approved");
        self.event_bus.publish(ListingApproved {
            listing_id: listing.id.clone(),
            title: listing.title.clone(),
        });
        Ok(listing)
    }

    /// Verify the payment if pending, otherwise approve
    pub fn advance(&mut self, id: Uuid, now: DateTime<Utc>) -> Result<ApprovalStep, AdminError> {
        let status = self.find_mut(id)?.status;
        match status {
            PaymentStatus::PendingPayment => {
                self.verify_payment(id)?;
                Ok(ApprovalStep::PaymentVerified)
            }
            PaymentStatus::PaymentVerified => self.approve(id, now).map(ApprovalStep::Approved),
        }
    }

    /// Drop a submission from the queue
    pub fn reject(&mut self, id: Uuid) -> Result<PendingSubmission, AdminError> {
        let index = self.position(id)?;
        let submission = self.submissions.remove(index);

        tracing::info!(%id, "Submission rejected");
        self.event_bus.publish(ListingRejected {
            listing_id: id.to_string(),
        });
        Ok(submission)
    }

    fn position(&self, id: Uuid) -> Result<usize, AdminError> {
        self.submissions
            .iter()
            .position(|s| s.id == id)
            .ok_or(AdminError::SubmissionNotFound(id))
    }

    fn find_mut(&mut self, id: Uuid) -> Result<&mut PendingSubmission, AdminError> {
        self.submissions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(AdminError::SubmissionNotFound(id))
    }
}
