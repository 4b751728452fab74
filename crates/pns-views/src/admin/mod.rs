//! Admin dashboard: listing approvals and featured link slots

mod approvals;
mod slots;

use std::str::FromStr;

use thiserror::Error;
use uuid::Uuid;

pub use approvals::{ApprovalQueue, ApprovalStep, PaymentStatus, PendingSubmission};
pub use slots::{LinkSlot, LinkSlotBoard, SlotStats, SlotStatus, FEATURED_SLOT_COUNT};

/// Errors raised by admin actions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdminError {
    #[error("No pending submission with id {0}")]
    SubmissionNotFound(Uuid),

    #[error("Payment for submission {0} has not been verified")]
    PaymentNotVerified(Uuid),

    #[error("Payment for submission {0} is already verified")]
    PaymentAlreadyVerified(Uuid),

    #[error("Slot {0} does not exist")]
    NoSuchSlot(u32),

    #[error("Slot {slot} is already occupied by listing {listing_id}")]
    SlotOccupied { slot: u32, listing_id: String },

    #[error("Listing {listing_id} already holds slot {slot}")]
    AlreadyAssigned { slot: u32, listing_id: String },

    #[error("All featured slots are occupied")]
    NoFreeSlot,
}

/// Admin panel sections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdminSection {
    #[default]
    Approvals,
    Links,
    Analytics,
}

impl AdminSection {
    pub const ALL: [AdminSection; 3] = [
        AdminSection::Approvals,
        AdminSection::Links,
        AdminSection::Analytics,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            AdminSection::Approvals => "approvals",
            AdminSection::Links => "links",
            AdminSection::Analytics => "analytics",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AdminSection::Approvals => "Product Approvals",
            AdminSection::Links => "Link Management",
            AdminSection::Analytics => "Analytics",
        }
    }
}

impl FromStr for AdminSection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|section| section.id() == s)
            .ok_or_else(|| format!("Unknown admin section '{}'", s))
    }
}
