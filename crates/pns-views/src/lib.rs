//! Presentation-independent view models of the storefront
//!
//! Every view here owns its state and timers; rendering is left to the caller.

pub mod admin;
mod browse;
mod gallery;
pub mod seller;

pub use admin::{
    AdminError, AdminSection, ApprovalQueue, ApprovalStep, LinkSlot, LinkSlotBoard,
    PaymentStatus, PendingSubmission, SlotStatus,
};
pub use browse::{BrowseSnapshot, BrowseView, FilterBadge, FilterKind};
pub use gallery::{ImageGallery, SwipeDirection};
pub use seller::{DraftError, ListingDraft, Placement, SellerOverview, SellerSection};
