use serde::{Deserialize, Serialize};

mod engine;
mod rotator;
mod subscriber;

pub use engine::CarouselEngine;
pub use rotator::CarouselRotator;
pub use subscriber::CarouselSubscriber;

/// Rotation phase of the featured carousel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarouselPhase {
    /// No rotation: interval disabled or at most one page
    Idle,
    /// Timer active, pages advance automatically
    Running,
    /// Rotation suspended while the user is pointing at or touching the carousel
    Paused,
}

/// User interaction over the carousel region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    PointerEnter,
    PointerLeave,
    TouchStart,
    TouchEnd,
}

impl Interaction {
    /// Whether this interaction begins contact with the carousel
    pub fn starts_contact(&self) -> bool {
        matches!(self, Interaction::PointerEnter | Interaction::TouchStart)
    }
}

/// Viewport width breakpoints for the number of items per page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Breakpoints {
    /// Viewports at least this wide use the tablet count
    pub tablet_min_width: u32,

    /// Viewports at least this wide use the desktop count
    pub desktop_min_width: u32,

    pub mobile_items: usize,
    pub tablet_items: usize,
    pub desktop_items: usize,
}

impl Default for Breakpoints {
    fn default() -> Self {
        Self {
            tablet_min_width: 640,
            desktop_min_width: 1024,
            mobile_items: 1,
            tablet_items: 2,
            desktop_items: 4,
        }
    }
}

impl Breakpoints {
    /// Items per page for a viewport width (never zero)
    pub fn items_per_page(&self, viewport_width: u32) -> usize {
        let items = if viewport_width >= self.desktop_min_width {
            self.desktop_items
        } else if viewport_width >= self.tablet_min_width {
            self.tablet_items
        } else {
            self.mobile_items
        };
        items.max(1)
    }
}

/// Snapshot passed to subscribers and renderers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarouselContext {
    pub phase: CarouselPhase,
    pub current_page: usize,
    pub page_count: usize,
    pub items_per_page: usize,
    pub total_items: usize,
}
