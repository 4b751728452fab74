//! Carousel subscriber trait

use super::CarouselContext;

/// Trait for components that need to respond to carousel page or phase changes
pub trait CarouselSubscriber: Send + Sync {
    /// Called after the current page or the rotation phase changes
    fn on_carousel_change(&self, context: &CarouselContext);
}
