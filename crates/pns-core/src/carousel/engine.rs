//! Carousel engine implementation

use super::{Breakpoints, CarouselContext, CarouselPhase, CarouselSubscriber, Interaction};
use parking_lot::RwLock;
use std::ops::Range;
use std::sync::{Arc, Weak};
use std::time::Duration;

/// Carousel state stored internally
#[derive(Debug, Clone)]
struct CarouselState {
    current_page: usize,
    items_per_page: usize,
    total_items: usize,
    interval: Option<Duration>,
    /// True while pointer or touch contact is active over the carousel
    in_contact: bool,
}

impl CarouselState {
    fn page_count(&self) -> usize {
        self.total_items.div_ceil(self.items_per_page.max(1))
    }

    fn rotates(&self) -> bool {
        self.page_count() > 1 && self.interval.map_or(false, |d| !d.is_zero())
    }

    fn phase(&self) -> CarouselPhase {
        if !self.rotates() {
            CarouselPhase::Idle
        } else if self.in_contact {
            CarouselPhase::Paused
        } else {
            CarouselPhase::Running
        }
    }

    fn clamp_page(&mut self) {
        let page_count = self.page_count();
        if page_count == 0 {
            self.current_page = 0;
        } else if self.current_page >= page_count {
            self.current_page = page_count - 1;
        }
    }

    fn context(&self) -> CarouselContext {
        CarouselContext {
            phase: self.phase(),
            current_page: self.current_page,
            page_count: self.page_count(),
            items_per_page: self.items_per_page,
            total_items: self.total_items,
        }
    }
}

/// Page state machine of the featured carousel.
///
/// The engine is purely synchronous: timer fires arrive through [`tick`],
/// which is what [`CarouselRotator`](super::CarouselRotator) drives.
///
/// [`tick`]: CarouselEngine::tick
pub struct CarouselEngine {
    state: Arc<RwLock<CarouselState>>,
    subscribers: Arc<RwLock<Vec<Weak<dyn CarouselSubscriber>>>>,
}

impl CarouselEngine {
    /// Create a new carousel engine with no items
    pub fn new(items_per_page: usize, interval: Option<Duration>) -> Self {
        let state = CarouselState {
            current_page: 0,
            items_per_page: items_per_page.max(1),
            total_items: 0,
            interval,
            in_contact: false,
        };

        Self {
            state: Arc::new(RwLock::new(state)),
            subscribers: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Replace page size, item count and interval.
    ///
    /// Returns true if any of them changed.
    pub fn configure(
        &self,
        items_per_page: usize,
        total_items: usize,
        interval: Option<Duration>,
    ) -> bool {
        self.update(|state| {
            let items_per_page = items_per_page.max(1);
            let changed = state.items_per_page != items_per_page
                || state.total_items != total_items
                || state.interval != interval;
            state.items_per_page = items_per_page;
            state.total_items = total_items;
            state.interval = interval;
            state.clamp_page();
            changed
        })
    }

    /// Update the item count (e.g. the featured subset changed)
    pub fn set_total_items(&self, total_items: usize) -> bool {
        let (items_per_page, interval) = {
            let state = self.state.read();
            (state.items_per_page, state.interval)
        };
        self.configure(items_per_page, total_items, interval)
    }

    /// Update the page size
    pub fn set_items_per_page(&self, items_per_page: usize) -> bool {
        let (total_items, interval) = {
            let state = self.state.read();
            (state.total_items, state.interval)
        };
        self.configure(items_per_page, total_items, interval)
    }

    /// Recompute the page size for a new viewport width
    pub fn resize(&self, viewport_width: u32, breakpoints: &Breakpoints) -> bool {
        self.set_items_per_page(breakpoints.items_per_page(viewport_width))
    }

    /// Apply a pointer or touch interaction and return the resulting phase
    pub fn interact(&self, interaction: Interaction) -> CarouselPhase {
        self.update(|state| {
            state.in_contact = interaction.starts_contact();
        });
        self.phase()
    }

    /// Timer fire: advance to the next page when running.
    ///
    /// Returns true if the page changed.
    pub fn tick(&self) -> bool {
        self.update(|state| {
            if state.phase() != CarouselPhase::Running {
                return false;
            }
            state.current_page = (state.current_page + 1) % state.page_count();
            true
        })
    }

    /// Jump to a page (indicator click), clamped to the valid range
    pub fn select_page(&self, page: usize) {
        self.update(|state| {
            state.current_page = page;
            state.clamp_page();
        });
    }

    /// Manual step forward with wrap-around
    pub fn next(&self) {
        self.update(|state| {
            let page_count = state.page_count();
            if page_count > 0 {
                state.current_page = (state.current_page + 1) % page_count;
            }
        });
    }

    /// Manual step backward with wrap-around
    pub fn previous(&self) {
        self.update(|state| {
            let page_count = state.page_count();
            if page_count > 0 {
                state.current_page = (state.current_page + page_count - 1) % page_count;
            }
        });
    }

    /// Current rotation phase
    pub fn phase(&self) -> CarouselPhase {
        self.state.read().phase()
    }

    pub fn current_page(&self) -> usize {
        self.state.read().current_page
    }

    pub fn page_count(&self) -> usize {
        self.state.read().page_count()
    }

    pub fn items_per_page(&self) -> usize {
        self.state.read().items_per_page
    }

    /// Auto-rotate interval, `None` when rotation is disabled
    pub fn interval(&self) -> Option<Duration> {
        self.state.read().interval.filter(|d| !d.is_zero())
    }

    /// Get current carousel context
    pub fn get_context(&self) -> CarouselContext {
        self.state.read().context()
    }

    /// Item index range shown on the current page
    pub fn page_range(&self) -> Range<usize> {
        let state = self.state.read();
        let start = state.current_page.saturating_mul(state.items_per_page);
        let start = start.min(state.total_items);
        let end = start.saturating_add(state.items_per_page).min(state.total_items);
        start..end
    }

    /// Slice the current page out of an item collection
    pub fn page_items<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let range = self.page_range();
        let end = range.end.min(items.len());
        let start = range.start.min(end);
        &items[start..end]
    }

    /// Add a subscriber
    pub fn add_subscriber(&self, subscriber: Arc<dyn CarouselSubscriber>) {
        let mut subscribers = self.subscribers.write();
        subscribers.push(Arc::downgrade(&subscriber));
    }

    /// Run a mutation and notify subscribers if the visible context changed
    fn update<R>(&self, f: impl FnOnce(&mut CarouselState) -> R) -> R {
        let mut state = self.state.write();
        let before = state.context();
        let result = f(&mut *state);
        let after = state.context();
        drop(state);

        if before != after {
            tracing::trace!(
                page = after.current_page,
                pages = after.page_count,
                phase = ?after.phase,
                "Carousel changed"
            );
            self.notify_subscribers(&after);
        }
        result
    }

    /// Notify all subscribers of a carousel change
    fn notify_subscribers(&self, context: &CarouselContext) {
        let mut subscribers = self.subscribers.write();

        // Remove any dead weak references
        subscribers.retain(|weak| weak.strong_count() > 0);

        for weak in subscribers.iter() {
            if let Some(subscriber) = weak.upgrade() {
                subscriber.on_carousel_change(context);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    const FIVE_SECONDS: Option<Duration> = Some(Duration::from_millis(5000));

    fn engine(items_per_page: usize, total: usize) -> CarouselEngine {
        let engine = CarouselEngine::new(items_per_page, FIVE_SECONDS);
        engine.set_total_items(total);
        engine
    }

    #[test]
    fn test_page_count_and_wrap_around() {
        let engine = engine(4, 10);
        assert_eq!(engine.page_count(), 3);
        assert_eq!(engine.phase(), CarouselPhase::Running);

        let mut sizes = Vec::new();
        for _ in 0..3 {
            sizes.push(engine.page_range().len());
            assert!(engine.tick());
        }
        assert_eq!(sizes, vec![4, 4, 2]);
        assert_eq!(engine.current_page(), 0);
    }

    #[test]
    fn test_idle_without_interval_or_single_page() {
        let single = engine(4, 4);
        assert_eq!(single.phase(), CarouselPhase::Idle);
        assert!(!single.tick());

        let disabled = CarouselEngine::new(4, None);
        disabled.set_total_items(10);
        assert_eq!(disabled.phase(), CarouselPhase::Idle);

        let zero = CarouselEngine::new(4, Some(Duration::ZERO));
        zero.set_total_items(10);
        assert_eq!(zero.phase(), CarouselPhase::Idle);
        assert_eq!(zero.interval(), None);
    }

    #[test]
    fn test_empty_collection_has_no_pages() {
        let engine = engine(4, 0);
        assert_eq!(engine.page_count(), 0);
        assert_eq!(engine.phase(), CarouselPhase::Idle);
        assert_eq!(engine.page_range(), 0..0);
        engine.next();
        engine.previous();
        assert_eq!(engine.current_page(), 0);
    }

    #[test]
    fn test_pause_blocks_ticks() {
        let engine = engine(4, 10);
        assert_eq!(engine.interact(Interaction::PointerEnter), CarouselPhase::Paused);
        assert!(!engine.tick());
        assert_eq!(engine.current_page(), 0);

        assert_eq!(engine.interact(Interaction::PointerLeave), CarouselPhase::Running);
        assert!(engine.tick());
        assert_eq!(engine.current_page(), 1);

        assert_eq!(engine.interact(Interaction::TouchStart), CarouselPhase::Paused);
        assert_eq!(engine.interact(Interaction::TouchEnd), CarouselPhase::Running);
    }

    #[test]
    fn test_leave_returns_to_idle_when_rotation_no_longer_holds() {
        let engine = engine(4, 10);
        engine.interact(Interaction::PointerEnter);
        engine.set_total_items(3);
        assert_eq!(engine.interact(Interaction::PointerLeave), CarouselPhase::Idle);
    }

    #[test]
    fn test_select_page_is_clamped() {
        let engine = engine(4, 10);
        engine.select_page(1);
        assert_eq!(engine.current_page(), 1);
        engine.select_page(99);
        assert_eq!(engine.current_page(), 2);
        assert_eq!(engine.phase(), CarouselPhase::Running);
    }

    #[test]
    fn test_manual_navigation_wraps() {
        let engine = engine(4, 10);
        engine.previous();
        assert_eq!(engine.current_page(), 2);
        engine.next();
        assert_eq!(engine.current_page(), 0);
    }

    #[test]
    fn test_resize_clamps_current_page() {
        let engine = engine(1, 10);
        engine.select_page(9);
        let breakpoints = Breakpoints::default();

        assert!(engine.resize(1280, &breakpoints));
        assert_eq!(engine.items_per_page(), 4);
        assert_eq!(engine.current_page(), 2);

        // Same bucket, nothing changes
        assert!(!engine.resize(1600, &breakpoints));
    }

    #[test]
    fn test_page_items_slices_collection() {
        let items: Vec<u32> = (0..10).collect();
        let engine = engine(4, items.len());
        engine.select_page(2);
        assert_eq!(engine.page_items(&items), &[8, 9]);
    }

    struct Recorder {
        pages: Mutex<Vec<usize>>,
    }

    impl CarouselSubscriber for Recorder {
        fn on_carousel_change(&self, context: &CarouselContext) {
            self.pages.lock().push(context.current_page);
        }
    }

    #[test]
    fn test_subscribers_notified_on_change_only() {
        let engine = engine(4, 10);
        let recorder = Arc::new(Recorder {
            pages: Mutex::new(Vec::new()),
        });
        engine.add_subscriber(recorder.clone());

        engine.tick();
        engine.select_page(1);
        engine.tick();
        assert_eq!(*recorder.pages.lock(), vec![1, 2]);

        drop(recorder);
        engine.tick();
    }
}
