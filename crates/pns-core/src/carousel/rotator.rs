//! Timer-driven rotation on top of the carousel engine

use super::{Breakpoints, CarouselEngine, CarouselPhase, Interaction};
use crate::schedule::ScheduledTask;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Owns the auto-advance timer of a [`CarouselEngine`].
///
/// The timer runs exactly while the engine is [`CarouselPhase::Running`]. It is
/// restarted from zero whenever page size, item count or interval change and
/// when rotation resumes after a pause; it is cancelled on pause, when
/// rotation stops being possible, on [`shutdown`](Self::shutdown) and on drop.
pub struct CarouselRotator {
    engine: Arc<CarouselEngine>,
    timer: Mutex<Option<ScheduledTask>>,
}

impl CarouselRotator {
    /// Wrap an engine; no timer runs until the first configuration or interaction
    pub fn new(engine: Arc<CarouselEngine>) -> Self {
        Self {
            engine,
            timer: Mutex::new(None),
        }
    }

    pub fn engine(&self) -> &Arc<CarouselEngine> {
        &self.engine
    }

    /// Mount or reconfigure the carousel
    pub fn configure(&self, items_per_page: usize, total_items: usize, interval: Option<Duration>) {
        let changed = self.engine.configure(items_per_page, total_items, interval);
        if changed || !self.timer_matches_phase() {
            self.restart_timer();
        }
    }

    /// The rotated collection changed size
    pub fn set_total_items(&self, total_items: usize) {
        if self.engine.set_total_items(total_items) {
            self.restart_timer();
        }
    }

    /// Viewport resize: recompute the page size from the breakpoints
    pub fn resize(&self, viewport_width: u32, breakpoints: &Breakpoints) {
        if self.engine.resize(viewport_width, breakpoints) {
            tracing::debug!(
                viewport_width,
                items_per_page = self.engine.items_per_page(),
                "Carousel page size changed"
            );
            self.restart_timer();
        }
    }

    /// Pointer/touch interaction; pausing cancels the timer, resuming restarts it
    pub fn interact(&self, interaction: Interaction) -> CarouselPhase {
        let before = self.engine.phase();
        let after = self.engine.interact(interaction);
        if before != after {
            self.restart_timer();
        }
        after
    }

    /// Indicator click; does not touch the timer
    pub fn select_page(&self, page: usize) {
        self.engine.select_page(page);
    }

    pub fn next(&self) {
        self.engine.next();
    }

    pub fn previous(&self) {
        self.engine.previous();
    }

    /// Whether an auto-advance timer is currently scheduled
    pub fn is_timer_active(&self) -> bool {
        self.timer.lock().as_ref().map_or(false, |t| !t.is_finished())
    }

    /// Cancel any running timer (unmount)
    pub fn shutdown(&self) {
        if self.timer.lock().take().is_some() {
            tracing::debug!("Carousel rotation stopped");
        }
    }

    fn timer_matches_phase(&self) -> bool {
        let running = self.engine.phase() == CarouselPhase::Running;
        running == self.timer.lock().is_some()
    }

    fn restart_timer(&self) {
        let mut timer = self.timer.lock();

        // Dropping the old task aborts it
        timer.take();

        if self.engine.phase() != CarouselPhase::Running {
            return;
        }
        let Some(interval) = self.engine.interval() else {
            return;
        };

        let engine = Arc::downgrade(&self.engine);
        *timer = Some(ScheduledTask::every("carousel", interval, move || {
            if let Some(engine) = engine.upgrade() {
                engine.tick();
            }
        }));
    }
}

impl Drop for CarouselRotator {
    fn drop(&mut self) {
        self.shutdown();
    }
}
