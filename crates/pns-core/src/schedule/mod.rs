//! Timer primitives with scoped cancellation
//!
//! Both [`ScheduledTask`] and [`Debouncer`] own a tokio task and abort it when
//! dropped, so a timer can never outlive the component that started it.
//! Starting a timer requires a tokio runtime context.

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// A running timer. Cancelled on `cancel()` or drop.
#[derive(Debug)]
pub struct ScheduledTask {
    name: &'static str,
    handle: JoinHandle<()>,
}

impl ScheduledTask {
    /// Fire `f` every `period`; the first fire happens one full period after start
    pub fn every<F>(name: &'static str, period: Duration, mut f: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let start = Instant::now() + period;
        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(start, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                tracing::trace!(timer = name, "Timer fired");
                f();
            }
        });

        Self { name, handle }
    }

    /// Fire `f` once after `delay`
    pub fn after<F>(name: &'static str, delay: Duration, f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let deadline = Instant::now() + delay;
        let handle = tokio::spawn(async move {
            time::sleep_until(deadline).await;
            tracing::trace!(timer = name, "Timer fired");
            f();
        });

        Self { name, handle }
    }

    /// Timer name used in logs
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the underlying task has completed or been aborted
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stop the timer; a pending fire will not happen
    pub fn cancel(self) {
        // Drop does the work
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        if !self.handle.is_finished() {
            tracing::trace!(timer = self.name, "Cancelling timer");
        }
        self.handle.abort();
    }
}

/// Latest value and the push that stored it
struct Pending<T> {
    generation: u64,
    value: Option<T>,
}

struct DebounceShared<T> {
    latest: Mutex<Pending<T>>,
    sink: Box<dyn Fn(T) + Send + Sync>,
}

impl<T> DebounceShared<T> {
    fn deliver(&self) {
        let value = self.latest.lock().value.take();
        if let Some(value) = value {
            (self.sink)(value);
        }
    }

    /// Deliver only if no push happened after the one numbered `generation`
    fn deliver_if(&self, generation: u64) {
        let value = {
            let mut latest = self.latest.lock();
            if latest.generation != generation {
                return;
            }
            latest.value.take()
        };
        if let Some(value) = value {
            (self.sink)(value);
        }
    }
}

/// Coalesces rapid updates and delivers only the last one after a quiet period
pub struct Debouncer<T: Send + 'static> {
    delay: Duration,
    shared: Arc<DebounceShared<T>>,
    pending: Mutex<Option<ScheduledTask>>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Create a debouncer that hands settled values to `sink`
    pub fn new<F>(delay: Duration, sink: F) -> Self
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        Self {
            delay,
            shared: Arc::new(DebounceShared {
                latest: Mutex::new(Pending {
                    generation: 0,
                    value: None,
                }),
                sink: Box::new(sink),
            }),
            pending: Mutex::new(None),
        }
    }

    /// Configured quiet period
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Record a new value and restart the quiet period
    pub fn push(&self, value: T) {
        let generation = {
            let mut latest = self.shared.latest.lock();
            latest.generation += 1;
            latest.value = Some(value);
            latest.generation
        };

        // An older task that already woke up sees a newer generation and backs off
        let shared: Weak<DebounceShared<T>> = Arc::downgrade(&self.shared);
        let task = ScheduledTask::after("debounce", self.delay, move || {
            if let Some(shared) = shared.upgrade() {
                shared.deliver_if(generation);
            }
        });

        // Replacing the previous task aborts it
        *self.pending.lock() = Some(task);
    }

    /// Whether a value is waiting for the quiet period to end
    pub fn is_pending(&self) -> bool {
        self.shared.latest.lock().value.is_some()
    }

    /// Deliver the pending value now, if any
    pub fn flush(&self) {
        self.pending.lock().take();
        self.shared.deliver();
    }

    /// Drop the pending value without delivering it
    pub fn cancel(&self) {
        self.pending.lock().take();
        self.shared.latest.lock().value.take();
    }
}

impl<T: Send + 'static> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_every_fires_after_each_full_period() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let _task = ScheduledTask::every("test", Duration::from_millis(100), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        time::sleep(Duration::from_millis(50)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        time::sleep(Duration::from_millis(100)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        time::sleep(Duration::from_millis(200)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_task_never_fires() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = count.clone();
        let task = ScheduledTask::after("test", Duration::from_millis(100), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        task.cancel();

        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_debouncer_delivers_last_value_once() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let debouncer = Debouncer::new(Duration::from_millis(500), move |v: String| {
            sink.lock().push(v);
        });

        debouncer.push("p".to_string());
        time::sleep(Duration::from_millis(200)).await;
        debouncer.push("ph".to_string());
        time::sleep(Duration::from_millis(200)).await;
        debouncer.push("phone".to_string());

        time::sleep(Duration::from_millis(400)).await;
        assert!(seen.lock().is_empty());
        assert!(debouncer.is_pending());

        time::sleep(Duration::from_millis(200)).await;
        assert_eq!(*seen.lock(), vec!["phone".to_string()]);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_debouncer_flush_and_cancel() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let debouncer = Debouncer::new(Duration::from_millis(500), move |v: u32| {
            sink.lock().push(v);
        });

        debouncer.push(1);
        debouncer.flush();
        assert_eq!(*seen.lock(), vec![1]);

        debouncer.push(2);
        debouncer.cancel();
        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(*seen.lock(), vec![1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_timer_does_not_deliver_newer_value() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let debouncer = Debouncer::new(Duration::from_millis(500), move |v: u32| {
            sink.lock().push(v);
        });

        debouncer.push(1);
        let superseded = debouncer.shared.latest.lock().generation;
        time::sleep(Duration::from_millis(300)).await;
        debouncer.push(2);

        // A timer from the first push that fires late must not hand over 2 early
        debouncer.shared.deliver_if(superseded);
        assert!(seen.lock().is_empty());
        assert!(debouncer.is_pending());

        time::sleep(Duration::from_millis(400)).await;
        assert!(seen.lock().is_empty());
        time::sleep(Duration::from_millis(200)).await;
        assert_eq!(*seen.lock(), vec![2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_debouncer_discards_pending_value() {
        let seen = Arc::new(AtomicUsize::new(0));
        let sink = seen.clone();
        let debouncer = Debouncer::new(Duration::from_millis(500), move |_: u32| {
            sink.fetch_add(1, Ordering::SeqCst);
        });
        debouncer.push(7);
        drop(debouncer);

        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(seen.load(Ordering::SeqCst), 0);
    }
}
