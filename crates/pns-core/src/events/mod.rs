//! Type-keyed publish/subscribe between storefront components

use std::any::{type_name, Any, TypeId};

use ahash::AHashMap;
use parking_lot::Mutex;

/// Anything that can travel over the [`EventBus`]
pub trait Event: Send + Sync + 'static {
    fn as_any(&self) -> &dyn Any;
}

/// Receives events of the type it was subscribed for
pub trait EventHandler: Send + Sync {
    fn handle(&mut self, event: &dyn Event);
}

type Handlers = Vec<Box<dyn EventHandler>>;

/// Storefront-wide event bus, shared behind an `Arc`
#[derive(Default)]
pub struct EventBus {
    handlers: Mutex<AHashMap<TypeId, Handlers>>,
}

/// Common storefront events
pub mod events {
    use super::Event;

    /// Listing collection loaded from a source
    #[derive(Debug, Clone)]
    pub struct ListingsLoaded {
        pub source_name: String,
        pub listing_count: usize,
    }

    /// Listing collection failed to load
    #[derive(Debug, Clone)]
    pub struct ListingsLoadFailed {
        pub source_name: String,
        pub error: String,
    }

    /// A share action completed
    #[derive(Debug, Clone)]
    pub struct ShareCompleted {
        pub listing_id: String,
        pub platform: String,
    }

    /// A share action failed
    #[derive(Debug, Clone)]
    pub struct ShareFailed {
        pub listing_id: String,
        pub platform: String,
        pub error: String,
    }

    /// An admin approved a pending submission
    #[derive(Debug, Clone)]
    pub struct ListingApproved {
        pub listing_id: String,
        pub title: String,
    }

    /// An admin rejected a pending submission
    #[derive(Debug, Clone)]
    pub struct ListingRejected {
        pub listing_id: String,
    }

    macro_rules! impl_event {
        ($($t:ty),* $(,)?) => {
            $(
                impl Event for $t {
                    fn as_any(&self) -> &dyn std::any::Any {
                        self
                    }
                }
            )*
        };
    }

    impl_event!(
        ListingsLoaded,
        ListingsLoadFailed,
        ShareCompleted,
        ShareFailed,
        ListingApproved,
        ListingRejected,
    );
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for events of type `E`
    pub fn subscribe<E: Event>(&self, handler: Box<dyn EventHandler>) {
        self.handlers
            .lock()
            .entry(TypeId::of::<E>())
            .or_default()
            .push(handler);
    }

    /// Handlers registered for `E`
    pub fn subscriber_count<E: Event>(&self) -> usize {
        self.handlers
            .lock()
            .get(&TypeId::of::<E>())
            .map_or(0, Vec::len)
    }

    /// Deliver an event to every handler of its type, in subscription order.
    ///
    /// Handlers run while the bus is locked and must not publish themselves.
    pub fn publish<E: Event>(&self, event: E) {
        let mut handlers = self.handlers.lock();
        let Some(handlers) = handlers.get_mut(&TypeId::of::<E>()) else {
            tracing::trace!(event = type_name::<E>(), "No subscribers");
            return;
        };
        for handler in handlers.iter_mut() {
            handler.handle(&event);
        }
    }
}

struct FnHandler<F>(F);

impl<F> EventHandler for FnHandler<F>
where
    F: FnMut(&dyn Event) + Send + Sync,
{
    fn handle(&mut self, event: &dyn Event) {
        (self.0)(event);
    }
}

/// Wrap a closure as an event handler
pub fn handler_from_fn<F>(f: F) -> Box<dyn EventHandler>
where
    F: FnMut(&dyn Event) + Send + Sync + 'static,
{
    Box::new(FnHandler(f))
}

#[cfg(test)]
mod tests {
    use super::events::{ListingsLoaded, ShareFailed};
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_publish_reaches_only_matching_subscribers() {
        let bus = EventBus::new();
        let loaded = Arc::new(AtomicUsize::new(0));
        let counter = loaded.clone();
        bus.subscribe::<ListingsLoaded>(handler_from_fn(move |event| {
            if let Some(e) = event.as_any().downcast_ref::<ListingsLoaded>() {
                counter.fetch_add(e.listing_count, Ordering::SeqCst);
            }
        }));

        bus.publish(ListingsLoaded {
            source_name: "memory".to_string(),
            listing_count: 120,
        });
        bus.publish(ShareFailed {
            listing_id: "1".to_string(),
            platform: "clipboard".to_string(),
            error: "denied".to_string(),
        });

        assert_eq!(loaded.load(Ordering::SeqCst), 120);
        assert_eq!(bus.subscriber_count::<ListingsLoaded>(), 1);
        assert_eq!(bus.subscriber_count::<ShareFailed>(), 0);
    }
}
