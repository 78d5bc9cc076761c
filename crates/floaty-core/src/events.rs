use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

/// Events emitted by the widget as it changes state.
///
/// Consumed by whatever the embedder subscribes on the application context:
/// logging in the `floaty` harness, assertions in tests.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum WidgetEvent {
    /// The button was clicked.
    ButtonClicked,

    /// The tooltip next to the button was shown or hidden.
    TooltipChanged { visible: bool },

    /// The panel was shown or hidden.
    PanelVisibilityChanged { visible: bool },

    /// Page text was handed to the embedded document's channel.
    PageTextSent { origin: String, text_length: usize },

    /// A message could not be delivered and was dropped.
    MessageDropped { reason: String },
}

/// Identifies a subscription so it can be removed later.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler<E> = Arc<dyn Fn(&E) + Send + Sync>;

struct Subscribers<E> {
    next_id: u64,
    handlers: Vec<(SubscriptionId, Handler<E>)>,
}

/// Synchronous observer list.
///
/// Handlers run on the emitting thread, in subscription order. The handler
/// list is snapshotted before dispatch, so a handler may subscribe, unsubscribe
/// or emit again without deadlocking.
pub struct EventBus<E> {
    inner: Arc<Mutex<Subscribers<E>>>,
}

impl<E> Clone for EventBus<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Subscribers {
                next_id: 0,
                handlers: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Subscribers<E>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a handler.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let mut subs = self.lock();
        let id = SubscriptionId(subs.next_id);
        subs.next_id += 1;
        subs.handlers.push((id, Arc::new(handler)));
        id
    }

    /// Remove a handler. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subs = self.lock();
        let before = subs.handlers.len();
        subs.handlers.retain(|(sub_id, _)| *sub_id != id);
        subs.handlers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().handlers.len()
    }

    /// Deliver `event` to every current subscriber.
    pub fn emit(&self, event: &E) {
        let handlers: Vec<Handler<E>> = self
            .lock()
            .handlers
            .iter()
            .map(|(_, h)| Arc::clone(h))
            .collect();
        for handler in handlers {
            handler(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_emit_reaches_all_subscribers_in_order() {
        let bus = EventBus::<u32>::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for tag in ["a", "b"] {
            let seen = Arc::clone(&seen);
            bus.subscribe(move |n: &u32| seen.lock().unwrap().push(format!("{tag}{n}")));
        }
        bus.emit(&1);

        assert_eq!(*seen.lock().unwrap(), vec!["a1", "b1"]);
    }

    #[test]
    fn test_unsubscribe() {
        let bus = EventBus::<()>::new();
        let count = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&count);
        let id = bus.subscribe(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        bus.emit(&());
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.emit(&());

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn test_handler_may_emit_reentrantly() {
        let bus = EventBus::<u32>::new();
        let count = Arc::new(AtomicUsize::new(0));
        let inner_bus = bus.clone();
        let c = Arc::clone(&count);
        bus.subscribe(move |n: &u32| {
            c.fetch_add(1, Ordering::SeqCst);
            if *n > 0 {
                inner_bus.emit(&(n - 1));
            }
        });

        bus.emit(&2);
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_widget_event_serialization() {
        let event = WidgetEvent::PageTextSent {
            origin: "https://chat.example".to_string(),
            text_length: 11,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("PageTextSent"));
        let parsed: WidgetEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }
}
