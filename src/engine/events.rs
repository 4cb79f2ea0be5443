//! Event channel for value-changed notifications.
//!
//! Widgets do not call back into the host directly. Every user edit emits a
//! [`ValueChanged`] on the form's channel; the host subscribes once at the
//! root and receives (scoped path, new value) pairs.
//!
//! # API
//!
//! - `subscribe(handler)` - Receive every event; returns cleanup function
//! - `subscribe_path(path, handler)` - Receive events for one path
//! - `last_event()` - Reactive signal holding the most recent event
//!
//! # Example
//!
//! ```
//! use spark_form::engine::{EventChannel, ValueChanged};
//! use spark_form::WidgetValue;
//!
//! let channel = EventChannel::new();
//! let cleanup = channel.subscribe(|event| println!("{} changed", event.path));
//!
//! channel.emit(ValueChanged::new("mass", WidgetValue::Double(2.0)));
//! cleanup();
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use spark_signals::{Signal, signal};
use tracing::trace;

use crate::types::WidgetValue;

// =============================================================================
// TYPES
// =============================================================================

/// A widget value changed through a user edit.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueChanged {
    pub path: String,
    pub value: WidgetValue,
}

impl ValueChanged {
    pub fn new(path: impl Into<String>, value: WidgetValue) -> Self {
        Self {
            path: path.into(),
            value,
        }
    }
}

pub type ValueHandler = Rc<dyn Fn(&ValueChanged)>;

/// Cleanup function returned by subscriptions.
pub type Cleanup = Box<dyn FnOnce()>;

// =============================================================================
// HANDLER REGISTRY
// =============================================================================

#[derive(Default)]
struct HandlerRegistry {
    handlers: Vec<(usize, Option<String>, ValueHandler)>,
    next_id: usize,
}

impl HandlerRegistry {
    fn next_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

/// Per-form event channel. Clones share the same subscribers.
#[derive(Clone)]
pub struct EventChannel {
    registry: Rc<RefCell<HandlerRegistry>>,
    last: Signal<Option<ValueChanged>>,
}

impl Default for EventChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl EventChannel {
    pub fn new() -> Self {
        Self {
            registry: Rc::new(RefCell::new(HandlerRegistry::default())),
            last: signal(None),
        }
    }

    /// Subscribe to all value-changed events.
    /// Returns cleanup function.
    pub fn subscribe<F>(&self, handler: F) -> Cleanup
    where
        F: Fn(&ValueChanged) + 'static,
    {
        self.add(None, Rc::new(handler))
    }

    /// Subscribe to events for a single scoped path.
    pub fn subscribe_path<F>(&self, path: &str, handler: F) -> Cleanup
    where
        F: Fn(&ValueChanged) + 'static,
    {
        self.add(Some(path.to_string()), Rc::new(handler))
    }

    fn add(&self, path: Option<String>, handler: ValueHandler) -> Cleanup {
        let id = {
            let mut reg = self.registry.borrow_mut();
            let id = reg.next_id();
            reg.handlers.push((id, path, handler));
            id
        };

        let registry = Rc::downgrade(&self.registry);
        Box::new(move || {
            if let Some(registry) = registry.upgrade() {
                registry
                    .borrow_mut()
                    .handlers
                    .retain(|(handler_id, _, _)| *handler_id != id);
            }
        })
    }

    /// Deliver `event` to matching subscribers, in subscription order.
    ///
    /// Handlers may subscribe or unsubscribe while being called; changes
    /// take effect from the next event.
    pub fn emit(&self, event: ValueChanged) {
        trace!(path = %event.path, value = ?event.value, "value changed");

        let handlers: Vec<ValueHandler> = self
            .registry
            .borrow()
            .handlers
            .iter()
            .filter(|(_, path, _)| path.as_deref().is_none_or(|p| p == event.path))
            .map(|(_, _, handler)| Rc::clone(handler))
            .collect();

        for handler in handlers {
            handler(&event);
        }

        self.last.set(Some(event));
    }

    /// Most recent event, as a reactive signal.
    pub fn last_event(&self) -> Signal<Option<ValueChanged>> {
        self.last.clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.registry.borrow().handlers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spark_signals::effect;
    use std::cell::Cell;

    #[test]
    fn test_subscribe_and_cleanup() {
        let channel = EventChannel::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let seen_clone = seen.clone();
        let cleanup = channel.subscribe(move |e| seen_clone.borrow_mut().push(e.path.clone()));

        channel.emit(ValueChanged::new("a", WidgetValue::Bool(true)));
        cleanup();
        channel.emit(ValueChanged::new("b", WidgetValue::Bool(false)));

        assert_eq!(*seen.borrow(), vec!["a".to_string()]);
        assert_eq!(channel.subscriber_count(), 0);
    }

    #[test]
    fn test_path_subscription_filters() {
        let channel = EventChannel::new();
        let count = Rc::new(Cell::new(0));

        let count_clone = count.clone();
        let _cleanup = channel.subscribe_path("pose", move |_| count_clone.set(count_clone.get() + 1));

        channel.emit(ValueChanged::new("mass", WidgetValue::Double(1.0)));
        channel.emit(ValueChanged::new("pose", WidgetValue::Double(1.0)));

        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_handler_may_unsubscribe_itself() {
        let channel = EventChannel::new();
        let slot: Rc<RefCell<Option<Cleanup>>> = Rc::new(RefCell::new(None));
        let calls = Rc::new(Cell::new(0));

        let slot_clone = slot.clone();
        let calls_clone = calls.clone();
        let cleanup = channel.subscribe(move |_| {
            calls_clone.set(calls_clone.get() + 1);
            if let Some(cleanup) = slot_clone.borrow_mut().take() {
                cleanup();
            }
        });
        *slot.borrow_mut() = Some(cleanup);

        channel.emit(ValueChanged::new("a", WidgetValue::Int(1)));
        channel.emit(ValueChanged::new("a", WidgetValue::Int(2)));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_last_event_is_reactive() {
        let channel = EventChannel::new();
        let runs = Rc::new(Cell::new(0));

        let last = channel.last_event();
        let runs_clone = runs.clone();
        let _effect = effect(move || {
            let _ = last.get();
            runs_clone.set(runs_clone.get() + 1);
        });

        let initial = runs.get();
        channel.emit(ValueChanged::new("a", WidgetValue::String("x".into())));
        assert_eq!(runs.get(), initial + 1);
        assert_eq!(
            channel.last_event().get().map(|e| e.path),
            Some("a".to_string())
        );
    }
}
