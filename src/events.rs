// SPDX-License-Identifier: GPL-3.0-only

//! A small typed publish/subscribe primitive (spec.md §4.1).
//!
//! Each [`Bus<T>`] is a single-event-type broadcaster: `listen` registers a
//! handler, `fire` invokes every registered handler synchronously, in
//! subscription order, on the caller's thread. There is no unsubscribe;
//! listeners are expected to live for the lifetime of the owning [`App`](crate::app::App).

/// A synchronous publish/subscribe channel for one event payload type.
pub struct Bus<T> {
    listeners: Vec<Box<dyn Fn(&T) + Send>>,
}

impl<T> Bus<T> {
    /// Creates an empty bus.
    pub fn new() -> Self {
        Self { listeners: Vec::new() }
    }

    /// Registers a handler. Handlers run in the order they were registered.
    pub fn listen<F>(&mut self, handler: F)
    where
        F: Fn(&T) + Send + 'static,
    {
        self.listeners.push(Box::new(handler));
    }

    /// Invokes every registered handler with `payload`, in subscription
    /// order, on the calling thread. A panicking handler propagates to the
    /// caller; the bus does not catch it.
    pub fn fire(&self, payload: &T) {
        for listener in &self.listeners {
            listener(payload);
        }
    }

    /// The number of currently registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl<T> Default for Bus<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// A bus for an event with no payload.
pub type UnitBus = Bus<()>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn fires_listeners_in_subscription_order() {
        let mut bus: Bus<i32> = Bus::new();
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));

        let order_a = Arc::clone(&order);
        bus.listen(move |_| order_a.lock().unwrap().push("a"));
        let order_b = Arc::clone(&order);
        bus.listen(move |_| order_b.lock().unwrap().push("b"));

        bus.fire(&42);

        assert_eq!(*order.lock().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn counts_listeners() {
        let mut bus: UnitBus = Bus::new();
        assert_eq!(bus.listener_count(), 0);
        bus.listen(|_| {});
        bus.listen(|_| {});
        assert_eq!(bus.listener_count(), 2);
    }

    #[test]
    fn fire_invokes_every_listener() {
        let mut bus: Bus<()> = Bus::new();
        let count = Arc::new(AtomicUsize::new(0));
        for _ in 0..5 {
            let count = Arc::clone(&count);
            bus.listen(move |_| {
                count.fetch_add(1, Ordering::SeqCst);
            });
        }
        bus.fire(&());
        assert_eq!(count.load(Ordering::SeqCst), 5);
    }
}
