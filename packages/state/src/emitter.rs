//! Fire-and-forget event emitter

use crate::listeners::{ListenerSet, Subscription};

/// Synchronous event emitter. Clones share the listener list.
pub struct EventEmitter<E> {
    listeners: ListenerSet<E>,
}

impl<E> Clone for EventEmitter<E> {
    fn clone(&self) -> Self {
        Self {
            listeners: self.listeners.clone(),
        }
    }
}

impl<E: 'static> Default for EventEmitter<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: 'static> EventEmitter<E> {
    pub fn new() -> Self {
        Self {
            listeners: ListenerSet::new(),
        }
    }

    pub fn on(&self, listener: impl Fn(&E) + 'static) -> Subscription {
        self.listeners.add(listener)
    }

    pub fn emit(&self, event: &E) {
        self.listeners.notify(event);
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}
