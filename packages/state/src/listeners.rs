//! Listener bookkeeping shared by every state cell.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/// Handle returned by every `watch`/`on` call.
///
/// Dropping a subscription leaves the listener attached; call
/// [`Subscription::unsubscribe`] to detach it.
#[must_use = "dropping a Subscription keeps the listener attached forever"]
pub struct Subscription {
    teardown: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Wrap an arbitrary teardown closure
    pub fn new(teardown: impl FnOnce() + 'static) -> Self {
        Self {
            teardown: Some(Box::new(teardown)),
        }
    }

    /// A subscription with nothing to tear down
    pub fn noop() -> Self {
        Self { teardown: None }
    }

    /// Detach the listener. Safe to call from inside the listener itself.
    pub fn unsubscribe(mut self) {
        if let Some(teardown) = self.teardown.take() {
            teardown();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("attached", &self.teardown.is_some())
            .finish()
    }
}

struct Entry<T: ?Sized> {
    id: u64,
    alive: Rc<Cell<bool>>,
    callback: Rc<dyn Fn(&T)>,
}

/// Ordered listener list. Cloning shares the same list.
pub(crate) struct ListenerSet<T: ?Sized> {
    entries: Rc<RefCell<Vec<Entry<T>>>>,
    next_id: Rc<Cell<u64>>,
}

impl<T: ?Sized> Clone for ListenerSet<T> {
    fn clone(&self) -> Self {
        Self {
            entries: Rc::clone(&self.entries),
            next_id: Rc::clone(&self.next_id),
        }
    }
}

impl<T: ?Sized + 'static> ListenerSet<T> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Rc::new(RefCell::new(Vec::new())),
            next_id: Rc::new(Cell::new(0)),
        }
    }

    pub(crate) fn add(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);

        let alive = Rc::new(Cell::new(true));
        self.entries.borrow_mut().push(Entry {
            id,
            alive: Rc::clone(&alive),
            callback: Rc::new(callback),
        });

        let entries: Weak<RefCell<Vec<Entry<T>>>> = Rc::downgrade(&self.entries);
        Subscription::new(move || {
            alive.set(false);
            if let Some(entries) = entries.upgrade() {
                entries.borrow_mut().retain(|entry| entry.id != id);
            }
        })
    }

    /// Notify every listener attached when the dispatch started.
    ///
    /// Listeners removed mid-dispatch are skipped; listeners added
    /// mid-dispatch wait for the next one.
    pub(crate) fn notify(&self, value: &T) {
        let snapshot: Vec<(Rc<Cell<bool>>, Rc<dyn Fn(&T)>)> = self
            .entries
            .borrow()
            .iter()
            .map(|entry| (Rc::clone(&entry.alive), Rc::clone(&entry.callback)))
            .collect();

        for (alive, callback) in snapshot {
            if alive.get() {
                callback(value);
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.borrow().len()
    }
}
