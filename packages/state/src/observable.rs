//! # Scalar state cell
//!
//! Holds one value and notifies watchers when it changes.
//!
//! ```rust
//! use datagrid_state::Observable;
//!
//! let count = Observable::new(0);
//! let sub = count.watch(|value| println!("count = {value}"));
//! count.set(1);
//! count.update(|value| value + 1);
//! sub.unsubscribe();
//! ```

use crate::listeners::{ListenerSet, Subscription};
use std::cell::RefCell;
use std::rc::Rc;

/// Decides whether a write is a no-op
pub type Equality<T> = fn(&T, &T) -> bool;

struct Inner<T> {
    value: RefCell<T>,
    equals: Option<Equality<T>>,
    listeners: ListenerSet<T>,
}

/// Shared handle to a single observable value. Clones share state.
pub struct Observable<T> {
    inner: Rc<Inner<T>>,
}

impl<T> Clone for Observable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: Clone + PartialEq + 'static> Observable<T> {
    /// Writes equal to the current value (by `PartialEq`) are skipped
    pub fn new(value: T) -> Self {
        Self::with_equality(value, |a, b| a == b)
    }
}

impl<T: Clone + 'static> Observable<T> {
    /// Use a custom equality, e.g. pointer identity for `Rc` payloads
    pub fn with_equality(value: T, equals: Equality<T>) -> Self {
        Self::build(value, Some(equals))
    }

    /// Every write notifies, even when the value did not change
    pub fn without_equality(value: T) -> Self {
        Self::build(value, None)
    }

    fn build(value: T, equals: Option<Equality<T>>) -> Self {
        Self {
            inner: Rc::new(Inner {
                value: RefCell::new(value),
                equals,
                listeners: ListenerSet::new(),
            }),
        }
    }

    /// Clone of the current value
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }

    /// Borrow the current value without cloning it
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.borrow())
    }

    /// Replace the value and notify. Returns `false` when the write was a no-op.
    pub fn set(&self, value: T) -> bool {
        self.write(value, false)
    }

    /// Replace the value without notifying watchers
    pub fn set_silent(&self, value: T) -> bool {
        self.write(value, true)
    }

    /// Compute the next value from the current one
    pub fn update(&self, updater: impl FnOnce(&T) -> T) -> bool {
        let next = updater(&self.inner.value.borrow());
        self.set(next)
    }

    /// Attach a listener called with the new value after every change
    pub fn watch(&self, listener: impl Fn(&T) + 'static) -> Subscription {
        self.inner.listeners.add(listener)
    }

    pub fn watcher_count(&self) -> usize {
        self.inner.listeners.len()
    }

    fn write(&self, value: T, silent: bool) -> bool {
        if let Some(equals) = self.inner.equals {
            if equals(&self.inner.value.borrow(), &value) {
                return false;
            }
        }

        let snapshot = if silent { None } else { Some(value.clone()) };
        *self.inner.value.borrow_mut() = value;

        if let Some(snapshot) = snapshot {
            self.inner.listeners.notify(&snapshot);
        }
        true
    }
}

impl<T: Clone + std::fmt::Debug + 'static> std::fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Observable").field(&self.get()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_equal_write_is_noop() {
        let cell = Observable::new(3);
        let calls = Rc::new(Cell::new(0));
        let calls_inner = Rc::clone(&calls);
        let _sub = cell.watch(move |_| calls_inner.set(calls_inner.get() + 1));

        assert!(!cell.set(3));
        assert!(cell.set(4));
        assert_eq!(calls.get(), 1);
        assert_eq!(cell.get(), 4);
    }

    #[test]
    fn test_identity_equality() {
        let first = Rc::new(vec![1, 2]);
        let cell = Observable::with_equality(Rc::clone(&first), Rc::ptr_eq);

        assert!(!cell.set(Rc::clone(&first)));
        assert!(cell.set(Rc::new(vec![1, 2])));
    }

    #[test]
    fn test_silent_write_skips_watchers() {
        let cell = Observable::new("a".to_string());
        let fired = Rc::new(Cell::new(false));
        let fired_inner = Rc::clone(&fired);
        let _sub = cell.watch(move |_| fired_inner.set(true));

        cell.set_silent("b".to_string());
        assert!(!fired.get());
        assert_eq!(cell.get(), "b");
    }

    #[test]
    fn test_reentrant_write_from_listener() {
        let cell = Observable::new(0);
        let handle = cell.clone();
        let _sub = cell.watch(move |value| {
            if *value < 3 {
                handle.set(value + 1);
            }
        });

        cell.set(1);
        assert_eq!(cell.get(), 3);
    }

    #[test]
    fn test_update_uses_current_value() {
        let cell = Observable::new(10);
        cell.update(|v| v * 2);
        assert_eq!(cell.get(), 20);
    }
}
