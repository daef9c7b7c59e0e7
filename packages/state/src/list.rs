//! Ordered list cell

use crate::listeners::Subscription;
use crate::observable::{Equality, Observable};

/// Observable ordered list. Every mutation publishes the whole new list.
pub struct ObservableList<T> {
    cell: Observable<Vec<T>>,
}

impl<T> Clone for ObservableList<T> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
        }
    }
}

impl<T: Clone + PartialEq + 'static> ObservableList<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            cell: Observable::new(items),
        }
    }
}

impl<T: Clone + 'static> ObservableList<T> {
    pub fn with_equality(items: Vec<T>, equals: Equality<Vec<T>>) -> Self {
        Self {
            cell: Observable::with_equality(items, equals),
        }
    }

    pub fn without_equality(items: Vec<T>) -> Self {
        Self {
            cell: Observable::without_equality(items),
        }
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.cell.get()
    }

    pub fn with<R>(&self, f: impl FnOnce(&[T]) -> R) -> R {
        self.cell.with(|items| f(items))
    }

    pub fn get(&self, index: usize) -> Option<T> {
        self.cell.with(|items| items.get(index).cloned())
    }

    pub fn last(&self) -> Option<T> {
        self.cell.with(|items| items.last().cloned())
    }

    pub fn len(&self) -> usize {
        self.cell.with(Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn set(&self, items: Vec<T>) -> bool {
        self.cell.set(items)
    }

    pub fn set_silent(&self, items: Vec<T>) -> bool {
        self.cell.set_silent(items)
    }

    /// Edit a copy of the list in place, then publish it
    pub fn modify(&self, f: impl FnOnce(&mut Vec<T>)) -> bool {
        let mut items = self.cell.get();
        f(&mut items);
        self.cell.set(items)
    }

    pub fn push(&self, item: T) -> bool {
        self.modify(|items| items.push(item))
    }

    /// Remove the item at `index`. Out-of-range indices are a no-op.
    pub fn remove(&self, index: usize) -> Option<T> {
        let mut removed = None;
        self.modify(|items| {
            if index < items.len() {
                removed = Some(items.remove(index));
            }
        });
        removed
    }

    pub fn clear(&self) -> bool {
        self.cell.set(Vec::new())
    }

    pub fn watch(&self, listener: impl Fn(&Vec<T>) + 'static) -> Subscription {
        self.cell.watch(listener)
    }
}

impl<T: Clone + std::fmt::Debug + 'static> std::fmt::Debug for ObservableList<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.to_vec()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_push_and_remove_notify_in_order() {
        let list = ObservableList::new(vec![1]);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_inner = Rc::clone(&seen);
        let _sub = list.watch(move |items| seen_inner.borrow_mut().push(items.clone()));

        list.push(2);
        assert_eq!(list.remove(0), Some(1));
        assert_eq!(list.remove(5), None);

        assert_eq!(*seen.borrow(), vec![vec![1, 2], vec![2]]);
    }

    #[test]
    fn test_clear_on_empty_list_is_noop() {
        let list: ObservableList<u8> = ObservableList::new(Vec::new());
        assert!(!list.clear());
        assert!(list.is_empty());
    }
}
