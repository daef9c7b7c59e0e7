//! # Keyed map cell
//!
//! Insertion-ordered map with two watch granularities: the whole map, or a
//! single key. Single-key watchers get the current value replayed as soon
//! as they subscribe, so late consumers never miss the latest state.

use crate::error::StateError;
use crate::listeners::{ListenerSet, Subscription};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::rc::Rc;

struct Inner<K, V> {
    entries: RefCell<Vec<(K, V)>>,
    listeners: ListenerSet<Vec<(K, V)>>,
    item_listeners: RefCell<HashMap<K, ListenerSet<Option<V>>>>,
}

/// Observable insertion-ordered map. Clones share state.
pub struct ObservableMap<K, V> {
    inner: Rc<Inner<K, V>>,
}

impl<K, V> Clone for ObservableMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<K, V> Default for ObservableMap<K, V>
where
    K: Eq + Hash + Clone + Debug + 'static,
    V: Clone + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> ObservableMap<K, V>
where
    K: Eq + Hash + Clone + Debug + 'static,
    V: Clone + 'static,
{
    pub fn new() -> Self {
        Self {
            inner: Rc::new(Inner {
                entries: RefCell::new(Vec::new()),
                listeners: ListenerSet::new(),
                item_listeners: RefCell::new(HashMap::new()),
            }),
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        self.inner
            .entries
            .borrow()
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.position(key).is_some()
    }

    pub fn keys(&self) -> Vec<K> {
        self.inner.entries.borrow().iter().map(|(k, _)| k.clone()).collect()
    }

    pub fn values(&self) -> Vec<V> {
        self.inner.entries.borrow().iter().map(|(_, v)| v.clone()).collect()
    }

    pub fn entries(&self) -> Vec<(K, V)> {
        self.inner.entries.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert a new key. Fails if the key is already present.
    pub fn add_item(&self, key: K, value: V) -> Result<(), StateError> {
        if self.contains_key(&key) {
            return Err(StateError::DuplicateKey(format!("{:?}", key)));
        }
        self.inner
            .entries
            .borrow_mut()
            .push((key.clone(), value.clone()));
        self.emit(&key, Some(value));
        Ok(())
    }

    /// Remove an existing key and return its value
    pub fn remove_item(&self, key: &K) -> Result<V, StateError> {
        let index = self
            .position(key)
            .ok_or_else(|| StateError::MissingKey(format!("{:?}", key)))?;
        let (_, removed) = self.inner.entries.borrow_mut().remove(index);
        self.emit(key, None);
        Ok(removed)
    }

    /// Swap the value of an existing key, keeping its position
    pub fn replace_item(&self, key: &K, value: V) -> Result<V, StateError> {
        let index = self
            .position(key)
            .ok_or_else(|| StateError::MissingKey(format!("{:?}", key)))?;
        let previous =
            std::mem::replace(&mut self.inner.entries.borrow_mut()[index].1, value.clone());
        self.emit(key, Some(value));
        Ok(previous)
    }

    /// Replace the whole map. Every key that was or is present is re-published.
    pub fn set(&self, entries: Vec<(K, V)>) {
        let mut touched = self.keys();
        for (key, _) in &entries {
            if !touched.contains(key) {
                touched.push(key.clone());
            }
        }

        *self.inner.entries.borrow_mut() = entries;

        self.inner.listeners.notify(&self.entries());
        for key in touched {
            let value = self.get(&key);
            self.notify_item(&key, value);
        }
    }

    pub fn clear(&self) {
        self.set(Vec::new());
    }

    /// Watch every change to the map
    pub fn watch(&self, listener: impl Fn(&Vec<(K, V)>) + 'static) -> Subscription {
        self.inner.listeners.add(listener)
    }

    /// Watch one key. The listener is called immediately with the current value.
    pub fn watch_item(&self, key: K, listener: impl Fn(&Option<V>) + 'static) -> Subscription {
        let current = self.get(&key);
        listener(&current);

        let set = self
            .inner
            .item_listeners
            .borrow_mut()
            .entry(key)
            .or_insert_with(ListenerSet::new)
            .clone();
        set.add(listener)
    }

    fn position(&self, key: &K) -> Option<usize> {
        self.inner.entries.borrow().iter().position(|(k, _)| k == key)
    }

    fn emit(&self, key: &K, value: Option<V>) {
        self.inner.listeners.notify(&self.entries());
        self.notify_item(key, value);
    }

    fn notify_item(&self, key: &K, value: Option<V>) {
        let set = self.inner.item_listeners.borrow().get(key).cloned();
        if let Some(set) = set {
            set.notify(&value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_add_remove_replace_contracts() {
        let map: ObservableMap<String, u32> = ObservableMap::new();
        map.add_item("a".into(), 1).unwrap();

        assert_eq!(
            map.add_item("a".into(), 2),
            Err(StateError::DuplicateKey("\"a\"".into()))
        );
        assert!(map.replace_item(&"b".into(), 2).is_err());
        assert!(map.remove_item(&"b".into()).is_err());

        assert_eq!(map.replace_item(&"a".into(), 5).unwrap(), 1);
        assert_eq!(map.remove_item(&"a".into()).unwrap(), 5);
        assert!(map.is_empty());
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let map: ObservableMap<&'static str, u32> = ObservableMap::new();
        map.add_item("z", 1).unwrap();
        map.add_item("a", 2).unwrap();
        map.replace_item(&"z", 3).unwrap();
        assert_eq!(map.keys(), vec!["z", "a"]);
    }

    #[test]
    fn test_watch_item_replays_latest() {
        let map: ObservableMap<&'static str, u32> = ObservableMap::new();
        map.add_item("x", 7).unwrap();

        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_inner = Rc::clone(&seen);
        let _sub = map.watch_item("x", move |value| seen_inner.borrow_mut().push(*value));

        map.replace_item(&"x", 8).unwrap();
        map.add_item("y", 1).unwrap();
        map.remove_item(&"x").unwrap();

        assert_eq!(*seen.borrow(), vec![Some(7), Some(8), None]);
    }

    #[test]
    fn test_whole_map_watch_fires_per_mutation() {
        let map: ObservableMap<u8, u8> = ObservableMap::new();
        let calls = Rc::new(Cell::new(0));
        let calls_inner = Rc::clone(&calls);
        let _sub = map.watch(move |_| calls_inner.set(calls_inner.get() + 1));

        map.add_item(1, 1).unwrap();
        map.add_item(2, 2).unwrap();
        map.set(vec![(3, 3)]);
        assert_eq!(calls.get(), 3);
        assert_eq!(map.keys(), vec![3]);
    }
}
