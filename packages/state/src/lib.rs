//! # Datagrid State
//!
//! Minimal reactive primitives the grid engine is built on.
//!
//! - [`Observable`]: a single value
//! - [`ObservableList`]: an ordered list
//! - [`ObservableMap`]: an insertion-ordered keyed map with per-key watchers
//! - [`EventEmitter`]: fire-and-forget events
//!
//! All notification is synchronous and in subscription order. Listeners may
//! mutate the cell they are watching or unsubscribe themselves while being
//! notified; the listener list is snapshotted before every dispatch.

mod emitter;
mod error;
mod list;
mod listeners;
mod map;
mod observable;

pub use emitter::EventEmitter;
pub use error::StateError;
pub use list::ObservableList;
pub use listeners::Subscription;
pub use map::ObservableMap;
pub use observable::{Equality, Observable};
