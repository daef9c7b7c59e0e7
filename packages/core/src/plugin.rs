//! # Plugin lifecycle
//!
//! Optional features attach to a grid through [`Plugin`]. On activation a
//! plugin pushes every teardown it needs (listener subscriptions, command
//! cleanup) onto the [`Unsubscribes`] list it is handed; deactivation runs
//! them in order. Plugins are registered under their own explicit key.
//!
//! Plugins are usually cheap handles over shared state, so the host can
//! keep a clone to call feature-specific methods while the grid owns
//! another.

use crate::errors::{GridError, GridResult};
use crate::grid::DataGrid;
use datagrid_state::Subscription;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, info};

pub trait Plugin {
    /// Unique registry key
    fn key(&self) -> &str;

    /// Attach to `grid`, queueing every teardown on `unsubscribes`
    fn handle_activate(&self, grid: &DataGrid, unsubscribes: &mut Unsubscribes) -> GridResult<()>;

    /// Extra cleanup before the queued teardowns run
    fn handle_deactivate(&self, _grid: &DataGrid) {}
}

/// Teardown closures queued by a plugin, run in insertion order
#[derive(Default)]
pub struct Unsubscribes {
    teardowns: Vec<Box<dyn FnOnce()>>,
}

impl Unsubscribes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, teardown: impl FnOnce() + 'static) {
        self.teardowns.push(Box::new(teardown));
    }

    pub fn push_subscription(&mut self, subscription: Subscription) {
        self.push(move || subscription.unsubscribe());
    }

    pub fn len(&self) -> usize {
        self.teardowns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teardowns.is_empty()
    }

    pub fn run_all(&mut self) {
        for teardown in self.teardowns.drain(..) {
            teardown();
        }
    }
}

impl std::fmt::Debug for Unsubscribes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unsubscribes({})", self.teardowns.len())
    }
}

struct PluginSlot {
    key: String,
    plugin: Rc<dyn Plugin>,
    active: bool,
    unsubscribes: Unsubscribes,
}

/// Registered plugins in insertion order
#[derive(Default)]
pub struct PluginManager {
    slots: RefCell<Vec<PluginSlot>>,
}

impl PluginManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, plugin: Rc<dyn Plugin>) -> GridResult<()> {
        let key = plugin.key().to_string();
        if self.contains(&key) {
            return Err(GridError::DuplicatePlugin(key));
        }
        self.slots.borrow_mut().push(PluginSlot {
            key,
            plugin,
            active: false,
            unsubscribes: Unsubscribes::new(),
        });
        Ok(())
    }

    /// Deactivate and drop a plugin
    pub fn remove(&self, grid: &DataGrid, key: &str) -> GridResult<Rc<dyn Plugin>> {
        self.deactivate(grid, key)?;
        let mut slots = self.slots.borrow_mut();
        let index = slots
            .iter()
            .position(|slot| slot.key == key)
            .ok_or_else(|| GridError::PluginNotFound(key.to_string()))?;
        Ok(slots.remove(index).plugin)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.slots.borrow().iter().any(|slot| slot.key == key)
    }

    pub fn get(&self, key: &str) -> Option<Rc<dyn Plugin>> {
        self.slots
            .borrow()
            .iter()
            .find(|slot| slot.key == key)
            .map(|slot| Rc::clone(&slot.plugin))
    }

    pub fn keys(&self) -> Vec<String> {
        self.slots.borrow().iter().map(|slot| slot.key.clone()).collect()
    }

    pub fn is_active(&self, key: &str) -> bool {
        self.slots
            .borrow()
            .iter()
            .any(|slot| slot.key == key && slot.active)
    }

    /// Activate a registered plugin. Returns `false` if it already was.
    ///
    /// If the plugin fails to activate, whatever it queued so far is torn
    /// down again.
    pub fn activate(&self, grid: &DataGrid, key: &str) -> GridResult<bool> {
        let plugin = match self.slot_state(key)? {
            (_, true) => return Ok(false),
            (plugin, false) => plugin,
        };

        // No borrow is held while the plugin runs
        let mut unsubscribes = Unsubscribes::new();
        if let Err(err) = plugin.handle_activate(grid, &mut unsubscribes) {
            unsubscribes.run_all();
            return Err(err);
        }

        let queued = unsubscribes.len();
        self.with_slot(key, |slot| {
            slot.active = true;
            slot.unsubscribes = unsubscribes;
        })?;
        info!(plugin = key, teardowns = queued, "Activated plugin");
        Ok(true)
    }

    /// Run the plugin's teardowns. Idempotent.
    pub fn deactivate(&self, grid: &DataGrid, key: &str) -> GridResult<bool> {
        let plugin = match self.slot_state(key)? {
            (_, false) => return Ok(false),
            (plugin, true) => plugin,
        };

        let mut unsubscribes = self.with_slot(key, |slot| {
            slot.active = false;
            std::mem::take(&mut slot.unsubscribes)
        })?;

        plugin.handle_deactivate(grid);
        let count = unsubscribes.len();
        unsubscribes.run_all();
        debug!(plugin = key, teardowns = count, "Deactivated plugin");
        Ok(true)
    }

    /// Deactivate every plugin, last added first
    pub fn deactivate_all(&self, grid: &DataGrid) {
        for key in self.keys().into_iter().rev() {
            // Keys were just listed
            let _ = self.deactivate(grid, &key);
        }
    }

    fn slot_state(&self, key: &str) -> GridResult<(Rc<dyn Plugin>, bool)> {
        self.slots
            .borrow()
            .iter()
            .find(|slot| slot.key == key)
            .map(|slot| (Rc::clone(&slot.plugin), slot.active))
            .ok_or_else(|| GridError::PluginNotFound(key.to_string()))
    }

    fn with_slot<R>(&self, key: &str, f: impl FnOnce(&mut PluginSlot) -> R) -> GridResult<R> {
        let mut slots = self.slots.borrow_mut();
        let slot = slots
            .iter_mut()
            .find(|slot| slot.key == key)
            .ok_or_else(|| GridError::PluginNotFound(key.to_string()))?;
        Ok(f(slot))
    }
}

impl std::fmt::Debug for PluginManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginManager").field("plugins", &self.keys()).finish()
    }
}
