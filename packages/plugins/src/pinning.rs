//! # Pinning
//!
//! Columns pin to the left or right edge and rows to the top or bottom.
//! Pins are keyed by header or row id, so they follow a column or row
//! wherever it moves. The grid's own order is never changed; renderers
//! ask for [`PinningPlugin::ordered_headers`] and
//! [`PinningPlugin::ordered_rows`] instead.
//!
//! Pins whose column or row disappears are dropped.

use datagrid_core::{
    create_id, get_id_type, Command, DataGrid, GridResult, Header, Id, IdSpec, IdType,
    ObservableMap, Plugin, Row, Unsubscribes, WeakDataGrid,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use tracing::debug;

pub const PINNING_KEY: &str = "pinning";
pub const PINNING_SOURCE: &str = "pinning";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pin {
    Left,
    Right,
    Top,
    Bottom,
}

impl Pin {
    fn fits(self, kind: IdType) -> bool {
        match kind {
            IdType::Header => matches!(self, Pin::Left | Pin::Right),
            IdType::Row => matches!(self, Pin::Top | Pin::Bottom),
            _ => false,
        }
    }
}

#[derive(Clone)]
pub struct PinningPlugin {
    pins: ObservableMap<Id, Pin>,
    grid: Rc<RefCell<Option<WeakDataGrid>>>,
}

impl PinningPlugin {
    pub fn new() -> Self {
        Self {
            pins: ObservableMap::new(),
            grid: Rc::new(RefCell::new(None)),
        }
    }

    pub fn pins(&self) -> &ObservableMap<Id, Pin> {
        &self.pins
    }

    fn grid(&self) -> Option<DataGrid> {
        self.grid.borrow().as_ref().and_then(WeakDataGrid::upgrade)
    }

    pub fn pin_column(&self, key: &str, pin: Pin) -> bool {
        let id = create_id(IdSpec::Header(key));
        let known = self.grid().map_or(false, |grid| {
            grid.state().headers.with(|headers| headers.iter().any(|h| h.id == id))
        });
        known && self.set_pin(id, pin)
    }

    pub fn pin_row(&self, key: &str, pin: Pin) -> bool {
        let id = create_id(IdSpec::Row(key));
        let known = self.grid().map_or(false, |grid| {
            grid.state().rows.with(|rows| rows.iter().any(|r| r.id == id))
        });
        known && self.set_pin(id, pin)
    }

    pub fn unpin_column(&self, key: &str) -> bool {
        self.pins.remove_item(&create_id(IdSpec::Header(key))).is_ok()
    }

    pub fn unpin_row(&self, key: &str) -> bool {
        self.pins.remove_item(&create_id(IdSpec::Row(key))).is_ok()
    }

    pub fn column_pin(&self, key: &str) -> Option<Pin> {
        self.pins.get(&create_id(IdSpec::Header(key)))
    }

    pub fn row_pin(&self, key: &str) -> Option<Pin> {
        self.pins.get(&create_id(IdSpec::Row(key)))
    }

    fn set_pin(&self, id: Id, pin: Pin) -> bool {
        let Ok(kind) = get_id_type(&id) else {
            return false;
        };
        if !pin.fits(kind) {
            return false;
        }
        debug!(id = %id, ?pin, "Pinned");
        if self.pins.contains_key(&id) {
            self.pins.replace_item(&id, pin).is_ok()
        } else {
            self.pins.add_item(id, pin).is_ok()
        }
    }

    /// Left-pinned, unpinned, then right-pinned headers, each group in grid order
    pub fn ordered_headers(&self) -> Vec<Rc<Header>> {
        let Some(grid) = self.grid() else {
            return Vec::new();
        };
        let headers = grid.state().headers.to_vec();
        self.partition(headers, |header| &header.id, Pin::Left, Pin::Right)
    }

    /// Top-pinned, unpinned, then bottom-pinned rows, each group in grid order
    pub fn ordered_rows(&self) -> Vec<Rc<Row>> {
        let Some(grid) = self.grid() else {
            return Vec::new();
        };
        let rows = grid.state().rows.to_vec();
        self.partition(rows, |row| &row.id, Pin::Top, Pin::Bottom)
    }

    fn partition<T>(
        &self,
        items: Vec<Rc<T>>,
        id_of: impl Fn(&T) -> &Id,
        head: Pin,
        tail: Pin,
    ) -> Vec<Rc<T>> {
        let (mut first, mut middle, mut last) = (Vec::new(), Vec::new(), Vec::new());
        for item in items {
            let pin = self.pins.get(id_of(&*item));
            match pin {
                Some(pin) if pin == head => first.push(item),
                Some(pin) if pin == tail => last.push(item),
                _ => middle.push(item),
            }
        }
        first.extend(middle);
        first.extend(last);
        first
    }

    /// Drop pins of `kind` whose id is not in `present`
    fn prune(pins: &ObservableMap<Id, Pin>, kind: IdType, present: HashSet<&Id>) {
        let stale: Vec<Id> = pins
            .keys()
            .into_iter()
            .filter(|id| matches!(get_id_type(id), Ok(k) if k == kind))
            .filter(|id| !present.contains(id))
            .collect();
        for id in stale {
            debug!(id = %id, "Dropped pin");
            let _ = pins.remove_item(&id);
        }
    }

    fn pin_command(&self, weak: &WeakDataGrid, id: &str, pin: Option<Pin>) -> Command {
        let (plugin, weak) = (self.clone(), weak.clone());
        Command::sync(id, PINNING_SOURCE, move |payload| {
            let Some(key) = target_column(&weak, payload) else {
                return Ok(());
            };
            match pin {
                Some(pin) => plugin.pin_column(&key, pin),
                None => plugin.unpin_column(&key),
            };
            Ok(())
        })
    }
}

/// Column named by the payload, else the active cell's column
fn target_column(weak: &WeakDataGrid, payload: Option<Value>) -> Option<String> {
    if let Some(Value::String(key)) = payload {
        return Some(key);
    }
    let grid = weak.upgrade()?;
    let active = grid.selection().active_cell()?;
    grid.helper()
        .column(active.coordinates.column_index)
        .map(|column| column.key.clone())
}

impl Default for PinningPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for PinningPlugin {
    fn key(&self) -> &str {
        PINNING_KEY
    }

    fn handle_activate(&self, grid: &DataGrid, unsubscribes: &mut Unsubscribes) -> GridResult<()> {
        let weak = grid.downgrade();
        *self.grid.borrow_mut() = Some(weak.clone());

        let pins = self.pins.clone();
        unsubscribes.push_subscription(grid.state().headers.watch(move |headers| {
            Self::prune(&pins, IdType::Header, headers.iter().map(|h| &h.id).collect());
        }));
        let pins = self.pins.clone();
        unsubscribes.push_subscription(grid.state().rows.watch(move |rows| {
            Self::prune(&pins, IdType::Row, rows.iter().map(|r| &r.id).collect());
        }));

        grid.commands().register(vec![
            self.pin_command(&weak, "pin-column-left", Some(Pin::Left)),
            self.pin_command(&weak, "pin-column-right", Some(Pin::Right)),
            self.pin_command(&weak, "unpin-column", None),
        ])?;

        let slot = Rc::clone(&self.grid);
        unsubscribes.push(move || {
            if let Some(grid) = weak.upgrade() {
                grid.commands().unregister_all(PINNING_SOURCE);
            }
            slot.borrow_mut().take();
        });
        Ok(())
    }
}

impl std::fmt::Debug for PinningPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PinningPlugin")
            .field("pins", &self.pins.entries())
            .finish()
    }
}
