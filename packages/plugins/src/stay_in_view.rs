//! Keeps the focus cell on screen.
//!
//! After every keyboard-driven selection command the plugin publishes the
//! cell a renderer should scroll into view: the active cell for navigation
//! and jumps, the moving end of the last range for expansion.

use datagrid_core::{CellId, DataGrid, GridEvent, GridResult, Observable, Plugin, Unsubscribes};
use std::rc::Rc;
use tracing::trace;

pub const STAY_IN_VIEW_KEY: &str = "stay-in-view";

const FOLLOW_ACTIVE: &[&str] = &[
    "navigate-up",
    "navigate-down",
    "navigate-left",
    "navigate-right",
    "jump-left",
    "jump-right",
    "jump-top",
    "jump-bottom",
];

const FOLLOW_RANGE_END: &[&str] = &["expand-left", "expand-right", "expand-upper", "expand-lower"];

#[derive(Clone)]
pub struct StayInViewPlugin {
    target: Observable<Option<CellId>>,
}

impl StayInViewPlugin {
    pub fn new() -> Self {
        Self {
            // Same cell twice still means "scroll there"
            target: Observable::without_equality(None),
        }
    }

    /// Cell to scroll into view
    pub fn target(&self) -> &Observable<Option<CellId>> {
        &self.target
    }
}

impl Default for StayInViewPlugin {
    fn default() -> Self {
        Self::new()
    }
}

fn scroll_target(grid: &DataGrid, command: &str) -> Option<CellId> {
    if FOLLOW_ACTIVE.contains(&command) {
        grid.selection().active_cell().map(|cell| cell.id)
    } else if FOLLOW_RANGE_END.contains(&command) {
        grid.selection().last_range().map(|range| range.end)
    } else {
        None
    }
}

impl Plugin for StayInViewPlugin {
    fn key(&self) -> &str {
        STAY_IN_VIEW_KEY
    }

    fn handle_activate(&self, grid: &DataGrid, unsubscribes: &mut Unsubscribes) -> GridResult<()> {
        let weak = grid.downgrade();
        let target = self.target.clone();

        unsubscribes.push_subscription(grid.events().on(move |event| {
            let GridEvent::CommandExecuted { id } = event else {
                return;
            };
            let Some(grid) = weak.upgrade() else {
                return;
            };
            if let Some(cell) = scroll_target(&grid, id) {
                trace!(command = %id, cell = %cell, "Scroll target");
                target.set(Some(cell));
            }
        }));

        let target = self.target.clone();
        unsubscribes.push(move || {
            target.set(None);
        });
        Ok(())
    }
}

impl std::fmt::Debug for StayInViewPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StayInViewPlugin")
            .field("target", &self.target.get())
            .finish()
    }
}
