//! # Fill handle
//!
//! Dragging the corner of a selection repeats its values up or down.
//!
//! ```text
//! start_fill()        source = last selected range
//! extend_fill(cell)   target = source stretched to cell's row
//! finish_fill()       tile source over target, select target
//! ```
//!
//! The source block repeats with its own period, anchored on the source
//! rows, so filling upward ends on the source's first row pattern just as
//! filling downward starts with it.

use datagrid_core::{
    CellCoordinates, CellRange, DataGrid, GridResult, Observable, Plugin, Unsubscribes,
    WeakDataGrid,
};
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

pub const FILL_HANDLE_KEY: &str = "fill-handle";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillState {
    pub source: CellRange,
    pub target: CellRange,
}

impl FillState {
    /// Rows of `target` outside `source`
    pub fn fill_rows(&self) -> Option<(usize, usize)> {
        let s = self.source.boundary();
        let t = self.target.boundary();
        if t.max.row_index > s.max.row_index {
            Some((s.max.row_index + 1, t.max.row_index))
        } else if t.min.row_index < s.min.row_index {
            Some((t.min.row_index, s.min.row_index - 1))
        } else {
            None
        }
    }
}

#[derive(Clone)]
pub struct FillHandlePlugin {
    fill: Observable<Option<FillState>>,
    grid: Rc<RefCell<Option<WeakDataGrid>>>,
}

impl FillHandlePlugin {
    pub fn new() -> Self {
        Self {
            fill: Observable::new(None),
            grid: Rc::new(RefCell::new(None)),
        }
    }

    /// Fill in progress, for rendering the drag outline
    pub fn state(&self) -> &Observable<Option<FillState>> {
        &self.fill
    }

    fn grid(&self) -> Option<DataGrid> {
        self.grid.borrow().as_ref().and_then(WeakDataGrid::upgrade)
    }

    /// Grab the handle of the last selected range
    pub fn start_fill(&self) -> bool {
        let Some(grid) = self.grid() else {
            return false;
        };
        let Some(range) = grid.selection().last_range() else {
            return false;
        };
        let source = range.boundary().to_range();
        self.fill.set(Some(FillState {
            source,
            target: source,
        }));
        true
    }

    /// Stretch the fill to `cell`'s row. Columns always stay those of the
    /// source.
    pub fn extend_fill(&self, cell: CellCoordinates) -> bool {
        let Some(FillState { source, .. }) = self.fill.get() else {
            return false;
        };
        let Some(grid) = self.grid() else {
            return false;
        };
        if cell.row_index >= grid.helper().row_count() {
            return false;
        }

        let s = source.boundary();
        let target = if cell.row_index > s.max.row_index {
            CellRange::new(s.min, CellCoordinates::new(cell.row_index, s.max.column_index))
        } else if cell.row_index < s.min.row_index {
            CellRange::new(CellCoordinates::new(cell.row_index, s.min.column_index), s.max)
        } else {
            source
        };
        self.fill.set(Some(FillState { source, target }))
    }

    /// Write the fill. Returns `false` when there was nothing to fill or
    /// the host did not accept the change.
    pub async fn finish_fill(&self) -> bool {
        let Some(fill) = self.fill.get() else {
            return false;
        };
        self.fill.set(None);

        let (Some(grid), Some((from, to))) = (self.grid(), fill.fill_rows()) else {
            return false;
        };

        let s = fill.source.boundary();
        let period = s.max.row_index - s.min.row_index + 1;
        let source_block: Vec<Vec<Value>> = (s.min.row_index..=s.max.row_index)
            .map(|row| {
                (s.min.column_index..=s.max.column_index)
                    .map(|column| {
                        grid.helper()
                            .get_cell_value(CellCoordinates::new(row, column))
                            .unwrap_or(Value::Null)
                    })
                    .collect()
            })
            .collect();

        let block: Vec<Vec<Value>> = (from..=to)
            .map(|row| {
                let phase = (row as isize - s.min.row_index as isize).rem_euclid(period as isize);
                source_block[phase as usize].clone()
            })
            .collect();

        let destination = CellRange::new(
            CellCoordinates::new(from, s.min.column_index),
            CellCoordinates::new(to, s.max.column_index),
        );
        debug!(from, to, period, "Filling rows");
        if !grid.modifier().set_range_data(&destination, block).await {
            return false;
        }

        let t = fill.target.boundary();
        grid.selection().select_range(t.min, t.max, true);
        true
    }

    pub fn cancel_fill(&self) {
        self.fill.set(None);
    }
}

impl Default for FillHandlePlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for FillHandlePlugin {
    fn key(&self) -> &str {
        FILL_HANDLE_KEY
    }

    fn handle_activate(&self, grid: &DataGrid, unsubscribes: &mut Unsubscribes) -> GridResult<()> {
        *self.grid.borrow_mut() = Some(grid.downgrade());

        // A fill is anchored on the rows it started from
        let fill = self.fill.clone();
        unsubscribes.push_subscription(grid.state().data.watch(move |_| {
            fill.set(None);
        }));

        let (fill, slot) = (self.fill.clone(), Rc::clone(&self.grid));
        unsubscribes.push(move || {
            fill.set(None);
            slot.borrow_mut().take();
        });
        Ok(())
    }
}

impl std::fmt::Debug for FillHandlePlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FillHandlePlugin")
            .field("fill", &self.fill.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_rows() {
        let source = CellRange::from_bounds((2, 0), (3, 1));
        let below = FillState {
            source,
            target: CellRange::from_bounds((2, 0), (6, 1)),
        };
        assert_eq!(below.fill_rows(), Some((4, 6)));

        let above = FillState {
            source,
            target: CellRange::from_bounds((0, 0), (3, 1)),
        };
        assert_eq!(above.fill_rows(), Some((0, 1)));

        let none = FillState { source, target: source };
        assert_eq!(none.fill_rows(), None);
    }

    #[test]
    fn test_inactive_plugin_does_nothing() {
        let plugin = FillHandlePlugin::new();
        assert!(!plugin.start_fill());
        assert!(!plugin.extend_fill(CellCoordinates::new(3, 0)));
    }
}
