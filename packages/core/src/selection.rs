//! # Selection controller
//!
//! Owns the active cell, the ordered list of selected ranges, the editing
//! mode and the drag state machine. All writes to those observables go
//! through here.
//!
//! ## Drag lifecycle
//!
//! ```text
//! pointer_down ──► Start ──(settle_drag / promote_drag)──► Dragging
//!                    │                                        │
//!                    └──────────────── pointer_up ◄───────────┘
//!                                          │
//!                                  finalize_ranges
//! ```
//!
//! While `Dragging`, `pointer_enter` stretches the last range. On release
//! the range list is normalized so that overlapping drags end up as a set
//! of disjoint rectangles.

use crate::errors::GridResult;
use crate::helper::DataGridHelper;
use crate::ids::{extract_cell_id, CellCoordinates, CellId};
use crate::range::{
    break_range_to_smaller_part, is_range_inside_others, try_combine_ranges,
    try_remove_duplicates, CellRange, SelectedRange,
};
use crate::state::{ActiveCell, DraggingStatus, EditingMode, GridState};
use std::rc::Rc;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanSelectionOptions {
    pub maintain_active_cell: bool,
    pub maintain_editing: bool,
}

/// Modifier keys held during a pointer press
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PointerModifiers {
    /// Extend the last range
    pub shift: bool,
    /// Start an additional range
    pub ctrl: bool,
}

#[derive(Debug, Clone)]
pub struct SelectionController {
    state: Rc<GridState>,
    helper: DataGridHelper,
}

fn offset(index: usize, delta: isize, last: usize) -> usize {
    index.saturating_add_signed(delta).min(last)
}

impl SelectionController {
    pub fn new(state: Rc<GridState>, helper: DataGridHelper) -> Self {
        Self { state, helper }
    }

    pub fn active_cell(&self) -> Option<ActiveCell> {
        self.state.active_cell.get()
    }

    pub fn last_range(&self) -> Option<SelectedRange> {
        self.state.selected_ranges.last()
    }

    /// Move the active cell by a relative offset, clamped to the grid.
    ///
    /// Collapses any multi-range selection into a single cell at the
    /// destination. Returns `false` without an active cell or when the
    /// destination is not selectable.
    pub fn navigate(&self, delta_columns: isize, delta_rows: isize) -> bool {
        let (Some(active), Some(last)) = (self.active_cell(), self.helper.last_cell()) else {
            return false;
        };

        let from = active.coordinates;
        let to = CellCoordinates::new(
            offset(from.row_index, delta_rows, last.row_index),
            offset(from.column_index, delta_columns, last.column_index),
        );

        if !self.helper.is_selectable(to) {
            return false;
        }

        self.clean_selection(CleanSelectionOptions::default());
        self.start_selection(to);
        true
    }

    /// Focus `cell` and open a new 1×1 range there
    pub fn start_selection(&self, cell: CellCoordinates) {
        self.state.active_cell.set(Some(ActiveCell::new(cell)));
        self.state.selected_ranges.push(SelectedRange::single(cell));
    }

    /// Select `[start, end]`, replacing all ranges when `clear` is set and
    /// appending otherwise. The active cell moves to `start`.
    pub fn select_range(&self, start: CellCoordinates, end: CellCoordinates, clear: bool) -> bool {
        if !self.helper.is_selectable(start) || !self.helper.is_selectable(end) {
            return false;
        }

        let range = SelectedRange::new(CellRange::new(start, end));
        if clear {
            self.state.selected_ranges.set(vec![range]);
        } else {
            self.state.selected_ranges.push(range);
        }
        self.state.active_cell.set(Some(ActiveCell::new(start)));
        true
    }

    pub fn select_range_by_id(
        &self,
        start: &CellId,
        end: &CellId,
        clear: bool,
    ) -> GridResult<bool> {
        Ok(self.select_range(extract_cell_id(start)?, extract_cell_id(end)?, clear))
    }

    /// Move the end of the most recent range, keeping its start
    pub fn update_last_selected_range(&self, end: CellCoordinates) -> bool {
        if !self.helper.is_selectable(end) {
            return false;
        }

        self.state.selected_ranges.modify(|ranges| {
            if let Some(last) = ranges.last_mut() {
                if last.range.end != end {
                    *last = SelectedRange::new(CellRange::new(last.range.start, end));
                }
            }
        })
    }

    pub fn update_last_selected_range_by_id(&self, end: &CellId) -> GridResult<bool> {
        Ok(self.update_last_selected_range(extract_cell_id(end)?))
    }

    fn expand(&self, delta_columns: isize, delta_rows: isize) -> bool {
        let (Some(last_range), Some(last)) = (self.last_range(), self.helper.last_cell()) else {
            return false;
        };

        let end = last_range.range.end;
        self.update_last_selected_range(CellCoordinates::new(
            offset(end.row_index, delta_rows, last.row_index),
            offset(end.column_index, delta_columns, last.column_index),
        ))
    }

    pub fn expand_left(&self) -> bool {
        self.expand(-1, 0)
    }

    pub fn expand_right(&self) -> bool {
        self.expand(1, 0)
    }

    pub fn expand_upper(&self) -> bool {
        self.expand(0, -1)
    }

    pub fn expand_lower(&self) -> bool {
        self.expand(0, 1)
    }

    fn span(count: usize) -> isize {
        isize::try_from(count).unwrap_or(isize::MAX)
    }

    pub fn jump_left(&self) -> bool {
        self.navigate(-Self::span(self.helper.column_count()), 0)
    }

    pub fn jump_right(&self) -> bool {
        self.navigate(Self::span(self.helper.column_count()), 0)
    }

    pub fn jump_top(&self) -> bool {
        self.navigate(0, -Self::span(self.helper.row_count()))
    }

    pub fn jump_bottom(&self) -> bool {
        self.navigate(0, Self::span(self.helper.row_count()))
    }

    /// One range over the whole grid. The active cell is kept, or set to
    /// the origin when nothing was focused.
    pub fn select_all(&self) -> bool {
        let Some(last) = self.helper.last_cell() else {
            return false;
        };

        let origin = CellCoordinates::default();
        if self.active_cell().is_none() {
            self.state.active_cell.set(Some(ActiveCell::new(origin)));
        }
        self.state
            .selected_ranges
            .set(vec![SelectedRange::new(CellRange::new(origin, last))]);
        true
    }

    pub fn clean_selection(&self, options: CleanSelectionOptions) {
        self.state.selected_ranges.clear();
        if !options.maintain_active_cell {
            self.state.active_cell.set(None);
        }
        if !options.maintain_editing {
            self.state.editing.set(EditingMode::Off);
        }
    }

    /// Begin editing the active cell. Disabled cells cannot be edited.
    pub fn start_editing(&self, mode: EditingMode) -> bool {
        let Some(active) = self.active_cell() else {
            return false;
        };
        if self.helper.is_cell_disabled(active.coordinates) {
            return false;
        }
        self.state.editing.set(mode)
    }

    pub fn stop_editing(&self) -> bool {
        self.state.editing.set(EditingMode::Off)
    }

    /// Press on a cell. Shift extends the last range, ctrl adds a range,
    /// a plain press starts over. Arms the drag state machine.
    pub fn pointer_down(&self, cell: CellCoordinates, modifiers: PointerModifiers) -> bool {
        if !self.helper.is_selectable(cell) {
            return false;
        }

        if modifiers.shift && self.last_range().is_some() {
            self.update_last_selected_range(cell);
        } else if modifiers.ctrl {
            self.state.editing.set(EditingMode::Off);
            self.start_selection(cell);
        } else {
            self.clean_selection(CleanSelectionOptions::default());
            self.start_selection(cell);
        }

        self.state.dragging.set(DraggingStatus::Start);
        true
    }

    /// `Start → Dragging`; anything else is left alone
    pub fn promote_drag(&self) -> bool {
        if self.state.dragging.get() != DraggingStatus::Start {
            return false;
        }
        self.state.dragging.set(DraggingStatus::Dragging)
    }

    /// Wait out the press delay, then promote a still-pending drag
    pub async fn settle_drag(&self) -> bool {
        tokio::time::sleep(self.state.drag_delay()).await;
        self.promote_drag()
    }

    pub fn pointer_enter(&self, cell: CellCoordinates) -> bool {
        if self.state.dragging.get() != DraggingStatus::Dragging {
            return false;
        }
        self.update_last_selected_range(cell)
    }

    /// End a drag and normalize the range list
    pub fn pointer_up(&self) -> bool {
        if !self.state.dragging.get().is_active() {
            return false;
        }
        self.state.dragging.set(DraggingStatus::Idle);
        if self.state.selected_ranges.len() > 1 {
            self.finalize_ranges();
        }
        true
    }

    /// Resolve overlaps left behind by the last drag.
    ///
    /// A last range lying inside earlier ranges is cut out of them and
    /// dropped. The list is then merged to a fixed point and deduplicated.
    pub fn finalize_ranges(&self) {
        let mut ranges: Vec<CellRange> = self
            .state
            .selected_ranges
            .with(|ranges| ranges.iter().map(|r| r.range).collect());

        let Some(last) = ranges.pop() else {
            return;
        };

        let containing = is_range_inside_others(&last, &ranges);
        if containing.is_empty() {
            ranges.push(last);
        } else {
            for index in containing.into_iter().rev() {
                let parts = break_range_to_smaller_part(&ranges[index], &last);
                ranges.splice(index..=index, parts);
            }
        }

        let before = ranges.len();
        let ranges = try_remove_duplicates(&try_combine_ranges(&ranges));
        debug!(before, after = ranges.len(), "Finalized selection");

        self.state
            .selected_ranges
            .set(ranges.into_iter().map(SelectedRange::new).collect());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::{Column, RowData, SharedRow};
    use crate::options::DataGridOptions;

    fn controller(rows: usize, columns: usize) -> (SelectionController, Rc<GridState>) {
        let data: Vec<SharedRow> = (0..rows).map(|_| Rc::new(RowData::new())).collect();
        let columns = (0..columns).map(|i| Column::new(format!("c{}", i))).collect();
        let state = Rc::new(GridState::new(&DataGridOptions::new(data, columns)));
        let helper = DataGridHelper::new(Rc::clone(&state));
        (SelectionController::new(Rc::clone(&state), helper), state)
    }

    fn at(row: usize, column: usize) -> CellCoordinates {
        CellCoordinates::new(row, column)
    }

    fn bounds(state: &GridState) -> Vec<((usize, usize), (usize, usize))> {
        state.selected_ranges.with(|ranges| {
            ranges
                .iter()
                .map(|r| {
                    let b = r.boundary();
                    (
                        (b.min.row_index, b.min.column_index),
                        (b.max.row_index, b.max.column_index),
                    )
                })
                .collect()
        })
    }

    #[test]
    fn test_navigate_clamps_at_origin() {
        let (selection, state) = controller(5, 5);
        selection.start_selection(at(0, 0));
        selection.navigate(0, -1);
        assert_eq!(state.active_cell.get().map(|a| a.coordinates), Some(at(0, 0)));
        selection.navigate(-3, 0);
        assert_eq!(state.active_cell.get().map(|a| a.coordinates), Some(at(0, 0)));
    }

    #[test]
    fn test_navigate_without_active_cell_is_noop() {
        let (selection, state) = controller(3, 3);
        assert!(!selection.navigate(1, 0));
        assert!(state.active_cell.get().is_none());
    }

    #[test]
    fn test_navigate_collapses_ranges() {
        let (selection, state) = controller(5, 5);
        selection.select_range(at(0, 0), at(2, 2), true);
        selection.select_range(at(4, 4), at(4, 4), false);
        assert!(selection.navigate(1, 1));
        assert_eq!(bounds(&state), vec![((1, 1), (1, 1))]);
    }

    #[test]
    fn test_navigate_skips_unselectable_destination() {
        let data: Vec<SharedRow> = (0..2).map(|_| Rc::new(RowData::new())).collect();
        let columns = vec![Column::new("a"), Column::new("b").selectable(false)];
        let state = Rc::new(GridState::new(&DataGridOptions::new(data, columns)));
        let helper = DataGridHelper::new(Rc::clone(&state));
        let selection = SelectionController::new(Rc::clone(&state), helper);

        selection.start_selection(at(0, 0));
        assert!(!selection.navigate(1, 0));
        assert_eq!(state.active_cell.get().map(|a| a.coordinates), Some(at(0, 0)));
    }

    /// Column 1 of a 3x3 grid cannot be selected
    fn controller_with_locked_column() -> (SelectionController, Rc<GridState>) {
        let data: Vec<SharedRow> = (0..3).map(|_| Rc::new(RowData::new())).collect();
        let columns = vec![Column::new("a"), Column::new("b").selectable(false), Column::new("c")];
        let state = Rc::new(GridState::new(&DataGridOptions::new(data, columns)));
        let helper = DataGridHelper::new(Rc::clone(&state));
        (SelectionController::new(Rc::clone(&state), helper), state)
    }

    #[test]
    fn test_select_range_rejects_unselectable_endpoints() {
        let (selection, state) = controller_with_locked_column();
        assert!(selection.select_range(at(0, 0), at(2, 0), true));

        assert!(!selection.select_range(at(0, 1), at(2, 2), true));
        assert!(!selection.select_range(at(0, 2), at(1, 1), false));
        assert_eq!(bounds(&state), vec![((0, 0), (2, 0))]);
        assert_eq!(state.active_cell.get().map(|a| a.coordinates), Some(at(0, 0)));

        // Only the corners are checked
        assert!(selection.select_range(at(0, 0), at(2, 2), true));
        assert_eq!(bounds(&state), vec![((0, 0), (2, 2))]);
    }

    #[test]
    fn test_update_last_range_rejects_unselectable_end() {
        let (selection, state) = controller_with_locked_column();
        selection.start_selection(at(0, 0));

        assert!(!selection.update_last_selected_range(at(2, 1)));
        assert_eq!(bounds(&state), vec![((0, 0), (0, 0))]);
        assert_eq!(state.active_cell.get().map(|a| a.coordinates), Some(at(0, 0)));

        assert!(selection.update_last_selected_range(at(2, 2)));
        assert_eq!(bounds(&state), vec![((0, 0), (2, 2))]);
    }

    #[test]
    fn test_pointer_down_on_unselectable_cell_is_ignored() {
        let (selection, state) = controller_with_locked_column();
        selection.start_selection(at(1, 2));

        assert!(!selection.pointer_down(at(0, 1), PointerModifiers::default()));
        assert_eq!(bounds(&state), vec![((1, 2), (1, 2))]);
        assert_eq!(state.dragging.get(), DraggingStatus::Idle);
    }

    #[test]
    fn test_expand_moves_end_only() {
        let (selection, state) = controller(5, 5);
        selection.start_selection(at(2, 2));
        selection.expand_lower();
        selection.expand_lower();
        selection.expand_left();
        assert_eq!(bounds(&state), vec![((2, 1), (4, 2))]);
        selection.expand_lower();
        assert_eq!(bounds(&state), vec![((2, 1), (4, 2))]);
        assert_eq!(state.active_cell.get().map(|a| a.coordinates), Some(at(2, 2)));
    }

    #[test]
    fn test_jump_snaps_to_edges() {
        let (selection, state) = controller(4, 6);
        selection.start_selection(at(1, 2));
        selection.jump_right();
        selection.jump_bottom();
        assert_eq!(state.active_cell.get().map(|a| a.coordinates), Some(at(3, 5)));
        selection.jump_top();
        selection.jump_left();
        assert_eq!(state.active_cell.get().map(|a| a.coordinates), Some(at(0, 0)));
    }

    #[test]
    fn test_select_all_and_clean() {
        let (selection, state) = controller(3, 2);
        assert!(selection.select_all());
        assert_eq!(bounds(&state), vec![((0, 0), (2, 1))]);

        state.editing.set(EditingMode::Inline);
        selection.clean_selection(CleanSelectionOptions {
            maintain_active_cell: true,
            maintain_editing: true,
        });
        assert!(state.selected_ranges.is_empty());
        assert!(state.active_cell.get().is_some());
        assert_eq!(state.editing.get(), EditingMode::Inline);

        selection.clean_selection(CleanSelectionOptions::default());
        assert!(state.active_cell.get().is_none());
        assert_eq!(state.editing.get(), EditingMode::Off);
    }

    #[test]
    fn test_drag_extends_only_while_dragging() {
        let (selection, state) = controller(5, 5);
        selection.pointer_down(at(0, 0), PointerModifiers::default());
        assert_eq!(state.dragging.get(), DraggingStatus::Start);
        assert!(!selection.pointer_enter(at(2, 2)));

        selection.promote_drag();
        assert!(selection.pointer_enter(at(2, 2)));
        assert!(selection.pointer_up());
        assert_eq!(state.dragging.get(), DraggingStatus::Idle);
        assert_eq!(bounds(&state), vec![((0, 0), (2, 2))]);
    }

    #[test]
    fn test_ctrl_drag_inside_range_cuts_it_out() {
        let (selection, state) = controller(5, 5);
        selection.select_range(at(0, 0), at(2, 2), true);
        selection.pointer_down(at(1, 1), PointerModifiers { shift: false, ctrl: true });
        selection.pointer_up();

        let cells: usize = state
            .selected_ranges
            .with(|ranges| ranges.iter().map(|r| r.cells.len()).sum());
        assert_eq!(cells, 8);
        assert!(state
            .selected_ranges
            .with(|ranges| ranges.iter().all(|r| !r.range.contains(at(1, 1)))));
    }

    #[test]
    fn test_adjacent_drags_merge() {
        let (selection, state) = controller(5, 5);
        selection.select_range(at(0, 0), at(1, 1), true);
        selection.pointer_down(at(2, 0), PointerModifiers { shift: false, ctrl: true });
        selection.promote_drag();
        selection.pointer_enter(at(2, 1));
        selection.pointer_up();
        assert_eq!(bounds(&state), vec![((0, 0), (2, 1))]);
    }

    #[test]
    fn test_editing_requires_active_cell() {
        let (selection, state) = controller(2, 2);
        assert!(!selection.start_editing(EditingMode::Inline));
        selection.start_selection(at(0, 0));
        assert!(selection.start_editing(EditingMode::Floating));
        assert_eq!(state.editing.get(), EditingMode::Floating);
        assert!(selection.stop_editing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_settle_drag_promotes_after_delay() {
        let (selection, state) = controller(2, 2);
        selection.pointer_down(at(0, 0), PointerModifiers::default());
        assert!(selection.settle_drag().await);
        assert_eq!(state.dragging.get(), DraggingStatus::Dragging);
    }
}
