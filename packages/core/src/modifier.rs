//! # Data modifier
//!
//! Row and cell mutations. The host owns the row array: every mutation
//! builds a new `Vec<SharedRow>` and hands it to `on_change` together with
//! the [`RowOperation`]s describing it. Rows that did not change keep their
//! `Rc`, so hosts and [`create_rows`](crate::rows::create_rows) can skip
//! them.
//!
//! Policy no-ops (locked rows, no `on_change`, empty input) return `false`.
//!
//! ## Paste
//!
//! [`DataModifier::set_range_data`] writes a block of values into a range:
//!
//! 1. Each destination column runs its `pre_paste_values` hook over its
//!    column of the block. Hooks run concurrently.
//! 2. A single source row is broadcast to every row of the range.
//! 3. Several source rows are written from the range's top row down,
//!    appending new rows when the block runs past the end (or truncating
//!    the block when rows are locked).
//! 4. Each cell goes through `paste_value`, one cell at a time, and
//!    disabled cells are skipped.

use crate::column::{Column, PasteValueArgs, RowData, SharedRow};
use crate::history::DataGridHistory;
use crate::ids::CellCoordinates;
use crate::operations::RowOperation;
use crate::range::CellRange;
use crate::selection::{CleanSelectionOptions, SelectionController};
use crate::state::{EditingMode, GridState};
use futures::future::join_all;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct DataModifier {
    state: Rc<GridState>,
    selection: SelectionController,
    history: DataGridHistory,
}

impl DataModifier {
    pub fn new(
        state: Rc<GridState>,
        selection: SelectionController,
        history: DataGridHistory,
    ) -> Self {
        Self {
            state,
            selection,
            history,
        }
    }

    /// Journal the change and deliver it to the host
    fn commit(&self, rows: Vec<SharedRow>, operations: Vec<RowOperation>) -> bool {
        let Some(on_change) = self.state.on_change() else {
            warn!(operations = operations.len(), "Mutation dropped, no on_change handler");
            return false;
        };

        let before = self.state.data.get();
        self.history.record(&operations, &before, &rows);
        on_change(rows, operations);
        true
    }

    fn locked(&self, action: &'static str) -> bool {
        let locked = self.state.lock_rows();
        if locked {
            debug!(action, "Rows are locked");
        }
        locked
    }

    /// Replace one row
    pub fn update_data(&self, row_index: usize, row: RowData) -> bool {
        let mut rows = self.state.data.get().to_vec();
        let Some(slot) = rows.get_mut(row_index) else {
            return false;
        };
        *slot = Rc::new(row);
        self.commit(rows, vec![RowOperation::update(row_index, row_index + 1)])
    }

    /// Insert `count` fresh rows right after `row_index`
    pub fn insert_row_after(&self, row_index: usize, count: usize) -> bool {
        if self.locked("insert") || count == 0 {
            return false;
        }
        self.state.editing.set(EditingMode::Off);

        let settings = self.state.settings();
        let mut rows = self.state.data.get().to_vec();
        let at = (row_index + 1).min(rows.len());
        let created: Vec<SharedRow> = (0..count).map(|_| Rc::new(settings.new_row())).collect();
        rows.splice(at..at, created);

        debug!(row = at, count, "Inserted rows");
        self.commit(rows, vec![RowOperation::create(at, at + count)])
    }

    /// Clone rows `[row_min, row_max]` and insert the copies after `row_max`
    pub fn duplicate_rows(&self, row_min: usize, row_max: usize) -> bool {
        if self.locked("duplicate") {
            return false;
        }

        let settings = self.state.settings();
        let mut rows = self.state.data.get().to_vec();
        let (first, last) = (row_min.min(row_max), row_min.max(row_max));
        if last >= rows.len() {
            return false;
        }

        let copies: Vec<SharedRow> = (first..=last)
            .map(|index| {
                let source = &rows[index];
                Rc::new(match &settings.duplicate_row {
                    Some(f) => f(source, index),
                    None => RowData::clone(source),
                })
            })
            .collect();

        let at = last + 1;
        let count = copies.len();
        rows.splice(at..at, copies);

        debug!(row = at, count, "Duplicated rows");
        self.commit(rows, vec![RowOperation::create(at, at + count)])
    }

    /// Remove rows `[from_row, to_row]`
    pub fn delete_rows(&self, from_row: usize, to_row: usize) -> bool {
        if self.locked("delete") {
            return false;
        }

        let mut rows = self.state.data.get().to_vec();
        let first = from_row.min(to_row);
        if first >= rows.len() {
            return false;
        }
        let last = from_row.max(to_row).min(rows.len() - 1);
        rows.drain(first..=last);

        debug!(row = first, count = last - first + 1, "Deleted rows");
        self.commit(rows, vec![RowOperation::delete(first, last + 1)])
    }

    /// Delete key behavior over the current selection.
    ///
    /// With smart delete on, unlocked rows and every enabled cell of the
    /// selection already empty, the covered rows are removed. Otherwise
    /// enabled cells are cleared, one `UPDATE` per range.
    pub fn delete_selection(&self) -> bool {
        let ranges: Vec<CellRange> = self
            .state
            .selected_ranges
            .with(|ranges| ranges.iter().map(|r| r.range).collect());
        if ranges.is_empty() {
            return false;
        }

        let data = self.state.data.get();
        let columns = self.state.columns.get();

        // Enabled cells of every range, clipped to the grid
        let mut cells: Vec<(CellCoordinates, Rc<Column>)> = Vec::new();
        for range in &ranges {
            for cell in range.coordinates() {
                let (Some(row), Some(column)) =
                    (data.get(cell.row_index), columns.get(cell.column_index))
                else {
                    continue;
                };
                if !column.disabled.resolve(row, cell.row_index) {
                    cells.push((cell, Rc::clone(column)));
                }
            }
        }
        if cells.is_empty() {
            return false;
        }

        let all_empty = cells
            .iter()
            .all(|(cell, column)| column.is_empty_value(&data[cell.row_index], cell.row_index));

        if all_empty && self.state.smart_delete_enabled() && !self.state.lock_rows() {
            let covered: BTreeSet<usize> = ranges
                .iter()
                .flat_map(|range| {
                    let b = range.boundary();
                    b.min.row_index..=b.max.row_index
                })
                .filter(|&row| row < data.len())
                .collect();
            return self.delete_row_set(&covered);
        }

        let mut touched: BTreeMap<usize, RowData> = BTreeMap::new();
        for (cell, column) in &cells {
            let original = &data[cell.row_index];
            let row = touched
                .entry(cell.row_index)
                .or_insert_with(|| RowData::clone(original));
            match column.deleted_value(original, cell.row_index) {
                Some(value) => {
                    row.insert(column.key.clone(), value);
                }
                None => {
                    row.remove(&column.key);
                }
            }
        }

        let mut rows = data.to_vec();
        for (index, row) in touched {
            rows[index] = Rc::new(row);
        }

        let operations = ranges
            .iter()
            .filter_map(|range| {
                let b = range.boundary();
                if b.min.row_index >= data.len() {
                    return None;
                }
                let end = (b.max.row_index + 1).min(data.len());
                Some(RowOperation::update(b.min.row_index, end))
            })
            .collect();

        self.commit(rows, operations)
    }

    /// Remove a set of rows, one `DELETE` per contiguous block, bottom-up
    fn delete_row_set(&self, rows_to_delete: &BTreeSet<usize>) -> bool {
        let mut blocks: Vec<(usize, usize)> = Vec::new();
        for &row in rows_to_delete {
            match blocks.last_mut() {
                Some((_, end)) if *end == row => *end = row + 1,
                _ => blocks.push((row, row + 1)),
            }
        }

        let rows: Vec<SharedRow> = self.state.data.with(|data| {
            data.iter()
                .enumerate()
                .filter(|(index, _)| !rows_to_delete.contains(index))
                .map(|(_, row)| Rc::clone(row))
                .collect()
        });
        let operations = blocks
            .iter()
            .rev()
            .map(|&(from, to)| RowOperation::delete(from, to))
            .collect();

        debug!(rows = rows_to_delete.len(), blocks = blocks.len(), "Smart delete");
        self.selection.clean_selection(CleanSelectionOptions::default());
        self.commit(rows, operations)
    }

    /// Paste `range_data` (row-major) into `range`
    pub async fn set_range_data(&self, range: &CellRange, range_data: Vec<Vec<Value>>) -> bool {
        let width = range_data.iter().map(Vec::len).max().unwrap_or(0);
        if width == 0 {
            return false;
        }

        let data = self.state.data.get();
        let columns = self.state.columns.get();
        let b = range.boundary();
        let (top, left) = (b.min.row_index, b.min.column_index);
        if top >= data.len() || left >= columns.len() {
            return false;
        }

        let targets: Vec<Rc<Column>> = columns[left..(left + width).min(columns.len())].to_vec();

        // Column-major pre-paste transforms, all columns at once
        let pending = targets.iter().enumerate().map(|(offset, column)| {
            let values = range_data
                .iter()
                .map(|row| row.get(offset).cloned().unwrap_or(Value::Null))
                .collect();
            column.run_pre_paste(values)
        });
        let transformed: Vec<Vec<Value>> = join_all(pending).await;

        let single = range_data.len() == 1;
        let mut rows = data.to_vec();
        let (row_span, created) = if single {
            (top..(b.max.row_index + 1).min(data.len()), 0)
        } else {
            let wanted = top + range_data.len();
            if wanted <= data.len() {
                (top..wanted, 0)
            } else if self.state.lock_rows() {
                (top..data.len(), 0)
            } else {
                let settings = self.state.settings();
                let extra = wanted - data.len();
                rows.extend((0..extra).map(|_| Rc::new(settings.new_row())));
                (top..wanted, extra)
            }
        };

        for row_index in row_span.clone() {
            let source_index = if single { 0 } else { row_index - top };
            let original = Rc::clone(&rows[row_index]);
            let mut row = RowData::clone(&original);
            let mut changed = false;

            for (offset, column) in targets.iter().enumerate() {
                if column.disabled.resolve(&original, row_index) {
                    continue;
                }
                let value = transformed
                    .get(offset)
                    .and_then(|values| values.get(source_index))
                    .cloned()
                    .unwrap_or(Value::Null);
                let value = column
                    .run_paste_value(PasteValueArgs {
                        value,
                        row_data: Rc::clone(&original),
                        row_index,
                    })
                    .await;
                row.insert(column.key.clone(), value);
                changed = true;
            }

            if changed {
                rows[row_index] = Rc::new(row);
            }
        }

        let updated_end = row_span.end.min(data.len());
        let mut operations = Vec::with_capacity(2);
        if updated_end > top {
            operations.push(RowOperation::update(top, updated_end));
        }
        if created > 0 {
            operations.push(RowOperation::create(data.len(), data.len() + created));
        }

        debug!(
            rows = row_span.len(),
            columns = targets.len(),
            created,
            "Pasted range"
        );
        self.commit(rows, operations)
    }

    /// Paste a same-shaped block of `null` into `range`
    pub async fn empty_range(&self, range: &CellRange) -> bool {
        let rows = range.row_count();
        let columns = range.column_count();
        self.set_range_data(range, vec![vec![Value::Null; columns]; rows]).await
    }
}
