//! # History journal
//!
//! Undo/redo over the host row array.
//!
//! ## Design
//!
//! - Every committed mutation is recorded as one batch of items, one item
//!   per emitted operation, each carrying the row slice needed to invert it
//! - Undo inverts a batch's items in reverse order and pushes the matching
//!   redo batch; redo replays in original order and pushes an undo batch
//! - New mutations clear the redo stack
//! - The undo stack is bounded by a level limit (0 = unlimited)
//!
//! Inverses:
//!
//! | recorded | undo emits | redo record |
//! |----------|------------|-------------|
//! | `DELETE` | `RESTORE` (captured rows spliced back) | `DELETE` |
//! | `UPDATE` | `REVERT` (captured rows written back) | `UPDATE` with the rows it replaced |
//! | `CREATE` | `DELETE` of the created span | `CREATE` with the removed rows |
//!
//! [`History`] is the pure journal working on row slices.
//! [`DataGridHistory`] binds it to a grid's data and `on_change`.

use crate::column::SharedRow;
use crate::operations::{OperationType, RowOperation};
use crate::state::GridState;
use std::cell::RefCell;
use std::ops::Range;
use std::rc::Rc;
use tracing::{debug, warn};

/// New row array and the operations that produced it
pub type HistoryStep = (Vec<SharedRow>, Vec<RowOperation>);

/// One operation plus the rows needed to invert or replay it
#[derive(Debug, Clone)]
pub struct HistoryItem {
    pub kind: OperationType,
    pub from_row_index: usize,
    pub to_row_index: usize,
    pub data: Vec<SharedRow>,
}

impl HistoryItem {
    fn new(kind: OperationType, span: Range<usize>, data: Vec<SharedRow>) -> Self {
        Self {
            kind,
            from_row_index: span.start,
            to_row_index: span.end,
            data,
        }
    }
}

/// Items recorded by a single mutation, in application order
#[derive(Debug, Clone, Default)]
pub struct HistoryBatch {
    pub items: Vec<HistoryItem>,
}

/// Undo/redo stacks
#[derive(Debug)]
pub struct History {
    /// Applied batches (most recent last)
    undo_items: Vec<HistoryBatch>,

    /// Undone batches (most recent last)
    redo_items: Vec<HistoryBatch>,

    /// Maximum number of undo levels (0 = unlimited)
    limit: usize,
}

/// `[from, to)` clipped to `len`
fn clamp_span(from: usize, to: usize, len: usize) -> Range<usize> {
    let start = from.min(len);
    start..to.clamp(start, len)
}

fn insert_rows(rows: &mut Vec<SharedRow>, at: usize, items: &[SharedRow]) {
    let tail = rows.split_off(at);
    rows.extend_from_slice(items);
    rows.extend(tail);
}

impl History {
    pub fn new() -> Self {
        Self::with_limit(100)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            undo_items: Vec::new(),
            redo_items: Vec::new(),
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
        self.trim();
    }

    /// Record one mutation.
    ///
    /// `UPDATE` and `DELETE` spans address `before`, `CREATE` spans address
    /// `after`. Operations emitted by one commit must follow that rule,
    /// which is why multi-block deletes are emitted bottom-up.
    pub fn record(
        &mut self,
        operations: &[RowOperation],
        before: &[SharedRow],
        after: &[SharedRow],
    ) {
        let items: Vec<HistoryItem> = operations
            .iter()
            .map(|op| {
                let source = match op.kind {
                    OperationType::Create | OperationType::Restore => after,
                    _ => before,
                };
                let span = clamp_span(op.from_row_index, op.to_row_index, source.len());
                HistoryItem::new(op.kind, span.clone(), source[span].to_vec())
            })
            .collect();

        if items.is_empty() {
            return;
        }

        self.undo_items.push(HistoryBatch { items });
        self.trim();
        self.redo_items.clear();
    }

    fn trim(&mut self) {
        if self.limit > 0 && self.undo_items.len() > self.limit {
            let excess = self.undo_items.len() - self.limit;
            self.undo_items.drain(..excess);
        }
    }

    /// Invert the most recent batch against `current`.
    ///
    /// Returns the new row array and the operations describing it, or
    /// `None` when there is nothing to undo.
    pub fn undo(&mut self, current: &[SharedRow]) -> Option<HistoryStep> {
        let batch = self.undo_items.pop()?;
        let mut rows = current.to_vec();
        let mut operations = Vec::with_capacity(batch.items.len());
        let mut redo = Vec::with_capacity(batch.items.len());

        for item in batch.items.into_iter().rev() {
            let span = clamp_span(item.from_row_index, item.to_row_index, rows.len());
            match item.kind {
                OperationType::Delete => {
                    let at = span.start;
                    let end = at + item.data.len();
                    insert_rows(&mut rows, at, &item.data);
                    operations.push(RowOperation::restore(at, end));
                    redo.push(HistoryItem::new(OperationType::Delete, at..end, item.data));
                }
                OperationType::Update | OperationType::Revert => {
                    let replaced: Vec<SharedRow> = rows.splice(span.clone(), item.data).collect();
                    let end = span.start + replaced.len();
                    operations.push(RowOperation::revert(span.start, end));
                    redo.push(HistoryItem::new(OperationType::Update, span.start..end, replaced));
                }
                OperationType::Create | OperationType::Restore => {
                    let removed: Vec<SharedRow> = rows.drain(span.clone()).collect();
                    operations.push(RowOperation::delete(span.start, span.end));
                    redo.push(HistoryItem::new(OperationType::Create, span, removed));
                }
            }
        }

        redo.reverse();
        self.redo_items.push(HistoryBatch { items: redo });
        Some((rows, operations))
    }

    /// Replay the most recently undone batch against `current`
    pub fn redo(&mut self, current: &[SharedRow]) -> Option<HistoryStep> {
        let batch = self.redo_items.pop()?;
        let mut rows = current.to_vec();
        let mut operations = Vec::with_capacity(batch.items.len());
        let mut undo = Vec::with_capacity(batch.items.len());

        for item in batch.items {
            let span = clamp_span(item.from_row_index, item.to_row_index, rows.len());
            match item.kind {
                OperationType::Delete | OperationType::Restore => {
                    let removed: Vec<SharedRow> = rows.drain(span.clone()).collect();
                    operations.push(RowOperation::delete(span.start, span.end));
                    undo.push(HistoryItem::new(OperationType::Delete, span, removed));
                }
                OperationType::Create => {
                    let at = span.start;
                    let end = at + item.data.len();
                    insert_rows(&mut rows, at, &item.data);
                    operations.push(RowOperation::create(at, end));
                    undo.push(HistoryItem::new(OperationType::Create, at..end, item.data));
                }
                OperationType::Update | OperationType::Revert => {
                    let replaced: Vec<SharedRow> = rows.splice(span.clone(), item.data).collect();
                    let end = span.start + replaced.len();
                    operations.push(RowOperation::update(span.start, end));
                    undo.push(HistoryItem::new(OperationType::Update, span.start..end, replaced));
                }
            }
        }

        self.undo_items.push(HistoryBatch { items: undo });
        self.trim();
        Some((rows, operations))
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_items.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_items.is_empty()
    }

    pub fn undo_levels(&self) -> usize {
        self.undo_items.len()
    }

    pub fn redo_levels(&self) -> usize {
        self.redo_items.len()
    }

    pub fn clear(&mut self) {
        self.undo_items.clear();
        self.redo_items.clear();
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

/// [`History`] bound to a grid
#[derive(Debug, Clone)]
pub struct DataGridHistory {
    state: Rc<GridState>,
    journal: Rc<RefCell<History>>,
}

impl DataGridHistory {
    pub fn new(state: Rc<GridState>, limit: usize) -> Self {
        Self {
            state,
            journal: Rc::new(RefCell::new(History::with_limit(limit))),
        }
    }

    /// Record a committed mutation
    pub(crate) fn record(
        &self,
        operations: &[RowOperation],
        before: &[SharedRow],
        after: &[SharedRow],
    ) {
        self.journal.borrow_mut().record(operations, before, after);
    }

    /// Record an operation against the current data, clearing redo
    pub fn add_undo(&self, operation: RowOperation) {
        let data = self.state.data.get();
        self.record(&[operation], &data, &data);
    }

    pub fn undo(&self) -> bool {
        self.step("undo", |journal, rows| journal.undo(rows))
    }

    pub fn redo(&self) -> bool {
        self.step("redo", |journal, rows| journal.redo(rows))
    }

    fn step(
        &self,
        direction: &'static str,
        apply: impl FnOnce(&mut History, &[SharedRow]) -> Option<HistoryStep>,
    ) -> bool {
        let Some(on_change) = self.state.on_change() else {
            warn!(direction, "History step skipped, no on_change handler");
            return false;
        };

        let data = self.state.data.get();
        let result = {
            // Released before the host runs
            let mut journal = self.journal.borrow_mut();
            apply(&mut *journal, data.as_slice())
        };
        let Some((rows, operations)) = result else {
            return false;
        };

        debug!(direction, operations = operations.len(), "History step");
        on_change(rows, operations);
        true
    }

    pub fn can_undo(&self) -> bool {
        self.journal.borrow().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.journal.borrow().can_redo()
    }

    pub fn undo_levels(&self) -> usize {
        self.journal.borrow().undo_levels()
    }

    pub fn redo_levels(&self) -> usize {
        self.journal.borrow().redo_levels()
    }

    pub fn set_limit(&self, limit: usize) {
        self.journal.borrow_mut().set_limit(limit);
    }

    pub fn clear(&self) {
        self.journal.borrow_mut().clear();
    }
}
