//! Read-side queries over grid state: counts, cell attributes, values.

use crate::column::{Column, SharedRow};
use crate::ids::CellCoordinates;
use crate::range::CellRange;
use crate::state::GridState;
use serde_json::Value;
use std::rc::Rc;

/// Resolved per-cell flags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellAttributes {
    pub disabled: bool,
    pub selectable: bool,
}

#[derive(Debug, Clone)]
pub struct DataGridHelper {
    state: Rc<GridState>,
}

impl DataGridHelper {
    pub fn new(state: Rc<GridState>) -> Self {
        Self { state }
    }

    pub fn row_count(&self) -> usize {
        self.state.row_count()
    }

    pub fn column_count(&self) -> usize {
        self.state.column_count()
    }

    pub fn column(&self, index: usize) -> Option<Rc<Column>> {
        self.state.columns.with(|columns| columns.get(index).cloned())
    }

    pub fn column_index(&self, key: &str) -> Option<usize> {
        self.state
            .columns
            .with(|columns| columns.iter().position(|c| c.key == key))
    }

    pub fn row_data(&self, index: usize) -> Option<SharedRow> {
        self.state.data.with(|data| data.get(index).cloned())
    }

    /// Bottom-right cell, `None` for an empty grid
    pub fn last_cell(&self) -> Option<CellCoordinates> {
        let (rows, columns) = (self.row_count(), self.column_count());
        if rows == 0 || columns == 0 {
            return None;
        }
        Some(CellCoordinates::new(rows - 1, columns - 1))
    }

    pub fn contains(&self, cell: CellCoordinates) -> bool {
        cell.row_index < self.row_count() && cell.column_index < self.column_count()
    }

    /// `None` when the cell lies outside the grid
    pub fn cell_attributes(&self, cell: CellCoordinates) -> Option<CellAttributes> {
        let column = self.column(cell.column_index)?;
        let row = self.row_data(cell.row_index)?;
        Some(CellAttributes {
            disabled: column.disabled.resolve(&row, cell.row_index),
            selectable: column.selectable.resolve(&row, cell.row_index),
        })
    }

    /// Cells outside the grid count as disabled
    pub fn is_cell_disabled(&self, cell: CellCoordinates) -> bool {
        self.cell_attributes(cell).map_or(true, |attrs| attrs.disabled)
    }

    pub fn is_selectable(&self, cell: CellCoordinates) -> bool {
        self.cell_attributes(cell).map_or(false, |attrs| attrs.selectable)
    }

    pub fn get_cell_value(&self, cell: CellCoordinates) -> Option<Value> {
        let column = self.column(cell.column_index)?;
        let row = self.row_data(cell.row_index)?;
        row.get(&column.key).cloned()
    }

    /// Values of a range as clipboard text, row-major.
    ///
    /// The range is clipped to the grid. Strings are copied verbatim,
    /// missing and `null` values become `""` and everything else is
    /// rendered as JSON.
    pub fn get_range_data(&self, range: &CellRange) -> Vec<Vec<String>> {
        let Some(last) = self.last_cell() else {
            return Vec::new();
        };
        let b = range.boundary();
        if b.min.row_index > last.row_index || b.min.column_index > last.column_index {
            return Vec::new();
        }

        let max_row = b.max.row_index.min(last.row_index);
        let max_column = b.max.column_index.min(last.column_index);

        (b.min.row_index..=max_row)
            .map(|row| {
                (b.min.column_index..=max_column)
                    .map(|column| {
                        stringify_value(self.get_cell_value(CellCoordinates::new(row, column)))
                    })
                    .collect()
            })
            .collect()
    }
}

pub fn stringify_value(value: Option<Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s,
        Some(other) => other.to_string(),
    }
}
