//! Host fixture: a grid whose `on_change` feeds rows straight back

#![allow(dead_code)]

use datagrid_core::{
    Column, DataGrid, DataGridOptions, RowData, RowOperation, SharedRow,
};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::rc::Rc;

pub struct Host {
    pub grid: DataGrid,
    pub changes: Rc<RefCell<Vec<Vec<RowOperation>>>>,
}

impl Host {
    /// Operations of the most recent `on_change`
    pub fn last_operations(&self) -> Vec<RowOperation> {
        self.changes.borrow().last().cloned().unwrap_or_default()
    }

    pub fn change_count(&self) -> usize {
        self.changes.borrow().len()
    }

    pub fn value(&self, row: usize, key: &str) -> Option<Value> {
        self.grid.data().get(row).and_then(|r| r.get(key).cloned())
    }

    pub fn row_ids(&self) -> Vec<Value> {
        self.grid
            .data()
            .iter()
            .map(|r| r.get("id").cloned().unwrap_or(Value::Null))
            .collect()
    }
}

pub fn shared(value: Value) -> SharedRow {
    match value {
        Value::Object(map) => Rc::new(map),
        _ => Rc::new(RowData::new()),
    }
}

/// `count` rows of `{id, name, qty}`
pub fn numbered_rows(count: usize) -> Vec<SharedRow> {
    (0..count)
        .map(|i| shared(json!({"id": i, "name": format!("row {}", i), "qty": i * 10})))
        .collect()
}

pub fn default_columns() -> Vec<Column> {
    vec![Column::new("id"), Column::new("name"), Column::new("qty")]
}

pub fn host_with(options: DataGridOptions) -> Host {
    let grid = DataGrid::new(options).unwrap();
    let changes = Rc::new(RefCell::new(Vec::new()));

    let weak = grid.downgrade();
    let log = Rc::clone(&changes);
    grid.set_on_change(move |rows, operations| {
        log.borrow_mut().push(operations);
        if let Some(grid) = weak.upgrade() {
            grid.set_data(rows);
        }
    });

    Host { grid, changes }
}

pub fn host(rows: usize) -> Host {
    host_with(DataGridOptions::new(numbered_rows(rows), default_columns()))
}
