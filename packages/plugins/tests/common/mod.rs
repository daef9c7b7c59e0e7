#![allow(dead_code)]

use datagrid_core::{Column, DataGrid, DataGridOptions, RowData, RowOperation, SharedRow};
use serde_json::{json, Value};
use std::cell::RefCell;
use std::rc::Rc;

/// Grid whose host feeds every change straight back
pub struct Host {
    pub grid: DataGrid,
    pub changes: Rc<RefCell<Vec<Vec<RowOperation>>>>,
}

impl Host {
    pub fn last_operations(&self) -> Vec<RowOperation> {
        self.changes.borrow().last().cloned().unwrap_or_default()
    }

    pub fn value(&self, row: usize, key: &str) -> Value {
        self.grid
            .data()
            .get(row)
            .and_then(|r| r.get(key).cloned())
            .unwrap_or(Value::Null)
    }

    pub fn column_values(&self, key: &str) -> Vec<Value> {
        (0..self.grid.data().len()).map(|row| self.value(row, key)).collect()
    }
}

pub fn shared(value: Value) -> SharedRow {
    match value {
        Value::Object(map) => Rc::new(map),
        _ => Rc::new(RowData::new()),
    }
}

/// `{id, name, qty}` rows, `qty = i * 10`
pub fn numbered_rows(count: usize) -> Vec<SharedRow> {
    (0..count)
        .map(|i| shared(json!({"id": i, "name": format!("row {}", i), "qty": i * 10})))
        .collect()
}

pub fn host(rows: usize) -> Host {
    let columns = vec![Column::new("id"), Column::new("name"), Column::new("qty")];
    let grid = DataGrid::new(DataGridOptions::new(numbered_rows(rows), columns)).unwrap();
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
