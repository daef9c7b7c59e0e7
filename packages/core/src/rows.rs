//! # Rows and headers
//!
//! Derived, read-only views over the host's row array and column list.
//! Neither stores cell values: renderers read them live from `Row::data`.

use crate::column::{Column, RowData, SharedRow};
use crate::ids::{create_cell_id, create_id, CellCoordinates, CellId, Id, IdSpec};
use serde_json::Value;
use std::rc::Rc;

/// Lightweight cell descriptor, no value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellDescriptor {
    pub id: CellId,
    pub row_id: Id,
    pub header_id: Id,
    pub coordinates: CellCoordinates,
}

#[derive(Debug, Clone)]
pub struct Row {
    pub id: Id,
    pub key: String,
    pub index: usize,
    pub data: SharedRow,
    pub cells: Vec<CellDescriptor>,
}

/// Stable-by-key wrapper around a column
#[derive(Debug, Clone)]
pub struct Header {
    pub id: Id,
    pub index: usize,
    pub column: Rc<Column>,
}

impl Header {
    pub fn key(&self) -> &str {
        &self.column.key
    }

    pub fn title(&self) -> &str {
        self.column.title()
    }
}

/// Element-wise pointer equality, used as the change test for derived lists
#[allow(clippy::ptr_arg)]
pub fn same_rcs<T>(a: &Vec<Rc<T>>, b: &Vec<Rc<T>>) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| Rc::ptr_eq(x, y))
}

/// Stable key of a row, read from the configured field.
///
/// Strings are used verbatim and other scalars are JSON-rendered. Rows
/// without the field fall back to their index.
pub fn row_key_of(data: &RowData, row_key: &str, index: usize) -> String {
    match data.get(row_key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => index.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Build headers for `columns`.
///
/// A previous header is reused when it sits at the same index and wraps
/// the very same column (`Rc::ptr_eq`).
pub fn create_headers(columns: &[Rc<Column>], previous: &[Rc<Header>]) -> Vec<Rc<Header>> {
    columns
        .iter()
        .enumerate()
        .map(|(index, column)| match previous.get(index) {
            Some(header) if Rc::ptr_eq(&header.column, column) => Rc::clone(header),
            _ => Rc::new(Header {
                id: create_id(IdSpec::Header(&column.key)),
                index,
                column: Rc::clone(column),
            }),
        })
        .collect()
}

/// Build rows for `data`.
///
/// Reuse rule: the previous row object at the same index is handed back
/// unchanged when its data is the same allocation as the incoming row
/// (`Rc::ptr_eq`) and its cells point at the same header ids. Everything
/// else is rebuilt, so downstream diffing can rely on row identity.
pub fn create_rows(
    data: &[SharedRow],
    headers: &[Rc<Header>],
    row_key: &str,
    previous: &[Rc<Row>],
) -> Vec<Rc<Row>> {
    data.iter()
        .enumerate()
        .map(|(index, row_data)| {
            if let Some(prev) = previous.get(index) {
                if Rc::ptr_eq(&prev.data, row_data) && same_header_ids(prev, headers) {
                    return Rc::clone(prev);
                }
            }
            Rc::new(build_row(index, row_data, headers, row_key))
        })
        .collect()
}

fn same_header_ids(row: &Row, headers: &[Rc<Header>]) -> bool {
    row.cells.len() == headers.len()
        && row
            .cells
            .iter()
            .zip(headers)
            .all(|(cell, header)| cell.header_id == header.id)
}

fn build_row(index: usize, data: &SharedRow, headers: &[Rc<Header>], row_key: &str) -> Row {
    let key = row_key_of(data, row_key, index);
    let id = create_id(IdSpec::Row(&key));

    let cells = headers
        .iter()
        .map(|header| {
            let coordinates = CellCoordinates::new(index, header.index);
            CellDescriptor {
                id: create_cell_id(coordinates),
                row_id: id.clone(),
                header_id: header.id.clone(),
                coordinates,
            }
        })
        .collect();

    Row {
        id,
        key,
        index,
        data: Rc::clone(data),
        cells,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn shared(value: Value) -> SharedRow {
        match value {
            Value::Object(map) => Rc::new(map),
            _ => Rc::new(RowData::new()),
        }
    }

    fn columns(keys: &[&str]) -> Vec<Rc<Column>> {
        keys.iter().map(|key| Rc::new(Column::new(*key))).collect()
    }

    #[test]
    fn test_row_ids_and_cells() {
        let headers = create_headers(&columns(&["id", "name"]), &[]);
        let data = vec![shared(json!({"id": 7, "name": "a"})), shared(json!({"name": "b"}))];
        let rows = create_rows(&data, &headers, "id", &[]);

        assert_eq!(rows[0].id.as_str(), "row:7");
        assert_eq!(rows[1].key, "1");
        assert_eq!(rows[1].cells[1].id.as_str(), "cell:1-1");
        assert_eq!(rows[1].cells[1].header_id.as_str(), "header:name");
    }

    #[test]
    fn test_unchanged_rows_are_reused() {
        let headers = create_headers(&columns(&["id"]), &[]);
        let first = shared(json!({"id": "a"}));
        let second = shared(json!({"id": "b"}));
        let before = create_rows(&[Rc::clone(&first), Rc::clone(&second)], &headers, "id", &[]);

        let replaced = shared(json!({"id": "b", "x": 1}));
        let after = create_rows(&[Rc::clone(&first), replaced], &headers, "id", &before);

        assert!(Rc::ptr_eq(&before[0], &after[0]));
        assert!(!Rc::ptr_eq(&before[1], &after[1]));
    }

    #[test]
    fn test_moved_row_is_rebuilt() {
        let headers = create_headers(&columns(&["id"]), &[]);
        let a = shared(json!({"id": "a"}));
        let b = shared(json!({"id": "b"}));
        let before = create_rows(&[Rc::clone(&a), Rc::clone(&b)], &headers, "id", &[]);
        let after = create_rows(&[b, a], &headers, "id", &before);

        assert_eq!(after[0].index, 0);
        assert_eq!(after[0].key, "b");
        assert!(!Rc::ptr_eq(&before[1], &after[0]));
    }

    #[test]
    fn test_headers_reused_by_column_identity() {
        let cols = columns(&["a", "b"]);
        let before = create_headers(&cols, &[]);
        let mut next = cols.clone();
        next[1] = Rc::new(Column::new("b").disabled(true));
        let after = create_headers(&next, &before);

        assert!(Rc::ptr_eq(&before[0], &after[0]));
        assert!(!Rc::ptr_eq(&before[1], &after[1]));
        assert_eq!(after[1].id.as_str(), "header:b");
    }
}
