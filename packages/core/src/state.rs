//! # Grid state
//!
//! Every observable the grid exposes to renderers and plugins. `rows` and
//! `headers` are derived from `data` and `columns` and are rebuilt whenever
//! either input is replaced, reusing unchanged entries (see
//! [`create_rows`](crate::rows::create_rows)).
//!
//! `active_cell`, `selected_ranges`, `editing` and `dragging` are written
//! only through [`SelectionController`](crate::selection::SelectionController).

use crate::column::{Column, SharedRow};
use crate::config::GridLayout;
use crate::ids::{CellCoordinates, CellId};
use crate::options::{DataGridOptions, GridSettings, OnChange};
use crate::range::SelectedRange;
use crate::rows::{create_headers, create_rows, same_rcs, Header, Row};
use datagrid_state::{Observable, ObservableList};
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tracing::debug;

/// The focused cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveCell {
    pub id: CellId,
    pub coordinates: CellCoordinates,
}

impl ActiveCell {
    pub fn new(coordinates: CellCoordinates) -> Self {
        Self {
            id: coordinates.id(),
            coordinates,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EditingMode {
    #[default]
    Off,
    Inline,
    Floating,
}

impl EditingMode {
    pub fn is_editing(self) -> bool {
        self != EditingMode::Off
    }
}

/// `Idle → Start → Dragging → Idle`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DraggingStatus {
    #[default]
    Idle,
    Start,
    Dragging,
}

impl DraggingStatus {
    pub fn is_active(self) -> bool {
        self != DraggingStatus::Idle
    }
}

fn same_data(a: &Rc<Vec<SharedRow>>, b: &Rc<Vec<SharedRow>>) -> bool {
    Rc::ptr_eq(a, b)
}

fn same_columns(a: &Rc<Vec<Rc<Column>>>, b: &Rc<Vec<Rc<Column>>>) -> bool {
    Rc::ptr_eq(a, b)
}

pub struct GridState {
    /// Host row array as last handed to the grid
    pub data: Observable<Rc<Vec<SharedRow>>>,
    pub columns: Observable<Rc<Vec<Rc<Column>>>>,
    pub rows: ObservableList<Rc<Row>>,
    pub headers: ObservableList<Rc<Header>>,
    pub active_cell: Observable<Option<ActiveCell>>,
    /// Last entry is the most recently created range
    pub selected_ranges: ObservableList<SelectedRange>,
    pub editing: Observable<EditingMode>,
    pub dragging: Observable<DraggingStatus>,
    settings: RefCell<GridSettings>,
}

impl GridState {
    pub(crate) fn new(options: &DataGridOptions) -> Self {
        let settings = GridSettings::from_options(options);
        let columns: Vec<Rc<Column>> = options.columns.iter().cloned().map(Rc::new).collect();
        let headers = create_headers(&columns, &[]);
        let rows = create_rows(&options.data, &headers, &settings.row_key, &[]);

        Self {
            data: Observable::with_equality(Rc::new(options.data.clone()), same_data),
            columns: Observable::with_equality(Rc::new(columns), same_columns),
            rows: ObservableList::with_equality(rows, same_rcs::<Row>),
            headers: ObservableList::with_equality(headers, same_rcs::<Header>),
            active_cell: Observable::new(None),
            selected_ranges: ObservableList::new(Vec::new()),
            editing: Observable::new(EditingMode::Off),
            dragging: Observable::new(DraggingStatus::Idle),
            settings: RefCell::new(settings),
        }
    }

    /// Replace the row array and rebuild derived rows
    pub fn set_data(&self, data: Vec<SharedRow>) {
        let count = data.len();
        self.data.set(Rc::new(data));
        self.refresh_rows(true);
        debug!(rows = count, "Data replaced");
    }

    pub fn set_columns(&self, columns: Vec<Column>) {
        self.set_shared_columns(columns.into_iter().map(Rc::new).collect());
    }

    /// Replace the column list. Columns that are the same `Rc` keep their header.
    pub fn set_shared_columns(&self, columns: Vec<Rc<Column>>) {
        let count = columns.len();
        let previous = self.headers.to_vec();
        let headers = create_headers(&columns, &previous);
        self.columns.set(Rc::new(columns));
        self.headers.set(headers);
        self.refresh_rows(true);
        debug!(columns = count, "Columns replaced");
    }

    pub(crate) fn refresh_rows(&self, reuse: bool) {
        let previous = if reuse { self.rows.to_vec() } else { Vec::new() };
        let data = self.data.get();
        let headers = self.headers.to_vec();
        let row_key = self.settings.borrow().row_key.clone();
        self.rows.set(create_rows(&data, &headers, &row_key, &previous));
    }

    pub fn row_count(&self) -> usize {
        self.data.with(|data| data.len())
    }

    pub fn column_count(&self) -> usize {
        self.columns.with(|columns| columns.len())
    }

    pub fn row_key(&self) -> String {
        self.settings.borrow().row_key.clone()
    }

    pub fn lock_rows(&self) -> bool {
        self.settings.borrow().lock_rows
    }

    pub fn smart_delete_enabled(&self) -> bool {
        !self.settings.borrow().disable_smart_delete
    }

    pub fn layout(&self) -> GridLayout {
        self.settings.borrow().layout.clone()
    }

    pub fn drag_delay(&self) -> Duration {
        self.settings.borrow().drag_delay
    }

    /// Cloned out so callers never hold the settings borrow while the host runs
    pub fn on_change(&self) -> Option<OnChange> {
        self.settings.borrow().on_change.clone()
    }

    pub(crate) fn settings(&self) -> GridSettings {
        self.settings.borrow().clone()
    }

    pub(crate) fn update_settings(&self, f: impl FnOnce(&mut GridSettings)) {
        let previous_key = self.row_key();
        f(&mut self.settings.borrow_mut());
        if self.row_key() != previous_key {
            self.refresh_rows(false);
        }
    }
}

impl std::fmt::Debug for GridState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridState")
            .field("rows", &self.row_count())
            .field("columns", &self.column_count())
            .field("active_cell", &self.active_cell.get())
            .field("selected_ranges", &self.selected_ranges.len())
            .field("editing", &self.editing.get())
            .field("dragging", &self.dragging.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::RowData;
    use serde_json::json;
    use std::cell::Cell;

    fn row(id: i64) -> SharedRow {
        let mut data = RowData::new();
        data.insert("id".to_string(), json!(id));
        Rc::new(data)
    }

    fn state(rows: usize) -> GridState {
        let data = (0..rows as i64).map(row).collect();
        GridState::new(&DataGridOptions::new(data, vec![Column::new("id"), Column::new("name")]))
    }

    #[test]
    fn test_rows_derived_from_data() {
        let state = state(3);
        assert_eq!(state.rows.len(), 3);
        assert_eq!(state.headers.len(), 2);
        assert_eq!(state.rows.get(2).map(|r| r.key.clone()), Some("2".to_string()));
    }

    #[test]
    fn test_set_data_reuses_unchanged_rows() {
        let state = state(2);
        let before = state.rows.to_vec();
        let mut data = state.data.get().to_vec();
        data[1] = row(9);
        state.set_data(data);

        let after = state.rows.to_vec();
        assert!(Rc::ptr_eq(&before[0], &after[0]));
        assert_eq!(after[1].key, "9");
    }

    #[test]
    fn test_same_array_does_not_notify_rows() {
        let state = state(2);
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        let _sub = state.rows.watch(move |_| counter.set(counter.get() + 1));

        state.set_data(state.data.get().to_vec());
        assert_eq!(hits.get(), 0);
    }

    #[test]
    fn test_row_key_change_rebuilds_rows() {
        let state = state(1);
        let before = state.rows.to_vec();
        state.update_settings(|s| s.row_key = "name".to_string());
        let after = state.rows.to_vec();
        assert!(!Rc::ptr_eq(&before[0], &after[0]));
        assert_eq!(after[0].key, "0");
    }
}
