//! Host contract: what the application hands the grid

use crate::column::{Column, RowData, SharedRow};
use crate::config::{GridConfig, GridLayout};
use crate::operations::RowOperation;
use std::rc::Rc;
use std::time::Duration;

/// Receives every new row array together with the operations that produced it
pub type OnChange = Rc<dyn Fn(Vec<SharedRow>, Vec<RowOperation>)>;
pub type CreateRowFn = Rc<dyn Fn() -> RowData>;
pub type DuplicateRowFn = Rc<dyn Fn(&RowData, usize) -> RowData>;

#[derive(Clone)]
pub struct DataGridOptions {
    pub data: Vec<SharedRow>,
    pub columns: Vec<Column>,
    pub row_key: String,
    pub lock_rows: bool,
    pub disable_smart_delete: bool,
    pub create_row: Option<CreateRowFn>,
    pub duplicate_row: Option<DuplicateRowFn>,
    pub on_change: Option<OnChange>,
    pub layout: GridLayout,
    pub history_limit: usize,
    pub drag_delay: Duration,
}

impl DataGridOptions {
    pub fn new(data: Vec<SharedRow>, columns: Vec<Column>) -> Self {
        Self::from_config(&GridConfig::default(), data, columns)
    }

    /// Options from a config file. Columns passed in code take precedence
    /// over the declarative ones.
    pub fn from_config(config: &GridConfig, data: Vec<SharedRow>, columns: Vec<Column>) -> Self {
        let columns = if columns.is_empty() {
            config.columns.iter().map(Column::from).collect()
        } else {
            columns
        };

        Self {
            data,
            columns,
            row_key: config.row_key.clone(),
            lock_rows: config.lock_rows,
            disable_smart_delete: config.disable_smart_delete,
            create_row: None,
            duplicate_row: None,
            on_change: None,
            layout: config.layout.clone(),
            history_limit: config.history_limit,
            drag_delay: Duration::from_millis(config.drag_delay_ms),
        }
    }

    pub fn with_row_key(mut self, row_key: impl Into<String>) -> Self {
        self.row_key = row_key.into();
        self
    }

    pub fn with_lock_rows(mut self, lock_rows: bool) -> Self {
        self.lock_rows = lock_rows;
        self
    }

    pub fn with_smart_delete(mut self, enabled: bool) -> Self {
        self.disable_smart_delete = !enabled;
        self
    }

    pub fn with_create_row(mut self, f: impl Fn() -> RowData + 'static) -> Self {
        self.create_row = Some(Rc::new(f));
        self
    }

    pub fn with_duplicate_row(mut self, f: impl Fn(&RowData, usize) -> RowData + 'static) -> Self {
        self.duplicate_row = Some(Rc::new(f));
        self
    }

    pub fn with_on_change(
        mut self,
        f: impl Fn(Vec<SharedRow>, Vec<RowOperation>) + 'static,
    ) -> Self {
        self.on_change = Some(Rc::new(f));
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }
}

impl Default for DataGridOptions {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new())
    }
}

/// Host settings the engine reads while running. Swappable at runtime.
#[derive(Clone)]
pub(crate) struct GridSettings {
    pub row_key: String,
    pub lock_rows: bool,
    pub disable_smart_delete: bool,
    pub create_row: Option<CreateRowFn>,
    pub duplicate_row: Option<DuplicateRowFn>,
    pub on_change: Option<OnChange>,
    pub layout: GridLayout,
    pub drag_delay: Duration,
}

impl GridSettings {
    pub(crate) fn from_options(options: &DataGridOptions) -> Self {
        Self {
            row_key: options.row_key.clone(),
            lock_rows: options.lock_rows,
            disable_smart_delete: options.disable_smart_delete,
            create_row: options.create_row.clone(),
            duplicate_row: options.duplicate_row.clone(),
            on_change: options.on_change.clone(),
            layout: options.layout.clone(),
            drag_delay: options.drag_delay,
        }
    }

    pub(crate) fn new_row(&self) -> RowData {
        match &self.create_row {
            Some(f) => f(),
            None => RowData::new(),
        }
    }
}
