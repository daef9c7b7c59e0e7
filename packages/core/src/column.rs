//! # Column configuration
//!
//! Host-supplied per-column behavior. Rendering fields live with the
//! renderer; the engine only consumes the parts that drive decisions:
//! disabled/selectable flags and the paste and delete hooks.
//!
//! Paste hooks may be asynchronous. Synchronous closures are wrapped in a
//! ready future so the paste algorithm treats both the same way.

use crate::config::ColumnConfig;
use futures::future::{self, FutureExt, LocalBoxFuture};
use serde_json::Value;
use std::future::Future;
use std::rc::Rc;

/// One row of host data
pub type RowData = serde_json::Map<String, Value>;

/// Host rows are shared; identity (`Rc::ptr_eq`) means "unchanged"
pub type SharedRow = Rc<RowData>;

pub type PrePasteValuesFn = Rc<dyn Fn(Vec<Value>) -> LocalBoxFuture<'static, Vec<Value>>>;
pub type PasteValueFn = Rc<dyn Fn(PasteValueArgs) -> LocalBoxFuture<'static, Value>>;
pub type IsCellEmptyFn = Rc<dyn Fn(CellValueArgs<'_>) -> bool>;
pub type DeleteValueFn = Rc<dyn Fn(CellValueArgs<'_>) -> Value>;

/// Input to a column's `paste_value` hook
#[derive(Debug, Clone)]
pub struct PasteValueArgs {
    pub value: Value,
    pub row_data: SharedRow,
    pub row_index: usize,
}

/// Input to `is_cell_empty` / `delete_value`
#[derive(Debug, Clone, Copy)]
pub struct CellValueArgs<'a> {
    pub value: Option<&'a Value>,
    pub row_index: usize,
}

/// Boolean cell attribute, fixed or computed per row
#[derive(Clone)]
pub enum CellFlag {
    Static(bool),
    Dynamic(Rc<dyn Fn(&RowData, usize) -> bool>),
}

impl CellFlag {
    pub fn resolve(&self, row_data: &RowData, row_index: usize) -> bool {
        match self {
            CellFlag::Static(value) => *value,
            CellFlag::Dynamic(f) => f(row_data, row_index),
        }
    }
}

impl std::fmt::Debug for CellFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellFlag::Static(value) => write!(f, "Static({})", value),
            CellFlag::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

impl From<bool> for CellFlag {
    fn from(value: bool) -> Self {
        CellFlag::Static(value)
    }
}

#[derive(Clone)]
pub struct Column {
    pub key: String,
    pub header: Option<String>,
    pub disabled: CellFlag,
    pub selectable: CellFlag,
    pub pre_paste_values: Option<PrePasteValuesFn>,
    pub paste_value: Option<PasteValueFn>,
    pub is_cell_empty: Option<IsCellEmptyFn>,
    pub delete_value: Option<DeleteValueFn>,
}

impl Column {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            header: None,
            disabled: CellFlag::Static(false),
            selectable: CellFlag::Static(true),
            pre_paste_values: None,
            paste_value: None,
            is_cell_empty: None,
            delete_value: None,
        }
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = CellFlag::Static(disabled);
        self
    }

    pub fn disabled_when(mut self, f: impl Fn(&RowData, usize) -> bool + 'static) -> Self {
        self.disabled = CellFlag::Dynamic(Rc::new(f));
        self
    }

    pub fn selectable(mut self, selectable: bool) -> Self {
        self.selectable = CellFlag::Static(selectable);
        self
    }

    pub fn selectable_when(mut self, f: impl Fn(&RowData, usize) -> bool + 'static) -> Self {
        self.selectable = CellFlag::Dynamic(Rc::new(f));
        self
    }

    pub fn with_pre_paste_values(mut self, f: impl Fn(Vec<Value>) -> Vec<Value> + 'static) -> Self {
        self.pre_paste_values = Some(Rc::new(move |values| future::ready(f(values)).boxed_local()));
        self
    }

    pub fn with_pre_paste_values_async<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Vec<Value>) -> Fut + 'static,
        Fut: Future<Output = Vec<Value>> + 'static,
    {
        self.pre_paste_values = Some(Rc::new(move |values| f(values).boxed_local()));
        self
    }

    pub fn with_paste_value(mut self, f: impl Fn(PasteValueArgs) -> Value + 'static) -> Self {
        self.paste_value = Some(Rc::new(move |args| future::ready(f(args)).boxed_local()));
        self
    }

    pub fn with_paste_value_async<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(PasteValueArgs) -> Fut + 'static,
        Fut: Future<Output = Value> + 'static,
    {
        self.paste_value = Some(Rc::new(move |args| f(args).boxed_local()));
        self
    }

    pub fn with_is_cell_empty(mut self, f: impl Fn(CellValueArgs<'_>) -> bool + 'static) -> Self {
        self.is_cell_empty = Some(Rc::new(f));
        self
    }

    pub fn with_delete_value(mut self, f: impl Fn(CellValueArgs<'_>) -> Value + 'static) -> Self {
        self.delete_value = Some(Rc::new(f));
        self
    }

    /// Header text, falling back to the key
    pub fn title(&self) -> &str {
        self.header.as_deref().unwrap_or(&self.key)
    }

    /// Missing, `null` and `""` count as empty unless the column decides otherwise
    pub fn is_empty_value(&self, row_data: &RowData, row_index: usize) -> bool {
        let value = row_data.get(&self.key);
        match &self.is_cell_empty {
            Some(f) => f(CellValueArgs { value, row_index }),
            None => match value {
                None | Some(Value::Null) => true,
                Some(Value::String(s)) => s.is_empty(),
                Some(_) => false,
            },
        }
    }

    /// Value written by a delete, `None` meaning "remove the key"
    pub fn deleted_value(&self, row_data: &RowData, row_index: usize) -> Option<Value> {
        self.delete_value.as_ref().map(|f| {
            f(CellValueArgs {
                value: row_data.get(&self.key),
                row_index,
            })
        })
    }

    pub(crate) async fn run_pre_paste(&self, values: Vec<Value>) -> Vec<Value> {
        match &self.pre_paste_values {
            Some(f) => f(values).await,
            None => values,
        }
    }

    pub(crate) async fn run_paste_value(&self, args: PasteValueArgs) -> Value {
        match &self.paste_value {
            Some(f) => f(args).await,
            None => args.value,
        }
    }
}

impl std::fmt::Debug for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Column")
            .field("key", &self.key)
            .field("header", &self.header)
            .field("disabled", &self.disabled)
            .field("selectable", &self.selectable)
            .field("pre_paste_values", &self.pre_paste_values.is_some())
            .field("paste_value", &self.paste_value.is_some())
            .finish()
    }
}

impl From<&ColumnConfig> for Column {
    fn from(config: &ColumnConfig) -> Self {
        let mut column = Column::new(config.key.clone())
            .disabled(config.disabled)
            .selectable(config.selectable);
        column.header = config.header.clone();
        column
    }
}
