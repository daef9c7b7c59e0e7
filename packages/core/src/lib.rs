//! # Datagrid Core
//!
//! Headless engine behind an interactive spreadsheet-like grid: multi-range
//! selection, keyboard navigation, paste and fill, row mutation, undo/redo
//! and a command bus. Nothing here renders; renderers and input layers
//! read the observable state and call the public operations.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ host: owns Vec<SharedRow>, columns,         │
//! │       on_change(rows, operations)           │
//! └─────────────────────────────────────────────┘
//!            ↓ set_data            ↑ on_change
//! ┌─────────────────────────────────────────────┐
//! │ DataGrid                                    │
//! │  - GridState: data/columns → rows/headers   │
//! │  - SelectionController: active cell, ranges │
//! │  - DataModifier: CRUD, paste, smart delete  │
//! │  - DataGridHistory: undo/redo journal       │
//! │  - CommandRegistry + GridEvent emitter      │
//! │  - PluginManager                            │
//! └─────────────────────────────────────────────┘
//!            ↓ commands / events
//! ┌─────────────────────────────────────────────┐
//! │ plugins: clipboard, fill handle, pinning,   │
//! │          key bindings, stay-in-view         │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Host owns the data**: mutations build a new array and go out
//!    through `on_change`; the grid sees them when the host calls
//!    `set_data`
//! 2. **Ids, not identity**: cells, rows and headers are addressed by
//!    string ids such as `cell:3-1`
//! 3. **Row identity means unchanged**: untouched rows keep their `Rc`
//! 4. **Single-threaded**: `Rc`/`RefCell`, synchronous notification,
//!    async only for paste hooks and commands
//!
//! ## Usage
//!
//! ```rust,ignore
//! use datagrid_core::{Column, DataGrid, DataGridOptions};
//!
//! let grid = DataGrid::new(DataGridOptions::new(rows, vec![Column::new("name")]))?;
//! let weak = grid.downgrade();
//! grid.set_on_change(move |rows, operations| {
//!     if let Some(grid) = weak.upgrade() {
//!         grid.set_data(rows);
//!     }
//! });
//!
//! grid.selection().start_selection(CellCoordinates::new(0, 0));
//! grid.execute("navigate-down", None).await?;
//! ```

pub mod column;
pub mod commands;
pub mod config;
pub mod errors;
pub mod events;
pub mod grid;
pub mod helper;
pub mod history;
pub mod ids;
pub mod modifier;
pub mod operations;
pub mod options;
pub mod plugin;
pub mod range;
pub mod rows;
pub mod selection;
pub mod state;

pub use column::{CellFlag, CellValueArgs, Column, PasteValueArgs, RowData, SharedRow};
pub use commands::{Command, CommandRegistry};
pub use config::{ColumnConfig, GridConfig, GridLayout, DEFAULT_CONFIG_NAME};
pub use errors::{GridError, GridResult};
pub use events::GridEvent;
pub use grid::{DataGrid, WeakDataGrid, CORE_SOURCE, MAX_INSERT_ROWS};
pub use helper::{CellAttributes, DataGridHelper};
pub use history::{DataGridHistory, History, HistoryBatch, HistoryItem, HistoryStep};
pub use ids::{
    create_cell_id, create_id, extract_cell_id, get_id_type, get_max_cell_id, get_min_cell_id,
    CellCoordinates, CellId, Id, IdSpec, IdType,
};
pub use modifier::DataModifier;
pub use operations::{OperationType, RowOperation};
pub use options::{CreateRowFn, DataGridOptions, DuplicateRowFn, OnChange};
pub use plugin::{Plugin, PluginManager, Unsubscribes};
pub use range::{CellRange, Edge, RangeBoundary, RangeCell, SelectedRange};
pub use rows::{CellDescriptor, Header, Row};
pub use selection::{CleanSelectionOptions, PointerModifiers, SelectionController};
pub use state::{ActiveCell, DraggingStatus, EditingMode, GridState};

pub use datagrid_state::{EventEmitter, Observable, ObservableList, ObservableMap, Subscription};
