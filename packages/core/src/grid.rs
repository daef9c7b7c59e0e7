//! # Grid assembly
//!
//! [`DataGrid`] wires the state, helper, selection controller, modifier,
//! history, command bus and plugin manager of one grid instance and
//! registers the built-in commands.
//!
//! `DataGrid` is a cheap `Rc` handle. Closures that outlive a call (command
//! handlers, host callbacks, plugin listeners) hold a [`WeakDataGrid`]
//! instead, so a grid is freed once the host drops its last handle.

use crate::column::{Column, SharedRow};
use crate::commands::{Command, CommandRegistry};
use crate::config::GridConfig;
use crate::errors::GridResult;
use crate::events::GridEvent;
use crate::helper::DataGridHelper;
use crate::history::DataGridHistory;
use crate::modifier::DataModifier;
use crate::operations::RowOperation;
use crate::options::DataGridOptions;
use crate::plugin::{Plugin, PluginManager};
use crate::selection::{CleanSelectionOptions, SelectionController};
use crate::state::{EditingMode, GridState};
use datagrid_state::EventEmitter;
use serde_json::Value;
use std::rc::{Rc, Weak};
use std::time::Duration;
use tracing::{info, warn};

/// Source tag of the built-in commands
pub const CORE_SOURCE: &str = "core";

/// Most rows one `insert-row-below` may add
pub const MAX_INSERT_ROWS: usize = 10_000;

struct GridInner {
    state: Rc<GridState>,
    helper: DataGridHelper,
    selection: SelectionController,
    history: DataGridHistory,
    modifier: DataModifier,
    events: EventEmitter<GridEvent>,
    commands: CommandRegistry,
    plugins: PluginManager,
}

#[derive(Clone)]
pub struct DataGrid {
    inner: Rc<GridInner>,
}

#[derive(Clone)]
pub struct WeakDataGrid {
    inner: Weak<GridInner>,
}

impl WeakDataGrid {
    pub fn upgrade(&self) -> Option<DataGrid> {
        self.inner.upgrade().map(|inner| DataGrid { inner })
    }
}

impl DataGrid {
    pub fn new(options: DataGridOptions) -> GridResult<Self> {
        let state = Rc::new(GridState::new(&options));
        let helper = DataGridHelper::new(Rc::clone(&state));
        let selection = SelectionController::new(Rc::clone(&state), helper.clone());
        let history = DataGridHistory::new(Rc::clone(&state), options.history_limit);
        let modifier = DataModifier::new(Rc::clone(&state), selection.clone(), history.clone());
        let events = EventEmitter::new();
        let commands = CommandRegistry::new(events.clone());

        let grid = Self {
            inner: Rc::new(GridInner {
                state,
                helper,
                selection,
                history,
                modifier,
                events,
                commands,
                plugins: PluginManager::new(),
            }),
        };
        grid.register_core_commands()?;

        info!(
            rows = grid.helper().row_count(),
            columns = grid.helper().column_count(),
            "Created data grid"
        );
        Ok(grid)
    }

    pub fn downgrade(&self) -> WeakDataGrid {
        WeakDataGrid {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn state(&self) -> &GridState {
        &self.inner.state
    }

    pub fn helper(&self) -> &DataGridHelper {
        &self.inner.helper
    }

    pub fn selection(&self) -> &SelectionController {
        &self.inner.selection
    }

    pub fn modifier(&self) -> &DataModifier {
        &self.inner.modifier
    }

    pub fn history(&self) -> &DataGridHistory {
        &self.inner.history
    }

    pub fn commands(&self) -> &CommandRegistry {
        &self.inner.commands
    }

    pub fn events(&self) -> &EventEmitter<GridEvent> {
        &self.inner.events
    }

    pub fn plugins(&self) -> &PluginManager {
        &self.inner.plugins
    }

    /// Hand the grid a new row array, usually from inside `on_change`
    pub fn set_data(&self, rows: Vec<SharedRow>) {
        self.inner.state.set_data(rows);
    }

    pub fn data(&self) -> Rc<Vec<SharedRow>> {
        self.inner.state.data.get()
    }

    pub fn set_columns(&self, columns: Vec<Column>) {
        self.inner.state.set_columns(columns);
    }

    pub fn set_on_change(&self, on_change: impl Fn(Vec<SharedRow>, Vec<RowOperation>) + 'static) {
        self.inner
            .state
            .update_settings(|settings| settings.on_change = Some(Rc::new(on_change)));
    }

    /// Apply the runtime settings of a config file. Declared columns
    /// replace the current ones only when the config lists any.
    pub fn apply_config(&self, config: &GridConfig) {
        self.inner.state.update_settings(|settings| {
            settings.row_key = config.row_key.clone();
            settings.lock_rows = config.lock_rows;
            settings.disable_smart_delete = config.disable_smart_delete;
            settings.layout = config.layout.clone();
            settings.drag_delay = Duration::from_millis(config.drag_delay_ms);
        });
        self.inner.history.set_limit(config.history_limit);

        if !config.columns.is_empty() {
            self.set_columns(config.columns.iter().map(Column::from).collect());
        }
    }

    pub async fn execute(&self, id: &str, payload: Option<Value>) -> GridResult<bool> {
        self.inner.commands.execute(id, payload).await
    }

    pub fn undo(&self) -> bool {
        self.inner.history.undo()
    }

    pub fn redo(&self) -> bool {
        self.inner.history.redo()
    }

    /// Register and activate a plugin
    pub fn add_plugin(&self, plugin: impl Plugin + 'static) -> GridResult<()> {
        self.add_shared_plugin(Rc::new(plugin))
    }

    pub fn add_shared_plugin(&self, plugin: Rc<dyn Plugin>) -> GridResult<()> {
        let key = plugin.key().to_string();
        self.inner.plugins.add(plugin)?;
        self.inner.plugins.activate(self, &key)?;
        Ok(())
    }

    pub fn remove_plugin(&self, key: &str) -> GridResult<Rc<dyn Plugin>> {
        self.inner.plugins.remove(self, key)
    }

    pub fn activate_plugin(&self, key: &str) -> GridResult<bool> {
        self.inner.plugins.activate(self, key)
    }

    pub fn deactivate_plugin(&self, key: &str) -> GridResult<bool> {
        self.inner.plugins.deactivate(self, key)
    }

    /// Deactivate every plugin
    pub fn destroy(&self) {
        self.inner.plugins.deactivate_all(self);
    }

    /// Rows targeted by row commands: the last range, else the active cell
    fn target_rows(&self) -> Option<(usize, usize)> {
        if let Some(range) = self.selection().last_range() {
            let b = range.boundary();
            return Some((b.min.row_index, b.max.row_index));
        }
        self.selection()
            .active_cell()
            .map(|cell| (cell.coordinates.row_index, cell.coordinates.row_index))
    }

    fn register_core_commands(&self) -> GridResult<()> {
        let weak = self.downgrade();

        self.inner.commands.register(vec![
            core_command(&weak, "navigate-up", |grid, _| {
                grid.selection().navigate(0, -1);
            }),
            core_command(&weak, "navigate-down", |grid, _| {
                grid.selection().navigate(0, 1);
            }),
            core_command(&weak, "navigate-left", |grid, _| {
                grid.selection().navigate(-1, 0);
            }),
            core_command(&weak, "navigate-right", |grid, _| {
                grid.selection().navigate(1, 0);
            }),
            core_command(&weak, "expand-left", |grid, _| {
                grid.selection().expand_left();
            }),
            core_command(&weak, "expand-right", |grid, _| {
                grid.selection().expand_right();
            }),
            core_command(&weak, "expand-upper", |grid, _| {
                grid.selection().expand_upper();
            }),
            core_command(&weak, "expand-lower", |grid, _| {
                grid.selection().expand_lower();
            }),
            core_command(&weak, "jump-left", |grid, _| {
                grid.selection().jump_left();
            }),
            core_command(&weak, "jump-right", |grid, _| {
                grid.selection().jump_right();
            }),
            core_command(&weak, "jump-top", |grid, _| {
                grid.selection().jump_top();
            }),
            core_command(&weak, "jump-bottom", |grid, _| {
                grid.selection().jump_bottom();
            }),
            core_command(&weak, "select-all", |grid, _| {
                grid.selection().select_all();
            }),
            core_command(&weak, "clean-selection", |grid, _| {
                grid.selection().clean_selection(CleanSelectionOptions::default());
            }),
            core_command(&weak, "undo", |grid, _| {
                grid.undo();
            }),
            core_command(&weak, "redo", |grid, _| {
                grid.redo();
            }),
            core_command(&weak, "delete-selection", |grid, _| {
                grid.modifier().delete_selection();
            }),
            core_command(&weak, "insert-row-below", |grid, payload| {
                let count = match payload.as_ref().and_then(Value::as_u64) {
                    None => 1,
                    Some(n) => match usize::try_from(n) {
                        Ok(count) if count <= MAX_INSERT_ROWS => count,
                        _ => {
                            warn!(count = n, max = MAX_INSERT_ROWS, "Row count too large");
                            return;
                        }
                    },
                };
                let row = match grid.target_rows() {
                    Some((_, max)) => max,
                    None => grid.helper().row_count().saturating_sub(1),
                };
                grid.modifier().insert_row_after(row, count);
            }),
            core_command(&weak, "duplicate-rows", |grid, _| {
                if let Some((min, max)) = grid.target_rows() {
                    grid.modifier().duplicate_rows(min, max);
                }
            }),
            core_command(&weak, "delete-rows", |grid, _| {
                if let Some((min, max)) = grid.target_rows() {
                    if grid.modifier().delete_rows(min, max) {
                        grid.selection().clean_selection(CleanSelectionOptions::default());
                    }
                }
            }),
            core_command(&weak, "start-editing", |grid, payload| {
                let mode = match payload.as_ref().and_then(Value::as_str) {
                    Some("floating") => EditingMode::Floating,
                    _ => EditingMode::Inline,
                };
                grid.selection().start_editing(mode);
            }),
            core_command(&weak, "stop-editing", |grid, _| {
                grid.selection().stop_editing();
            }),
        ])
    }
}

type CoreAction = fn(&DataGrid, Option<Value>);

fn core_command(weak: &WeakDataGrid, id: &str, action: CoreAction) -> Command {
    let weak = weak.clone();
    Command::sync(id, CORE_SOURCE, move |payload| {
        if let Some(grid) = weak.upgrade() {
            action(&grid, payload);
        }
        Ok(())
    })
    .with_kind(CORE_SOURCE)
}

impl std::fmt::Debug for DataGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataGrid")
            .field("state", &self.inner.state)
            .field("commands", &self.inner.commands.len())
            .field("plugins", &self.inner.plugins.keys())
            .finish()
    }
}
