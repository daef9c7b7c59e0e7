//! Replay scripts: a JSON array of steps run against a headless grid.
//!
//! ```json
//! [
//!   { "step": "select", "start": [0, 1], "end": [2, 1] },
//!   { "step": "paste", "text": "a\nb" },
//!   { "step": "key", "chord": "ctrl+z" },
//!   { "step": "edit", "row": 0, "column": "name", "value": "x" },
//!   { "step": "command", "id": "insert-row-below", "payload": 2 }
//! ]
//! ```

use anyhow::{anyhow, bail, Context, Result};
use datagrid_core::{
    CellCoordinates, Column, DataGrid, DataGridOptions, GridConfig, RowData, RowOperation,
    SharedRow,
};
use datagrid_plugins::{ClipboardPlugin, KeyBindingsPlugin, MemoryClipboard, PinningPlugin};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "step", rename_all = "camelCase")]
pub enum Step {
    Command {
        id: String,
        #[serde(default)]
        payload: Option<Value>,
    },
    Key {
        chord: String,
    },
    /// `[row, column]` corners; `end` defaults to `start`
    Select {
        start: (usize, usize),
        #[serde(default)]
        end: Option<(usize, usize)>,
        #[serde(default)]
        append: bool,
    },
    /// Put tab-separated text on the clipboard and paste it
    Paste {
        text: String,
    },
    Edit {
        row: usize,
        column: String,
        value: Value,
    },
}

/// Operations delivered by one `on_change`, tagged with the step that caused them
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Change {
    pub step: usize,
    pub operations: Vec<RowOperation>,
}

#[derive(Debug, Serialize)]
pub struct Report {
    pub changes: Vec<Change>,
    pub rows: Vec<Value>,
}

pub fn parse_rows(json: &str) -> Result<Vec<SharedRow>> {
    let values: Vec<Value> = serde_json::from_str(json).context("rows must be a JSON array")?;
    values
        .into_iter()
        .enumerate()
        .map(|(index, value)| match value {
            Value::Object(map) => Ok(Rc::new(map)),
            other => Err(anyhow!("row {} is not an object: {}", index, other)),
        })
        .collect()
}

pub fn parse_script(json: &str) -> Result<Vec<Step>> {
    serde_json::from_str(json).context("invalid script")
}

/// One column per field, in order of first appearance
fn infer_columns(rows: &[SharedRow]) -> Vec<Column> {
    let mut keys: Vec<&String> = Vec::new();
    for row in rows {
        for key in row.keys() {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
    }
    keys.into_iter().map(|key| Column::new(key.as_str())).collect()
}

/// A grid whose host feeds every change back, with the clipboard, key
/// binding and pinning plugins attached
pub struct Session {
    grid: DataGrid,
    clipboard: MemoryClipboard,
    keys: KeyBindingsPlugin,
    changes: Rc<RefCell<Vec<Change>>>,
    step: Rc<Cell<usize>>,
}

impl Session {
    pub fn new(rows: Vec<SharedRow>, config: &GridConfig) -> Result<Self> {
        let columns = if config.columns.is_empty() {
            infer_columns(&rows)
        } else {
            Vec::new()
        };
        let grid = DataGrid::new(DataGridOptions::from_config(config, rows, columns))?;

        let changes = Rc::new(RefCell::new(Vec::new()));
        let step = Rc::new(Cell::new(0));
        {
            let (weak, log, step) = (grid.downgrade(), Rc::clone(&changes), Rc::clone(&step));
            grid.set_on_change(move |rows, operations| {
                log.borrow_mut().push(Change {
                    step: step.get(),
                    operations,
                });
                if let Some(grid) = weak.upgrade() {
                    grid.set_data(rows);
                }
            });
        }

        let clipboard = MemoryClipboard::new();
        let keys = KeyBindingsPlugin::from_config(config);
        grid.add_plugin(ClipboardPlugin::new(clipboard.clone()))?;
        grid.add_plugin(keys.clone())?;
        grid.add_plugin(PinningPlugin::new())?;

        Ok(Self {
            grid,
            clipboard,
            keys,
            changes,
            step,
        })
    }

    pub fn grid(&self) -> &DataGrid {
        &self.grid
    }

    pub async fn run(&self, steps: &[Step]) -> Result<()> {
        for (index, step) in steps.iter().enumerate() {
            self.step.set(index);
            debug!(step = index, ?step, "Running step");
            self.run_step(step)
                .await
                .with_context(|| format!("step {} failed", index))?;
        }
        Ok(())
    }

    async fn run_step(&self, step: &Step) -> Result<()> {
        match step {
            Step::Command { id, payload } => {
                self.grid.execute(id, payload.clone()).await?;
            }
            Step::Key { chord } => {
                if !self.keys.handle_key(chord).await? {
                    warn!(chord = %chord, "No command bound");
                }
            }
            Step::Select { start, end, append } => {
                let start = CellCoordinates::new(start.0, start.1);
                let end = end.map_or(start, |(row, column)| CellCoordinates::new(row, column));
                if !self.grid.selection().select_range(start, end, !append) {
                    warn!(%start, %end, "Range not selectable");
                }
            }
            Step::Paste { text } => {
                self.clipboard.set_text(text.as_str());
                self.grid.execute("paste", None).await?;
            }
            Step::Edit { row, column, value } => self.edit(*row, column, value.clone())?,
        }
        Ok(())
    }

    fn edit(&self, row: usize, column: &str, value: Value) -> Result<()> {
        let helper = self.grid.helper();
        let Some(column_index) = helper.column_index(column) else {
            bail!("unknown column: {}", column);
        };
        let Some(current) = helper.row_data(row) else {
            bail!("row {} out of range", row);
        };
        if helper.is_cell_disabled(CellCoordinates::new(row, column_index)) {
            warn!(row, column, "Cell is disabled");
            return Ok(());
        }

        let mut updated = RowData::clone(&current);
        updated.insert(column.to_string(), value);
        self.grid.modifier().update_data(row, updated);
        Ok(())
    }

    pub fn report(&self) -> Report {
        Report {
            changes: self.changes.borrow().clone(),
            rows: self
                .grid
                .data()
                .iter()
                .map(|row| Value::Object(RowData::clone(row)))
                .collect(),
        }
    }
}
