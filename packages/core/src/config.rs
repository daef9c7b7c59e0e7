use crate::errors::{GridError, GridResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const DEFAULT_CONFIG_NAME: &str = "datagrid.config.json";

/// Declarative grid configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridConfig {
    /// Row field used to derive stable row ids
    #[serde(default = "default_row_key")]
    pub row_key: String,

    /// Forbid inserting, duplicating and deleting rows
    #[serde(default)]
    pub lock_rows: bool,

    /// Deleting an already-empty selection clears values instead of deleting rows
    #[serde(default)]
    pub disable_smart_delete: bool,

    /// Maximum undo levels (0 = unlimited)
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Pointer hold time before a click turns into a drag
    #[serde(default = "default_drag_delay_ms")]
    pub drag_delay_ms: u64,

    #[serde(default)]
    pub layout: GridLayout,

    #[serde(default)]
    pub columns: Vec<ColumnConfig>,

    /// Key chord to command id, merged over the default bindings
    #[serde(default)]
    pub key_bindings: BTreeMap<String, String>,
}

fn default_row_key() -> String {
    "id".to_string()
}

fn default_history_limit() -> usize {
    100
}

fn default_drag_delay_ms() -> u64 {
    120
}

/// Sizes passed through to the renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridLayout {
    #[serde(default = "default_column_min_width")]
    pub column_min_width: f32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_max_width: Option<f32>,

    #[serde(default = "default_header_height")]
    pub header_height: f32,

    #[serde(default = "default_row_height")]
    pub row_height: f32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer_height: Option<f32>,
}

fn default_column_min_width() -> f32 {
    100.0
}

fn default_header_height() -> f32 {
    40.0
}

fn default_row_height() -> f32 {
    40.0
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            column_min_width: default_column_min_width(),
            column_max_width: None,
            header_height: default_header_height(),
            row_height: default_row_height(),
            footer_height: None,
        }
    }
}

/// Column entry of the config file. Hooks are attached in code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnConfig {
    pub key: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,

    #[serde(default)]
    pub disabled: bool,

    #[serde(default = "default_true")]
    pub selectable: bool,
}

fn default_true() -> bool {
    true
}

impl GridConfig {
    /// Load `datagrid.config.json` from a directory, or defaults if absent
    pub fn load(dir: impl AsRef<Path>) -> GridResult<Self> {
        let path = dir.as_ref().join(DEFAULT_CONFIG_NAME);

        if path.exists() {
            Self::load_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_file(path: impl AsRef<Path>) -> GridResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| GridError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> GridResult<Self> {
        let config: GridConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> GridResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn validate(&self) -> GridResult<()> {
        if self.row_key.is_empty() {
            return Err(GridError::Config("rowKey must not be empty".to_string()));
        }

        let mut seen = std::collections::HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.key.as_str()) {
                return Err(GridError::Config(format!("duplicate column key: {}", column.key)));
            }
        }

        if let Some(max) = self.layout.column_max_width {
            if max < self.layout.column_min_width {
                return Err(GridError::Config(
                    "columnMaxWidth is smaller than columnMinWidth".to_string(),
                ));
            }
        }

        Ok(())
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            row_key: default_row_key(),
            lock_rows: false,
            disable_smart_delete: false,
            history_limit: default_history_limit(),
            drag_delay_ms: default_drag_delay_ms(),
            layout: GridLayout::default(),
            columns: Vec::new(),
            key_bindings: BTreeMap::new(),
        }
    }
}
