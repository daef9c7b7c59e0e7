//! # Key bindings
//!
//! Maps key chords to command ids and runs them through the command bus.
//! Chords are written `modifier+...+key` in any case and modifier order;
//! they are normalized to `ctrl+shift+alt+key` before lookup, with `cmd`
//! and `meta` folded into `ctrl`.
//!
//! Overrides (from `GridConfig::key_bindings` or a JSON object) replace
//! defaults chord by chord. Binding a chord to `""` removes it.

use datagrid_core::{DataGrid, GridConfig, GridResult, Plugin, Unsubscribes, WeakDataGrid};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::debug;

pub const KEY_BINDINGS_KEY: &str = "key-bindings";

const DEFAULT_BINDINGS: &[(&str, &str)] = &[
    ("arrowup", "navigate-up"),
    ("arrowdown", "navigate-down"),
    ("arrowleft", "navigate-left"),
    ("arrowright", "navigate-right"),
    ("shift+arrowup", "expand-upper"),
    ("shift+arrowdown", "expand-lower"),
    ("shift+arrowleft", "expand-left"),
    ("shift+arrowright", "expand-right"),
    ("ctrl+arrowup", "jump-top"),
    ("ctrl+arrowdown", "jump-bottom"),
    ("ctrl+arrowleft", "jump-left"),
    ("ctrl+arrowright", "jump-right"),
    ("ctrl+a", "select-all"),
    ("ctrl+z", "undo"),
    ("ctrl+shift+z", "redo"),
    ("ctrl+y", "redo"),
    ("delete", "delete-selection"),
    ("backspace", "delete-selection"),
    ("enter", "start-editing"),
    ("f2", "start-editing"),
    ("escape", "stop-editing"),
    ("ctrl+c", "copy"),
    ("ctrl+x", "cut"),
    ("ctrl+v", "paste"),
];

/// Canonical form of a chord: `ctrl+shift+alt+key`, lowercase
pub fn normalize_chord(chord: &str) -> String {
    let chord = chord.to_lowercase();
    let (mut ctrl, mut shift, mut alt) = (false, false, false);
    let mut key = "";

    for part in chord.split('+').map(str::trim) {
        match part {
            "ctrl" | "control" | "cmd" | "meta" => ctrl = true,
            "shift" => shift = true,
            "alt" | "option" => alt = true,
            _ => key = part,
        }
    }

    let mut normalized = String::new();
    if ctrl {
        normalized.push_str("ctrl+");
    }
    if shift {
        normalized.push_str("shift+");
    }
    if alt {
        normalized.push_str("alt+");
    }
    normalized.push_str(key);
    normalized
}

pub fn default_bindings() -> BTreeMap<String, String> {
    DEFAULT_BINDINGS
        .iter()
        .map(|(chord, command)| (chord.to_string(), command.to_string()))
        .collect()
}

#[derive(Clone)]
pub struct KeyBindingsPlugin {
    bindings: Rc<RefCell<BTreeMap<String, String>>>,
    grid: Rc<RefCell<Option<WeakDataGrid>>>,
}

impl KeyBindingsPlugin {
    pub fn new() -> Self {
        Self {
            bindings: Rc::new(RefCell::new(default_bindings())),
            grid: Rc::new(RefCell::new(None)),
        }
    }

    pub fn from_config(config: &GridConfig) -> Self {
        let plugin = Self::new();
        plugin.apply_overrides(&config.key_bindings);
        plugin
    }

    /// Overrides from a JSON object of `chord: command`
    pub fn from_json(json: &str) -> GridResult<Self> {
        let overrides: BTreeMap<String, String> = serde_json::from_str(json)?;
        let plugin = Self::new();
        plugin.apply_overrides(&overrides);
        Ok(plugin)
    }

    pub fn apply_overrides(&self, overrides: &BTreeMap<String, String>) {
        let mut bindings = self.bindings.borrow_mut();
        for (chord, command) in overrides {
            let chord = normalize_chord(chord);
            if command.is_empty() {
                bindings.remove(&chord);
            } else {
                bindings.insert(chord, command.clone());
            }
        }
    }

    pub fn bind(&self, chord: &str, command: impl Into<String>) {
        self.bindings
            .borrow_mut()
            .insert(normalize_chord(chord), command.into());
    }

    pub fn unbind(&self, chord: &str) -> Option<String> {
        self.bindings.borrow_mut().remove(&normalize_chord(chord))
    }

    pub fn command_for(&self, chord: &str) -> Option<String> {
        self.bindings.borrow().get(&normalize_chord(chord)).cloned()
    }

    pub fn bindings(&self) -> BTreeMap<String, String> {
        self.bindings.borrow().clone()
    }

    /// Run the command bound to `chord`. Returns whether a binding matched
    /// a registered command.
    pub async fn handle_key(&self, chord: &str) -> GridResult<bool> {
        let Some(command) = self.command_for(chord) else {
            return Ok(false);
        };
        let Some(grid) = self.grid.borrow().as_ref().and_then(WeakDataGrid::upgrade) else {
            return Ok(false);
        };
        if !grid.commands().contains(&command) {
            debug!(chord, command = %command, "Bound command not registered");
            return Ok(false);
        }
        grid.execute(&command, None).await
    }
}

impl Default for KeyBindingsPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for KeyBindingsPlugin {
    fn key(&self) -> &str {
        KEY_BINDINGS_KEY
    }

    fn handle_activate(&self, grid: &DataGrid, unsubscribes: &mut Unsubscribes) -> GridResult<()> {
        *self.grid.borrow_mut() = Some(grid.downgrade());
        let slot = Rc::clone(&self.grid);
        unsubscribes.push(move || {
            slot.borrow_mut().take();
        });
        Ok(())
    }
}

impl std::fmt::Debug for KeyBindingsPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyBindingsPlugin")
            .field("bindings", &self.bindings.borrow().len())
            .finish()
    }
}
