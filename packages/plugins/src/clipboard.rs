//! # Clipboard
//!
//! `copy`, `cut` and `paste` commands over a pluggable [`ClipboardBackend`].
//! The grid side only deals in blocks of cell text; backends decide how a
//! block is stored. [`MemoryClipboard`] keeps it as tab-separated text, the
//! format spreadsheets exchange.
//!
//! Paste writes into the last selected range through
//! [`DataModifier::set_range_data`](datagrid_core::DataModifier::set_range_data),
//! so column paste hooks, broadcasting and row appending all apply. The
//! pasted area is selected afterwards.

use datagrid_core::{
    CellCoordinates, CellRange, Command, DataGrid, GridError, GridResult, Plugin, Unsubscribes,
    WeakDataGrid,
};
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

pub const CLIPBOARD_KEY: &str = "clipboard";
/// Source tag of the clipboard commands
pub const CLIPBOARD_SOURCE: &str = "clipboard";

pub trait ClipboardBackend {
    fn write(&self, block: Vec<Vec<String>>) -> GridResult<()>;

    /// `None` when the clipboard is empty
    fn read(&self) -> GridResult<Option<Vec<Vec<String>>>>;
}

/// Process-local clipboard holding tab-separated text
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    text: Rc<RefCell<Option<String>>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> Option<String> {
        self.text.borrow().clone()
    }

    /// Put raw text on the clipboard, as another application would
    pub fn set_text(&self, text: impl Into<String>) {
        *self.text.borrow_mut() = Some(text.into());
    }
}

impl ClipboardBackend for MemoryClipboard {
    fn write(&self, block: Vec<Vec<String>>) -> GridResult<()> {
        self.set_text(format_tsv(&block));
        Ok(())
    }

    fn read(&self) -> GridResult<Option<Vec<Vec<String>>>> {
        Ok(self.text.borrow().as_deref().map(parse_tsv))
    }
}

/// Rows joined by `\n`, cells by `\t`
pub fn format_tsv(block: &[Vec<String>]) -> String {
    block
        .iter()
        .map(|row| row.join("\t"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Inverse of [`format_tsv`]. Accepts `\r\n` and ignores one trailing newline.
pub fn parse_tsv(text: &str) -> Vec<Vec<String>> {
    let text = text.strip_suffix('\n').unwrap_or(text);
    let text = text.strip_suffix('\r').unwrap_or(text);
    if text.is_empty() {
        return Vec::new();
    }
    text.split('\n')
        .map(|line| {
            line.strip_suffix('\r')
                .unwrap_or(line)
                .split('\t')
                .map(str::to_string)
                .collect()
        })
        .collect()
}

#[derive(Clone)]
pub struct ClipboardPlugin {
    backend: Rc<dyn ClipboardBackend>,
}

impl ClipboardPlugin {
    pub fn new(backend: impl ClipboardBackend + 'static) -> Self {
        Self {
            backend: Rc::new(backend),
        }
    }

    pub fn with_shared_backend(backend: Rc<dyn ClipboardBackend>) -> Self {
        Self { backend }
    }
}

fn live(weak: &WeakDataGrid, id: &str) -> GridResult<DataGrid> {
    weak.upgrade()
        .ok_or_else(|| GridError::command_failed(id, "grid dropped"))
}

fn copy_selection(
    grid: &DataGrid,
    backend: &dyn ClipboardBackend,
) -> GridResult<Option<CellRange>> {
    let Some(range) = grid.selection().last_range() else {
        return Ok(None);
    };
    let block = grid.helper().get_range_data(&range.range);
    if block.is_empty() {
        return Ok(None);
    }
    debug!(rows = block.len(), "Copied range");
    backend.write(block)?;
    Ok(Some(range.range))
}

async fn paste_block(grid: DataGrid, block: Vec<Vec<String>>) -> GridResult<()> {
    let Some(range) = grid.selection().last_range() else {
        return Ok(());
    };
    let height = block.len();
    let width = block.iter().map(Vec::len).max().unwrap_or(0);
    if width == 0 {
        return Ok(());
    }

    let values = block
        .into_iter()
        .map(|row| row.into_iter().map(Value::String).collect())
        .collect();
    if !grid.modifier().set_range_data(&range.range, values).await {
        return Ok(());
    }

    // Select what was written, clipped to the (possibly grown) grid
    let b = range.boundary();
    let Some(last) = grid.helper().last_cell() else {
        return Ok(());
    };
    let rows = if height == 1 { range.range.row_count() } else { height };
    let end = CellCoordinates::new(
        (b.min.row_index + rows - 1).min(last.row_index),
        (b.min.column_index + width - 1).min(last.column_index),
    );
    grid.selection().select_range(b.min, end, true);
    Ok(())
}

impl Plugin for ClipboardPlugin {
    fn key(&self) -> &str {
        CLIPBOARD_KEY
    }

    fn handle_activate(&self, grid: &DataGrid, unsubscribes: &mut Unsubscribes) -> GridResult<()> {
        let weak = grid.downgrade();

        let copy = {
            let (weak, backend) = (weak.clone(), Rc::clone(&self.backend));
            Command::sync("copy", CLIPBOARD_SOURCE, move |_| {
                let grid = live(&weak, "copy")?;
                copy_selection(&grid, backend.as_ref()).map(|_| ())
            })
            .with_label("Copy")
        };

        let cut = {
            let (weak, backend) = (weak.clone(), Rc::clone(&self.backend));
            Command::new("cut", CLIPBOARD_SOURCE, move |_| {
                let copied = live(&weak, "cut")
                    .and_then(|grid| Ok((copy_selection(&grid, backend.as_ref())?, grid)));
                async move {
                    if let (Some(range), grid) = copied? {
                        grid.modifier().empty_range(&range).await;
                    }
                    Ok::<(), GridError>(())
                }
            })
            .with_label("Cut")
        };

        let paste = {
            let (weak, backend) = (weak.clone(), Rc::clone(&self.backend));
            Command::new("paste", CLIPBOARD_SOURCE, move |_| {
                let ready = live(&weak, "paste").and_then(|grid| Ok((grid, backend.read()?)));
                async move {
                    match ready? {
                        (grid, Some(block)) => paste_block(grid, block).await,
                        (_, None) => Ok(()),
                    }
                }
            })
            .with_label("Paste")
        };

        grid.commands().register(vec![copy, cut, paste])?;

        unsubscribes.push(move || {
            if let Some(grid) = weak.upgrade() {
                grid.commands().unregister_all(CLIPBOARD_SOURCE);
            }
        });
        Ok(())
    }
}

impl std::fmt::Debug for ClipboardPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ClipboardPlugin")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tsv_round_trip() {
        let block = vec![
            vec!["a".to_string(), "b".to_string()],
            vec!["".to_string(), "3".to_string()],
        ];
        assert_eq!(format_tsv(&block), "a\tb\n\t3");
        assert_eq!(parse_tsv(&format_tsv(&block)), block);
    }

    #[test]
    fn test_parse_tsv_spreadsheet_text() {
        assert_eq!(
            parse_tsv("x\ty\r\n1\t2\r\n"),
            vec![vec!["x", "y"], vec!["1", "2"]]
        );
        assert!(parse_tsv("").is_empty());
        assert!(parse_tsv("\n").is_empty());
    }

    #[test]
    fn test_memory_clipboard() {
        let clipboard = MemoryClipboard::new();
        assert_eq!(clipboard.read().unwrap(), None);

        clipboard.write(vec![vec!["1".into()]]).unwrap();
        assert_eq!(clipboard.text().as_deref(), Some("1"));

        clipboard.set_text("p\tq");
        assert_eq!(clipboard.read().unwrap(), Some(vec![vec!["p".to_string(), "q".to_string()]]));
    }
}
