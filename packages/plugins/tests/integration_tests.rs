//! Plugins attached to a live grid

mod common;

use common::host;
use datagrid_core::{CellCoordinates, CellRange, Column, RowOperation};
use datagrid_plugins::clipboard::CLIPBOARD_KEY;
use datagrid_plugins::pinning::PINNING_KEY;
use datagrid_plugins::{
    ClipboardPlugin, FillHandlePlugin, KeyBindingsPlugin, MemoryClipboard, Pin, PinningPlugin,
    StayInViewPlugin,
};
use serde_json::{json, Value};

fn at(row: usize, column: usize) -> CellCoordinates {
    CellCoordinates::new(row, column)
}

fn last_range(host: &common::Host) -> CellRange {
    host.grid.selection().last_range().unwrap().boundary().to_range()
}

#[tokio::test]
async fn test_copy_then_paste_block() {
    let host = host(6);
    let clipboard = MemoryClipboard::new();
    host.grid.add_plugin(ClipboardPlugin::new(clipboard.clone())).unwrap();

    host.grid.selection().select_range(at(0, 1), at(1, 2), true);
    host.grid.execute("copy", None).await.unwrap();
    assert_eq!(clipboard.text().as_deref(), Some("row 0\t0\nrow 1\t10"));

    host.grid.selection().select_range(at(3, 1), at(3, 1), true);
    host.grid.execute("paste", None).await.unwrap();

    assert_eq!(host.last_operations(), vec![RowOperation::update(3, 5)]);
    assert_eq!(host.value(3, "name"), json!("row 0"));
    assert_eq!(host.value(4, "qty"), json!("10"));
    assert_eq!(host.value(5, "name"), json!("row 5"));
    assert_eq!(last_range(&host), CellRange::from_bounds((3, 1), (4, 2)));
}

#[tokio::test]
async fn test_paste_appends_rows_past_the_end() {
    let host = host(3);
    let clipboard = MemoryClipboard::new();
    host.grid.add_plugin(ClipboardPlugin::new(clipboard.clone())).unwrap();

    clipboard.set_text("a\nb\nc\n");
    host.grid.selection().start_selection(at(2, 1));
    host.grid.execute("paste", None).await.unwrap();

    assert_eq!(
        host.last_operations(),
        vec![RowOperation::update(2, 3), RowOperation::create(3, 5)]
    );
    assert_eq!(
        host.column_values("name"),
        vec![json!("row 0"), json!("row 1"), json!("a"), json!("b"), json!("c")]
    );
    assert_eq!(last_range(&host), CellRange::from_bounds((2, 1), (4, 1)));
}

#[tokio::test]
async fn test_single_value_paste_fills_selection() {
    let host = host(5);
    let clipboard = MemoryClipboard::new();
    host.grid.add_plugin(ClipboardPlugin::new(clipboard.clone())).unwrap();

    clipboard.set_text("z");
    host.grid.selection().select_range(at(1, 1), at(3, 1), true);
    host.grid.execute("paste", None).await.unwrap();

    assert_eq!(host.last_operations(), vec![RowOperation::update(1, 4)]);
    for row in 1..=3 {
        assert_eq!(host.value(row, "name"), json!("z"));
    }
    assert_eq!(last_range(&host), CellRange::from_bounds((1, 1), (3, 1)));
}

#[tokio::test]
async fn test_cut_copies_and_clears() {
    let host = host(3);
    let clipboard = MemoryClipboard::new();
    host.grid.add_plugin(ClipboardPlugin::new(clipboard.clone())).unwrap();

    host.grid.selection().start_selection(at(1, 1));
    host.grid.execute("cut", None).await.unwrap();

    assert_eq!(clipboard.text().as_deref(), Some("row 1"));
    assert_eq!(host.value(1, "name"), Value::Null);

    assert!(host.grid.undo());
    assert_eq!(host.value(1, "name"), json!("row 1"));
}

#[tokio::test]
async fn test_empty_clipboard_paste_is_a_no_op() {
    let host = host(3);
    host.grid.add_plugin(ClipboardPlugin::new(MemoryClipboard::new())).unwrap();

    host.grid.selection().start_selection(at(0, 0));
    assert!(host.grid.execute("paste", None).await.unwrap());
    assert!(host.changes.borrow().is_empty());
}

#[tokio::test]
async fn test_clipboard_commands_go_away_with_the_plugin() {
    let host = host(3);
    host.grid.add_plugin(ClipboardPlugin::new(MemoryClipboard::new())).unwrap();
    assert!(host.grid.commands().contains("copy"));

    host.grid.remove_plugin(CLIPBOARD_KEY).unwrap();
    assert!(!host.grid.commands().contains("copy"));
    assert!(!host.grid.commands().contains("paste"));
    assert!(host.grid.commands().contains("undo"));
}

#[tokio::test]
async fn test_fill_down_repeats_source_block() {
    let host = host(6);
    let fill = FillHandlePlugin::new();
    host.grid.add_plugin(fill.clone()).unwrap();

    host.grid.selection().select_range(at(0, 2), at(1, 2), true);
    assert!(fill.start_fill());
    assert!(fill.extend_fill(at(5, 2)));
    assert_eq!(
        fill.state().get().unwrap().target,
        CellRange::from_bounds((0, 2), (5, 2))
    );

    assert!(fill.finish_fill().await);
    assert_eq!(host.last_operations(), vec![RowOperation::update(2, 6)]);
    assert_eq!(
        host.column_values("qty"),
        vec![json!(0), json!(10), json!(0), json!(10), json!(0), json!(10)]
    );
    assert_eq!(last_range(&host), CellRange::from_bounds((0, 2), (5, 2)));
    assert_eq!(fill.state().get(), None);
}

#[tokio::test]
async fn test_fill_up() {
    let host = host(5);
    let fill = FillHandlePlugin::new();
    host.grid.add_plugin(fill.clone()).unwrap();

    host.grid.selection().start_selection(at(3, 1));
    fill.start_fill();
    fill.extend_fill(at(1, 0));

    assert!(fill.finish_fill().await);
    assert_eq!(host.last_operations(), vec![RowOperation::update(1, 3)]);
    assert_eq!(host.value(1, "name"), json!("row 3"));
    assert_eq!(host.value(2, "name"), json!("row 3"));
    assert_eq!(host.value(0, "name"), json!("row 0"));
}

#[tokio::test]
async fn test_fill_without_extension_or_after_cancel() {
    let host = host(4);
    let fill = FillHandlePlugin::new();
    host.grid.add_plugin(fill.clone()).unwrap();

    host.grid.selection().start_selection(at(1, 1));
    fill.start_fill();
    assert!(!fill.extend_fill(at(1, 0)));
    assert!(!fill.finish_fill().await);

    fill.start_fill();
    fill.extend_fill(at(3, 1));
    fill.cancel_fill();
    assert!(!fill.finish_fill().await);
    assert!(host.changes.borrow().is_empty());
}

#[test]
fn test_pinned_header_order() {
    let host = host(3);
    let pinning = PinningPlugin::new();
    host.grid.add_plugin(pinning.clone()).unwrap();

    assert!(pinning.pin_column("qty", Pin::Left));
    assert!(pinning.pin_column("id", Pin::Right));
    assert!(!pinning.pin_column("missing", Pin::Left));
    assert!(!pinning.pin_column("name", Pin::Top));

    let keys: Vec<String> = pinning
        .ordered_headers()
        .iter()
        .map(|header| header.key().to_string())
        .collect();
    assert_eq!(keys, vec!["qty", "name", "id"]);
}

#[test]
fn test_pins_follow_vanishing_columns_and_rows() {
    let host = host(4);
    let pinning = PinningPlugin::new();
    host.grid.add_plugin(pinning.clone()).unwrap();

    pinning.pin_column("qty", Pin::Right);
    pinning.pin_row("2", Pin::Top);
    assert_eq!(pinning.ordered_rows()[0].key, "2");

    host.grid.set_columns(vec![Column::new("id"), Column::new("name")]);
    assert_eq!(pinning.column_pin("qty"), None);
    assert_eq!(pinning.row_pin("2"), Some(Pin::Top));

    assert!(host.grid.modifier().delete_rows(2, 2));
    assert_eq!(pinning.row_pin("2"), None);
}

#[tokio::test]
async fn test_pin_commands() {
    let host = host(3);
    let pinning = PinningPlugin::new();
    host.grid.add_plugin(pinning.clone()).unwrap();

    host.grid.selection().start_selection(at(0, 1));
    host.grid.execute("pin-column-right", None).await.unwrap();
    assert_eq!(pinning.column_pin("name"), Some(Pin::Right));

    host.grid
        .execute("pin-column-left", Some(json!("id")))
        .await
        .unwrap();
    assert_eq!(pinning.column_pin("id"), Some(Pin::Left));

    host.grid
        .execute("unpin-column", Some(json!("name")))
        .await
        .unwrap();
    assert_eq!(pinning.column_pin("name"), None);

    host.grid.remove_plugin(PINNING_KEY).unwrap();
    assert!(!host.grid.commands().contains("pin-column-left"));
}

#[tokio::test]
async fn test_key_bindings_drive_commands() {
    let host = host(4);
    let keys = KeyBindingsPlugin::new();
    let view = StayInViewPlugin::new();
    host.grid.add_plugin(keys.clone()).unwrap();
    host.grid.add_plugin(view.clone()).unwrap();

    host.grid.selection().start_selection(at(0, 0));
    assert!(keys.handle_key("ArrowDown").await.unwrap());
    assert_eq!(
        host.grid.selection().active_cell().unwrap().coordinates,
        at(1, 0)
    );
    assert_eq!(view.target().get(), Some(at(1, 0).id()));

    assert!(keys.handle_key("Shift+ArrowRight").await.unwrap());
    assert_eq!(last_range(&host), CellRange::from_bounds((1, 0), (1, 1)));
    assert_eq!(view.target().get(), Some(at(1, 1).id()));

    assert!(!keys.handle_key("q").await.unwrap());
    // Bound, but no clipboard plugin installed
    assert!(!keys.handle_key("ctrl+c").await.unwrap());
}

#[tokio::test]
async fn test_key_bindings_undo_redo() {
    let host = host(3);
    let keys = KeyBindingsPlugin::new();
    host.grid.add_plugin(keys.clone()).unwrap();

    host.grid.selection().start_selection(at(0, 1));
    host.grid
        .modifier()
        .set_range_data(&CellRange::from_bounds((0, 1), (0, 1)), vec![vec![json!("new")]])
        .await;
    assert_eq!(host.value(0, "name"), json!("new"));

    assert!(keys.handle_key("Ctrl+Z").await.unwrap());
    assert_eq!(host.value(0, "name"), json!("row 0"));

    assert!(keys.handle_key("cmd+shift+z").await.unwrap());
    assert_eq!(host.value(0, "name"), json!("new"));
}

#[tokio::test]
async fn test_unbound_plugin_handles_nothing() {
    let keys = KeyBindingsPlugin::new();
    assert!(!keys.handle_key("arrowdown").await.unwrap());
}
