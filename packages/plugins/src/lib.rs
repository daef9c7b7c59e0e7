//! Optional grid features, built on the public `datagrid-core` API only.
//!
//! Each feature is a [`Plugin`](datagrid_core::Plugin) handle. Keep a clone
//! to call its methods and hand another to
//! [`DataGrid::add_plugin`](datagrid_core::DataGrid::add_plugin):
//!
//! ```rust,ignore
//! let fill = FillHandlePlugin::new();
//! grid.add_plugin(fill.clone())?;
//! grid.add_plugin(ClipboardPlugin::new(MemoryClipboard::new()))?;
//!
//! fill.start_fill();
//! fill.extend_fill(CellCoordinates::new(9, 0));
//! fill.finish_fill().await;
//! ```

pub mod clipboard;
pub mod fill_handle;
pub mod keybindings;
pub mod pinning;
pub mod stay_in_view;

pub use clipboard::{ClipboardBackend, ClipboardPlugin, MemoryClipboard, CLIPBOARD_SOURCE};
pub use fill_handle::{FillHandlePlugin, FillState};
pub use keybindings::{default_bindings, normalize_chord, KeyBindingsPlugin};
pub use pinning::{Pin, PinningPlugin, PINNING_SOURCE};
pub use stay_in_view::StayInViewPlugin;
