//! Ready-made widgets for **trellis**.
//!
//! Every widget implements [`trellis_core::Component`], so it can be embedded
//! in any [`trellis_core::Model`] and placed freely within [`ratatui`]
//! layouts. Widgets report what the user did as messages; state the parent
//! owns (sort, filters, page, a controlled selection) is fed back through
//! setters.
//!
//! # Widgets
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`data_table`] | Sortable, filterable, selectable, expandable table with a loading skeleton |
//! | [`pager`] | Prev / Next page controls |
//! | [`wizard`] | Multi-step wizard with sync/async validation and optional steps |
//!
//! # Utilities
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`key`] | Configurable key bindings and hint lines |
//! | [`table_state`] | Selection, expansion, sort and filter transitions |
//! | [`theme`] | Light/dark detection and palettes |

pub mod data_table;
pub mod key;
pub mod pager;
pub mod table_state;
pub mod theme;
pub mod wizard;
