//! Virtualized tabular viewport
//!
//! Only the rows on screen are materialized. A small pool of
//! [`display_slot::DisplaySlot`]s is recycled as the user scrolls, and every
//! slot scrolls horizontally on its own while the
//! [`scroll_sync::ScrollCoordinator`] keeps them moving together.
//!
//! ```text
//! host (SlotPool)
//!   └── TableController::bind(slot, position)
//!         ├── RowRegistry::resolve(position)  -> Header | Data { logical_row }
//!         ├── DataProvider::get_row(logical_row)
//!         ├── CellLabeler                      -> display strings
//!         └── ScrollCoordinator::register/adopt
//! ```

use std::fmt;

pub mod cell_label;
pub mod column_layout;
pub mod controller;
pub mod display_slot;
pub mod row_registry;
pub mod scroll_sync;

pub use cell_label::CellLabeler;
pub use column_layout::{ColumnLayout, LayoutSettings};
pub use controller::{BindOutcome, BindStats, RowContent, TableController};
pub use display_slot::{DisplaySlot, SlotBinding};
pub use row_registry::{RowRegistry, SlotKind};
pub use scroll_sync::{RowScroll, ScrollCoordinator};

/// Contract violations raised by the viewport core
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewportError {
    /// The host asked for a display position past the last row
    PositionOutOfRange { position: usize, item_count: usize },
    /// The controller was torn down and no longer has a dataset
    Detached,
}

impl fmt::Display for ViewportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewportError::PositionOutOfRange {
                position,
                item_count,
            } => write!(
                f,
                "display position {} out of range (item count {})",
                position, item_count
            ),
            ViewportError::Detached => write!(f, "viewport has been torn down"),
        }
    }
}

impl std::error::Error for ViewportError {}
