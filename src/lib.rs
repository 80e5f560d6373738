//! A headless sectioned table layout and view-recycling engine.
//!
//! This crate focuses on the core work behind a virtualized table: tracking
//! per-section row heights, cumulative offsets, and header/footer bands;
//! mapping scroll offsets to index paths and back; and recycling view
//! instances through reuse-identifier keyed queues so scrolling a large
//! dataset touches only the rows crossing the viewport edges.
//!
//! It is UI-agnostic. A presentation host (TUI/GUI scroll surface) is
//! expected to provide:
//! - viewport size and scroll offset
//! - a [`TableDataSource`] for row counts and configured row views
//! - a [`TableDelegate`] for row/header/footer heights and header/footer
//!   views (every method has a default: 42-point rows, no headers/footers)
//!
//! The host calls [`Table::reload_data`] when the dataset changes and
//! [`Table::layout_visible`] after scroll or viewport updates, then renders
//! whatever [`Table::for_each_visible_region`] yields.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod error;
mod pool;
mod section;
mod source;
mod table;
mod types;


pub use error::TableError;
pub use pool::{ReusableView, ReusePool};
pub use section::SectionGeometry;
pub use source::{DEFAULT_ROW_HEIGHT, TableDataSource, TableDelegate};
pub use table::{OnChangeCallback, Table};
pub use types::{IndexPath, Rect, Region, ScrollPosition, Viewport, VisibleRange};
