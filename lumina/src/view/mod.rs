//! What part of the display order is rendered.
//!
//! - [`slice`] computes the window for paged, scrolling and virtualized views
//! - [`Pager`] and [`Summary`] describe the footer
//! - [`ColumnVisibility`] tracks which columns are shown

mod columns;
mod pager;
mod window;

pub use columns::*;
pub use pager::*;
pub use window::*;
