//! Data model types
//!
//! This module contains the core data types:
//! - [`CellValue`] - Dynamic cell value
//! - [`Dataset`] - Rows with persistent [`RowId`]s
//! - [`ColumnSet`] - Ordered columns plus the markup subset

mod dataset;
mod value;

pub use dataset::*;
pub use value::*;
