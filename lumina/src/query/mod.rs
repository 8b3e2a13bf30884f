//! Filtering and sorting.
//!
//! [`recompute`] turns the dataset plus the current [`FilterState`],
//! [`SortState`] and hidden rows into the display order.
//! [`FilterSortEngine`] caches that output per dataset generation.
//!
//! # Example
//!
//! ```
//! use lumina::model::{Dataset, RowId};
//! use lumina::query::{recompute, FilterState, PipelineMode, Query, SortState};
//! use lumina::selection::HiddenSet;
//!
//! let dataset = Dataset::load(
//!     vec!["name".into(), "val".into()],
//!     vec![],
//!     vec![vec!["b".into(), 2.into()], vec!["a".into(), 1.into()]],
//! )
//! .unwrap();
//!
//! let filter = FilterState::default();
//! let sort = SortState::asc("val");
//! let hidden = HiddenSet::default();
//! let visible = dataset.columns().names().to_vec();
//! let query = Query { filter: &filter, sort: &sort, hidden: &hidden, visible_columns: &visible };
//!
//! let ordered = recompute(&dataset, query, PipelineMode::Local);
//! assert_eq!(ordered.ids(), &[RowId(1), RowId(0)]);
//! ```

mod filter;
mod pipeline;
mod sort;

pub use filter::*;
pub use pipeline::*;
pub use sort::Direction;
pub use sort::SortKey;
pub use sort::SortState;
pub use sort::compare_cells;
