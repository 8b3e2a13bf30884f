//! The filter/sort pipeline from the full dataset to the display order.

use super::FilterState;
use super::SortState;
use super::sort::compare_rows;
use super::sort::stable_sort_by;
use crate::model::Dataset;
use crate::model::Row;
use crate::model::RowId;
use crate::selection::HiddenSet;

/// Where filtering and sorting happen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PipelineMode {
    /// Rows are filtered and sorted in memory.
    #[default]
    Local,
    /// An external source owns filtering and sorting; rows pass through in
    /// load order and the state is only forwarded.
    Remote,
}

/// Inputs of one pipeline run.
#[derive(Debug, Clone, Copy)]
pub struct Query<'a> {
    pub filter: &'a FilterState,
    pub sort: &'a SortState,
    pub hidden: &'a HiddenSet,
    /// Columns the global search looks at.
    pub visible_columns: &'a [String],
}

/// Pipeline output: identities in display order with their load positions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderedRows {
    ids: Vec<RowId>,
    positions: Vec<usize>,
    generation: u64,
}

impl OrderedRows {
    pub fn ids(&self) -> &[RowId] {
        &self.ids
    }

    /// Load positions, parallel to [`OrderedRows::ids`].
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Dataset generation this ordering was computed from.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Display position of an identity.
    pub fn index_of(&self, id: RowId) -> Option<usize> {
        self.ids.iter().position(|&i| i == id)
    }

    /// Rows in display order.
    pub fn rows<'a>(&'a self, dataset: &'a Dataset) -> impl Iterator<Item = &'a Row> + 'a {
        self.positions.iter().filter_map(|&p| dataset.row_at(p))
    }
}

/// Runs hidden exclusion, global search, column filters and the multi-key
/// sort, strictly in that order.
pub fn recompute(dataset: &Dataset, query: Query<'_>, mode: PipelineMode) -> OrderedRows {
    let generation = dataset.generation();
    if mode == PipelineMode::Remote {
        return OrderedRows {
            ids: dataset.ids(),
            positions: (0..dataset.len()).collect(),
            generation,
        };
    }

    let columns = dataset.columns();
    let search = query.filter.search();
    let search_columns: Vec<usize> = query
        .visible_columns
        .iter()
        .filter_map(|c| columns.index_of(c))
        .collect();
    let column_filters: Vec<(usize, &str)> = query
        .filter
        .columns()
        .filter_map(|(c, term)| columns.index_of(c).map(|i| (i, term)))
        .collect();

    let mut positions: Vec<usize> = dataset
        .rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| !query.hidden.contains(row.id()))
        .filter(|(_, row)| {
            search.is_empty()
                || search_columns
                    .iter()
                    .any(|&c| cell_contains(row, c, search))
        })
        .filter(|(_, row)| {
            column_filters
                .iter()
                .all(|&(c, term)| cell_contains(row, c, term))
        })
        .map(|(p, _)| p)
        .collect();

    let keys: Vec<_> = query
        .sort
        .keys()
        .iter()
        .filter_map(|k| columns.index_of(&k.column).map(|i| (i, k.direction)))
        .collect();
    if !keys.is_empty() {
        let rows = dataset.rows();
        stable_sort_by(&mut positions, |&a, &b| {
            compare_rows(&keys, rows[a].cells(), rows[b].cells())
        });
    }

    log::trace!(
        "pipeline: {} of {} rows after filters, {} sort keys",
        positions.len(),
        dataset.len(),
        keys.len()
    );

    OrderedRows {
        ids: positions.iter().map(|&p| dataset.rows()[p].id()).collect(),
        positions,
        generation,
    }
}

fn cell_contains(row: &Row, column: usize, term: &str) -> bool {
    row.cell(column).display().to_lowercase().contains(term)
}

/// Caches the last pipeline output and knows when it is stale.
#[derive(Debug, Default)]
pub struct FilterSortEngine {
    mode: PipelineMode,
    cache: Option<OrderedRows>,
}

impl FilterSortEngine {
    pub fn new(mode: PipelineMode) -> Self {
        Self { mode, cache: None }
    }

    pub fn mode(&self) -> PipelineMode {
        self.mode
    }

    /// Drops the cached ordering; the next [`FilterSortEngine::refresh`] recomputes.
    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    /// Returns `true` if there is no cached ordering for this dataset generation.
    pub fn is_stale(&self, dataset: &Dataset) -> bool {
        self.cache
            .as_ref()
            .is_none_or(|c| c.generation != dataset.generation())
    }

    /// Recomputes the ordering if stale and returns it.
    pub fn refresh(&mut self, dataset: &Dataset, query: Query<'_>) -> &OrderedRows {
        if self.is_stale(dataset) {
            self.cache = Some(recompute(dataset, query, self.mode));
        }
        self.cache.get_or_insert_with(OrderedRows::default)
    }

    /// The cached ordering, if it belongs to the dataset's current generation.
    pub fn output(&self, dataset: &Dataset) -> Option<&OrderedRows> {
        self.cache
            .as_ref()
            .filter(|c| c.generation == dataset.generation())
    }
}
