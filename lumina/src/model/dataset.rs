//! Dataset storage with persistent row identities

use std::collections::HashMap;
use std::collections::HashSet;
use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use super::CellValue;
use crate::error::ConfigError;

/// Reserved column carrying the persistent row identity in widget payloads.
pub const ROW_INDEX_COLUMN: &str = "__rowIndex__";

static NULL_CELL: CellValue = CellValue::Null;

/// Persistent identity of a row, assigned once at load time.
///
/// Identities survive sorting, filtering and hiding; they are never reused
/// within a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(pub u64);

impl RowId {
    /// Returns the raw identity value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for RowId {
    fn from(value: u64) -> Self {
        RowId(value)
    }
}

/// A row of cells plus its identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    id: RowId,
    cells: Vec<CellValue>,
}

impl Row {
    /// The row's persistent identity.
    pub fn id(&self) -> RowId {
        self.id
    }

    /// All cells in column order.
    pub fn cells(&self) -> &[CellValue] {
        &self.cells
    }

    /// Cell at a column position; missing cells read as `Null`.
    pub fn cell(&self, column: usize) -> &CellValue {
        self.cells.get(column).unwrap_or(&NULL_CELL)
    }
}

/// Ordered column names plus the subset holding pre-rendered markup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnSet {
    names: Vec<String>,
    html: HashSet<String>,
}

impl ColumnSet {
    /// Creates a column set. HTML names that are not columns are ignored.
    pub fn new(names: Vec<String>, html: impl IntoIterator<Item = String>) -> Self {
        let html = html.into_iter().filter(|h| names.contains(h)).collect();
        Self { names, html }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Position of a column by name.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// Returns `true` if the column's cells are markup rather than text.
    pub fn is_html(&self, name: &str) -> bool {
        self.html.contains(name)
    }
}

/// The full dataset, owned by the grid and replaced only wholesale.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    columns: ColumnSet,
    rows: Vec<Row>,
    index: HashMap<RowId, usize>,
    generation: u64,
}

impl Dataset {
    /// Loads raw rows, assigning identities.
    ///
    /// When the last column is [`ROW_INDEX_COLUMN`] it is removed and each
    /// row's trailing value becomes its identity. Rows without a usable
    /// identity fall back to their load position.
    pub fn load(
        columns: Vec<String>,
        html_columns: Vec<String>,
        rows: Vec<Vec<CellValue>>,
    ) -> Result<Self, ConfigError> {
        let mut columns = columns;
        let has_sentinel = columns.last().is_some_and(|c| c == ROW_INDEX_COLUMN);
        if has_sentinel {
            columns.pop();
        }
        if columns.is_empty() {
            return Err(ConfigError::NoColumns);
        }
        let width = columns.len();

        let mut loaded = Vec::with_capacity(rows.len());
        let mut index = HashMap::with_capacity(rows.len());
        for (position, mut cells) in rows.into_iter().enumerate() {
            let id = if cells.len() == width + 1 {
                cells.pop().as_ref().and_then(identity_from_cell)
            } else {
                None
            }
            .unwrap_or(RowId(position as u64));

            cells.resize(width, CellValue::Null);
            if index.insert(id, position).is_some() {
                return Err(ConfigError::duplicate_identity(id, position));
            }
            loaded.push(Row { id, cells });
        }

        log::debug!("loaded dataset: {} rows x {} columns", loaded.len(), width);
        Ok(Self {
            columns: ColumnSet::new(columns, html_columns),
            rows: loaded,
            index,
            generation: 0,
        })
    }

    /// Replaces the dataset wholesale, advancing the generation.
    pub fn replace(&mut self, next: Dataset) {
        let generation = self.generation + 1;
        *self = next;
        self.generation = generation;
        log::debug!("dataset replaced (generation {})", generation);
    }

    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    /// Rows in load order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Incremented on every [`Dataset::replace`].
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Load position of an identity.
    pub fn position_of(&self, id: RowId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn row(&self, id: RowId) -> Option<&Row> {
        self.position_of(id).map(|p| &self.rows[p])
    }

    pub fn row_at(&self, position: usize) -> Option<&Row> {
        self.rows.get(position)
    }

    /// All identities in load order.
    pub fn ids(&self) -> Vec<RowId> {
        self.rows.iter().map(Row::id).collect()
    }

    /// Cell of a row by column name.
    pub fn cell(&self, id: RowId, column: &str) -> Option<&CellValue> {
        let col = self.columns.index_of(column)?;
        self.row(id).map(|r| r.cell(col))
    }
}

fn identity_from_cell(cell: &CellValue) -> Option<RowId> {
    match cell {
        CellValue::Number(n) if n.is_finite() && *n >= 0.0 && n.fract() == 0.0 => {
            Some(RowId(*n as u64))
        }
        _ => None,
    }
}
