//! Export planning.
//!
//! The grid decides which rows and columns an export contains; turning them
//! into file content is the job of an [`Exporter`] supplied by the host.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::error::ExportError;
use crate::model::CellValue;
use crate::model::Dataset;
use crate::model::RowId;

/// What to export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportScope {
    /// The display order over visible columns.
    #[default]
    CurrentView,
    /// Every row in load order over every column.
    All,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Csv,
    Json,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Xlsx => "xlsx",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv;charset=utf-8",
            ExportFormat::Json => "application/json;charset=utf-8",
            ExportFormat::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            "xlsx" => Ok(ExportFormat::Xlsx),
            _ => Err(ExportError::unsupported(s)),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// What a current-view export leaves out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Exclusions {
    pub hidden_rows: usize,
    pub hidden_columns: Vec<String>,
    /// Active search term.
    pub search: Option<String>,
    /// Active column filters as `(column, term)`.
    pub column_filters: Vec<(String, String)>,
}

impl Exclusions {
    pub fn is_empty(&self) -> bool {
        self.hidden_rows == 0
            && self.hidden_columns.is_empty()
            && self.search.is_none()
            && self.column_filters.is_empty()
    }

    pub fn has_filters(&self) -> bool {
        self.search.is_some() || !self.column_filters.is_empty()
    }
}

impl fmt::Display for Exclusions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.hidden_rows > 0 {
            parts.push(format!("{} hidden row(s)", self.hidden_rows));
        }
        if !self.hidden_columns.is_empty() {
            parts.push(format!("{} hidden column(s)", self.hidden_columns.len()));
        }
        if self.has_filters() {
            parts.push("filtered-out rows".to_string());
        }
        f.write_str(&parts.join(", "))
    }
}

/// A planned export: which rows and columns, in which format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPlan {
    pub scope: ExportScope,
    pub format: ExportFormat,
    /// File name without extension.
    pub base_name: String,
    pub rows: Vec<RowId>,
    pub columns: Vec<String>,
    /// Exclusions of the current view, reported for either scope.
    pub exclusions: Exclusions,
}

impl ExportPlan {
    /// File name with extension.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.base_name, self.format.extension())
    }

    /// Copies the planned cells out of the dataset.
    pub fn materialize(&self, dataset: &Dataset) -> ExportTable {
        let indices: Vec<Option<usize>> = self
            .columns
            .iter()
            .map(|c| dataset.columns().index_of(c))
            .collect();
        let rows = self
            .rows
            .iter()
            .filter_map(|&id| dataset.row(id))
            .map(|row| {
                indices
                    .iter()
                    .map(|i| i.map(|i| row.cell(i).clone()).unwrap_or_default())
                    .collect()
            })
            .collect();
        ExportTable {
            columns: self.columns.clone(),
            rows,
        }
    }
}

/// Materialised export request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExportTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl ExportTable {
    /// Rows as ordered `column -> value` records.
    pub fn records(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .zip(row)
                    .map(|(c, v)| (c.clone(), v.to_json()))
                    .collect()
            })
            .collect()
    }
}

/// Content produced by a successful export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
    pub plan: ExportPlan,
}

/// Produces file content for a materialised export.
pub trait Exporter {
    /// Returns `true` if the exporter can write `format`.
    fn supports(&self, format: ExportFormat) -> bool;

    fn export(&self, format: ExportFormat, table: &ExportTable) -> Result<Vec<u8>, ExportError>;
}

/// Picks the export file name: configured name, else element id, else `data`.
pub fn base_name(configured: Option<&str>, element_id: &str) -> String {
    configured
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or(Some(element_id).filter(|s| !s.is_empty()))
        .unwrap_or("data")
        .to_string()
}
