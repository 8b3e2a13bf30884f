//! Cell and row formatting.
//!
//! - [`heatmap`] colors numeric cells by their position in the full-dataset range
//! - [`rules`] evaluates conditional-format rules
//! - [`highlight`] escapes cell text and marks search matches
//!
//! [`FormattingEngine`] combines heatmap backgrounds and rule styles into one
//! [`CellStyle`] per cell plus one per row. Later rules override earlier ones
//! per property.

pub mod heatmap;
pub mod highlight;
pub mod rules;
mod style;

pub use heatmap::ColumnStats;
pub use heatmap::HeatmapSpec;
pub use heatmap::HeatmapStats;
pub use heatmap::Rgb;
pub use heatmap::color_for;
pub use heatmap::compute_stats;
pub use highlight::Highlighter;
pub use highlight::escape_html;
pub use rules::ConditionalFormatRule;
pub use rules::Operator;
pub use rules::RuleEdit;
pub use rules::RuleSet;
pub use rules::RuleTarget;
pub use style::*;

use crate::model::Dataset;
use crate::model::Row;

/// Styles for one rendered row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowFormat {
    pub row: CellStyle,
    /// Parallel to the columns passed to [`FormattingEngine::format_row`].
    pub cells: Vec<CellStyle>,
}

/// Heatmap and conditional-format evaluation.
#[derive(Debug, Clone, Default)]
pub struct FormattingEngine {
    heatmap: Option<HeatmapSpec>,
    stats: HeatmapStats,
    rules: RuleSet,
}

impl FormattingEngine {
    /// Creates an engine and computes heatmap stats over `dataset`.
    pub fn new(dataset: &Dataset, heatmap: Option<HeatmapSpec>, rules: RuleSet) -> Self {
        let heatmap = heatmap.filter(|h| !h.is_empty());
        let stats = heatmap
            .as_ref()
            .map(|spec| compute_stats(dataset, spec))
            .unwrap_or_default();
        Self {
            heatmap,
            stats,
            rules,
        }
    }

    /// Recomputes heatmap stats if they belong to an older dataset generation.
    pub fn refresh_stats(&mut self, dataset: &Dataset) -> bool {
        let Some(spec) = &self.heatmap else {
            return false;
        };
        if self.stats.generation() == dataset.generation() {
            return false;
        }
        self.stats = compute_stats(dataset, spec);
        true
    }

    pub fn stats(&self) -> &HeatmapStats {
        &self.stats
    }

    pub fn heatmap(&self) -> Option<&HeatmapSpec> {
        self.heatmap.as_ref()
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn rules_mut(&mut self) -> &mut RuleSet {
        &mut self.rules
    }

    /// Returns `true` if the column carries a heatmap or any rule.
    pub fn is_formatted(&self, column: &str) -> bool {
        self.stats.get(column).is_some() || self.rules.has_rules_for(column)
    }

    /// Computes the styles of a row for the given visible columns.
    pub fn format_row(&self, dataset: &Dataset, row: &Row, columns: &[String]) -> RowFormat {
        let schema = dataset.columns();
        let mut format = RowFormat {
            row: CellStyle::default(),
            cells: vec![CellStyle::default(); columns.len()],
        };

        if let Some(spec) = &self.heatmap {
            for (slot, column) in format.cells.iter_mut().zip(columns) {
                let Some(index) = schema.index_of(column) else {
                    continue;
                };
                if let Some(color) =
                    heatmap::cell_color(row.cell(index), self.stats.get(column), spec.palette())
                {
                    slot.background = Some(heatmap::css_rgb(color));
                }
            }
        }

        for rule in self.rules.rules() {
            let Some(visible) = columns.iter().position(|c| *c == rule.column) else {
                continue;
            };
            let Some(index) = schema.index_of(&rule.column) else {
                continue;
            };
            if !rule.evaluate(row.cell(index)) {
                continue;
            }
            log::trace!("rule {} on '{}' matched row {}", rule.operator, rule.column, row.id());
            match rule.target {
                RuleTarget::Cell => format.cells[visible].merge(&rule.style),
                RuleTarget::Row => format.row.merge(&rule.style),
            }
        }
        format
    }
}
