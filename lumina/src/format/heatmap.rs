//! Heatmap statistics and palette interpolation.

use std::collections::HashMap;

use palette::Srgb;

use crate::model::CellValue;
use crate::model::Dataset;

/// Palette used when none (or fewer than two usable stops) is configured.
pub const DEFAULT_PALETTE: [&str; 3] = ["#f7fbff", "#6baed6", "#08306b"];

/// An 8-bit sRGB color.
pub type Rgb = Srgb<u8>;

/// Parses a CSS color: `#rgb`, `#rrggbb`, `rgb(r, g, b)` or a named color.
pub fn parse_color(text: &str) -> Option<Rgb> {
    let text = text.trim();
    if text.starts_with('#') {
        return text.parse::<Rgb>().ok();
    }
    if let Some(inner) = text
        .strip_prefix("rgb(")
        .and_then(|rest| rest.strip_suffix(')'))
    {
        let channels: Vec<u8> = inner
            .split(',')
            .filter_map(|c| c.trim().parse::<u8>().ok())
            .collect();
        return match channels[..] {
            [r, g, b] => Some(Rgb::new(r, g, b)),
            _ => None,
        };
    }
    palette::named::from_str(&text.to_lowercase())
}

/// Formats a color as `rgb(r, g, b)`.
pub fn css_rgb(color: Rgb) -> String {
    format!("rgb({}, {}, {})", color.red, color.green, color.blue)
}

/// Numeric columns to color plus the palette stops.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapSpec {
    columns: Vec<String>,
    palette: Vec<Rgb>,
}

impl HeatmapSpec {
    /// Builds a spec; unparseable stops are dropped and a palette with fewer
    /// than two stops is replaced by [`DEFAULT_PALETTE`].
    pub fn new(columns: Vec<String>, palette: &[String]) -> Self {
        let mut stops: Vec<Rgb> = palette.iter().filter_map(|s| parse_color(s)).collect();
        if stops.len() < 2 {
            if !palette.is_empty() {
                log::warn!("heatmap palette has fewer than two usable stops, using default");
            }
            stops = DEFAULT_PALETTE.iter().filter_map(|s| parse_color(s)).collect();
        }
        Self {
            columns,
            palette: stops,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn palette(&self) -> &[Rgb] {
        &self.palette
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Finite range of a numeric column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColumnStats {
    pub min: f64,
    pub max: f64,
}

/// Per-column ranges over the full dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeatmapStats {
    columns: HashMap<String, ColumnStats>,
    generation: u64,
}

impl HeatmapStats {
    pub fn get(&self, column: &str) -> Option<ColumnStats> {
        self.columns.get(column).copied()
    }

    /// Dataset generation the stats were computed from.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Scans the entire dataset once per heatmap column.
///
/// Non-numeric cells are ignored; columns without a numeric value, or not in
/// the schema, get no stats.
pub fn compute_stats(dataset: &Dataset, spec: &HeatmapSpec) -> HeatmapStats {
    let mut columns = HashMap::new();
    for name in spec.columns() {
        let Some(index) = dataset.columns().index_of(name) else {
            continue;
        };
        let stats = dataset
            .rows()
            .iter()
            .filter_map(|row| row.cell(index).as_number())
            .fold(None, |acc: Option<ColumnStats>, v| {
                Some(match acc {
                    Some(s) => ColumnStats {
                        min: s.min.min(v),
                        max: s.max.max(v),
                    },
                    None => ColumnStats { min: v, max: v },
                })
            });
        if let Some(stats) = stats {
            columns.insert(name.clone(), stats);
        }
    }
    log::debug!(
        "heatmap stats computed for {} of {} columns",
        columns.len(),
        spec.columns().len()
    );
    HeatmapStats {
        columns,
        generation: dataset.generation(),
    }
}

/// Maps a value onto the palette.
///
/// Returns the last stop when the column range is degenerate, `None` for an
/// empty palette or a non-finite value.
pub fn color_for(value: f64, stats: ColumnStats, palette: &[Rgb]) -> Option<Rgb> {
    let last = *palette.last()?;
    if !value.is_finite() {
        return None;
    }
    if stats.max == stats.min || palette.len() < 2 {
        return Some(last);
    }
    let t = ((value - stats.min) / (stats.max - stats.min)).clamp(0.0, 1.0);
    let steps = palette.len() - 1;
    let segment = ((t * steps as f64).floor() as usize).min(steps - 1);
    let local = t * steps as f64 - segment as f64;
    let (from, to) = (palette[segment], palette[segment + 1]);
    Some(Rgb::new(
        lerp_u8(from.red, to.red, local),
        lerp_u8(from.green, to.green, local),
        lerp_u8(from.blue, to.blue, local),
    ))
}

/// Color for a cell, if the column has stats and the cell is numeric.
pub fn cell_color(cell: &CellValue, stats: Option<ColumnStats>, palette: &[Rgb]) -> Option<Rgb> {
    color_for(cell.as_number()?, stats?, palette)
}

fn lerp_u8(from: u8, to: u8, t: f64) -> u8 {
    let from = from as f64;
    let to = to as f64;
    (from + (to - from) * t).round() as u8
}
