//! Widget payload and grid configuration.
//!
//! [`GridConfig`] mirrors the JSON the host sends, with every section and key
//! optional. [`GridConfig::resolve`] applies defaults and performance
//! overrides, producing the [`GridOptions`] a [`Grid`](crate::Grid) is built from.

use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::error::ConfigError;
use crate::format::HeatmapSpec;
use crate::model::CellValue;
use crate::query::PipelineMode;
use crate::selection::SelectionMode;
use crate::view::DEFAULT_ROW_HEIGHT;
use crate::view::DEFAULT_VIRTUALIZATION_BUFFER;

/// The full widget payload: rows, column names and configuration.
///
/// # Example
///
/// ```
/// use lumina::config::WidgetPayload;
///
/// let payload = WidgetPayload::from_json(r#"{
///     "data": [["a", 1, 0], ["b", 2, 1]],
///     "columns": ["name", "val", "__rowIndex__"],
///     "config": {"pagination": {"limit": 25}}
/// }"#).unwrap();
///
/// let options = payload.config.resolve();
/// assert_eq!(options.rows_per_page, 25);
/// assert!(options.search_enabled);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WidgetPayload {
    #[serde(default)]
    pub data: Vec<Vec<CellValue>>,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub config: GridConfig,
}

impl WidgetPayload {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        Ok(serde_json::from_value(value)?)
    }
}

fn yes() -> bool {
    true
}

/// Grid configuration as sent by the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridConfig {
    pub search: SearchConfig,
    pub selection: SelectionConfig,
    pub filters: FiltersConfig,
    pub pagination: PaginationConfig,
    pub buttons: ButtonsConfig,
    pub performance: PerformanceConfig,
    pub heatmap: Option<HeatmapConfig>,
    pub condformat: CondFormatConfig,
    pub layout: LayoutConfig,
    pub sortable: bool,
    pub sort_highlight: bool,
    pub col_hide: bool,
    pub title: Option<String>,
    pub caption: Option<String>,
    pub theme: String,
    pub maximizable: bool,
    pub minimizable: bool,
    pub element_id: Option<String>,
    /// Columns whose cells are pre-rendered markup.
    #[serde(rename = "html_cols", alias = "htmlCols")]
    pub html_cols: Vec<String>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            search: SearchConfig::default(),
            selection: SelectionConfig::default(),
            filters: FiltersConfig::default(),
            pagination: PaginationConfig::default(),
            buttons: ButtonsConfig::default(),
            performance: PerformanceConfig::default(),
            heatmap: None,
            condformat: CondFormatConfig::default(),
            layout: LayoutConfig::default(),
            sortable: true,
            sort_highlight: true,
            col_hide: false,
            title: None,
            caption: None,
            theme: "default".to_string(),
            maximizable: true,
            minimizable: true,
            element_id: None,
            html_cols: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchConfig {
    #[serde(default = "yes")]
    pub enabled: bool,
    #[serde(default = "yes")]
    pub highlight: bool,
    #[serde(default = "SearchConfig::default_position")]
    pub position: String,
}

impl SearchConfig {
    fn default_position() -> String {
        "right".to_string()
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            highlight: true,
            position: Self::default_position(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SelectionConfig {
    pub enabled: bool,
    /// `"single"` or `"multiple"`; anything else is single.
    pub mode: Option<String>,
    /// Show the "reset selection" control.
    pub reset: bool,
}

impl SelectionConfig {
    pub fn mode(&self) -> SelectionMode {
        match self.mode.as_deref().map(str::to_lowercase).as_deref() {
            Some("multiple") => SelectionMode::Multiple,
            _ => SelectionMode::Single,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FiltersConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "yes")]
    pub highlight: bool,
}

impl Default for FiltersConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            highlight: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationConfig {
    #[serde(default = "yes")]
    pub enabled: bool,
    #[serde(default = "PaginationConfig::default_limit")]
    pub limit: usize,
    #[serde(default = "PaginationConfig::default_limit_options")]
    pub limit_options: Vec<usize>,
    #[serde(default)]
    pub scroller: bool,
    #[serde(default = "yes")]
    pub show_summary: bool,
}

impl PaginationConfig {
    fn default_limit() -> usize {
        10
    }

    fn default_limit_options() -> Vec<usize> {
        vec![10, 25, 50, 100]
    }
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            limit: Self::default_limit(),
            limit_options: Self::default_limit_options(),
            scroller: false,
            show_summary: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ButtonsConfig {
    pub enabled: bool,
    pub column_view: Option<ColumnViewConfig>,
    pub downloads: Option<DownloadsConfig>,
    /// Legacy flat form of `columnView.enabled`.
    pub column_toggle: Option<bool>,
    /// Legacy flat form of `columnView.position`.
    pub position: Option<String>,
    /// Legacy flat form of `columnView.visibleColumns`.
    pub visible_columns: Option<Vec<String>>,
}

impl ButtonsConfig {
    /// The column view settings, built from the legacy keys when absent.
    pub fn column_view(&self) -> ColumnViewConfig {
        self.column_view.clone().unwrap_or_else(|| ColumnViewConfig {
            enabled: self.column_toggle != Some(false),
            position: self.position.clone().unwrap_or_else(ColumnViewConfig::default_position),
            visible_columns: self.visible_columns.clone(),
        })
    }

    pub fn downloads(&self) -> DownloadsConfig {
        self.downloads.clone().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnViewConfig {
    #[serde(default = "yes")]
    pub enabled: bool,
    #[serde(default = "ColumnViewConfig::default_position")]
    pub position: String,
    /// Initially visible columns; all when absent.
    #[serde(default)]
    pub visible_columns: Option<Vec<String>>,
}

impl ColumnViewConfig {
    fn default_position() -> String {
        "top".to_string()
    }
}

impl Default for ColumnViewConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            position: Self::default_position(),
            visible_columns: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default = "DownloadsConfig::default_formats")]
    pub formats: Vec<String>,
}

impl DownloadsConfig {
    fn default_formats() -> Vec<String> {
        vec!["csv".to_string(), "json".to_string()]
    }
}

impl Default for DownloadsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            filename: None,
            formats: Self::default_formats(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PerformanceConfig {
    pub virtualization: bool,
    pub virtualization_buffer: usize,
    pub debounce_search_ms: u64,
    pub debounce_filters_ms: u64,
    pub prefer_scroller: bool,
    pub disable_html: bool,
    pub disable_highlight: bool,
    pub disable_animations: bool,
    pub server_side: bool,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            virtualization: false,
            virtualization_buffer: DEFAULT_VIRTUALIZATION_BUFFER,
            debounce_search_ms: 0,
            debounce_filters_ms: 0,
            prefer_scroller: false,
            disable_html: false,
            disable_highlight: false,
            disable_animations: false,
            server_side: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapConfig {
    pub columns: Vec<String>,
    pub palette: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CondFormatConfig {
    /// Raw rule objects; malformed entries are skipped on load.
    pub rules: Vec<Value>,
    pub edit: bool,
}

/// Layout settings. Only the row height and animation flag affect the core;
/// everything else is passed through to the renderer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    /// Pixels, as a number or a CSS length such as `"32px"`.
    pub row_height: Option<Value>,
    pub animation: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl LayoutConfig {
    /// Row height in pixels, falling back to the default when missing or unusable.
    pub fn row_height_px(&self) -> f64 {
        let parsed = match &self.row_height {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => leading_number(s),
            _ => None,
        };
        parsed
            .filter(|h| h.is_finite() && *h > 0.0)
            .unwrap_or(DEFAULT_ROW_HEIGHT)
    }
}

/// Parses the numeric prefix of a CSS length.
fn leading_number(text: &str) -> Option<f64> {
    let text = text.trim();
    let end = text
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && (c == '-' || c == '+'))))
        .map_or(text.len(), |(i, _)| i);
    text[..end].parse().ok()
}

/// Resolved grid options.
#[derive(Debug, Clone)]
pub struct GridOptions {
    pub element_id: String,
    pub search_enabled: bool,
    pub search_highlight: bool,
    pub filters_enabled: bool,
    pub filters_highlight: bool,
    pub selection_enabled: bool,
    pub selection_mode: SelectionMode,
    pub selection_reset: bool,
    pub pagination_enabled: bool,
    pub rows_per_page: usize,
    pub rows_per_page_options: Vec<usize>,
    pub scroller: bool,
    pub show_summary: bool,
    pub virtualization: bool,
    pub virtualization_buffer: usize,
    pub row_height: f64,
    pub search_debounce: Duration,
    pub filter_debounce: Duration,
    pub pipeline_mode: PipelineMode,
    pub html_columns: Vec<String>,
    pub buttons_enabled: bool,
    pub column_view: ColumnViewConfig,
    pub downloads: DownloadsConfig,
    pub heatmap: Option<HeatmapSpec>,
    pub rules: Vec<Value>,
    pub rules_editable: bool,
    pub sortable: bool,
    pub sort_highlight: bool,
    pub col_hide: bool,
    pub animations: bool,
    pub theme: String,
    pub title: Option<String>,
    pub caption: Option<String>,
    pub maximizable: bool,
    pub minimizable: bool,
}

impl Default for GridOptions {
    fn default() -> Self {
        GridConfig::default().resolve()
    }
}

impl GridConfig {
    /// Applies defaults and performance overrides.
    ///
    /// - `preferScroller` forces scroller mode
    /// - `disableHtml` treats every column as text
    /// - `disableHighlight` turns off search and filter highlighting
    /// - `serverSide` switches the pipeline to [`PipelineMode::Remote`]
    pub fn resolve(&self) -> GridOptions {
        let perf = &self.performance;
        let heatmap = self
            .heatmap
            .as_ref()
            .map(|h| HeatmapSpec::new(h.columns.clone(), &h.palette));

        let options = GridOptions {
            element_id: self.element_id.clone().unwrap_or_default(),
            search_enabled: self.search.enabled,
            search_highlight: self.search.highlight && !perf.disable_highlight,
            filters_enabled: self.filters.enabled,
            filters_highlight: self.filters.highlight && !perf.disable_highlight,
            selection_enabled: self.selection.enabled,
            selection_mode: self.selection.mode(),
            selection_reset: self.selection.reset,
            pagination_enabled: self.pagination.enabled,
            rows_per_page: if self.pagination.limit == 0 {
                PaginationConfig::default_limit()
            } else {
                self.pagination.limit
            },
            rows_per_page_options: self.pagination.limit_options.clone(),
            scroller: self.pagination.scroller || perf.prefer_scroller,
            show_summary: self.pagination.show_summary,
            virtualization: perf.virtualization,
            virtualization_buffer: perf.virtualization_buffer,
            row_height: self.layout.row_height_px(),
            search_debounce: Duration::from_millis(perf.debounce_search_ms),
            filter_debounce: Duration::from_millis(perf.debounce_filters_ms),
            pipeline_mode: if perf.server_side {
                PipelineMode::Remote
            } else {
                PipelineMode::Local
            },
            html_columns: if perf.disable_html {
                Vec::new()
            } else {
                self.html_cols.clone()
            },
            buttons_enabled: self.buttons.enabled,
            column_view: self.buttons.column_view(),
            downloads: self.buttons.downloads(),
            heatmap,
            rules: self.condformat.rules.clone(),
            rules_editable: self.condformat.edit,
            sortable: self.sortable,
            sort_highlight: self.sort_highlight,
            col_hide: self.col_hide,
            animations: self.layout.animation.unwrap_or(true) && !perf.disable_animations,
            theme: self.theme.clone(),
            title: self.title.clone(),
            caption: self.caption.clone(),
            maximizable: self.maximizable,
            minimizable: self.minimizable,
        };
        log::debug!(
            "resolved grid options: mode={:?} scroller={} virtualization={} rows_per_page={}",
            options.pipeline_mode,
            options.scroller,
            options.virtualization,
            options.rows_per_page
        );
        options
    }
}
