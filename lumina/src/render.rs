//! Render output.
//!
//! The grid never touches a DOM. Each update yields a [`Patch`] that
//! describes only the regions the host has to rebuild.

use serde::Serialize;

use crate::export::Exclusions;
use crate::format::CellStyle;
use crate::model::RowId;
use crate::overlay::OverlayKind;
use crate::query::Direction;
use crate::view::EmptyPlaceholder;
use crate::view::Pager;

/// Regions to rebuild after an update.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "scope", rename_all = "camelCase")]
pub enum Patch {
    /// Rebuild everything.
    Full(GridFrame),
    /// Rebuild header, body and footer; the chrome stays.
    Table {
        header: HeaderFrame,
        body: BodyFrame,
        footer: FooterFrame,
    },
    /// Rebuild the body rows only.
    Body(BodyFrame),
    /// Update the outer chrome only.
    Chrome(ChromeFrame),
    /// Nothing visible changed.
    Nothing,
}

impl Patch {
    pub fn is_nothing(&self) -> bool {
        matches!(self, Patch::Nothing)
    }

    /// The body frame, if this patch carries one.
    pub fn body(&self) -> Option<&BodyFrame> {
        match self {
            Patch::Full(frame) => Some(&frame.body),
            Patch::Table { body, .. } | Patch::Body(body) => Some(body),
            _ => None,
        }
    }

    pub fn footer(&self) -> Option<&FooterFrame> {
        match self {
            Patch::Full(frame) => Some(&frame.footer),
            Patch::Table { footer, .. } => Some(footer),
            _ => None,
        }
    }

    pub fn header(&self) -> Option<&HeaderFrame> {
        match self {
            Patch::Full(frame) => Some(&frame.header),
            Patch::Table { header, .. } => Some(header),
            _ => None,
        }
    }

    pub fn chrome(&self) -> Option<&ChromeFrame> {
        match self {
            Patch::Full(frame) => Some(&frame.chrome),
            Patch::Chrome(chrome) => Some(chrome),
            _ => None,
        }
    }
}

/// Everything the host renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridFrame {
    pub chrome: ChromeFrame,
    pub header: HeaderFrame,
    pub body: BodyFrame,
    pub footer: FooterFrame,
}

/// Title, toolbar and window state around the table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChromeFrame {
    pub element_id: String,
    pub title: Option<String>,
    pub caption: Option<String>,
    pub theme: String,
    /// Search box text, `None` when search is disabled.
    pub search: Option<String>,
    pub fullscreen: bool,
    pub minimized: bool,
    pub overlay: Option<OverlayKind>,
    /// `(column, visible)` entries of the column menu, empty when disabled.
    pub column_options: Vec<(String, bool)>,
    pub download_formats: Vec<String>,
    /// Exclusions the download menu warns about.
    pub download_exclusions: Option<Exclusions>,
    pub selection_controls: bool,
    pub reset_selection_control: bool,
}

/// Column headers.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderFrame {
    pub columns: Vec<HeaderCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderCell {
    pub name: String,
    pub sort: Option<SortBadge>,
    /// Filter input text, `None` when column filters are disabled.
    pub filter: Option<String>,
    pub has_rules: bool,
    pub hideable: bool,
}

/// Sort direction and 1-based priority shown on a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortBadge {
    pub direction: Direction,
    pub priority: usize,
}

/// Rows of the current window.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BodyFrame {
    pub rows: Vec<RenderedRow>,
    /// Display position of the first row.
    pub start_offset: usize,
    pub leading_spacer: f64,
    pub trailing_spacer: f64,
    /// Message row shown instead of rows, spanning `column_count` columns.
    pub placeholder: Option<EmptyPlaceholder>,
    pub column_count: usize,
}

impl BodyFrame {
    pub fn ids(&self) -> Vec<RowId> {
        self.rows.iter().map(|r| r.id).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedRow {
    pub id: RowId,
    pub selected: bool,
    pub style: CellStyle,
    pub cells: Vec<RenderedCell>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedCell {
    pub column: String,
    /// Escaped text with highlight marks, or raw markup for HTML columns.
    pub html: String,
    pub style: CellStyle,
    pub sort_highlight: Option<SortHighlight>,
}

/// How a sorted column is marked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SortHighlight {
    /// Tinted background.
    Fill,
    /// Border only, leaving heatmap and rule backgrounds visible.
    Border,
}

/// Pagination controls and summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FooterFrame {
    pub summary: Option<String>,
    /// Page controls, `None` outside paged mode.
    pub pager: Option<Pager>,
    pub rows_per_page: usize,
    pub rows_per_page_options: Vec<usize>,
    pub selected: usize,
    pub hidden: usize,
}
