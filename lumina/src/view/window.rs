//! Visible window over the display order.

use std::ops::Range;

use serde::Serialize;

use crate::model::RowId;

/// Row height used when the configured one is unusable.
pub const DEFAULT_ROW_HEIGHT: f64 = 40.0;

/// Rows rendered above and below the viewport by default.
pub const DEFAULT_VIRTUALIZATION_BUFFER: usize = 8;

/// Geometry of a virtualized scroll viewport.
///
/// Values are sanitised on construction: a non-positive or non-finite row
/// height falls back to [`DEFAULT_ROW_HEIGHT`], negative or non-finite offsets
/// and heights clamp to zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VirtualViewport {
    row_height: f64,
    scroll_top: f64,
    viewport_height: f64,
    buffer: usize,
}

impl VirtualViewport {
    pub fn new(row_height: f64, scroll_top: f64, viewport_height: f64, buffer: usize) -> Self {
        let row_height = if row_height.is_finite() && row_height > 0.0 {
            row_height
        } else {
            DEFAULT_ROW_HEIGHT
        };
        Self {
            row_height,
            scroll_top: non_negative(scroll_top),
            viewport_height: non_negative(viewport_height),
            buffer,
        }
    }

    pub fn row_height(&self) -> f64 {
        self.row_height
    }

    pub fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    pub fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    pub fn buffer(&self) -> usize {
        self.buffer
    }

    /// Rows to materialise for `total` rows: `[first, last)`.
    ///
    /// An offset past the end of the content pins the window to the last
    /// rows, so a shrinking row set never renders empty.
    pub fn row_range(&self, total: usize) -> Range<usize> {
        let h = self.row_height;
        let first = ((self.scroll_top / h).floor() as usize).saturating_sub(self.buffer);
        let count = (self.viewport_height / h).ceil() as usize + 2 * self.buffer;
        let first = first.min(total.saturating_sub(count));
        let last = total.min(first.saturating_add(count));
        first..last
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 { value } else { 0.0 }
}

/// How the ordered rows are windowed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WindowMode {
    /// Discrete pages of `rows_per_page`.
    Paged,
    /// Every row is handed to a natively scrolling viewport.
    Scroller,
    /// Only rows intersecting the viewport, with spacers for the rest.
    Virtual(VirtualViewport),
}

/// Page position for discrete pagination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewState {
    page: usize,
    rows_per_page: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            page: 1,
            rows_per_page: 10,
        }
    }
}

impl ViewState {
    /// Creates a view on page 1. A zero page size becomes 1.
    pub fn new(rows_per_page: usize) -> Self {
        Self {
            page: 1,
            rows_per_page: rows_per_page.max(1),
        }
    }

    /// Current page, 1-based.
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn rows_per_page(&self) -> usize {
        self.rows_per_page
    }

    /// `ceil(total / rows_per_page)`, zero when there are no rows.
    pub fn total_pages(&self, total: usize) -> usize {
        total.div_ceil(self.rows_per_page)
    }

    /// Moves to a page, clamped to `[1, total_pages]`. Returns `true` if the page changed.
    pub fn go_to(&mut self, page: usize, total: usize) -> bool {
        let last = self.total_pages(total).max(1);
        let page = page.clamp(1, last);
        let changed = page != self.page;
        self.page = page;
        changed
    }

    /// Changes the page size and returns to page 1. Zero is rejected.
    pub fn set_rows_per_page(&mut self, rows_per_page: usize) -> bool {
        if rows_per_page == 0 {
            return false;
        }
        self.rows_per_page = rows_per_page;
        self.page = 1;
        true
    }

    pub fn reset_page(&mut self) {
        self.page = 1;
    }
}

/// Placeholder shown in place of rows when the window is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EmptyPlaceholder {
    /// A search is active and nothing matched.
    NoMatches,
    /// There is nothing to show.
    NoRecords,
}

impl EmptyPlaceholder {
    pub fn message(self) -> &'static str {
        match self {
            EmptyPlaceholder::NoMatches => "No matching records found",
            EmptyPlaceholder::NoRecords => "No records found",
        }
    }
}

/// Result of windowing: which rows to render and how much space to reserve.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSlice {
    /// Range into the display order.
    pub range: Range<usize>,
    /// Rows in the display order.
    pub total: usize,
    pub leading_spacer: f64,
    pub trailing_spacer: f64,
    pub placeholder: Option<EmptyPlaceholder>,
}

impl WindowSlice {
    /// Display position of the first rendered row.
    pub fn start_offset(&self) -> usize {
        self.range.start
    }

    /// Identities of the rendered rows.
    pub fn visible<'a>(&self, ordered: &'a [RowId]) -> &'a [RowId] {
        let end = self.range.end.min(ordered.len());
        &ordered[self.range.start.min(end)..end]
    }

    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

/// Computes the rendered window over `total` ordered rows.
pub fn slice(total: usize, view: &ViewState, mode: &WindowMode, search_active: bool) -> WindowSlice {
    let (range, leading_spacer, trailing_spacer) = match mode {
        WindowMode::Paged => {
            let start = (view.page - 1).saturating_mul(view.rows_per_page).min(total);
            let end = start.saturating_add(view.rows_per_page).min(total);
            (start..end, 0.0, 0.0)
        }
        WindowMode::Scroller => (0..total, 0.0, 0.0),
        WindowMode::Virtual(viewport) => {
            let range = viewport.row_range(total);
            let h = viewport.row_height();
            let leading = range.start as f64 * h;
            let trailing = (total - range.end) as f64 * h;
            (range, leading, trailing)
        }
    };

    let placeholder = (total == 0).then_some(if search_active {
        EmptyPlaceholder::NoMatches
    } else {
        EmptyPlaceholder::NoRecords
    });

    log::trace!(
        "window {:?} of {} (spacers {} / {})",
        range,
        total,
        leading_spacer,
        trailing_spacer
    );

    WindowSlice {
        range,
        total,
        leading_spacer,
        trailing_spacer,
        placeholder,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paged_window() {
        let mut view = ViewState::new(10);
        view.go_to(3, 25);
        let w = slice(25, &view, &WindowMode::Paged, false);
        assert_eq!(w.range, 20..25);
        assert_eq!(view.total_pages(25), 3);
    }

    #[test]
    fn test_go_to_clamps() {
        let mut view = ViewState::new(10);
        view.go_to(99, 25);
        assert_eq!(view.page(), 3);
        view.go_to(0, 25);
        assert_eq!(view.page(), 1);
        view.go_to(5, 0);
        assert_eq!(view.page(), 1);
    }

    #[test]
    fn test_rows_per_page_resets_page() {
        let mut view = ViewState::new(10);
        view.go_to(2, 30);
        assert!(view.set_rows_per_page(25));
        assert_eq!(view.page(), 1);
        assert!(!view.set_rows_per_page(0));
        assert_eq!(view.rows_per_page(), 25);
    }

    #[test]
    fn test_virtual_window() {
        let vp = VirtualViewport::new(40.0, 4000.0, 400.0, 8);
        let w = slice(1000, &ViewState::default(), &WindowMode::Virtual(vp), false);
        assert_eq!(w.range, 92..118);
        assert_eq!(w.leading_spacer, 92.0 * 40.0);
        assert_eq!(w.trailing_spacer, (1000.0 - 118.0) * 40.0);
    }

    #[test]
    fn test_virtual_window_clamps_bad_geometry() {
        let vp = VirtualViewport::new(-5.0, -100.0, f64::NAN, 2);
        assert_eq!(vp.row_height(), DEFAULT_ROW_HEIGHT);
        assert_eq!(vp.row_range(50), 0..4);

        let far = VirtualViewport::new(10.0, 1.0e9, 100.0, 2);
        assert_eq!(far.row_range(50), 36..50);
        assert_eq!(far.row_range(5), 0..5);
    }

    #[test]
    fn test_scrolled_past_shrunk_set_keeps_last_rows() {
        let vp = VirtualViewport::new(40.0, 36000.0, 400.0, 8);
        let w = slice(5, &ViewState::default(), &WindowMode::Virtual(vp), true);
        assert_eq!(w.range, 0..5);
        assert_eq!(w.placeholder, None);
        assert_eq!(w.leading_spacer, 0.0);
        assert_eq!(w.trailing_spacer, 0.0);

        let w = slice(100, &ViewState::default(), &WindowMode::Virtual(vp), true);
        assert_eq!(w.range, 74..100);
        assert_eq!(w.leading_spacer, 74.0 * 40.0);
    }

    #[test]
    fn test_empty_placeholder_depends_on_search() {
        let view = ViewState::default();
        let w = slice(0, &view, &WindowMode::Scroller, true);
        assert_eq!(w.placeholder, Some(EmptyPlaceholder::NoMatches));
        let w = slice(0, &view, &WindowMode::Scroller, false);
        assert_eq!(w.placeholder.map(EmptyPlaceholder::message), Some("No records found"));
    }
}
