//! Page controls and footer summary.

use std::fmt;

use serde::Serialize;

use super::ViewState;

/// Pages shown on each side of the current one.
const PAGE_LINK_RADIUS: usize = 2;

/// An entry in the page-link strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PageLink {
    Page { number: usize, current: bool },
    Gap,
}

/// Page controls for discrete pagination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pager {
    pub page: usize,
    pub total_pages: usize,
    pub has_previous: bool,
    pub has_next: bool,
    pub links: Vec<PageLink>,
}

impl Pager {
    pub fn new(view: &ViewState, total: usize) -> Self {
        let page = view.page();
        let total_pages = view.total_pages(total);
        let start = page.saturating_sub(PAGE_LINK_RADIUS).max(1);
        let end = total_pages.min(page + PAGE_LINK_RADIUS);

        let mut links = Vec::new();
        if start > 1 {
            links.push(PageLink::Page {
                number: 1,
                current: false,
            });
            if start > 2 {
                links.push(PageLink::Gap);
            }
        }
        for number in start..=end {
            links.push(PageLink::Page {
                number,
                current: number == page,
            });
        }
        if end < total_pages {
            if end + 1 < total_pages {
                links.push(PageLink::Gap);
            }
            links.push(PageLink::Page {
                number: total_pages,
                current: false,
            });
        }

        Self {
            page,
            total_pages,
            has_previous: page > 1,
            has_next: page < total_pages,
            links,
        }
    }
}

/// What the footer reports about the current view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    /// `(first, last)` 1-based rows on the page; `None` in scroller mode.
    pub range: Option<(usize, usize)>,
    pub total: usize,
    /// Shown only when selection is enabled and non-zero.
    pub selected: usize,
    pub hidden: usize,
    pub sorted: bool,
}

impl Summary {
    /// Summary for a paged view.
    pub fn paged(view: &ViewState, total: usize) -> Self {
        let first = if total > 0 {
            (view.page() - 1) * view.rows_per_page() + 1
        } else {
            0
        };
        let last = (view.page() * view.rows_per_page()).min(total);
        Self {
            range: Some((first, last)),
            total,
            selected: 0,
            hidden: 0,
            sorted: false,
        }
    }

    /// Summary for a scrolling view.
    pub fn scrolling(total: usize) -> Self {
        Self {
            range: None,
            total,
            selected: 0,
            hidden: 0,
            sorted: false,
        }
    }

    pub fn with_counts(mut self, selected: usize, hidden: usize, sorted: bool) -> Self {
        self.selected = selected;
        self.hidden = hidden;
        self.sorted = sorted;
        self
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.range {
            Some((first, last)) => {
                write!(f, "Showing {} to {} of {} results", first, last, self.total)?
            }
            None => write!(f, "Showing {} results (scroll to view all)", self.total)?,
        }
        if self.selected > 0 {
            write!(f, " (selected: {})", self.selected)?;
        }
        if self.hidden > 0 {
            write!(f, " ({} hidden)", self.hidden)?;
        }
        if self.sorted {
            write!(f, " (sorted)")?;
        }
        Ok(())
    }
}
