//! Search and column filter state.

use std::collections::BTreeMap;

use serde::Serialize;

/// Free-text search plus per-column substring filters.
///
/// Terms are stored lower-cased. A column without an entry has no filter, and
/// setting an empty term removes the entry.
///
/// # Example
///
/// ```
/// use lumina::query::FilterState;
///
/// let mut filter = FilterState::default();
/// filter.set_search("Contoso");
/// filter.set_column("city", "Par");
///
/// assert_eq!(filter.search(), "contoso");
/// assert_eq!(filter.column("city"), Some("par"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    search: String,
    #[serde(rename = "columnFilters")]
    columns: BTreeMap<String, String>,
}

impl FilterState {
    /// Sets the global search term. Returns `true` if it changed.
    pub fn set_search(&mut self, term: &str) -> bool {
        let term = term.to_lowercase();
        if term == self.search {
            return false;
        }
        self.search = term;
        true
    }

    /// The lower-cased search term, empty when no search is active.
    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn has_search(&self) -> bool {
        !self.search.is_empty()
    }

    /// Sets or clears a column filter. Returns `true` if it changed.
    pub fn set_column(&mut self, column: impl Into<String>, term: &str) -> bool {
        let column = column.into();
        let term = term.to_lowercase();
        if term.is_empty() {
            return self.columns.remove(&column).is_some();
        }
        self.columns.insert(column, term.clone()) != Some(term)
    }

    /// Removes a column's filter. Returns `true` if one was present.
    pub fn remove_column(&mut self, column: &str) -> bool {
        self.columns.remove(column).is_some()
    }

    /// Removes every column filter, leaving the search term.
    pub fn clear_columns(&mut self) -> bool {
        let had = !self.columns.is_empty();
        self.columns.clear();
        had
    }

    pub fn column(&self, column: &str) -> Option<&str> {
        self.columns.get(column).map(String::as_str)
    }

    /// Active column filters, ordered by column name.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns.iter().map(|(c, t)| (c.as_str(), t.as_str()))
    }

    pub fn has_column_filters(&self) -> bool {
        !self.columns.is_empty()
    }

    /// Returns `true` if any search or column filter is active.
    pub fn is_active(&self) -> bool {
        self.has_search() || self.has_column_filters()
    }
}
