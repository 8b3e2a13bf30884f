//! Column visibility.

use crate::model::ColumnSet;

/// Result of toggling a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnToggle {
    Hidden,
    Shown,
    /// The name is not a column of the dataset.
    Unknown,
}

/// Visible columns in schema order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnVisibility {
    all: Vec<String>,
    initial: Vec<String>,
    visible: Vec<String>,
}

impl ColumnVisibility {
    /// Starts with `initial` visible, or every column when `None`.
    ///
    /// Unknown names are dropped and schema order is kept.
    pub fn new(columns: &ColumnSet, initial: Option<&[String]>) -> Self {
        let all = columns.names().to_vec();
        let initial: Vec<String> = match initial {
            Some(names) => all.iter().filter(|c| names.contains(c)).cloned().collect(),
            None => all.clone(),
        };
        Self {
            visible: initial.clone(),
            initial,
            all,
        }
    }

    /// Visible columns in schema order.
    pub fn visible(&self) -> &[String] {
        &self.visible
    }

    pub fn is_visible(&self, column: &str) -> bool {
        self.visible.iter().any(|c| c == column)
    }

    /// Columns currently hidden, in schema order.
    pub fn hidden(&self) -> Vec<String> {
        self.all
            .iter()
            .filter(|c| !self.is_visible(c))
            .cloned()
            .collect()
    }

    /// Hides a visible column or shows a hidden one at its schema position.
    pub fn toggle(&mut self, column: &str) -> ColumnToggle {
        if let Some(i) = self.visible.iter().position(|c| c == column) {
            self.visible.remove(i);
            return ColumnToggle::Hidden;
        }
        let Some(original) = self.all.iter().position(|c| c == column) else {
            return ColumnToggle::Unknown;
        };
        let insert_at = self.all[..original]
            .iter()
            .filter(|c| self.is_visible(c))
            .count();
        self.visible.insert(insert_at, column.to_string());
        ColumnToggle::Shown
    }

    /// Restores the initial visibility.
    pub fn reset(&mut self) {
        self.visible = self.initial.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set() -> ColumnSet {
        ColumnSet::new(vec!["a".into(), "b".into(), "c".into()], vec![])
    }

    #[test]
    fn test_initial_visibility_keeps_schema_order() {
        let initial = vec!["c".to_string(), "zzz".to_string(), "a".to_string()];
        let v = ColumnVisibility::new(&set(), Some(&initial));
        assert_eq!(v.visible(), &["a", "c"]);
        assert_eq!(v.hidden(), vec!["b".to_string()]);
    }

    #[test]
    fn test_toggle_reinserts_at_schema_position() {
        let mut v = ColumnVisibility::new(&set(), None);
        assert_eq!(v.toggle("b"), ColumnToggle::Hidden);
        assert_eq!(v.toggle("a"), ColumnToggle::Hidden);
        assert_eq!(v.toggle("b"), ColumnToggle::Shown);
        assert_eq!(v.visible(), &["b", "c"]);
        assert_eq!(v.toggle("a"), ColumnToggle::Shown);
        assert_eq!(v.visible(), &["a", "b", "c"]);
        assert_eq!(v.toggle("nope"), ColumnToggle::Unknown);
    }

    #[test]
    fn test_reset() {
        let mut v = ColumnVisibility::new(&set(), None);
        v.toggle("a");
        v.reset();
        assert_eq!(v.visible().len(), 3);
    }
}
