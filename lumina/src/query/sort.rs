//! Multi-key sort state and ordering.

use std::cmp::Ordering;

use serde::Serialize;

use crate::model::CellValue;
use crate::model::collate;

/// Sort direction for a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Ascending order (A-Z, 0-9).
    Asc,
    /// Descending order (Z-A, 9-0).
    Desc,
}

impl Direction {
    pub fn is_ascending(self) -> bool {
        self == Direction::Asc
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        }
    }
}

/// A single sort key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortKey {
    pub column: String,
    pub direction: Direction,
}

/// Sort keys in priority order. A column appears at most once.
///
/// # Example
///
/// ```
/// use lumina::query::{Direction, SortState};
///
/// let mut sort = SortState::desc("revenue").then_asc("name");
/// assert_eq!(sort.direction_of("revenue"), Some(Direction::Desc));
///
/// // Toggling cycles asc -> desc -> removed
/// sort.toggle("revenue");
/// assert_eq!(sort.direction_of("revenue"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SortState {
    keys: Vec<SortKey>,
}

impl SortState {
    /// Creates an ascending sort on a column.
    pub fn asc(column: impl Into<String>) -> Self {
        Self::default().then_asc(column)
    }

    /// Creates a descending sort on a column.
    pub fn desc(column: impl Into<String>) -> Self {
        Self::default().then_desc(column)
    }

    /// Adds a lower-priority ascending key, replacing any existing key on the column.
    pub fn then_asc(mut self, column: impl Into<String>) -> Self {
        self.push(column.into(), Direction::Asc);
        self
    }

    /// Adds a lower-priority descending key, replacing any existing key on the column.
    pub fn then_desc(mut self, column: impl Into<String>) -> Self {
        self.push(column.into(), Direction::Desc);
        self
    }

    fn push(&mut self, column: String, direction: Direction) {
        self.keys.retain(|k| k.column != column);
        self.keys.push(SortKey { column, direction });
    }

    /// Cycles a column through ascending, descending and removed.
    ///
    /// New columns are appended at the lowest priority.
    pub fn toggle(&mut self, column: &str) {
        match self.keys.iter().position(|k| k.column == column) {
            Some(i) if self.keys[i].direction.is_ascending() => {
                self.keys[i].direction = Direction::Desc;
            }
            Some(i) => {
                self.keys.remove(i);
            }
            None => self.keys.push(SortKey {
                column: column.to_string(),
                direction: Direction::Asc,
            }),
        }
    }

    /// Removes the key on a column. Returns `true` if one was present.
    pub fn remove(&mut self, column: &str) -> bool {
        let before = self.keys.len();
        self.keys.retain(|k| k.column != column);
        self.keys.len() != before
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn direction_of(&self, column: &str) -> Option<Direction> {
        self.keys
            .iter()
            .find(|k| k.column == column)
            .map(|k| k.direction)
    }

    /// 1-based priority of a column's key.
    pub fn priority_of(&self, column: &str) -> Option<usize> {
        self.keys.iter().position(|k| k.column == column).map(|i| i + 1)
    }
}

/// Compares two cells: numerically when both parse as numbers, else by
/// collated display text.
pub fn compare_cells(a: &CellValue, b: &CellValue) -> Ordering {
    match (a.as_number(), b.as_number()) {
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        _ => collate(&a.display(), &b.display()),
    }
}

/// Compares two rows under resolved `(column index, direction)` keys.
pub(crate) fn compare_rows(
    keys: &[(usize, Direction)],
    a: &[CellValue],
    b: &[CellValue],
) -> Ordering {
    for &(col, direction) in keys {
        let null = CellValue::Null;
        let ordering = compare_cells(a.get(col).unwrap_or(&null), b.get(col).unwrap_or(&null));
        if ordering != Ordering::Equal {
            return direction.apply(ordering);
        }
    }
    Ordering::Equal
}

/// Stable merge sort.
///
/// Mixed numeric and text cells do not form a total order, which the slice
/// sorts are allowed to reject. This one only ever asks "is `b` before `a`".
pub(crate) fn stable_sort_by<T: Clone, F>(items: &mut Vec<T>, mut compare: F)
where
    F: FnMut(&T, &T) -> Ordering,
{
    let len = items.len();
    if len < 2 {
        return;
    }
    let mut src = std::mem::take(items);
    let mut dst: Vec<T> = Vec::with_capacity(len);
    let mut width = 1;
    while width < len {
        dst.clear();
        let mut start = 0;
        while start < len {
            let mid = (start + width).min(len);
            let end = (start + 2 * width).min(len);
            let (mut i, mut j) = (start, mid);
            while i < mid && j < end {
                if compare(&src[j], &src[i]) == Ordering::Less {
                    dst.push(src[j].clone());
                    j += 1;
                } else {
                    dst.push(src[i].clone());
                    i += 1;
                }
            }
            dst.extend_from_slice(&src[i..mid]);
            dst.extend_from_slice(&src[j..end]);
            start = end;
        }
        std::mem::swap(&mut src, &mut dst);
        width *= 2;
    }
    *items = src;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_cycle() {
        let mut s = SortState::default();
        s.toggle("val");
        assert_eq!(s.direction_of("val"), Some(Direction::Asc));
        s.toggle("val");
        assert_eq!(s.direction_of("val"), Some(Direction::Desc));
        s.toggle("val");
        assert!(s.is_empty());
    }

    #[test]
    fn test_toggle_appends_lowest_priority() {
        let mut s = SortState::asc("a");
        s.toggle("b");
        assert_eq!(s.priority_of("a"), Some(1));
        assert_eq!(s.priority_of("b"), Some(2));
    }

    #[test]
    fn test_builder_deduplicates_columns() {
        let s = SortState::asc("a").then_asc("b").then_desc("a");
        assert_eq!(s.keys().len(), 2);
        assert_eq!(s.keys()[1].column, "a");
    }

    #[test]
    fn test_compare_cells_numeric_vs_text() {
        assert_eq!(compare_cells(&"10".into(), &"9".into()), Ordering::Greater);
        assert_eq!(compare_cells(&"b".into(), &"a".into()), Ordering::Greater);
        assert_eq!(compare_cells(&2.into(), &"2".into()), Ordering::Equal);
    }

    #[test]
    fn test_stable_sort_keeps_ties_in_order() {
        let mut items = vec![(1, 'a'), (0, 'b'), (1, 'c'), (0, 'd'), (1, 'e')];
        stable_sort_by(&mut items, |x, y| x.0.cmp(&y.0));
        assert_eq!(items, vec![(0, 'b'), (0, 'd'), (1, 'a'), (1, 'c'), (1, 'e')]);
    }
}
