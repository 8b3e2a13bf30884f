//! Row selection and hiding.
//!
//! Selection and hiding are tracked by [`RowId`], so both survive sorting and
//! filtering. Selected rows stay selected while filtered out; only
//! [`SelectionManager::hide_selected_rows`] moves them out of the selection.

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use crate::model::RowId;

/// Selection mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// At most one selected row
    #[default]
    Single,
    /// Toggle on click, range on shift-click
    Multiple,
}

/// Keyboard modifiers held during a row activation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ctrl: false,
    };
}

/// Selected identities plus the last activated row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    mode: SelectionMode,
    selected: BTreeSet<RowId>,
    last_activated: Option<RowId>,
}

impl SelectionState {
    pub fn new(mode: SelectionMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn is_selected(&self, id: RowId) -> bool {
        self.selected.contains(&id)
    }

    /// Selected identities in ascending order.
    pub fn selected(&self) -> impl Iterator<Item = RowId> + '_ {
        self.selected.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn last_activated(&self) -> Option<RowId> {
        self.last_activated
    }
}

/// Identities excluded from every derived view until cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HiddenSet(BTreeSet<RowId>);

impl HiddenSet {
    pub fn contains(&self, id: RowId) -> bool {
        self.0.contains(&id)
    }

    pub fn insert(&mut self, id: RowId) -> bool {
        self.0.insert(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = RowId> + '_ {
        self.0.iter().copied()
    }

    fn clear(&mut self) -> usize {
        let count = self.0.len();
        self.0.clear();
        count
    }
}

impl FromIterator<RowId> for HiddenSet {
    fn from_iter<I: IntoIterator<Item = RowId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Identities added to and removed from the selection by one operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionChange {
    pub added: Vec<RowId>,
    pub removed: Vec<RowId>,
}

impl SelectionChange {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Selection and hidden-row state machine.
#[derive(Debug, Clone, Default)]
pub struct SelectionManager {
    enabled: bool,
    state: SelectionState,
    hidden: HiddenSet,
}

impl SelectionManager {
    pub fn new(enabled: bool, mode: SelectionMode) -> Self {
        Self {
            enabled,
            state: SelectionState::new(mode),
            hidden: HiddenSet::default(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn hidden(&self) -> &HiddenSet {
        &self.hidden
    }

    /// Applies a row click.
    ///
    /// `ordered` is the current display order, used to resolve shift-click
    /// ranges. Does nothing while selection is disabled.
    pub fn handle_row_activate(
        &mut self,
        id: RowId,
        modifiers: Modifiers,
        ordered: &[RowId],
    ) -> SelectionChange {
        if !self.enabled {
            return SelectionChange::default();
        }
        let change = match (self.state.mode, self.state.last_activated) {
            (SelectionMode::Multiple, Some(last)) if modifiers.shift => {
                self.range_select(last, id, ordered)
            }
            (SelectionMode::Single, _) => self.select_sole(id),
            (SelectionMode::Multiple, _) => self.toggle(id),
        };
        self.state.last_activated = Some(id);
        log::debug!(
            "row {} activated: +{} -{}, {} selected",
            id,
            change.added.len(),
            change.removed.len(),
            self.state.len()
        );
        change
    }

    fn select_sole(&mut self, id: RowId) -> SelectionChange {
        let was_selected = self.state.selected.contains(&id);
        let removed = std::mem::take(&mut self.state.selected).into_iter().collect();
        let added = if was_selected {
            vec![]
        } else {
            self.state.selected.insert(id);
            vec![id]
        };
        SelectionChange { added, removed }
    }

    fn toggle(&mut self, id: RowId) -> SelectionChange {
        if self.state.selected.remove(&id) {
            SelectionChange {
                added: vec![],
                removed: vec![id],
            }
        } else {
            self.state.selected.insert(id);
            SelectionChange {
                added: vec![id],
                removed: vec![],
            }
        }
    }

    /// Adds the inclusive display range between `anchor` and `target`.
    ///
    /// If either end is not in the current order, only `target` is added.
    fn range_select(&mut self, anchor: RowId, target: RowId, ordered: &[RowId]) -> SelectionChange {
        let anchor_pos = ordered.iter().position(|&i| i == anchor);
        let target_pos = ordered.iter().position(|&i| i == target);
        let range: &[RowId] = match (anchor_pos, target_pos) {
            (Some(a), Some(t)) => &ordered[a.min(t)..=a.max(t)],
            _ => std::slice::from_ref(&target),
        };
        let added = range
            .iter()
            .copied()
            .filter(|&id| self.state.selected.insert(id))
            .collect();
        SelectionChange {
            added,
            removed: vec![],
        }
    }

    /// Clears the selection without touching hidden rows.
    pub fn clear_selection(&mut self) -> SelectionChange {
        let removed = std::mem::take(&mut self.state.selected).into_iter().collect();
        SelectionChange {
            added: vec![],
            removed,
        }
    }

    /// Moves every selected identity into the hidden set and clears the
    /// selection. Returns the number of rows hidden.
    ///
    /// The display order must be recomputed afterwards.
    pub fn hide_selected_rows(&mut self) -> usize {
        let selected = std::mem::take(&mut self.state.selected);
        let count = selected.len();
        for id in selected {
            self.hidden.insert(id);
        }
        if count > 0 {
            self.state.last_activated = None;
            log::debug!("hid {} selected rows ({} hidden)", count, self.hidden.len());
        }
        count
    }

    /// Clears the hidden set without touching the selection. Returns the
    /// number of rows restored.
    pub fn unhide_all_rows(&mut self) -> usize {
        self.hidden.clear()
    }

    /// Drops all state after a dataset replace.
    pub(crate) fn reset(&mut self) {
        self.state = SelectionState::new(self.state.mode);
        self.hidden = HiddenSet::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[u64]) -> Vec<RowId> {
        raw.iter().copied().map(RowId).collect()
    }

    #[test]
    fn test_single_mode_replaces_and_deselects() {
        let mut m = SelectionManager::new(true, SelectionMode::Single);
        let order = ids(&[0, 1, 2]);
        m.handle_row_activate(RowId(0), Modifiers::NONE, &order);
        m.handle_row_activate(RowId(1), Modifiers::NONE, &order);
        assert_eq!(m.state().selected().collect::<Vec<_>>(), ids(&[1]));

        let change = m.handle_row_activate(RowId(1), Modifiers::NONE, &order);
        assert!(m.state().is_empty());
        assert_eq!(change.removed, ids(&[1]));
    }

    #[test]
    fn test_single_mode_ignores_shift() {
        let mut m = SelectionManager::new(true, SelectionMode::Single);
        let order = ids(&[0, 1, 2]);
        m.handle_row_activate(RowId(0), Modifiers::NONE, &order);
        m.handle_row_activate(RowId(2), Modifiers::SHIFT, &order);
        assert_eq!(m.state().len(), 1);
    }

    #[test]
    fn test_multiple_toggle() {
        let mut m = SelectionManager::new(true, SelectionMode::Multiple);
        let order = ids(&[0, 1, 2]);
        m.handle_row_activate(RowId(0), Modifiers::NONE, &order);
        m.handle_row_activate(RowId(2), Modifiers::NONE, &order);
        m.handle_row_activate(RowId(0), Modifiers::NONE, &order);
        assert_eq!(m.state().selected().collect::<Vec<_>>(), ids(&[2]));
        assert_eq!(m.state().last_activated(), Some(RowId(0)));
    }

    #[test]
    fn test_shift_range_uses_display_order() {
        let mut m = SelectionManager::new(true, SelectionMode::Multiple);
        // display order differs from identity order
        let order = ids(&[5, 1, 9, 3, 7]);
        m.handle_row_activate(RowId(7), Modifiers::NONE, &order);
        m.handle_row_activate(RowId(1), Modifiers::NONE, &order);
        m.handle_row_activate(RowId(3), Modifiers::SHIFT, &order);
        assert_eq!(m.state().selected().collect::<Vec<_>>(), ids(&[1, 3, 7, 9]));
    }

    #[test]
    fn test_shift_without_anchor_in_order_selects_target() {
        let mut m = SelectionManager::new(true, SelectionMode::Multiple);
        m.handle_row_activate(RowId(4), Modifiers::NONE, &ids(&[4, 5]));
        let change = m.handle_row_activate(RowId(6), Modifiers::SHIFT, &ids(&[5, 6]));
        assert_eq!(change.added, ids(&[6]));
        assert_eq!(m.state().len(), 2);
    }

    #[test]
    fn test_shift_without_last_activated_toggles() {
        let mut m = SelectionManager::new(true, SelectionMode::Multiple);
        m.handle_row_activate(RowId(1), Modifiers::SHIFT, &ids(&[0, 1, 2]));
        assert_eq!(m.state().selected().collect::<Vec<_>>(), ids(&[1]));
    }

    #[test]
    fn test_hide_selected_then_unhide() {
        let mut m = SelectionManager::new(true, SelectionMode::Multiple);
        let order = ids(&[0, 1, 2]);
        m.handle_row_activate(RowId(0), Modifiers::NONE, &order);
        m.handle_row_activate(RowId(2), Modifiers::NONE, &order);
        assert_eq!(m.hide_selected_rows(), 2);
        assert!(m.state().is_empty());
        assert_eq!(m.state().last_activated(), None);
        assert!(m.hidden().contains(RowId(2)));

        m.handle_row_activate(RowId(1), Modifiers::NONE, &order);
        assert_eq!(m.unhide_all_rows(), 2);
        assert!(m.state().is_selected(RowId(1)));
    }

    #[test]
    fn test_disabled_selection_is_inert() {
        let mut m = SelectionManager::new(false, SelectionMode::Multiple);
        let change = m.handle_row_activate(RowId(0), Modifiers::NONE, &ids(&[0]));
        assert!(change.is_empty());
        assert!(m.state().last_activated().is_none());
    }
}
