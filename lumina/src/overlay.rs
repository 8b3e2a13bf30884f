//! The single transient overlay (dropdown or menu) of a grid.
//!
//! At most one overlay is open at a time. Opening another closes the current
//! one; Escape or a click outside both the overlay and its trigger closes it.

use serde::Serialize;

/// Kind of floating panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum OverlayKind {
    /// Column visibility menu.
    ColumnMenu,
    /// Download options menu.
    DownloadMenu,
    /// Conditional-format panel of a column.
    ConditionalFormat { column: String },
}

/// Where a click landed relative to the open overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickTarget {
    /// Inside the overlay panel.
    Inside,
    /// On the trigger of an overlay.
    Trigger(OverlayKind),
    /// Anywhere else.
    Outside,
}

/// Overlay input events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayEvent {
    Toggle(OverlayKind),
    Click(ClickTarget),
    Escape,
}

/// Tagged state of the open overlay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OverlayState {
    open: Option<OverlayKind>,
}

impl OverlayState {
    pub fn open(&self) -> Option<&OverlayKind> {
        self.open.as_ref()
    }

    pub fn is_open(&self, kind: &OverlayKind) -> bool {
        self.open.as_ref() == Some(kind)
    }

    /// Applies an event. Returns `true` if the open overlay changed.
    pub fn handle(&mut self, event: OverlayEvent) -> bool {
        let next = match event {
            OverlayEvent::Toggle(kind) if self.is_open(&kind) => None,
            OverlayEvent::Toggle(kind) => Some(kind),
            OverlayEvent::Escape => None,
            OverlayEvent::Click(ClickTarget::Inside) => return false,
            // the trigger handles its own toggle
            OverlayEvent::Click(ClickTarget::Trigger(kind)) if self.is_open(&kind) => return false,
            OverlayEvent::Click(_) => None,
        };
        if next == self.open {
            return false;
        }
        log::debug!("overlay {:?} -> {:?}", self.open, next);
        self.open = next;
        true
    }

    pub fn close(&mut self) -> bool {
        self.open.take().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opening_one_closes_other() {
        let mut o = OverlayState::default();
        assert!(o.handle(OverlayEvent::Toggle(OverlayKind::ColumnMenu)));
        assert!(o.handle(OverlayEvent::Toggle(OverlayKind::DownloadMenu)));
        assert_eq!(o.open(), Some(&OverlayKind::DownloadMenu));
    }

    #[test]
    fn test_toggle_same_closes() {
        let mut o = OverlayState::default();
        o.handle(OverlayEvent::Toggle(OverlayKind::ColumnMenu));
        o.handle(OverlayEvent::Toggle(OverlayKind::ColumnMenu));
        assert!(o.open().is_none());
    }

    #[test]
    fn test_click_inside_keeps_open_outside_closes() {
        let mut o = OverlayState::default();
        let cf = OverlayKind::ConditionalFormat { column: "val".into() };
        o.handle(OverlayEvent::Toggle(cf.clone()));
        assert!(!o.handle(OverlayEvent::Click(ClickTarget::Inside)));
        assert!(!o.handle(OverlayEvent::Click(ClickTarget::Trigger(cf))));
        assert!(o.handle(OverlayEvent::Click(ClickTarget::Outside)));
        assert!(o.open().is_none());
    }

    #[test]
    fn test_escape_closes() {
        let mut o = OverlayState::default();
        o.handle(OverlayEvent::Toggle(OverlayKind::ColumnMenu));
        assert!(o.handle(OverlayEvent::Escape));
        assert!(!o.handle(OverlayEvent::Escape));
    }
}
