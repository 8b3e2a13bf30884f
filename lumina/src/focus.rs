//! Focus and cursor preservation across rebuilds.

use std::fmt;

/// Stable identity of a text input, independent of the element rendering it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InputTarget {
    Search,
    ColumnFilter(String),
}

impl fmt::Display for InputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputTarget::Search => write!(f, "__search"),
            InputTarget::ColumnFilter(column) => write!(f, "__filter_{}", column),
        }
    }
}

/// A focused text input as reported by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusedInput {
    pub target: InputTarget,
    /// Cursor offset in characters.
    pub cursor: usize,
}

/// Host access to text-input focus.
pub trait InputFocus {
    /// The text input holding focus, if any.
    fn focused_input(&self) -> Option<FocusedInput>;

    /// Character length of an input's current text, `None` if it is not rendered.
    fn input_len(&self, target: &InputTarget) -> Option<usize>;

    /// Focuses an input and places the cursor. Returns `false` if it is not rendered.
    fn focus_input(&mut self, target: &InputTarget, cursor: usize) -> bool;
}

/// Focus captured before a rebuild, waiting to be restored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FocusTracker {
    pending: Option<FocusedInput>,
}

impl FocusTracker {
    /// Records the focused input if it is the one the action concerns.
    ///
    /// Returns `true` if something was captured.
    pub fn capture<H>(&mut self, host: &H, relevant: Option<&InputTarget>) -> bool
    where
        H: InputFocus + ?Sized,
    {
        let Some(relevant) = relevant else {
            return false;
        };
        match host.focused_input() {
            Some(focused) if &focused.target == relevant => {
                log::debug!("captured focus on {} at {}", focused.target, focused.cursor);
                self.pending = Some(focused);
                true
            }
            _ => false,
        }
    }

    pub fn pending(&self) -> Option<&FocusedInput> {
        self.pending.as_ref()
    }

    /// Re-focuses the captured input, clamping the cursor to its current text.
    ///
    /// Returns `true` if focus was restored.
    pub fn restore<H>(&mut self, host: &mut H) -> bool
    where
        H: InputFocus + ?Sized,
    {
        let Some(snapshot) = self.pending.take() else {
            return false;
        };
        let Some(len) = host.input_len(&snapshot.target) else {
            log::debug!("focus target {} no longer rendered", snapshot.target);
            return false;
        };
        let cursor = snapshot.cursor.min(len);
        let restored = host.focus_input(&snapshot.target, cursor);
        log::debug!("restored focus on {} at {}: {}", snapshot.target, cursor, restored);
        restored
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }
}
