//! Cancellable deferred work.
//!
//! The grid is single-threaded; nothing here spawns or sleeps. The host
//! drives time by calling [`Scheduler::due`] with the current instant and
//! [`Scheduler::take_frames`] once per animation frame.

use std::time::Duration;
use std::time::Instant;

/// Debounce slot. Scheduling into an occupied slot replaces the pending call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DebounceSlot {
    Search,
    ColumnFilter(String),
}

/// Work deferred to the next animation frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameTask {
    /// Recompute the virtual window from the current scroll offset.
    VirtualScroll,
    /// Re-focus the input captured before the last rebuild.
    RestoreFocus,
}

#[derive(Debug, Clone)]
struct Pending<T> {
    slot: DebounceSlot,
    deadline: Instant,
    payload: T,
}

/// Debounce timers plus per-frame tasks.
#[derive(Debug, Clone)]
pub struct Scheduler<T> {
    pending: Vec<Pending<T>>,
    frames: Vec<FrameTask>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
            frames: Vec::new(),
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules `payload` to fire `delay` after `now`, replacing anything
    /// pending in the same slot.
    pub fn debounce(&mut self, slot: DebounceSlot, delay: Duration, now: Instant, payload: T) {
        self.cancel(&slot);
        log::trace!("debounce {:?} for {:?}", slot, delay);
        self.pending.push(Pending {
            slot,
            deadline: now + delay,
            payload,
        });
    }

    /// Drops the pending call in a slot. Returns `true` if there was one.
    pub fn cancel(&mut self, slot: &DebounceSlot) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| &p.slot != slot);
        before != self.pending.len()
    }

    /// Drops every pending column-filter call.
    pub fn cancel_column_filters(&mut self) -> usize {
        let before = self.pending.len();
        self.pending
            .retain(|p| !matches!(p.slot, DebounceSlot::ColumnFilter(_)));
        before - self.pending.len()
    }

    /// Drops every pending debounced call.
    pub fn cancel_all_debounced(&mut self) -> usize {
        let count = self.pending.len();
        self.pending.clear();
        count
    }

    pub fn is_pending(&self, slot: &DebounceSlot) -> bool {
        self.pending.iter().any(|p| &p.slot == slot)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Earliest pending deadline.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.iter().map(|p| p.deadline).min()
    }

    /// Removes and returns every call whose deadline has passed, earliest first.
    pub fn due(&mut self, now: Instant) -> Vec<(DebounceSlot, T)> {
        let (mut due, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|p| p.deadline <= now);
        self.pending = waiting;
        due.sort_by_key(|p| p.deadline);
        due.into_iter().map(|p| (p.slot, p.payload)).collect()
    }

    /// Requests a frame task. Returns `false` if it was already requested.
    pub fn request_frame(&mut self, task: FrameTask) -> bool {
        if self.frames.contains(&task) {
            return false;
        }
        self.frames.push(task);
        true
    }

    /// Drains the frame tasks in request order.
    pub fn take_frames(&mut self) -> Vec<FrameTask> {
        std::mem::take(&mut self.frames)
    }

    /// Drops all pending work.
    pub fn clear(&mut self) {
        self.pending.clear();
        self.frames.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_call_wins() {
        let now = Instant::now();
        let mut s = Scheduler::new();
        s.debounce(DebounceSlot::Search, Duration::from_millis(100), now, "a");
        s.debounce(DebounceSlot::Search, Duration::from_millis(100), now + Duration::from_millis(50), "ab");
        assert!(s.due(now + Duration::from_millis(120)).is_empty());
        let due = s.due(now + Duration::from_millis(150));
        assert_eq!(due, vec![(DebounceSlot::Search, "ab")]);
        assert_eq!(s.pending_count(), 0);
    }

    #[test]
    fn test_slots_are_independent() {
        let now = Instant::now();
        let mut s = Scheduler::new();
        s.debounce(DebounceSlot::ColumnFilter("a".into()), Duration::from_millis(30), now, 1);
        s.debounce(DebounceSlot::Search, Duration::from_millis(10), now, 2);
        s.debounce(DebounceSlot::ColumnFilter("b".into()), Duration::from_millis(20), now, 3);
        let due: Vec<i32> = s.due(now + Duration::from_millis(30)).into_iter().map(|(_, p)| p).collect();
        assert_eq!(due, vec![2, 3, 1]);
    }

    #[test]
    fn test_cancel_column_filters() {
        let now = Instant::now();
        let mut s = Scheduler::new();
        s.debounce(DebounceSlot::ColumnFilter("a".into()), Duration::ZERO, now, ());
        s.debounce(DebounceSlot::Search, Duration::ZERO, now, ());
        assert_eq!(s.cancel_column_filters(), 1);
        assert!(s.is_pending(&DebounceSlot::Search));
        assert_eq!(s.cancel_all_debounced(), 1);
        assert!(s.next_deadline().is_none());
    }

    #[test]
    fn test_frames_coalesce() {
        let mut s: Scheduler<()> = Scheduler::new();
        assert!(s.request_frame(FrameTask::VirtualScroll));
        assert!(!s.request_frame(FrameTask::VirtualScroll));
        assert!(s.request_frame(FrameTask::RestoreFocus));
        assert_eq!(s.take_frames(), vec![FrameTask::VirtualScroll, FrameTask::RestoreFocus]);
        assert!(s.take_frames().is_empty());
    }
}
