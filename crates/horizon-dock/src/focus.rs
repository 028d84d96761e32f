//! Focus bookkeeping: the focused placeholder, the staged next focus, the
//! recency list and the repeated-activation heuristic.

use std::time::{Duration, Instant};

use horizon_dock_core::logging::targets;
use horizon_dock_core::LruSet;

use crate::placeholder::PlaceholderId;
use crate::tree::WindowId;

/// What the host reports as holding keyboard focus inside a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusOwner {
    /// A managed component.
    Component(PlaceholderId),
    /// Something in the window that no placeholder owns.
    Unmanaged,
    /// The in-place text edit overlay.
    EditOverlay,
    /// Nothing has focus.
    None,
}

/// Focus state of one manager.
///
/// At most one placeholder is focused. Focus requests are staged in a
/// separate slot and applied later; staging again replaces the request.
#[derive(Debug)]
pub struct FocusTracker {
    focused: Option<PlaceholderId>,
    next: Option<PlaceholderId>,
    recent: LruSet<PlaceholderId>,
    active_window: Option<WindowId>,
}

impl FocusTracker {
    pub fn new(recent_capacity: usize) -> Self {
        Self {
            focused: None,
            next: None,
            recent: LruSet::new(recent_capacity),
            active_window: None,
        }
    }

    pub fn focused(&self) -> Option<PlaceholderId> {
        self.focused
    }

    /// Replace the focused placeholder, returning the previous one.
    pub fn set_focused(&mut self, placeholder: Option<PlaceholderId>) -> Option<PlaceholderId> {
        if let Some(id) = placeholder {
            self.recent.add(id);
        }
        std::mem::replace(&mut self.focused, placeholder)
    }

    pub fn next(&self) -> Option<PlaceholderId> {
        self.next
    }

    /// Stage the next focus target.
    pub fn stage(&mut self, placeholder: Option<PlaceholderId>) {
        tracing::trace!(target: targets::FOCUS, ?placeholder, "staged next focus");
        self.next = placeholder;
    }

    pub fn take_next(&mut self) -> Option<PlaceholderId> {
        self.next.take()
    }

    pub fn active_window(&self) -> Option<WindowId> {
        self.active_window
    }

    pub fn set_active_window(&mut self, window: Option<WindowId>) {
        self.active_window = window;
    }

    /// Drop every reference to `placeholder`.
    ///
    /// Returns `true` if it was the focused one.
    pub fn forget(&mut self, placeholder: PlaceholderId) -> bool {
        if self.next == Some(placeholder) {
            self.next = None;
        }
        self.recent.remove(&placeholder);
        if self.focused == Some(placeholder) {
            self.focused = None;
            return true;
        }
        false
    }

    /// Clear the focused and staged placeholders.
    pub fn clear(&mut self) {
        self.focused = None;
        self.next = None;
    }

    pub fn clear_history(&mut self) {
        self.recent.clear();
    }

    /// Most recent first.
    pub fn recent(&self) -> Vec<PlaceholderId> {
        self.recent.iter().copied().collect()
    }

    /// The most recently focused placeholder that `accept` still takes.
    ///
    /// Rejected entries are evicted on the way.
    pub fn refocus_candidate(&mut self, accept: impl FnMut(&PlaceholderId) -> bool) -> Option<PlaceholderId> {
        self.recent.find_and_prune(accept).copied()
    }
}

/// Detects the same placeholder being brought to front twice in quick
/// succession.
#[derive(Debug)]
pub struct ActivationTracker {
    window: Duration,
    last: Option<(PlaceholderId, Instant)>,
}

impl ActivationTracker {
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    /// Record an activation. Returns `true` when it repeats the previous
    /// one within the window.
    pub fn activated(&mut self, placeholder: PlaceholderId, now: Instant) -> bool {
        let repeated = matches!(
            self.last,
            Some((last, at)) if last == placeholder && now.saturating_duration_since(at) < self.window
        );
        self.last = Some((placeholder, now));
        repeated
    }

    pub fn clear(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn ids(n: usize) -> Vec<PlaceholderId> {
        let mut map: SlotMap<PlaceholderId, ()> = SlotMap::with_key();
        (0..n).map(|_| map.insert(())).collect()
    }

    #[test]
    fn test_recency_is_bounded() {
        let ids = ids(25);
        let mut tracker = FocusTracker::new(20);
        for &id in &ids {
            tracker.set_focused(Some(id));
        }
        let recent = tracker.recent();
        assert_eq!(recent.len(), 20);
        assert_eq!(recent[0], ids[24]);
        assert!(!recent.contains(&ids[4]));
        assert!(recent.contains(&ids[5]));
    }

    #[test]
    fn test_refocus_skips_and_evicts() {
        let ids = ids(3);
        let mut tracker = FocusTracker::new(20);
        for &id in &ids {
            tracker.set_focused(Some(id));
        }
        let hidden = ids[2];
        assert_eq!(tracker.refocus_candidate(|&id| id != hidden), Some(ids[1]));
        assert_eq!(tracker.recent(), vec![ids[1], ids[0]]);
    }

    #[test]
    fn test_stage_last_write_wins() {
        let ids = ids(2);
        let mut tracker = FocusTracker::new(4);
        tracker.stage(Some(ids[0]));
        tracker.stage(Some(ids[1]));
        assert_eq!(tracker.take_next(), Some(ids[1]));
        assert_eq!(tracker.next(), None);
    }

    #[test]
    fn test_forget() {
        let ids = ids(2);
        let mut tracker = FocusTracker::new(4);
        tracker.set_focused(Some(ids[0]));
        tracker.stage(Some(ids[0]));
        assert!(tracker.forget(ids[0]));
        assert_eq!(tracker.focused(), None);
        assert_eq!(tracker.next(), None);
        assert!(tracker.recent().is_empty());
        assert!(!tracker.forget(ids[1]));
    }

    #[test]
    fn test_activation_window() {
        let ids = ids(2);
        let start = Instant::now();
        let mut tracker = ActivationTracker::new(Duration::from_secs(3));
        assert!(!tracker.activated(ids[0], start));
        assert!(tracker.activated(ids[0], start + Duration::from_secs(1)));
        assert!(!tracker.activated(ids[1], start + Duration::from_secs(2)));
        assert!(!tracker.activated(ids[0], start + Duration::from_secs(3)));
        assert!(!tracker.activated(ids[0], start + Duration::from_secs(7)));
    }
}
