//! Choosing the parent window of a new dialog.

/// What the engine needs to know about a host window to parent a dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostWindow {
    pub id: u64,
    /// Whether the window is a dialog rather than a frame.
    pub dialog: bool,
    /// Short-lived dialogs (progress, task monitors) close on their own and
    /// must not become parents.
    pub transient: bool,
    pub showing: bool,
    /// The window that owns this one.
    pub parent: Option<Box<HostWindow>>,
}

impl HostWindow {
    /// A showing top-level frame.
    pub fn frame(id: u64) -> Self {
        Self {
            id,
            dialog: false,
            transient: false,
            showing: true,
            parent: None,
        }
    }

    /// A showing dialog owned by `parent`.
    pub fn dialog(id: u64, parent: HostWindow) -> Self {
        Self {
            id,
            dialog: true,
            transient: false,
            showing: true,
            parent: Some(Box::new(parent)),
        }
    }

    pub fn transient(mut self) -> Self {
        self.transient = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.showing = false;
        self
    }

    fn is_non_transient(&self) -> bool {
        !(self.dialog && self.transient)
    }
}

/// The window a new dialog should be parented to.
///
/// An explicit non-transient parent wins. Otherwise the active window is
/// used, except that a transient or hidden active dialog defers to its
/// nearest showing owner. With no usable candidate the main frame is used.
pub fn parent_window_for_dialog(
    explicit: Option<&HostWindow>,
    active: Option<&HostWindow>,
    main: &HostWindow,
) -> HostWindow {
    if let Some(window) = explicit.filter(|w| w.is_non_transient()) {
        return window.clone();
    }
    active
        .and_then(active_non_transient)
        .unwrap_or_else(|| main.clone())
}

fn active_non_transient(active: &HostWindow) -> Option<HostWindow> {
    let mut window = active;
    while window.dialog && (window.transient || !window.showing) {
        window = window.parent.as_deref()?;
    }
    window.showing.then(|| window.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_parent_wins() {
        let main = HostWindow::frame(1);
        let explicit = HostWindow::dialog(2, main.clone());
        let active = HostWindow::frame(3);
        let parent = parent_window_for_dialog(Some(&explicit), Some(&active), &main);
        assert_eq!(parent.id, 2);
    }

    #[test]
    fn test_transient_explicit_parent_ignored() {
        let main = HostWindow::frame(1);
        let explicit = HostWindow::dialog(2, main.clone()).transient();
        let active = HostWindow::frame(3);
        assert_eq!(parent_window_for_dialog(Some(&explicit), Some(&active), &main).id, 3);
    }

    #[test]
    fn test_transient_active_dialog_defers_to_owner() {
        let main = HostWindow::frame(1);
        let owner = HostWindow::dialog(2, main.clone());
        let task = HostWindow::dialog(3, owner).transient();
        assert_eq!(parent_window_for_dialog(None, Some(&task), &main).id, 2);
    }

    #[test]
    fn test_hidden_chain_falls_back_to_main() {
        let main = HostWindow::frame(1);
        let hidden_frame = HostWindow::frame(5).hidden();
        let closing = HostWindow::dialog(6, hidden_frame).hidden();
        assert_eq!(parent_window_for_dialog(None, Some(&closing), &main).id, 1);
        assert_eq!(parent_window_for_dialog(None, None, &main).id, 1);
    }
}
