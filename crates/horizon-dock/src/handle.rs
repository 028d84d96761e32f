//! Cross-thread access to a manager.
//!
//! A [`DockingWindowManager`] lives on one thread. Other threads reach it by
//! sending commands through a [`ManagerHandle`]; the manager runs them the
//! next time it processes events.
//!
//! ```ignore
//! let handle = manager.handle();
//! std::thread::spawn(move || {
//!     let count = handle.call(|manager| manager.active_providers().len())?;
//!     handle.post(|manager| manager.set_status_text("loaded"))?;
//!     Ok::<_, DockingError>(count)
//! });
//! ```

use std::fmt;
use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use horizon_dock_core::logging::targets;
use horizon_dock_core::{CoreError, ThreadAffinity};
use parking_lot::RwLock;

use crate::error::{DockingError, Result};
use crate::manager::DockingWindowManager;

/// A unit of work run on the manager's thread.
pub struct Command {
    run: Box<dyn FnOnce(&mut DockingWindowManager) + Send>,
}

impl Command {
    pub fn new<F>(run: F) -> Self
    where
        F: FnOnce(&mut DockingWindowManager) + Send + 'static,
    {
        Self { run: Box::new(run) }
    }

    pub(crate) fn execute(self, manager: &mut DockingWindowManager) {
        (self.run)(manager);
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Command")
    }
}

/// The result of [`ManagerHandle::call_or_pending`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingResult<R> {
    /// The command ran and produced a value.
    Ready(R),
    /// The command was queued behind the current event; its value is dropped.
    Pending,
}

impl<R> PendingResult<R> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn ready(self) -> Option<R> {
        match self {
            Self::Ready(value) => Some(value),
            Self::Pending => None,
        }
    }
}

/// A cloneable, `Send` handle to a manager.
#[derive(Clone)]
pub struct ManagerHandle {
    sender: Sender<Command>,
    affinity: ThreadAffinity,
    /// Held shared while sending and exclusively while closing, so nothing
    /// lands in the inbox after its final drain.
    open: Arc<RwLock<bool>>,
}

static_assertions::assert_impl_all!(ManagerHandle: Send, Sync, Clone);

impl fmt::Debug for ManagerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagerHandle")
            .field("thread", &self.affinity.thread_id())
            .field("alive", &self.is_alive())
            .finish()
    }
}

impl ManagerHandle {
    pub fn is_alive(&self) -> bool {
        *self.open.read()
    }

    /// Queue `command` to run on the manager's thread.
    pub fn post<F>(&self, command: F) -> Result<()>
    where
        F: FnOnce(&mut DockingWindowManager) + Send + 'static,
    {
        self.post_command(Command::new(command))
    }

    /// Fails with `Disposed` once the manager has been disposed.
    pub fn post_command(&self, command: Command) -> Result<()> {
        let open = self.open.read();
        if !*open {
            return Err(DockingError::Disposed);
        }
        self.sender.send(command).map_err(|_| DockingError::ManagerGone)
    }

    /// Run `command` on the manager's thread and wait for its result.
    ///
    /// Fails with `WouldDeadlock` on the manager's own thread, since the
    /// command could never run while the caller waits.
    pub fn call<R, F>(&self, command: F) -> Result<R>
    where
        F: FnOnce(&mut DockingWindowManager) -> R + Send + 'static,
        R: Send + 'static,
    {
        if self.affinity.is_same_thread() {
            tracing::warn!(target: targets::MANAGER, "blocking call issued on the manager thread");
            return Err(CoreError::WouldDeadlock.into());
        }
        let (tx, rx) = crossbeam_channel::bounded(1);
        self.post(move |manager| {
            let _ = tx.send(command(manager));
        })?;
        rx.recv().map_err(|_| DockingError::ManagerGone)
    }

    /// Like [`call`](Self::call), but on the manager's thread the command is
    /// queued and [`PendingResult::Pending`] returned instead.
    pub fn call_or_pending<R, F>(&self, command: F) -> Result<PendingResult<R>>
    where
        F: FnOnce(&mut DockingWindowManager) -> R + Send + 'static,
        R: Send + 'static,
    {
        if self.affinity.is_same_thread() {
            self.post(move |manager| {
                command(manager);
            })?;
            return Ok(PendingResult::Pending);
        }
        self.call(command).map(PendingResult::Ready)
    }
}

/// The manager's end of its handles.
pub(crate) struct CommandInbox {
    receiver: Receiver<Command>,
    handle: ManagerHandle,
}

impl CommandInbox {
    /// An inbox bound to the current thread.
    pub(crate) fn new() -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self {
            receiver,
            handle: ManagerHandle {
                sender,
                affinity: ThreadAffinity::current(),
                open: Arc::new(RwLock::new(true)),
            },
        }
    }

    pub(crate) fn handle(&self) -> ManagerHandle {
        self.handle.clone()
    }

    /// Every command queued so far.
    pub(crate) fn drain(&self) -> Vec<Command> {
        self.receiver.try_iter().collect()
    }

    /// Refuse further commands and drop the queued ones, waking blocked callers.
    pub(crate) fn close(&self) {
        let mut open = self.handle.open.write();
        *open = false;
        let dropped = self.drain().len();
        drop(open);
        if dropped > 0 {
            tracing::debug!(target: targets::MANAGER, dropped, "dropped queued commands");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_post_after_close_fails() {
        let inbox = CommandInbox::new();
        let handle = inbox.handle();
        handle.post(|_| {}).unwrap();
        assert_eq!(inbox.drain().len(), 1);

        inbox.close();
        assert!(!handle.is_alive());
        assert!(matches!(handle.post(|_| {}), Err(DockingError::Disposed)));
        assert!(matches!(
            std::thread::spawn(move || handle.call(|_| 1)).join().unwrap(),
            Err(DockingError::Disposed)
        ));
    }

    #[test]
    fn test_call_racing_close_never_hangs() {
        for _ in 0..200 {
            let inbox = CommandInbox::new();
            let handle = inbox.handle();
            let caller = std::thread::spawn(move || handle.call(|_| 5));
            inbox.close();
            // A command that slipped in before the close is dropped unrun.
            let result = caller.join().unwrap();
            assert!(matches!(
                result,
                Err(DockingError::Disposed) | Err(DockingError::ManagerGone)
            ));
        }
    }

    #[test]
    fn test_call_on_own_thread_would_deadlock() {
        let inbox = CommandInbox::new();
        let result = inbox.handle().call(|_| 1);
        assert!(matches!(result, Err(DockingError::Core(CoreError::WouldDeadlock))));
    }

    #[test]
    fn test_call_or_pending_on_own_thread() {
        let inbox = CommandInbox::new();
        let result = inbox.handle().call_or_pending(|_| 1).unwrap();
        assert!(result.is_pending());
        assert_eq!(inbox.drain().len(), 1);
    }

    #[test]
    fn test_call_unblocks_when_closed() {
        let inbox = CommandInbox::new();
        let handle = inbox.handle();
        let caller = std::thread::spawn(move || handle.call(|_| 5));
        // Wait for the command to arrive, then drop it unrun.
        while inbox.receiver.is_empty() {
            std::thread::yield_now();
        }
        inbox.close();
        assert!(matches!(caller.join().unwrap(), Err(DockingError::ManagerGone)));
    }
}
