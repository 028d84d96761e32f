//! Core runtime for Horizon Dock.
//!
//! This crate provides the building blocks the docking window engine is made
//! of, none of which know anything about windows:
//!
//! - **Signal/Slot System**: Type-safe notification of hosts and listeners
//! - **Coalescing Scheduler**: Poll-driven debouncing with a bounded maximum delay
//! - **Coalescing Worker**: The same debouncing on a dedicated background thread
//! - **Task Queue**: Deferred work that runs on the next tick
//! - **Clocks**: Injectable time sources for deterministic tests
//! - **Thread Affinity**: Checks for single-threaded actors
//! - **LRU Set**: A bounded most-recently-used set
//!
//! # Signal/Slot Example
//!
//! ```
//! use horizon_dock_core::Signal;
//!
//! let focus_changed = Signal::<Option<String>>::new();
//! let conn_id = focus_changed.connect(|title| {
//!     println!("Focus moved to: {:?}", title);
//! });
//!
//! focus_changed.emit(Some("Listing".to_string()));
//! focus_changed.disconnect(conn_id);
//! ```
//!
//! # Coalescing Example
//!
//! ```
//! use horizon_dock_core::{CoalescingScheduler, Clock, ManualClock};
//! use std::time::Duration;
//!
//! let clock = ManualClock::new();
//! let mut rebuild = CoalescingScheduler::new(Duration::from_millis(100), Duration::from_millis(750));
//!
//! for _ in 0..100 {
//!     rebuild.request(clock.now());
//! }
//! clock.advance(Duration::from_millis(100));
//! assert!(rebuild.poll(clock.now()));
//! assert_eq!(rebuild.fire_count(), 1);
//! ```

mod clock;
mod coalesce;
mod error;
pub mod logging;
mod lru;
pub mod signal;
mod task;
pub mod thread_check;
pub mod worker;

pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use coalesce::CoalescingScheduler;
pub use error::{CoreError, Result, SchedulerError, WorkerError};
pub use logging::PerfSpan;
pub use lru::LruSet;
pub use signal::{ConnectionId, Signal};
pub use task::{TaskId, TaskQueue};
pub use thread_check::ThreadAffinity;
pub use worker::{CoalescingWorker, WorkerBuilder, WorkerConfig};
