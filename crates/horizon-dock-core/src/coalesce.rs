//! Debounced, poll-driven update scheduling.
//!
//! A [`CoalescingScheduler`] collapses any number of update requests into a
//! single firing. The first request arms the scheduler to fire after the
//! minimum delay; each further request pushes the firing back by the minimum
//! delay again, but never past the first request plus the maximum delay. Under
//! continuous pressure the work therefore still runs at least once per
//! maximum-delay window.
//!
//! The scheduler owns no thread and no timer: the owner asks it whether it is
//! due with [`poll`](CoalescingScheduler::poll), passing the current instant.
//! This keeps it usable from a single-threaded actor and lets tests drive it
//! with a manual clock.
//!
//! # Example
//!
//! ```
//! use horizon_dock_core::CoalescingScheduler;
//! use std::time::{Duration, Instant};
//!
//! let mut rebuild = CoalescingScheduler::new(
//!     Duration::from_millis(100),
//!     Duration::from_millis(750),
//! );
//!
//! let start = Instant::now();
//! for i in 0..10 {
//!     rebuild.request(start + Duration::from_millis(i));
//! }
//! assert!(!rebuild.poll(start + Duration::from_millis(50)));
//! assert!(rebuild.poll(start + Duration::from_millis(110)));
//! assert!(!rebuild.is_pending());
//! ```

use std::time::{Duration, Instant};

use crate::error::SchedulerError;
use crate::logging::targets;

/// Coalesces update requests into debounced firings.
#[derive(Debug, Clone)]
pub struct CoalescingScheduler {
    min_delay: Duration,
    max_delay: Duration,
    /// When the current burst of requests started.
    first_request: Option<Instant>,
    /// When the pending firing is due.
    due: Option<Instant>,
    /// Requests received since the last firing.
    pending_requests: u64,
    /// How many times the scheduler has fired.
    fire_count: u64,
}

impl CoalescingScheduler {
    /// Create a scheduler with the given delays.
    ///
    /// A maximum delay shorter than the minimum is raised to the minimum.
    pub fn new(min_delay: Duration, max_delay: Duration) -> Self {
        if max_delay < min_delay {
            tracing::warn!(
                target: targets::SCHEDULER,
                ?min_delay,
                ?max_delay,
                "maximum delay shorter than minimum, clamping"
            );
        }
        Self {
            min_delay,
            max_delay: max_delay.max(min_delay),
            first_request: None,
            due: None,
            pending_requests: 0,
            fire_count: 0,
        }
    }

    /// Create a scheduler, rejecting a maximum delay shorter than the minimum.
    pub fn try_new(min_delay: Duration, max_delay: Duration) -> Result<Self, SchedulerError> {
        if max_delay < min_delay {
            return Err(SchedulerError::InvalidDelays {
                min: min_delay,
                max: max_delay,
            });
        }
        Ok(Self::new(min_delay, max_delay))
    }

    /// The debounce interval.
    pub fn min_delay(&self) -> Duration {
        self.min_delay
    }

    /// The upper bound between the first request of a burst and the firing.
    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Request a firing.
    pub fn request(&mut self, now: Instant) {
        let first = *self.first_request.get_or_insert(now);
        let debounced = now + self.min_delay;
        let deadline = first + self.max_delay;
        self.due = Some(debounced.min(deadline));
        self.pending_requests += 1;
    }

    /// Request a firing that happens as soon as the scheduler is next polled.
    pub fn request_immediate(&mut self, now: Instant) {
        self.first_request.get_or_insert(now);
        self.due = Some(now);
        self.pending_requests += 1;
    }

    /// Whether a firing is pending.
    #[inline]
    pub fn is_pending(&self) -> bool {
        self.due.is_some()
    }

    /// When the pending firing is due, if any.
    pub fn due_at(&self) -> Option<Instant> {
        self.due
    }

    /// Time remaining until the pending firing, or `None` if idle.
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.due.map(|due| due.saturating_duration_since(now))
    }

    /// Requests received since the last firing.
    pub fn pending_requests(&self) -> u64 {
        self.pending_requests
    }

    /// Total number of firings so far.
    pub fn fire_count(&self) -> u64 {
        self.fire_count
    }

    /// Fire if due.
    ///
    /// Returns `true` exactly once per burst of requests, at or after the due
    /// instant. The scheduler is idle again afterwards.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.due {
            Some(due) if due <= now => {
                tracing::trace!(
                    target: targets::SCHEDULER,
                    coalesced = self.pending_requests,
                    "coalesced update firing"
                );
                self.reset();
                self.fire_count += 1;
                true
            }
            _ => false,
        }
    }

    /// Drop any pending firing.
    ///
    /// Returns `true` if a firing was pending.
    pub fn cancel(&mut self) -> bool {
        let was_pending = self.is_pending();
        self.reset();
        was_pending
    }

    fn reset(&mut self) {
        self.first_request = None;
        self.due = None;
        self.pending_requests = 0;
    }
}
