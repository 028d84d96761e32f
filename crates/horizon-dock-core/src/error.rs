//! Error types for Horizon Dock core.

use std::fmt;
use std::time::Duration;

/// The main error type for Horizon Dock core operations.
#[derive(Debug)]
pub enum CoreError {
    /// Scheduler-related error.
    Scheduler(SchedulerError),
    /// Worker-related error.
    Worker(WorkerError),
    /// A blocking call was issued from the thread that has to service it.
    WouldDeadlock,
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scheduler(err) => write!(f, "Scheduler error: {err}"),
            Self::Worker(err) => write!(f, "Worker error: {err}"),
            Self::WouldDeadlock => {
                write!(f, "Blocking call issued from the servicing thread would deadlock")
            }
        }
    }
}

impl std::error::Error for CoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Scheduler(err) => Some(err),
            Self::Worker(err) => Some(err),
            Self::WouldDeadlock => None,
        }
    }
}

/// Coalescing scheduler errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// The maximum delay is shorter than the minimum delay.
    InvalidDelays {
        /// Requested minimum delay.
        min: Duration,
        /// Requested maximum delay.
        max: Duration,
    },
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidDelays { min, max } => write!(
                f,
                "Maximum delay ({max:?}) must not be shorter than minimum delay ({min:?})"
            ),
        }
    }
}

impl std::error::Error for SchedulerError {}

/// Background worker errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerError {
    /// The worker thread could not be spawned.
    SpawnFailed(String),
    /// The worker has been stopped and no longer accepts requests.
    Stopped,
}

impl fmt::Display for WorkerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SpawnFailed(msg) => write!(f, "Failed to spawn worker thread: {msg}"),
            Self::Stopped => write!(f, "Worker has been stopped"),
        }
    }
}

impl std::error::Error for WorkerError {}

impl From<SchedulerError> for CoreError {
    fn from(err: SchedulerError) -> Self {
        Self::Scheduler(err)
    }
}

impl From<WorkerError> for CoreError {
    fn from(err: WorkerError) -> Self {
        Self::Worker(err)
    }
}

/// A specialized Result type for Horizon Dock core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
