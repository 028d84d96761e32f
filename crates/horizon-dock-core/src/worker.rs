//! Coalescing background worker.
//!
//! A [`CoalescingWorker`] owns a dedicated thread that runs one unit of work
//! (reloading a table model, re-filtering a tree) whenever it has been asked
//! to, collapsing bursts of requests the same way
//! [`CoalescingScheduler`](crate::CoalescingScheduler) does: the work runs
//! once the requests have been quiet for the minimum delay, and at the latest
//! the maximum delay after the first request of a burst.
//!
//! Results are delivered through the [`on_completed`](CoalescingWorker::on_completed)
//! signal, emitted on the worker thread.
//!
//! # Example
//!
//! ```no_run
//! use horizon_dock_core::worker::{CoalescingWorker, WorkerBuilder};
//! use std::time::Duration;
//!
//! let worker = WorkerBuilder::new()
//!     .name("symbol-table-loader")
//!     .delays(Duration::from_millis(1000), Duration::from_secs(20 * 60))
//!     .spawn(|| 42usize)
//!     .expect("worker thread");
//!
//! worker.on_completed().connect(|rows| println!("reloaded {rows} rows"));
//! worker.request();
//! worker.stop_and_join();
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError, bounded};
use parking_lot::Mutex;

use crate::error::WorkerError;
use crate::logging::targets;
use crate::signal::Signal;

/// Default capacity of the request channel.
const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Configuration for creating a [`CoalescingWorker`].
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Name for the worker thread.
    pub name: String,
    /// Stack size for the worker thread in bytes. `None` uses the default.
    pub stack_size: Option<usize>,
    /// Capacity of the request channel.
    pub queue_capacity: usize,
    /// Quiet period required before the work runs.
    pub min_delay: Duration,
    /// Upper bound between the first request of a burst and the run.
    pub max_delay: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            name: "horizon-dock-worker".to_string(),
            stack_size: None,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            min_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(30_000),
        }
    }
}

impl WorkerConfig {
    /// Create a new configuration with the given thread name.
    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Builder for creating workers with custom configuration.
#[derive(Debug, Default)]
pub struct WorkerBuilder {
    config: WorkerConfig,
}

impl WorkerBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the thread name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.config.name = name.into();
        self
    }

    /// Set the stack size for the worker thread.
    pub fn stack_size(mut self, size: usize) -> Self {
        self.config.stack_size = Some(size);
        self
    }

    /// Set the request channel capacity.
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = capacity;
        self
    }

    /// Set the coalescing delays.
    pub fn delays(mut self, min_delay: Duration, max_delay: Duration) -> Self {
        self.config.min_delay = min_delay;
        self.config.max_delay = max_delay.max(min_delay);
        self
    }

    /// Build and start the worker.
    pub fn spawn<T, F>(self, work: F) -> Result<CoalescingWorker<T>, WorkerError>
    where
        T: Send + 'static,
        F: FnMut() -> T + Send + 'static,
    {
        CoalescingWorker::with_config(self.config, work)
    }
}

/// A message sent to the worker thread.
enum WorkerMessage {
    /// Run the unit of work (subject to coalescing).
    Request,
    /// Stop, discarding any pending run.
    Shutdown,
}

/// State shared between the worker handle and its thread.
struct WorkerState {
    running: AtomicBool,
    requests: AtomicU64,
    runs: AtomicU64,
}

/// A dedicated thread that runs a unit of work on coalesced requests.
pub struct CoalescingWorker<T: Send + 'static> {
    sender: Sender<WorkerMessage>,
    handle: Mutex<Option<JoinHandle<()>>>,
    state: Arc<WorkerState>,
    completed: Arc<Signal<T>>,
}

impl<T: Send + 'static> CoalescingWorker<T> {
    /// Start a worker with default configuration.
    pub fn spawn<F>(work: F) -> Result<Self, WorkerError>
    where
        F: FnMut() -> T + Send + 'static,
    {
        Self::with_config(WorkerConfig::default(), work)
    }

    /// Start a worker with custom configuration.
    pub fn with_config<F>(config: WorkerConfig, work: F) -> Result<Self, WorkerError>
    where
        F: FnMut() -> T + Send + 'static,
    {
        let (sender, receiver) = bounded(config.queue_capacity.max(1));
        let state = Arc::new(WorkerState {
            running: AtomicBool::new(true),
            requests: AtomicU64::new(0),
            runs: AtomicU64::new(0),
        });
        let completed = Arc::new(Signal::new());

        let thread_state = state.clone();
        let thread_signal = completed.clone();
        let (min_delay, max_delay) = (config.min_delay, config.max_delay.max(config.min_delay));

        let mut builder = thread::Builder::new().name(config.name);
        if let Some(stack_size) = config.stack_size {
            builder = builder.stack_size(stack_size);
        }

        let handle = builder
            .spawn(move || {
                worker_loop(receiver, &thread_state, &thread_signal, work, min_delay, max_delay);
                thread_state.running.store(false, Ordering::Release);
            })
            .map_err(|err| WorkerError::SpawnFailed(err.to_string()))?;

        Ok(Self {
            sender,
            handle: Mutex::new(Some(handle)),
            state,
            completed,
        })
    }

    /// Check if the worker is still running.
    pub fn is_running(&self) -> bool {
        self.state.running.load(Ordering::Acquire)
    }

    /// Signal emitted on the worker thread after each run.
    pub fn on_completed(&self) -> &Signal<T> {
        &self.completed
    }

    /// Total requests accepted so far.
    pub fn request_count(&self) -> u64 {
        self.state.requests.load(Ordering::Acquire)
    }

    /// Total runs of the unit of work so far.
    pub fn run_count(&self) -> u64 {
        self.state.runs.load(Ordering::Acquire)
    }

    /// Ask for the work to run.
    ///
    /// Returns `false` only if the worker has stopped. A full channel already
    /// holds a pending request, so the new one is coalesced into it.
    pub fn request(&self) -> bool {
        if !self.is_running() {
            return false;
        }
        match self.sender.try_send(WorkerMessage::Request) {
            Ok(()) | Err(TrySendError::Full(_)) => {
                self.state.requests.fetch_add(1, Ordering::AcqRel);
                true
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }

    /// Request the worker to stop. Any pending run is discarded.
    pub fn stop(&self) {
        self.state.running.store(false, Ordering::Release);
        // A full channel means the thread is awake and will see the flag.
        let _ = self.sender.try_send(WorkerMessage::Shutdown);
    }

    /// Wait for the worker thread to finish.
    ///
    /// Returns `true` if the worker was joined successfully, `false` if
    /// already joined or the thread panicked.
    pub fn join(&self) -> bool {
        let mut handle = self.handle.lock();
        match handle.take() {
            Some(h) => h.join().is_ok(),
            None => false,
        }
    }

    /// Stop the worker and wait for it to finish.
    pub fn stop_and_join(&self) -> bool {
        self.stop();
        self.join()
    }
}

impl<T: Send + 'static> Drop for CoalescingWorker<T> {
    fn drop(&mut self) {
        self.stop();
    }
}

static_assertions::assert_impl_all!(CoalescingWorker<Vec<u8>>: Send, Sync);

/// Outcome of waiting out one burst of requests.
enum Burst {
    Run,
    RunThenStop,
    Stop,
}

fn worker_loop<T, F>(
    receiver: Receiver<WorkerMessage>,
    state: &WorkerState,
    completed: &Signal<T>,
    mut work: F,
    min_delay: Duration,
    max_delay: Duration,
) where
    T: Send + 'static,
    F: FnMut() -> T,
{
    loop {
        match receiver.recv() {
            Ok(WorkerMessage::Request) => {}
            Ok(WorkerMessage::Shutdown) | Err(_) => break,
        }

        let burst = wait_out_burst(&receiver, state, min_delay, max_delay);
        if matches!(burst, Burst::Stop) {
            break;
        }

        let result = work();
        state.runs.fetch_add(1, Ordering::AcqRel);
        tracing::trace!(target: targets::WORKER, "coalesced work completed");
        completed.emit(result);

        if matches!(burst, Burst::RunThenStop) {
            break;
        }
    }
    tracing::debug!(target: targets::WORKER, "worker loop exited");
}

/// Absorb further requests until the burst has been quiet for `min_delay`
/// or `max_delay` has passed since it started.
fn wait_out_burst(
    receiver: &Receiver<WorkerMessage>,
    state: &WorkerState,
    min_delay: Duration,
    max_delay: Duration,
) -> Burst {
    let hard_deadline = Instant::now() + max_delay;
    let mut deadline = (Instant::now() + min_delay).min(hard_deadline);

    loop {
        let timeout = deadline.saturating_duration_since(Instant::now());
        match receiver.recv_timeout(timeout) {
            Ok(WorkerMessage::Request) => {
                deadline = (Instant::now() + min_delay).min(hard_deadline);
            }
            Ok(WorkerMessage::Shutdown) => return Burst::Stop,
            Err(RecvTimeoutError::Timeout) => {
                if !state.running.load(Ordering::Acquire) {
                    return Burst::Stop;
                }
                return Burst::Run;
            }
            Err(RecvTimeoutError::Disconnected) => return Burst::RunThenStop,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_worker_creation() {
        let worker = CoalescingWorker::spawn(|| 1).unwrap();
        assert!(worker.is_running());
        assert_eq!(worker.run_count(), 0);
        assert!(worker.stop_and_join());
    }

    #[test]
    fn test_burst_runs_once() {
        let worker = WorkerBuilder::new()
            .name("test-worker")
            .delays(Duration::from_millis(50), Duration::from_secs(5))
            .spawn(|| ())
            .unwrap();

        let completions = Arc::new(AtomicUsize::new(0));
        let completions_clone = completions.clone();
        worker.on_completed().connect(move |_| {
            completions_clone.fetch_add(1, Ordering::SeqCst);
        });

        for _ in 0..20 {
            assert!(worker.request());
        }

        let deadline = Instant::now() + Duration::from_secs(5);
        while worker.run_count() == 0 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        thread::sleep(Duration::from_millis(100));

        assert_eq!(worker.run_count(), 1);
        assert_eq!(completions.load(Ordering::SeqCst), 1);
        assert_eq!(worker.request_count(), 20);
        worker.stop_and_join();
    }

    #[test]
    fn test_request_after_stop_is_rejected() {
        let worker = CoalescingWorker::spawn(|| 0u8).unwrap();
        worker.stop();
        assert!(!worker.request());
        worker.join();
        assert!(!worker.is_running());
    }

    #[test]
    fn test_stop_discards_pending_run() {
        let worker = WorkerBuilder::new()
            .delays(Duration::from_secs(10), Duration::from_secs(10))
            .spawn(|| ())
            .unwrap();

        worker.request();
        thread::sleep(Duration::from_millis(20));
        assert!(worker.stop_and_join());
        assert_eq!(worker.run_count(), 0);
    }
}
