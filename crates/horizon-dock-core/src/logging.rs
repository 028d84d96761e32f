//! Logging facilities for Horizon Dock.
//!
//! Horizon Dock uses the `tracing` crate for instrumentation. Nothing is
//! printed unless the application installs a subscriber:
//!
//! ```ignore
//! use tracing_subscriber::EnvFilter;
//!
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter(EnvFilter::new("horizon_dock=debug"))
//!         .init();
//! }
//! ```
//!
//! Every subsystem logs under one of the [`targets`] constants so that a
//! single component (say, focus arbitration) can be traced in isolation.

/// Span names used throughout Horizon Dock for tracing.
pub mod span_names {
    /// Coalesced layout rebuild.
    pub const REBUILD: &str = "horizon_dock::rebuild";
    /// Key chord dispatch.
    pub const KEY_DISPATCH: &str = "horizon_dock::key_dispatch";
    /// Layout restore from persisted state.
    pub const RESTORE: &str = "horizon_dock::restore";
    /// Signal emission span.
    pub const SIGNAL: &str = "horizon_dock::signal";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core runtime target.
    pub const CORE: &str = "horizon_dock_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_dock_core::signal";
    /// Coalescing scheduler target.
    pub const SCHEDULER: &str = "horizon_dock_core::scheduler";
    /// Background worker target.
    pub const WORKER: &str = "horizon_dock_core::worker";

    /// Docking window manager lifecycle.
    pub const MANAGER: &str = "horizon_dock::manager";
    /// Window tree mutation and validation.
    pub const TREE: &str = "horizon_dock::tree";
    /// Focus arbitration.
    pub const FOCUS: &str = "horizon_dock::focus";
    /// Action registration and enablement.
    pub const ACTIONS: &str = "horizon_dock::actions";
    /// Key chord resolution.
    pub const KEYS: &str = "horizon_dock::keys";
    /// Layout and preference persistence.
    pub const PERSIST: &str = "horizon_dock::persist";
    /// Process-wide manager registry.
    pub const REGISTRY: &str = "horizon_dock::registry";
}

/// A guard that records the duration of an operation as a tracing span.
///
/// The span stays entered until the guard is dropped.
///
/// ```ignore
/// let _span = PerfSpan::new("rebuild");
/// // timed work
/// ```
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create and enter a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::debug_span!(target: "horizon_dock::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_targets_are_namespaced() {
        for target in [targets::MANAGER, targets::TREE, targets::FOCUS, targets::KEYS] {
            assert!(target.starts_with("horizon_dock::"));
        }
        assert!(targets::SCHEDULER.starts_with(targets::CORE));
    }

    #[test]
    fn test_perf_span_without_subscriber() {
        let _span = PerfSpan::new("test_operation");
    }
}
