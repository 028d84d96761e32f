//! Manager configuration.
//!
//! [`DockingConfig`] gathers the tunables of a docking window manager. Every
//! field has a default, so a configuration file only needs to name what it
//! changes:
//!
//! ```
//! use horizon_dock::DockingConfig;
//!
//! let config = DockingConfig::from_toml_str(r#"
//!     rebuild_max_delay_ms = 500
//!     windows_on_top = true
//! "#).unwrap();
//!
//! assert_eq!(config.rebuild_min_delay_ms, 100);
//! assert_eq!(config.rebuild_max_delay_ms, 500);
//! assert!(config.windows_on_top);
//! ```

use std::time::Duration;

use horizon_dock_core::CoalescingScheduler;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geometry::{Rect, Size};

/// Tunables for a docking window manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DockingConfig {
    /// Quiet period before a layout rebuild runs.
    pub rebuild_min_delay_ms: u64,
    /// Upper bound on how long a rebuild can be postponed by further requests.
    pub rebuild_max_delay_ms: u64,
    /// Debounce interval for recomputing action enablement after a context change.
    pub context_update_delay_ms: u64,
    /// How many recently focused components are remembered as refocus candidates.
    pub recent_focus_capacity: usize,
    /// Bringing the same component to front twice within this window emphasizes it.
    pub emphasis_window_ms: u64,
    /// Initial bounds of the main window.
    pub main_window_bounds: Rect,
    /// Size of a detached window created by dragging a component out.
    pub detached_window_size: Size,
    /// Whether components can be docked, moved and detached at all.
    pub docking: bool,
    /// Whether detached windows stay above the main window.
    pub windows_on_top: bool,
    /// Whether the main window carries a status bar.
    pub status_bar: bool,
}

impl Default for DockingConfig {
    fn default() -> Self {
        Self {
            rebuild_min_delay_ms: 100,
            rebuild_max_delay_ms: 750,
            context_update_delay_ms: 500,
            recent_focus_capacity: 20,
            emphasis_window_ms: 3000,
            main_window_bounds: Rect::new(0, 0, 1200, 800),
            detached_window_size: Size::new(500, 400),
            docking: true,
            windows_on_top: false,
            status_bar: true,
        }
    }
}

impl DockingConfig {
    /// Parse a configuration from TOML text. Missing fields take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Set the rebuild debounce delays.
    pub fn with_rebuild_delays(mut self, min: Duration, max: Duration) -> Self {
        self.rebuild_min_delay_ms = min.as_millis() as u64;
        self.rebuild_max_delay_ms = max.as_millis() as u64;
        self
    }

    /// Set the action-context debounce delay.
    pub fn with_context_update_delay(mut self, delay: Duration) -> Self {
        self.context_update_delay_ms = delay.as_millis() as u64;
        self
    }

    /// Set the capacity of the recent-focus list.
    pub fn with_recent_focus_capacity(mut self, capacity: usize) -> Self {
        self.recent_focus_capacity = capacity;
        self
    }

    /// Set whether docking is enabled.
    pub fn with_docking(mut self, docking: bool) -> Self {
        self.docking = docking;
        self
    }

    /// Set the initial main window bounds.
    pub fn with_main_window_bounds(mut self, bounds: Rect) -> Self {
        self.main_window_bounds = bounds;
        self
    }

    pub(crate) fn rebuild_scheduler(&self) -> CoalescingScheduler {
        CoalescingScheduler::new(
            Duration::from_millis(self.rebuild_min_delay_ms),
            Duration::from_millis(self.rebuild_max_delay_ms),
        )
    }

    pub(crate) fn context_scheduler(&self) -> CoalescingScheduler {
        let delay = Duration::from_millis(self.context_update_delay_ms);
        CoalescingScheduler::new(delay, delay)
    }

    pub(crate) fn emphasis_window(&self) -> Duration {
        Duration::from_millis(self.emphasis_window_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DockingError;

    #[test]
    fn test_defaults() {
        let config = DockingConfig::default();
        assert_eq!(config.rebuild_min_delay_ms, 100);
        assert_eq!(config.rebuild_max_delay_ms, 750);
        assert_eq!(config.context_update_delay_ms, 500);
        assert_eq!(config.recent_focus_capacity, 20);
        assert_eq!(config.emphasis_window(), Duration::from_secs(3));
        assert!(config.docking);
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(DockingConfig::from_toml_str("").unwrap(), DockingConfig::default());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = DockingConfig::default()
            .with_rebuild_delays(Duration::from_millis(10), Duration::from_millis(20))
            .with_docking(false);
        let text = toml::to_string(&config).unwrap();
        assert_eq!(DockingConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_invalid_toml() {
        let err = DockingConfig::from_toml_str("docking = \"sometimes\"").unwrap_err();
        assert!(matches!(err, DockingError::Config(_)));
    }

    #[test]
    fn test_schedulers_follow_config() {
        let config = DockingConfig::default()
            .with_context_update_delay(Duration::from_millis(250));
        let context = config.context_scheduler();
        assert_eq!(context.min_delay(), Duration::from_millis(250));
        assert_eq!(context.max_delay(), Duration::from_millis(250));
        assert_eq!(config.rebuild_scheduler().max_delay(), Duration::from_millis(750));
    }
}
