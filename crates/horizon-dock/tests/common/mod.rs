//! Shared harness: a manual clock, a manager and a fake host that records
//! what the manager asks of it.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use horizon_dock::{
    ComponentProvider, DockingConfig, DockingWindowManager, FocusOwner, FocusRequest, LayoutSnapshot,
    ManagerRegistry, ProviderRef, WindowId, WindowPosition,
};
use horizon_dock_core::ManualClock;
use parking_lot::Mutex;

/// Route engine logs to the test output. Filter with `RUST_LOG`.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A provider with a fixed identity and placement.
pub struct TestProvider {
    pub name: String,
    pub owner: String,
    pub title: String,
    pub group: String,
    pub position: WindowPosition,
    pub transient: bool,
}

impl TestProvider {
    pub fn new(owner: &str, name: &str) -> Self {
        Self {
            name: name.to_string(),
            owner: owner.to_string(),
            title: name.to_string(),
            group: String::new(),
            position: WindowPosition::Right,
            transient: false,
        }
    }

    pub fn at(mut self, position: WindowPosition) -> Self {
        self.position = position;
        self
    }

    pub fn in_group(mut self, group: &str) -> Self {
        self.group = group.to_string();
        self
    }

    pub fn transient(mut self) -> Self {
        self.transient = true;
        self
    }

    pub fn shared(self) -> ProviderRef {
        Arc::new(self)
    }
}

impl ComponentProvider for TestProvider {
    fn name(&self) -> &str {
        &self.name
    }
    fn owner(&self) -> &str {
        &self.owner
    }
    fn title(&self) -> String {
        self.title.clone()
    }
    fn window_group(&self) -> &str {
        &self.group
    }
    fn is_transient(&self) -> bool {
        self.transient
    }
    fn default_window_position(&self) -> WindowPosition {
        self.position
    }
}

/// Everything the manager told the host.
#[derive(Default)]
pub struct FakeHost {
    pub focus_requests: Mutex<Vec<FocusRequest>>,
    pub snapshots: Mutex<Vec<LayoutSnapshot>>,
    pub alerts: Mutex<usize>,
    pub statuses: Mutex<Vec<String>>,
}

impl FakeHost {
    fn attach(manager: &DockingWindowManager) -> Arc<Self> {
        let host = Arc::new(Self::default());
        let sink = host.clone();
        manager
            .signals()
            .focus_requested
            .connect(move |request| sink.focus_requests.lock().push(*request));
        let sink = host.clone();
        manager
            .signals()
            .rebuilt
            .connect(move |snapshot| sink.snapshots.lock().push(snapshot.clone()));
        let sink = host.clone();
        manager.signals().alert.connect(move |_| *sink.alerts.lock() += 1);
        let sink = host.clone();
        manager
            .signals()
            .status_changed
            .connect(move |text| sink.statuses.lock().push(text.clone()));
        host
    }

    pub fn last_snapshot(&self) -> Option<LayoutSnapshot> {
        self.snapshots.lock().last().cloned()
    }
}

pub struct Harness {
    pub clock: ManualClock,
    pub manager: DockingWindowManager,
    pub host: Arc<FakeHost>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(DockingConfig::default())
    }

    pub fn with_config(config: DockingConfig) -> Self {
        init_logging();
        let clock = ManualClock::new();
        let mut manager = DockingWindowManager::builder("Test Tool")
            .config(config)
            .clock(clock.shared())
            .registry(ManagerRegistry::new())
            .build();
        let host = FakeHost::attach(&manager);
        manager.set_visible(true);
        manager.window_activated(WindowId::Main, true);
        Self { clock, manager, host }
    }

    /// Let every pending timer and deferred task run.
    pub fn settle(&mut self) {
        for _ in 0..4 {
            self.clock.advance(Duration::from_secs(1));
            self.manager.process_events();
        }
    }

    /// Grant the focus requests the manager made, as a real host would.
    pub fn confirm_focus(&mut self) {
        let requests: Vec<FocusRequest> = self.host.focus_requests.lock().drain(..).collect();
        for request in requests {
            self.manager
                .focus_owner_changed(request.window, FocusOwner::Component(request.placeholder));
        }
        self.manager.process_events();
    }

    /// Settle, then grant focus.
    pub fn settle_and_focus(&mut self) {
        self.settle();
        self.confirm_focus();
    }
}
