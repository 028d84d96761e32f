//! Tests for routing key chords between local and tool-wide actions.

mod common;

use std::sync::Arc;

use common::{Harness, TestProvider};
use horizon_dock::{
    ActionRef, DockingAction, DockingActionIf, Key, KeyBindingData, KeyBindingPrecedence, KeyChord, KeyResolution,
    MenuData, ProviderRef,
};
use parking_lot::Mutex;

/// Every perform is logged as `(action, provider in context)`.
type PerformLog = Arc<Mutex<Vec<(String, Option<String>)>>>;

fn logged(name: &str, data: KeyBindingData, log: &PerformLog) -> DockingAction {
    let log = log.clone();
    let action_name = name.to_string();
    DockingAction::new(name, "TestPlugin")
        .with_key_binding(data)
        .on_perform(move |context| {
            let provider = context.provider().map(|p| p.name().to_string());
            log.lock().push((action_name.clone(), provider));
        })
}

fn focused_harness(providers: &[&ProviderRef]) -> Harness {
    let mut harness = Harness::new();
    for p in providers {
        harness.manager.add_component((*p).clone(), true).unwrap();
    }
    harness.settle_and_focus();
    harness
}

#[test]
fn test_focused_provider_action_beats_global() {
    let disassembly = TestProvider::new("CodeBrowser", "Disassembly").shared();
    let console = TestProvider::new("Console", "Console").shared();
    let mut harness = focused_harness(&[&console, &disassembly]);

    let log = PerformLog::default();
    let chord = KeyChord::ctrl_shift(Key::X);
    let a: ActionRef = Arc::new(logged("A", KeyBindingData::new(chord), &log));
    let b: ActionRef = Arc::new(logged("B", KeyBindingData::new(chord), &log));
    harness.manager.add_local_action(&disassembly, a).unwrap();
    harness.manager.add_tool_action(b).unwrap();

    harness.manager.show_component(&disassembly, true);
    harness.settle_and_focus();
    assert_eq!(harness.manager.active_component_provider().unwrap().name(), "Disassembly");

    match harness.manager.dispatch_key(chord) {
        KeyResolution::Single(exec) => assert_eq!(exec.action().name(), "A"),
        other => panic!("expected A alone, got {other:?}"),
    }
    assert_eq!(*log.lock(), vec![("A".to_string(), Some("Disassembly".to_string()))]);
}

#[test]
fn test_global_action_runs_when_focused_provider_has_none() {
    let disassembly = TestProvider::new("CodeBrowser", "Disassembly").shared();
    let console = TestProvider::new("Console", "Console").shared();
    let mut harness = focused_harness(&[&disassembly, &console]);

    let log = PerformLog::default();
    let chord = KeyChord::ctrl_shift(Key::X);
    let a: ActionRef = Arc::new(logged("A", KeyBindingData::new(chord), &log));
    let b: ActionRef = Arc::new(logged("B", KeyBindingData::new(chord), &log));
    harness.manager.add_local_action(&disassembly, a).unwrap();
    harness.manager.add_tool_action(b).unwrap();

    harness.manager.show_component(&console, true);
    harness.settle_and_focus();
    assert_eq!(harness.manager.active_component_provider().unwrap().name(), "Console");

    assert!(matches!(harness.manager.dispatch_key(chord), KeyResolution::Single(_)));
    assert_eq!(*log.lock(), vec![("B".to_string(), Some("Console".to_string()))]);
}

#[test]
fn test_inapplicable_binding_reports_to_host() {
    let listing = TestProvider::new("CodeBrowser", "Listing").shared();
    let mut harness = focused_harness(&[&listing]);

    let chord = KeyChord::ctrl(Key::E);
    let log = PerformLog::default();
    let action: ActionRef = Arc::new(logged("Edit Label", KeyBindingData::new(chord), &log).valid_when(|_| false));
    harness.manager.add_tool_action(action).unwrap();

    assert!(matches!(harness.manager.dispatch_key(chord), KeyResolution::NotApplicable));
    assert_eq!(*harness.host.alerts.lock(), 1);
    assert_eq!(
        harness.host.statuses.lock().last().map(String::as_str),
        Some("Action (Ctrl+E) not valid in this context!")
    );
    assert!(log.lock().is_empty());
    assert_eq!(harness.manager.key_binding_precedence(chord), None);
}

#[test]
fn test_competing_globals_offered_to_host() {
    let listing = TestProvider::new("CodeBrowser", "Listing").shared();
    let mut harness = focused_harness(&[&listing]);

    let chord = KeyChord::key_only(Key::F5);
    let log = PerformLog::default();
    for name in ["Refresh", "Resume"] {
        let action: ActionRef = Arc::new(logged(name, KeyBindingData::new(chord), &log));
        harness.manager.add_tool_action(action).unwrap();
    }
    let offered = Arc::new(Mutex::new(Vec::new()));
    let sink = offered.clone();
    harness.manager.signals().action_choice_requested.connect(move |list| {
        sink.lock()
            .extend(list.iter().map(|exec| exec.action().name().to_string()));
    });

    assert!(matches!(harness.manager.dispatch_key(chord), KeyResolution::Multiple(_)));
    assert_eq!(*offered.lock(), vec!["Refresh".to_string(), "Resume".to_string()]);
    assert!(log.lock().is_empty());
}

#[test]
fn test_reserved_binding_fires_through_open_menu() {
    let listing = TestProvider::new("CodeBrowser", "Listing").shared();
    let mut harness = focused_harness(&[&listing]);

    let log = PerformLog::default();
    let help = KeyChord::key_only(Key::F1);
    let save = KeyChord::ctrl(Key::S);
    let reserved: ActionRef = Arc::new(logged("Help", KeyBindingData::reserved(help), &log));
    let ordinary: ActionRef = Arc::new(logged("Save", KeyBindingData::new(save), &log));
    harness.manager.add_tool_action(reserved).unwrap();
    harness.manager.add_tool_action(ordinary).unwrap();
    assert_eq!(
        harness.manager.key_binding_precedence(help),
        Some(KeyBindingPrecedence::Reserved)
    );

    harness.manager.set_menu_showing(true);
    assert!(matches!(harness.manager.dispatch_key(save), KeyResolution::Suppressed));
    assert!(matches!(harness.manager.dispatch_key(help), KeyResolution::Single(_)));
    harness.manager.set_menu_showing(false);
    assert!(matches!(harness.manager.dispatch_key(save), KeyResolution::Single(_)));

    let names: Vec<String> = log.lock().iter().map(|(name, _)| name.clone()).collect();
    assert_eq!(names, vec!["Help".to_string(), "Save".to_string()]);
}

#[test]
fn test_removed_provider_releases_its_bindings() {
    let disassembly = TestProvider::new("CodeBrowser", "Disassembly").shared();
    let mut harness = focused_harness(&[&disassembly]);

    let chord = KeyChord::ctrl_shift(Key::X);
    let log = PerformLog::default();
    let a: ActionRef = Arc::new(logged("A", KeyBindingData::new(chord), &log));
    harness.manager.add_local_action(&disassembly, a).unwrap();
    assert!(harness.manager.remove_component(&disassembly));
    harness.settle_and_focus();

    assert!(matches!(harness.manager.dispatch_key(chord), KeyResolution::NotApplicable));
    assert!(log.lock().is_empty());
}

#[test]
fn test_popup_collects_local_global_and_contributed_actions() {
    let listing = TestProvider::new("CodeBrowser", "Listing").shared();
    let mut harness = focused_harness(&[&listing]);

    let popup = |name: &str| DockingAction::new(name, "TestPlugin").with_popup_menu_data(MenuData::new([name]));
    harness
        .manager
        .add_local_action(&listing, Arc::new(popup("Set Label")))
        .unwrap();
    harness.manager.add_tool_action(Arc::new(popup("Copy"))).unwrap();
    harness
        .manager
        .add_tool_action(Arc::new(popup("Hidden").popup_when(|_| false)))
        .unwrap();
    harness
        .manager
        .add_tool_action(Arc::new(DockingAction::new("Menu Only", "TestPlugin")))
        .unwrap();

    struct Bookmarks;
    impl horizon_dock::PopupActionProvider for Bookmarks {
        fn popup_actions(&self, _context: &horizon_dock::ActionContext) -> Vec<ActionRef> {
            let bookmark: ActionRef = Arc::new(DockingAction::new("Add Bookmark", "Bookmarks"));
            vec![bookmark]
        }
    }
    harness.manager.add_popup_action_provider(Arc::new(Bookmarks));

    let names: Vec<String> = harness
        .manager
        .popup_actions(&listing)
        .iter()
        .map(|a| a.name().to_string())
        .collect();
    assert_eq!(names, vec!["Set Label", "Copy", "Add Bookmark"]);
}
