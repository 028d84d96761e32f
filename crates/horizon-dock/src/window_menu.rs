//! The Window menu: one entry per component plus one per detached window.
//!
//! The entries are ordinary tool actions owned by [`DOCKING_WINDOWS_OWNER`].
//! The manager throws them away and builds a fresh set on every rebuild.
//! Performing one posts a command back to the manager through its handle,
//! so the action itself holds no reference to the manager.

use std::collections::BTreeMap;
use std::sync::Arc;

use horizon_dock_core::logging::targets;

use crate::action::{ActionRef, DockingAction, MenuData};
use crate::handle::ManagerHandle;
use crate::manager::DockingWindowManager;
use crate::placeholder::PlaceholderId;
use crate::tree::WindowId;

/// Owner of every Window menu action.
pub const DOCKING_WINDOWS_OWNER: &str = "DockingWindows";

/// Title of the top-level menu.
pub const WINDOW_MENU: &str = "Window";

const SHOW_ALL: &str = "Show All";
const PERMANENT_GROUP: &str = "Permanent";
const TRANSIENT_GROUP: &str = "Transient";
const WINDOWS_GROUP: &str = "zzz Windows";

/// A component listed in the Window menu.
#[derive(Debug, Clone)]
pub(crate) struct MenuEntry {
    pub placeholder: PlaceholderId,
    pub title: String,
    pub icon: Option<String>,
    pub sub_menu: Option<String>,
    pub transient: bool,
}

/// A detached window listed in the Window menu.
#[derive(Debug, Clone)]
pub(crate) struct WindowEntry {
    pub window: WindowId,
    pub title: String,
}

struct SortedAction {
    transient: bool,
    sub_menu: Option<String>,
    show_all: bool,
    title: String,
    action: ActionRef,
}

/// Show-component and show-all actions for `entries`.
///
/// Transient and permanent components are grouped separately by submenu.
/// A submenu with a single entry is not worth opening, so that entry moves
/// up to the top level.
pub(crate) fn component_actions(handle: &ManagerHandle, entries: Vec<MenuEntry>) -> Vec<ActionRef> {
    let (transient, permanent): (Vec<_>, Vec<_>) = entries.into_iter().partition(|e| e.transient);

    let mut sorted = Vec::new();
    for (group, transient) in [(permanent, false), (transient, true)] {
        for (sub_menu, entries) in promote_single_menu_groups(group_by_sub_menu(group)) {
            if let Some(name) = &sub_menu {
                sorted.push(SortedAction {
                    transient,
                    sub_menu: sub_menu.clone(),
                    show_all: true,
                    title: SHOW_ALL.to_string(),
                    action: show_all_action(handle, name, &entries),
                });
            }
            for entry in entries {
                sorted.push(SortedAction {
                    transient,
                    sub_menu: sub_menu.clone(),
                    show_all: false,
                    title: entry.title.clone(),
                    action: show_component_action(handle, &entry, sub_menu.as_deref()),
                });
            }
        }
    }
    sorted.sort_by(|a, b| {
        (a.transient, &a.sub_menu, a.show_all, &a.title).cmp(&(b.transient, &b.sub_menu, b.show_all, &b.title))
    });
    sorted.into_iter().map(|s| s.action).collect()
}

/// One show-window action per detached window.
pub(crate) fn window_actions(handle: &ManagerHandle, windows: &[WindowEntry]) -> Vec<ActionRef> {
    windows
        .iter()
        .map(|entry| {
            let handle = handle.clone();
            let window = entry.window;
            let action = DockingAction::new(format!("Show Window {}", entry.title), DOCKING_WINDOWS_OWNER)
                .with_description(format!("Bring window '{}' to front", entry.title))
                .with_menu_bar_data(MenuData::new([WINDOW_MENU, entry.title.as_str()]).with_group(WINDOWS_GROUP))
                .on_perform(move |_| {
                    post(&handle, move |manager| {
                        manager.window_to_front(window);
                    })
                });
            Arc::new(action) as ActionRef
        })
        .collect()
}

fn group_by_sub_menu(entries: Vec<MenuEntry>) -> BTreeMap<Option<String>, Vec<MenuEntry>> {
    let mut groups: BTreeMap<Option<String>, Vec<MenuEntry>> = BTreeMap::new();
    for entry in entries {
        groups.entry(entry.sub_menu.clone()).or_default().push(entry);
    }
    groups
}

fn promote_single_menu_groups(
    mut groups: BTreeMap<Option<String>, Vec<MenuEntry>>,
) -> BTreeMap<Option<String>, Vec<MenuEntry>> {
    let singles: Vec<Option<String>> = groups
        .iter()
        .filter(|(name, entries)| name.is_some() && entries.len() == 1)
        .map(|(name, _)| name.clone())
        .collect();
    for name in singles {
        if let Some(entries) = groups.remove(&name) {
            groups.entry(None).or_default().extend(entries);
        }
    }
    groups
}

fn show_component_action(handle: &ManagerHandle, entry: &MenuEntry, sub_menu: Option<&str>) -> ActionRef {
    let mut path = vec![WINDOW_MENU];
    path.extend(sub_menu);
    path.push(&entry.title);
    let group = if entry.transient { TRANSIENT_GROUP } else { PERMANENT_GROUP };
    let mut data = MenuData::new(path).with_group(group);
    if let Some(icon) = &entry.icon {
        data = data.with_icon(icon.clone());
    }

    let handle = handle.clone();
    let placeholder = entry.placeholder;
    let action = DockingAction::new(entry.title.clone(), DOCKING_WINDOWS_OWNER)
        .with_description(format!("Show {}", entry.title))
        .with_menu_bar_data(data)
        .on_perform(move |_| {
            post(&handle, move |manager| {
                manager.show_placeholder(placeholder, true, true);
            })
        });
    Arc::new(action)
}

fn show_all_action(handle: &ManagerHandle, sub_menu: &str, entries: &[MenuEntry]) -> ActionRef {
    let handle = handle.clone();
    let placeholders: Vec<PlaceholderId> = entries.iter().map(|e| e.placeholder).collect();
    let action = DockingAction::new(format!("{SHOW_ALL} {sub_menu}"), DOCKING_WINDOWS_OWNER)
        .with_description(format!("Show every component under {sub_menu}"))
        .with_menu_bar_data(MenuData::new([WINDOW_MENU, sub_menu, SHOW_ALL]).with_group(PERMANENT_GROUP))
        .on_perform(move |_| {
            let placeholders = placeholders.clone();
            post(&handle, move |manager| {
                for id in placeholders {
                    manager.show_placeholder(id, true, true);
                }
            })
        });
    Arc::new(action)
}

fn post<F>(handle: &ManagerHandle, command: F)
where
    F: FnOnce(&mut DockingWindowManager) + Send + 'static,
{
    if let Err(err) = handle.post(command) {
        tracing::debug!(target: targets::MANAGER, %err, "window menu command dropped");
    }
}
