//! Menu bar and toolbar render models.
//!
//! Hosts draw these; the engine rebuilds them from the actions of a window.
//! Within a menu, items are ordered by menu group and sub-group, with a
//! separator wherever the group changes. Items without a group sort last.

use crate::action::{ActionRef, MenuData, ToolBarData};
use crate::keys::KeyChord;

// ============================================================================
// MenuItem
// ============================================================================

/// An action placed in a menu.
#[derive(Debug, Clone)]
pub struct MenuActionItem {
    pub action: ActionRef,
    pub text: String,
    pub icon: Option<String>,
    pub mnemonic: Option<char>,
    pub key_binding: Option<KeyChord>,
    pub enabled: bool,
}

/// An entry of a menu.
#[derive(Debug, Clone)]
pub enum MenuItem {
    Action(MenuActionItem),
    Separator,
    Submenu { title: String, menu: MenuModel },
}

impl MenuItem {
    pub fn is_separator(&self) -> bool {
        matches!(self, MenuItem::Separator)
    }

    /// Display text of an action or submenu.
    pub fn display_text(&self) -> Option<&str> {
        match self {
            MenuItem::Action(item) => Some(&item.text),
            MenuItem::Submenu { title, .. } => Some(title),
            MenuItem::Separator => None,
        }
    }
}

// ============================================================================
// MenuModel
// ============================================================================

/// One menu, possibly nested.
#[derive(Debug, Clone, Default)]
pub struct MenuModel {
    title: String,
    items: Vec<MenuItem>,
}

impl MenuModel {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The submenu with the given title.
    pub fn submenu(&self, title: &str) -> Option<&MenuModel> {
        self.items.iter().find_map(|item| match item {
            MenuItem::Submenu { title: t, menu } if t == title => Some(menu),
            _ => None,
        })
    }

    /// Display texts of the items, separators as `"-"`.
    pub fn item_texts(&self) -> Vec<&str> {
        self.items
            .iter()
            .map(|item| item.display_text().unwrap_or("-"))
            .collect()
    }
}

/// The menus of one window, in the order they first appeared.
#[derive(Debug, Clone, Default)]
pub struct MenuBarModel {
    menus: Vec<MenuModel>,
}

impl MenuBarModel {
    /// Build from every action's menu bar data.
    pub fn build<'a>(actions: impl IntoIterator<Item = &'a ActionRef>) -> Self {
        let mut root = Node::new(String::new());
        for action in actions {
            let Some(data) = action.menu_bar_data() else {
                continue;
            };
            if data.path().len() < 2 {
                // A menu bar entry needs a menu and an item name.
                continue;
            }
            root.insert(action, &data, 0);
        }
        let menus = root
            .children
            .into_iter()
            .map(|entry| match entry {
                Entry::Menu(node) => node.into_model(),
                Entry::Item(item) => MenuModel {
                    title: item.item.text.clone(),
                    items: Vec::new(),
                },
            })
            .collect();
        Self { menus }
    }

    pub fn menus(&self) -> &[MenuModel] {
        &self.menus
    }

    pub fn menu(&self, title: &str) -> Option<&MenuModel> {
        self.menus.iter().find(|m| m.title == title)
    }

    pub fn menu_count(&self) -> usize {
        self.menus.len()
    }

    pub fn is_empty(&self) -> bool {
        self.menus.is_empty()
    }
}

struct GroupedItem {
    group: Option<String>,
    sub_group: Option<String>,
    item: MenuActionItem,
}

enum Entry {
    Menu(Node),
    Item(GroupedItem),
}

impl Entry {
    fn group_key(&self) -> (bool, String, String) {
        match self {
            Entry::Menu(node) => (node.group.is_none(), node.group.clone().unwrap_or_default(), String::new()),
            Entry::Item(item) => (
                item.group.is_none(),
                item.group.clone().unwrap_or_default(),
                item.sub_group.clone().unwrap_or_default(),
            ),
        }
    }
}

struct Node {
    title: String,
    group: Option<String>,
    children: Vec<Entry>,
}

impl Node {
    fn new(title: String) -> Self {
        Self {
            title,
            group: None,
            children: Vec::new(),
        }
    }

    fn insert(&mut self, action: &ActionRef, data: &MenuData, depth: usize) {
        let path = data.path();
        if depth + 1 == path.len() {
            self.children.push(Entry::Item(GroupedItem {
                group: data.group().map(str::to_string),
                sub_group: data.sub_group().map(str::to_string),
                item: MenuActionItem {
                    action: action.clone(),
                    text: path[depth].clone(),
                    icon: data.icon().map(str::to_string),
                    mnemonic: data.mnemonic(),
                    key_binding: action.key_binding(),
                    enabled: action.is_enabled(),
                },
            }));
            return;
        }

        let title = &path[depth];
        let index = self
            .children
            .iter()
            .position(|e| matches!(e, Entry::Menu(node) if &node.title == title));
        let index = index.unwrap_or_else(|| {
            let mut node = Node::new(title.clone());
            // A submenu sorts with the group of the first item that created it.
            node.group = data.group().map(str::to_string);
            self.children.push(Entry::Menu(node));
            self.children.len() - 1
        });
        if let Entry::Menu(node) = &mut self.children[index] {
            node.insert(action, data, depth + 1);
        }
    }

    fn into_model(mut self) -> MenuModel {
        self.children.sort_by_key(Entry::group_key);
        let mut items = Vec::new();
        let mut last_group: Option<Option<String>> = None;
        for entry in self.children {
            let group = match &entry {
                Entry::Menu(node) => node.group.clone(),
                Entry::Item(item) => item.group.clone(),
            };
            if last_group.as_ref().is_some_and(|last| *last != group) {
                items.push(MenuItem::Separator);
            }
            last_group = Some(group);
            items.push(match entry {
                Entry::Menu(node) => MenuItem::Submenu {
                    title: node.title.clone(),
                    menu: node.into_model(),
                },
                Entry::Item(item) => MenuItem::Action(item.item),
            });
        }
        MenuModel {
            title: self.title,
            items,
        }
    }
}

// ============================================================================
// ToolBarModel
// ============================================================================

/// A toolbar button.
#[derive(Debug, Clone)]
pub struct ToolBarItem {
    pub action: ActionRef,
    pub name: String,
    pub icon: Option<String>,
    pub tool_tip: String,
    pub enabled: bool,
}

/// Buttons sharing a toolbar group.
#[derive(Debug, Clone)]
pub struct ToolBarGroup {
    pub group: Option<String>,
    pub items: Vec<ToolBarItem>,
}

/// The toolbar of one window.
#[derive(Debug, Clone, Default)]
pub struct ToolBarModel {
    groups: Vec<ToolBarGroup>,
}

impl ToolBarModel {
    /// Build from every action's toolbar data.
    pub fn build<'a>(actions: impl IntoIterator<Item = &'a ActionRef>) -> Self {
        let mut entries: Vec<(ToolBarData, &ActionRef)> = actions
            .into_iter()
            .filter_map(|action| action.tool_bar_data().map(|data| (data, action)))
            .collect();
        entries.sort_by(|(a, _), (b, _)| {
            let key = |d: &ToolBarData| {
                (
                    d.group().is_none(),
                    d.group().unwrap_or_default().to_string(),
                    d.sub_group().unwrap_or_default().to_string(),
                )
            };
            key(a).cmp(&key(b))
        });

        let mut groups: Vec<ToolBarGroup> = Vec::new();
        for (data, action) in entries {
            let group = data.group().map(str::to_string);
            let item = ToolBarItem {
                action: action.clone(),
                name: action.name().to_string(),
                icon: data.icon().map(str::to_string),
                tool_tip: tool_tip(action),
                enabled: action.is_enabled(),
            };
            match groups.last_mut() {
                Some(last) if last.group == group => last.items.push(item),
                _ => groups.push(ToolBarGroup { group, items: vec![item] }),
            }
        }
        Self { groups }
    }

    pub fn groups(&self) -> &[ToolBarGroup] {
        &self.groups
    }

    pub fn items(&self) -> impl Iterator<Item = &ToolBarItem> {
        self.groups.iter().flat_map(|g| g.items.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

fn tool_tip(action: &ActionRef) -> String {
    let description = action.description();
    let text = if description.is_empty() {
        action.name().to_string()
    } else {
        description
    };
    match action.key_binding() {
        Some(chord) => format!("{text} ({chord})"),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{DockingAction, KeyBindingData};
    use crate::keys::{Key, KeyChord};
    use std::sync::Arc;

    fn menu_action(name: &str, path: &[&str], group: Option<&str>) -> ActionRef {
        let mut data = MenuData::new(path.iter().copied());
        if let Some(group) = group {
            data = data.with_group(group);
        }
        Arc::new(DockingAction::new(name, "TestPlugin").with_menu_bar_data(data))
    }

    #[test]
    fn test_menus_keep_first_seen_order() {
        let actions = vec![
            menu_action("Open", &["File", "Open"], Some("a")),
            menu_action("Copy", &["Edit", "Copy"], None),
            menu_action("Save", &["File", "Save"], Some("a")),
        ];
        let bar = MenuBarModel::build(&actions);
        let titles: Vec<&str> = bar.menus().iter().map(MenuModel::title).collect();
        assert_eq!(titles, vec!["File", "Edit"]);
        assert_eq!(bar.menu("File").map(|m| m.item_texts()), Some(vec!["Open", "Save"]));
    }

    #[test]
    fn test_groups_separated() {
        let actions = vec![
            menu_action("Exit", &["File", "Exit"], Some("z")),
            menu_action("Open", &["File", "Open"], Some("a")),
            menu_action("Loose", &["File", "Loose"], None),
            menu_action("Recent", &["File", "Recent", "one"], Some("a")),
        ];
        let bar = MenuBarModel::build(&actions);
        let file = bar.menu("File").unwrap();
        assert_eq!(file.item_texts(), vec!["Open", "Recent", "-", "Exit", "-", "Loose"]);
        assert_eq!(file.submenu("Recent").map(|m| m.item_texts()), Some(vec!["one"]));
    }

    #[test]
    fn test_toolbar_groups_and_tooltips() {
        let save: ActionRef = Arc::new(
            DockingAction::new("Save", "TestPlugin")
                .with_description("Save the program")
                .with_tool_bar_data(ToolBarData::new("save.png").with_group("file"))
                .with_key_binding(KeyBindingData::new(KeyChord::ctrl(Key::S))),
        );
        let undo: ActionRef = Arc::new(
            DockingAction::new("Undo", "TestPlugin")
                .with_tool_bar_data(ToolBarData::new("undo.png").with_group("edit")),
        );
        let plain: ActionRef = Arc::new(DockingAction::new("Plain", "TestPlugin"));

        let bar = ToolBarModel::build(&vec![save, undo, plain]);
        let groups: Vec<Option<&str>> = bar.groups().iter().map(|g| g.group.as_deref()).collect();
        assert_eq!(groups, vec![Some("edit"), Some("file")]);
        let tips: Vec<&str> = bar.items().map(|i| i.tool_tip.as_str()).collect();
        assert_eq!(tips, vec!["Undo", "Save the program (Ctrl+S)"]);
    }
}
