//! Read-only views of a window tree: structural shapes and render snapshots.

use super::{NodeId, NodeKind, Orientation, WindowId, WindowTree};
use crate::geometry::Rect;
use crate::placeholder::PlaceholderId;

// ============================================================================
// Shape
// ============================================================================

/// Structure of one layout subtree, with tabs identified by owner and name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeNode {
    Split {
        orientation: Orientation,
        first: Box<ShapeNode>,
        second: Box<ShapeNode>,
    },
    Tabs(Vec<(String, String)>),
}

impl ShapeNode {
    /// A tab group from `(owner, name)` pairs.
    pub fn tabs<'a>(identities: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self::Tabs(
            identities
                .into_iter()
                .map(|(owner, name)| (owner.to_string(), name.to_string()))
                .collect(),
        )
    }
}

/// The structure of a whole tree, for comparing layouts.
///
/// Divider ratios, bounds and visibility are left out: two trees with the
/// same shape put the same components in the same places.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TreeShape {
    pub main: Option<ShapeNode>,
    pub windows: Vec<Option<ShapeNode>>,
}

impl TreeShape {
    pub fn window_count(&self) -> usize {
        self.windows.len()
    }
}

// ============================================================================
// Snapshot
// ============================================================================

/// One visible tab.
#[derive(Debug, Clone, PartialEq)]
pub struct TabSnapshot {
    pub placeholder: PlaceholderId,
    pub owner: String,
    pub name: String,
    pub title: String,
    pub icon: Option<String>,
    pub header_shown: bool,
    pub selected: bool,
}

/// Render model of one layout subtree.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutNode {
    Split {
        orientation: Orientation,
        divider: f32,
        first: Box<LayoutNode>,
        second: Box<LayoutNode>,
    },
    Tabs {
        node: NodeId,
        tabs: Vec<TabSnapshot>,
        /// Index into `tabs` of the front tab.
        top: usize,
    },
}

/// Render model of one top-level window.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowSnapshot {
    pub id: WindowId,
    pub bounds: Rect,
    pub on_top: bool,
    pub root: Option<LayoutNode>,
}

/// What a host needs to draw every window of a manager.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutSnapshot {
    pub title: String,
    pub main: WindowSnapshot,
    /// Detached windows with at least one visible tab.
    pub windows: Vec<WindowSnapshot>,
}

impl LayoutSnapshot {
    /// Every visible tab in every window.
    pub fn tabs(&self) -> Vec<&TabSnapshot> {
        let mut tabs = Vec::new();
        for window in std::iter::once(&self.main).chain(&self.windows) {
            if let Some(root) = &window.root {
                collect_tabs(root, &mut tabs);
            }
        }
        tabs
    }
}

fn collect_tabs<'a>(node: &'a LayoutNode, tabs: &mut Vec<&'a TabSnapshot>) {
    match node {
        LayoutNode::Split { first, second, .. } => {
            collect_tabs(first, tabs);
            collect_tabs(second, tabs);
        }
        LayoutNode::Tabs { tabs: own, .. } => tabs.extend(own),
    }
}

impl WindowTree {
    /// The structure of the tree, hidden slots included.
    pub fn shape(&self) -> TreeShape {
        TreeShape {
            main: self.window_child(WindowId::Main).and_then(|n| self.shape_of(n)),
            windows: self
                .detached_windows()
                .into_iter()
                .map(|w| self.window_child(WindowId::Detached(w)).and_then(|n| self.shape_of(n)))
                .collect(),
        }
    }

    fn shape_of(&self, node: NodeId) -> Option<ShapeNode> {
        match &self.nodes.get(node)?.kind {
            NodeKind::Split(split) => {
                let first = self.shape_of(split.first);
                let second = self.shape_of(split.second);
                match (first, second) {
                    (Some(first), Some(second)) => Some(ShapeNode::Split {
                        orientation: split.orientation,
                        first: Box::new(first),
                        second: Box::new(second),
                    }),
                    (one, other) => one.or(other),
                }
            }
            NodeKind::Component(component) => {
                let tabs: Vec<(String, String)> = component
                    .placeholders
                    .iter()
                    .filter_map(|&p| self.placeholders.get(p))
                    .map(|p| (p.owner().to_string(), p.name().to_string()))
                    .collect();
                (!tabs.is_empty()).then_some(ShapeNode::Tabs(tabs))
            }
            _ => None,
        }
    }

    /// The render model: only showing placeholders, empty branches collapsed.
    pub fn layout_snapshot(&self, windows_on_top: bool) -> LayoutSnapshot {
        let main = WindowSnapshot {
            id: WindowId::Main,
            bounds: self.window_bounds(WindowId::Main).unwrap_or_default(),
            on_top: false,
            root: self.window_child(WindowId::Main).and_then(|n| self.snapshot_of(n)),
        };
        let windows = self
            .detached_windows()
            .into_iter()
            .map(WindowId::Detached)
            .filter_map(|id| {
                let root = self.window_child(id).and_then(|n| self.snapshot_of(n))?;
                Some(WindowSnapshot {
                    id,
                    bounds: self.window_bounds(id).unwrap_or_default(),
                    on_top: windows_on_top,
                    root: Some(root),
                })
            })
            .collect();
        LayoutSnapshot {
            title: self.title().to_string(),
            main,
            windows,
        }
    }

    fn snapshot_of(&self, node: NodeId) -> Option<LayoutNode> {
        match &self.nodes.get(node)?.kind {
            NodeKind::Split(split) => {
                let first = self.snapshot_of(split.first);
                let second = self.snapshot_of(split.second);
                match (first, second) {
                    (Some(first), Some(second)) => Some(LayoutNode::Split {
                        orientation: split.orientation,
                        divider: split.divider,
                        first: Box::new(first),
                        second: Box::new(second),
                    }),
                    (one, other) => one.or(other),
                }
            }
            NodeKind::Component(component) => {
                let top_id = component.placeholders.get(component.top).copied();
                let mut top = 0;
                let mut tabs = Vec::new();
                for &id in &component.placeholders {
                    let Some(p) = self.placeholders.get(id).filter(|p| p.is_showing()) else {
                        continue;
                    };
                    if Some(id) == top_id {
                        top = tabs.len();
                    }
                    tabs.push(TabSnapshot {
                        placeholder: id,
                        owner: p.owner().to_string(),
                        name: p.name().to_string(),
                        title: p.full_title(),
                        icon: p.icon().map(str::to_string),
                        header_shown: p.is_header_shown(),
                        selected: p.is_selected(),
                    });
                }
                (!tabs.is_empty()).then_some(LayoutNode::Tabs { node, tabs, top })
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::geometry::{Point, Size};
    use crate::placeholder::Placeholder;
    use crate::provider::WindowPosition;
    use crate::tree::*;

    fn tree() -> WindowTree {
        WindowTree::new("Tool", Rect::new(0, 0, 800, 600), Size::new(200, 100))
    }

    #[test]
    fn test_snapshot_omits_hidden() {
        let mut tree = tree();
        let shown = tree.insert_placeholder(Placeholder::inert("O", "Shown", "Shown", "", true));
        let hidden = tree.insert_placeholder(Placeholder::inert("O", "Hidden", "Hidden", "", false));
        tree.add(shown, WindowPosition::Right);
        tree.add(hidden, WindowPosition::Bottom);

        let snapshot = tree.layout_snapshot(false);
        let names: Vec<&str> = snapshot.tabs().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Shown"]);
        assert!(matches!(snapshot.main.root, Some(LayoutNode::Tabs { .. })));

        // The shape still records the hidden slot.
        assert!(matches!(tree.shape().main, Some(ShapeNode::Split { .. })));
    }

    #[test]
    fn test_snapshot_top_follows_visible_tabs() {
        let mut tree = tree();
        let a = tree.insert_placeholder(Placeholder::inert("O", "A", "A", "", false));
        let b = tree.insert_placeholder(Placeholder::inert("O", "B", "B", "", true));
        tree.add(a, WindowPosition::Right);
        tree.add(b, WindowPosition::Stack);

        let snapshot = tree.layout_snapshot(false);
        match snapshot.main.root {
            Some(LayoutNode::Tabs { tabs, top, .. }) => {
                assert_eq!(tabs.len(), 1);
                assert_eq!(top, 0);
            }
            other => panic!("unexpected layout {other:?}"),
        }
    }

    #[test]
    fn test_detached_windows_on_top() {
        let mut tree = tree();
        let a = tree.insert_placeholder(Placeholder::inert("O", "A", "A", "", true));
        let b = tree.insert_placeholder(Placeholder::inert("O", "B", "B", "", false));
        tree.add_at_point(a, Point::new(5, 5));
        tree.add_at_point(b, Point::new(9, 9));

        let snapshot = tree.layout_snapshot(true);
        assert_eq!(snapshot.windows.len(), 1);
        assert!(snapshot.windows[0].on_top);
        assert!(!snapshot.main.on_top);
        assert_eq!(tree.shape().window_count(), 2);
    }
}
