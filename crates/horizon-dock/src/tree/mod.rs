//! The window tree.
//!
//! A [`WindowTree`] is an arena of layout nodes and the placeholders they
//! hold. The root node is the main window; it holds one layout subtree and
//! any number of detached windows, each of which holds a subtree of its own.
//! Subtrees are built from splits (two children side by side or stacked
//! vertically) and component nodes (one or more placeholders shown as tabs).
//!
//! ```text
//! Root ── Split(H) ─┬─ Component [Listing, Bytes]
//!   │               └─ Component [Console]
//!   └── Window ── Component [Registers]
//! ```
//!
//! All links are [`NodeId`] and [`PlaceholderId`] handles into the arena, so
//! dropping the tree drops everything.

mod shape;
pub(crate) mod xml;

use slotmap::{new_key_type, SlotMap};

use horizon_dock_core::logging::targets;

use crate::error::{DockingError, Result};
use crate::geometry::{Point, Rect, Size};
use crate::placeholder::{Placeholder, PlaceholderId};
use crate::provider::WindowPosition;

pub use shape::{LayoutNode, LayoutSnapshot, ShapeNode, TabSnapshot, TreeShape, WindowSnapshot};

new_key_type! {
    /// Handle of a node in a window tree.
    pub struct NodeId;
}

/// Direction in which a split arranges its two children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// Side by side.
    Horizontal,
    /// One above the other.
    Vertical,
}

impl Orientation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Horizontal => "HORIZONTAL",
            Self::Vertical => "VERTICAL",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "HORIZONTAL" => Some(Self::Horizontal),
            "VERTICAL" => Some(Self::Vertical),
            _ => None,
        }
    }
}

/// A top-level window of the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WindowId {
    /// The main window.
    Main,
    /// A detached window.
    Detached(NodeId),
}

#[derive(Debug, Clone)]
struct RootData {
    bounds: Rect,
    title: String,
    child: Option<NodeId>,
    windows: Vec<NodeId>,
    last_focused: Option<PlaceholderId>,
}

#[derive(Debug, Clone)]
struct WindowData {
    bounds: Rect,
    child: Option<NodeId>,
    last_focused: Option<PlaceholderId>,
}

#[derive(Debug, Clone)]
struct SplitData {
    orientation: Orientation,
    divider: f32,
    first: NodeId,
    second: NodeId,
}

#[derive(Debug, Clone, Default)]
struct ComponentData {
    placeholders: Vec<PlaceholderId>,
    top: usize,
}

#[derive(Debug, Clone)]
enum NodeKind {
    Root(RootData),
    Window(WindowData),
    Split(SplitData),
    Component(ComponentData),
}

#[derive(Debug, Clone)]
struct NodeData {
    parent: Option<NodeId>,
    kind: NodeKind,
}

/// The arena of layout nodes and placeholders.
#[derive(Debug)]
pub struct WindowTree {
    nodes: SlotMap<NodeId, NodeData>,
    placeholders: SlotMap<PlaceholderId, Placeholder>,
    root: NodeId,
    detached_size: Size,
}

impl WindowTree {
    /// An empty tree whose main window has the given title and bounds.
    pub fn new(title: impl Into<String>, main_bounds: Rect, detached_size: Size) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(NodeData {
            parent: None,
            kind: NodeKind::Root(RootData {
                bounds: main_bounds,
                title: title.into(),
                child: None,
                windows: Vec::new(),
                last_focused: None,
            }),
        });
        Self {
            nodes,
            placeholders: SlotMap::with_key(),
            root,
            detached_size,
        }
    }

    // ========================================================================
    // Placeholders
    // ========================================================================

    /// Store a placeholder without installing it anywhere.
    pub(crate) fn insert_placeholder(&mut self, placeholder: Placeholder) -> PlaceholderId {
        self.placeholders.insert(placeholder)
    }

    pub fn placeholder(&self, id: PlaceholderId) -> Option<&Placeholder> {
        self.placeholders.get(id)
    }

    pub(crate) fn placeholder_mut(&mut self, id: PlaceholderId) -> Option<&mut Placeholder> {
        self.placeholders.get_mut(id)
    }

    pub fn contains_placeholder(&self, id: PlaceholderId) -> bool {
        self.placeholders.contains_key(id)
    }

    pub fn placeholders(&self) -> impl Iterator<Item = (PlaceholderId, &Placeholder)> {
        self.placeholders.iter()
    }

    pub fn placeholder_count(&self) -> usize {
        self.placeholders.len()
    }

    /// Uninstall a placeholder and forget it entirely.
    pub(crate) fn delete_placeholder(&mut self, id: PlaceholderId) -> Option<Placeholder> {
        self.remove(id, false);
        self.placeholders.remove(id)
    }

    // ========================================================================
    // Windows
    // ========================================================================

    pub fn title(&self) -> &str {
        match &self.nodes[self.root].kind {
            NodeKind::Root(root) => &root.title,
            _ => "",
        }
    }

    pub(crate) fn set_title(&mut self, title: impl Into<String>) {
        if let NodeKind::Root(root) = &mut self.nodes[self.root].kind {
            root.title = title.into();
        }
    }

    /// The main window followed by every detached window.
    pub fn windows(&self) -> Vec<WindowId> {
        let mut windows = vec![WindowId::Main];
        windows.extend(self.detached_windows().into_iter().map(WindowId::Detached));
        windows
    }

    pub fn detached_windows(&self) -> Vec<NodeId> {
        match &self.nodes[self.root].kind {
            NodeKind::Root(root) => root.windows.clone(),
            _ => Vec::new(),
        }
    }

    pub fn contains_window(&self, window: WindowId) -> bool {
        match window {
            WindowId::Main => true,
            WindowId::Detached(node) => self.detached_windows().contains(&node),
        }
    }

    fn window_node(&self, window: WindowId) -> Option<NodeId> {
        match window {
            WindowId::Main => Some(self.root),
            WindowId::Detached(node) if self.contains_window(window) => Some(node),
            WindowId::Detached(_) => None,
        }
    }

    pub fn window_bounds(&self, window: WindowId) -> Option<Rect> {
        match &self.nodes.get(self.window_node(window)?)?.kind {
            NodeKind::Root(root) => Some(root.bounds),
            NodeKind::Window(data) => Some(data.bounds),
            _ => None,
        }
    }

    pub fn set_window_bounds(&mut self, window: WindowId, bounds: Rect) -> bool {
        let Some(node) = self.window_node(window) else {
            return false;
        };
        match &mut self.nodes[node].kind {
            NodeKind::Root(root) => root.bounds = bounds,
            NodeKind::Window(data) => data.bounds = bounds,
            _ => return false,
        }
        true
    }

    /// The layout subtree directly under a window.
    pub fn window_child(&self, window: WindowId) -> Option<NodeId> {
        match &self.nodes.get(self.window_node(window)?)?.kind {
            NodeKind::Root(root) => root.child,
            NodeKind::Window(data) => data.child,
            _ => None,
        }
    }

    pub fn last_focused(&self, window: WindowId) -> Option<PlaceholderId> {
        match &self.nodes.get(self.window_node(window)?)?.kind {
            NodeKind::Root(root) => root.last_focused,
            NodeKind::Window(data) => data.last_focused,
            _ => None,
        }
    }

    pub(crate) fn set_last_focused(&mut self, window: WindowId, placeholder: Option<PlaceholderId>) {
        let Some(node) = self.window_node(window) else {
            return;
        };
        match &mut self.nodes[node].kind {
            NodeKind::Root(root) => root.last_focused = placeholder,
            NodeKind::Window(data) => data.last_focused = placeholder,
            _ => {}
        }
    }

    /// Forget `placeholder` as any window's last focused component.
    pub(crate) fn clear_last_focused(&mut self, placeholder: PlaceholderId) {
        for window in self.windows() {
            if self.last_focused(window) == Some(placeholder) {
                self.set_last_focused(window, None);
            }
        }
    }

    /// The window a placeholder is installed in.
    pub fn window_of(&self, placeholder: PlaceholderId) -> Option<WindowId> {
        let mut current = self.placeholders.get(placeholder)?.node()?;
        loop {
            let data = self.nodes.get(current)?;
            match data.kind {
                NodeKind::Root(_) => return Some(WindowId::Main),
                NodeKind::Window(_) => return Some(WindowId::Detached(current)),
                _ => current = data.parent?,
            }
        }
    }

    /// Every placeholder installed in `window`, in layout order.
    pub fn placeholders_in_window(&self, window: WindowId) -> Vec<PlaceholderId> {
        let mut found = Vec::new();
        if let Some(child) = self.window_child(window) {
            self.collect_placeholders(child, &mut found);
        }
        found
    }

    fn collect_placeholders(&self, node: NodeId, found: &mut Vec<PlaceholderId>) {
        match self.nodes.get(node).map(|n| &n.kind) {
            Some(NodeKind::Split(split)) => {
                self.collect_placeholders(split.first, found);
                self.collect_placeholders(split.second, found);
            }
            Some(NodeKind::Component(component)) => found.extend(component.placeholders.iter().copied()),
            _ => {}
        }
    }

    // ========================================================================
    // Component nodes
    // ========================================================================

    /// The placeholders of a component node, as tabs.
    pub fn component_placeholders(&self, node: NodeId) -> &[PlaceholderId] {
        match self.nodes.get(node).map(|n| &n.kind) {
            Some(NodeKind::Component(component)) => &component.placeholders,
            _ => &[],
        }
    }

    /// The front tab of a component node.
    pub fn top_placeholder(&self, node: NodeId) -> Option<PlaceholderId> {
        match self.nodes.get(node).map(|n| &n.kind) {
            Some(NodeKind::Component(component)) => component.placeholders.get(component.top).copied(),
            _ => None,
        }
    }

    /// Make `placeholder` the front tab of its component node.
    pub(crate) fn bring_to_front(&mut self, placeholder: PlaceholderId) -> bool {
        let Some(node) = self.placeholders.get(placeholder).and_then(Placeholder::node) else {
            return false;
        };
        match self.nodes.get_mut(node).map(|n| &mut n.kind) {
            Some(NodeKind::Component(component)) => {
                match component.placeholders.iter().position(|&p| p == placeholder) {
                    Some(index) => {
                        component.top = index;
                        true
                    }
                    None => false,
                }
            }
            _ => false,
        }
    }

    /// The component node holding a showing member of `group`, other than `exclude`.
    pub fn showing_group_node(&self, group: &str, exclude: PlaceholderId) -> Option<NodeId> {
        if group.is_empty() {
            return None;
        }
        self.placeholders
            .iter()
            .filter(|(id, p)| *id != exclude && p.is_showing() && p.group() == group)
            .find_map(|(_, p)| p.node())
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Install `placeholder` relative to the main window's layout.
    ///
    /// `Stack` adds a tab to the first component node; a direction splits
    /// the whole layout; `Window` opens a detached window.
    #[tracing::instrument(skip(self), target = "horizon_dock::tree", level = "trace")]
    pub fn add(&mut self, placeholder: PlaceholderId, position: WindowPosition) -> bool {
        if !self.placeholders.contains_key(placeholder) {
            return false;
        }
        self.remove(placeholder, false);

        match position {
            WindowPosition::Window => {
                let origin = self.next_window_origin();
                self.add_window(placeholder, Rect::from_origin_size(origin, self.detached_size));
            }
            WindowPosition::Stack => {
                let first = self
                    .window_child(WindowId::Main)
                    .and_then(|child| self.first_component(child));
                match first {
                    Some(node) => {
                        self.stack(placeholder, node);
                    }
                    None => self.install_in_container(placeholder, self.root),
                }
            }
            _ => match self.window_child(WindowId::Main) {
                None => self.install_in_container(placeholder, self.root),
                Some(existing) => {
                    let component = self.new_component(placeholder);
                    let split = self.make_split(existing, component, position);
                    self.set_container_child(self.root, Some(split));
                    self.nodes[split].parent = Some(self.root);
                }
            },
        }
        true
    }

    /// Install `placeholder` next to a showing member of its window group,
    /// or at its default position when no group member is showing.
    pub fn add_default(&mut self, placeholder: PlaceholderId) -> bool {
        let Some(p) = self.placeholders.get(placeholder) else {
            return false;
        };
        let group = p.group().to_string();
        let intra = p.intra_group_position();
        let default = p.default_position();

        match self.showing_group_node(&group, placeholder) {
            Some(node) => match intra {
                WindowPosition::Stack => self.stack(placeholder, node),
                WindowPosition::Window => self.add(placeholder, WindowPosition::Window),
                direction => self.split(placeholder, node, direction),
            },
            None => self.add(placeholder, default),
        }
    }

    /// Add `placeholder` as a tab of component node `node`.
    pub fn stack(&mut self, placeholder: PlaceholderId, node: NodeId) -> bool {
        if !self.is_component(node) || !self.placeholders.contains_key(placeholder) {
            return false;
        }
        if self.placeholders[placeholder].node() == Some(node) {
            return self.bring_to_front(placeholder);
        }
        self.remove(placeholder, false);
        if !self.is_component(node) {
            return false;
        }
        if let NodeKind::Component(component) = &mut self.nodes[node].kind {
            component.placeholders.push(placeholder);
            component.top = component.placeholders.len() - 1;
        }
        self.placeholders[placeholder].set_node(Some(node));
        true
    }

    /// Put `placeholder` beside node `node`, splitting it in `position`.
    pub fn split(&mut self, placeholder: PlaceholderId, node: NodeId, position: WindowPosition) -> bool {
        match position {
            WindowPosition::Stack => return self.stack(placeholder, node),
            WindowPosition::Window => return self.add(placeholder, WindowPosition::Window),
            _ => {}
        }
        if !self.nodes.contains_key(node) || !self.placeholders.contains_key(placeholder) {
            return false;
        }
        if self.placeholders[placeholder].node() == Some(node)
            && self.component_placeholders(node).len() == 1
        {
            return true;
        }
        self.remove(placeholder, false);
        let Some(parent) = self.nodes.get(node).and_then(|n| n.parent) else {
            return false;
        };

        let component = self.new_component(placeholder);
        let split = self.make_split(node, component, position);
        self.replace_child(parent, node, split);
        true
    }

    /// Open a detached window at `point` holding only `placeholder`.
    pub fn add_at_point(&mut self, placeholder: PlaceholderId, point: Point) -> Option<NodeId> {
        if !self.placeholders.contains_key(placeholder) {
            return None;
        }
        self.remove(placeholder, false);
        let bounds = Rect::from_origin_size(point, self.detached_size);
        Some(self.add_window(placeholder, bounds))
    }

    /// Uninstall `placeholder`.
    ///
    /// With `keep_around` the placeholder stays in its node as a slot;
    /// otherwise it leaves the node, and an emptied node is pruned.
    pub fn remove(&mut self, placeholder: PlaceholderId, keep_around: bool) {
        if keep_around {
            return;
        }
        let Some(node) = self.placeholders.get_mut(placeholder).and_then(|p| {
            let node = p.node();
            p.set_node(None);
            node
        }) else {
            return;
        };

        let now_empty = match self.nodes.get_mut(node).map(|n| &mut n.kind) {
            Some(NodeKind::Component(component)) => {
                if let Some(index) = component.placeholders.iter().position(|&p| p == placeholder) {
                    component.placeholders.remove(index);
                    if component.top > index || component.top >= component.placeholders.len() {
                        component.top = component.top.saturating_sub(1);
                    }
                }
                component.placeholders.is_empty()
            }
            _ => false,
        };
        if now_empty {
            self.prune(node);
        }
    }

    /// Destroy empty component nodes and empty detached windows.
    ///
    /// Returns how many nodes were removed.
    pub fn update(&mut self) -> usize {
        let empty: Vec<NodeId> = self
            .nodes
            .iter()
            .filter(|(_, n)| matches!(&n.kind, NodeKind::Component(c) if c.placeholders.is_empty()))
            .map(|(id, _)| id)
            .collect();
        let before = self.nodes.len();
        for node in empty {
            if self.nodes.contains_key(node) {
                self.prune(node);
            }
        }

        let empty_windows: Vec<NodeId> = self
            .detached_windows()
            .into_iter()
            .filter(|&w| self.window_child(WindowId::Detached(w)).is_none())
            .collect();
        for window in empty_windows {
            self.destroy_window(window);
        }

        let removed = before - self.nodes.len();
        if removed > 0 {
            tracing::debug!(target: targets::TREE, removed, "pruned empty nodes");
        }
        removed
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Check parent links and placeholder back-links.
    pub fn validate(&self) -> Result<()> {
        for (id, node) in &self.nodes {
            let children: Vec<NodeId> = match &node.kind {
                NodeKind::Root(root) => root.child.into_iter().chain(root.windows.iter().copied()).collect(),
                NodeKind::Window(window) => window.child.into_iter().collect(),
                NodeKind::Split(split) => vec![split.first, split.second],
                NodeKind::Component(component) => {
                    for &p in &component.placeholders {
                        let back = self.placeholders.get(p).and_then(Placeholder::node);
                        if back != Some(id) {
                            return Err(DockingError::invalid_layout(
                                "placeholder does not point back at its component node",
                            ));
                        }
                    }
                    if !component.placeholders.is_empty() && component.top >= component.placeholders.len() {
                        return Err(DockingError::invalid_layout("top tab out of range"));
                    }
                    Vec::new()
                }
            };
            for child in children {
                match self.nodes.get(child) {
                    Some(data) if data.parent == Some(id) => {}
                    Some(_) => return Err(DockingError::invalid_layout("child has wrong parent link")),
                    None => return Err(DockingError::invalid_layout("dangling child handle")),
                }
            }
        }
        for (id, placeholder) in &self.placeholders {
            if let Some(node) = placeholder.node() {
                if !self.component_placeholders(node).contains(&id) {
                    return Err(DockingError::invalid_layout(
                        "placeholder points at a node that does not hold it",
                    ));
                }
            }
        }
        Ok(())
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn is_component(&self, node: NodeId) -> bool {
        matches!(self.nodes.get(node).map(|n| &n.kind), Some(NodeKind::Component(_)))
    }

    fn first_component(&self, node: NodeId) -> Option<NodeId> {
        match &self.nodes.get(node)?.kind {
            NodeKind::Component(_) => Some(node),
            NodeKind::Split(split) => self
                .first_component(split.first)
                .or_else(|| self.first_component(split.second)),
            _ => None,
        }
    }

    fn new_component(&mut self, placeholder: PlaceholderId) -> NodeId {
        let node = self.nodes.insert(NodeData {
            parent: None,
            kind: NodeKind::Component(ComponentData {
                placeholders: vec![placeholder],
                top: 0,
            }),
        });
        if let Some(p) = self.placeholders.get_mut(placeholder) {
            p.set_node(Some(node));
        }
        node
    }

    /// A split holding `existing` and `added`, with `added` on the `position` side.
    fn make_split(&mut self, existing: NodeId, added: NodeId, position: WindowPosition) -> NodeId {
        let orientation = if position.is_horizontal() {
            Orientation::Horizontal
        } else {
            Orientation::Vertical
        };
        let (first, second) = if position.is_leading() {
            (added, existing)
        } else {
            (existing, added)
        };
        let split = self.nodes.insert(NodeData {
            parent: None,
            kind: NodeKind::Split(SplitData {
                orientation,
                divider: 0.5,
                first,
                second,
            }),
        });
        self.nodes[first].parent = Some(split);
        self.nodes[second].parent = Some(split);
        split
    }

    pub(crate) fn insert_split(
        &mut self,
        orientation: Orientation,
        divider: f32,
        first: NodeId,
        second: NodeId,
    ) -> NodeId {
        let split = self.nodes.insert(NodeData {
            parent: None,
            kind: NodeKind::Split(SplitData {
                orientation,
                divider: divider.clamp(0.0, 1.0),
                first,
                second,
            }),
        });
        self.nodes[first].parent = Some(split);
        self.nodes[second].parent = Some(split);
        split
    }

    /// Move the divider of split node `node`. The ratio is clamped to `0.0..=1.0`.
    pub fn set_divider_location(&mut self, node: NodeId, divider: f32) -> bool {
        match self.nodes.get_mut(node).map(|n| &mut n.kind) {
            Some(NodeKind::Split(split)) => {
                split.divider = divider.clamp(0.0, 1.0);
                true
            }
            _ => false,
        }
    }

    /// A component node holding `placeholders`, all of which must be uninstalled.
    pub(crate) fn insert_component(&mut self, placeholders: Vec<PlaceholderId>, top: usize) -> NodeId {
        let top = top.min(placeholders.len().saturating_sub(1));
        let node = self.nodes.insert(NodeData {
            parent: None,
            kind: NodeKind::Component(ComponentData {
                placeholders: placeholders.clone(),
                top,
            }),
        });
        for p in placeholders {
            if let Some(placeholder) = self.placeholders.get_mut(p) {
                placeholder.set_node(Some(node));
            }
        }
        node
    }

    /// Attach a subtree directly under a window.
    pub(crate) fn set_window_child(&mut self, window: WindowId, child: Option<NodeId>) {
        if let Some(node) = self.window_node(window) {
            self.set_container_child(node, child);
            if let Some(child) = child {
                self.nodes[child].parent = Some(node);
            }
        }
    }

    /// A new, empty detached window.
    pub(crate) fn insert_window(&mut self, bounds: Rect) -> NodeId {
        let window = self.nodes.insert(NodeData {
            parent: Some(self.root),
            kind: NodeKind::Window(WindowData {
                bounds,
                child: None,
                last_focused: None,
            }),
        });
        if let NodeKind::Root(root) = &mut self.nodes[self.root].kind {
            root.windows.push(window);
        }
        tracing::debug!(target: targets::TREE, ?window, "detached window created");
        window
    }

    fn add_window(&mut self, placeholder: PlaceholderId, bounds: Rect) -> NodeId {
        let window = self.insert_window(bounds);
        let component = self.new_component(placeholder);
        self.set_window_child(WindowId::Detached(window), Some(component));
        window
    }

    fn next_window_origin(&self) -> Point {
        let main = self.window_bounds(WindowId::Main).unwrap_or_default();
        let offset = 40 * (self.detached_windows().len() as i32 + 1);
        Point::new(main.x + offset, main.y + offset)
    }

    fn install_in_container(&mut self, placeholder: PlaceholderId, container: NodeId) {
        let component = self.new_component(placeholder);
        self.set_container_child(container, Some(component));
        self.nodes[component].parent = Some(container);
    }

    fn set_container_child(&mut self, container: NodeId, child: Option<NodeId>) {
        match &mut self.nodes[container].kind {
            NodeKind::Root(root) => root.child = child,
            NodeKind::Window(window) => window.child = child,
            _ => {}
        }
    }

    /// Swap `old` for `new` among `parent`'s children.
    fn replace_child(&mut self, parent: NodeId, old: NodeId, new: NodeId) {
        match &mut self.nodes[parent].kind {
            NodeKind::Root(root) if root.child == Some(old) => root.child = Some(new),
            NodeKind::Window(window) if window.child == Some(old) => window.child = Some(new),
            NodeKind::Split(split) => {
                if split.first == old {
                    split.first = new;
                } else if split.second == old {
                    split.second = new;
                }
            }
            _ => {}
        }
        self.nodes[new].parent = Some(parent);
    }

    /// Remove `node` and collapse whatever it leaves behind.
    fn prune(&mut self, node: NodeId) {
        let Some(data) = self.nodes.remove(node) else {
            return;
        };
        if let NodeKind::Component(component) = &data.kind {
            for &p in &component.placeholders {
                if let Some(placeholder) = self.placeholders.get_mut(p) {
                    placeholder.set_node(None);
                }
            }
        }
        let Some(parent) = data.parent else {
            return;
        };

        match self.nodes.get(parent).map(|n| n.kind.clone()) {
            Some(NodeKind::Split(split)) => {
                let sibling = if split.first == node { split.second } else { split.first };
                let grandparent = self.nodes[parent].parent;
                self.nodes.remove(parent);
                match grandparent {
                    Some(grandparent) => self.replace_child(grandparent, parent, sibling),
                    None => self.nodes[sibling].parent = None,
                }
            }
            Some(NodeKind::Root(_)) => self.set_container_child(parent, None),
            Some(NodeKind::Window(_)) => {
                self.set_container_child(parent, None);
                self.destroy_window(parent);
            }
            _ => {}
        }
    }

    fn destroy_window(&mut self, window: NodeId) {
        if let Some(child) = self.window_child(WindowId::Detached(window)) {
            let mut orphans = Vec::new();
            self.collect_placeholders(child, &mut orphans);
            for p in orphans {
                if let Some(placeholder) = self.placeholders.get_mut(p) {
                    placeholder.set_node(None);
                }
            }
            self.remove_subtree(child);
        }
        if let NodeKind::Root(root) = &mut self.nodes[self.root].kind {
            root.windows.retain(|&w| w != window);
        }
        self.nodes.remove(window);
        tracing::debug!(target: targets::TREE, ?window, "detached window destroyed");
    }

    fn remove_subtree(&mut self, node: NodeId) {
        if let Some(data) = self.nodes.remove(node) {
            if let NodeKind::Split(split) = data.kind {
                self.remove_subtree(split.first);
                self.remove_subtree(split.second);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> WindowTree {
        WindowTree::new("Tool", Rect::new(0, 0, 1000, 800), Size::new(300, 200))
    }

    fn slot(tree: &mut WindowTree, name: &str, group: &str) -> PlaceholderId {
        tree.insert_placeholder(Placeholder::inert("Owner", name, name, group, true))
    }

    #[test]
    fn test_add_directional_splits_root() {
        let mut tree = tree();
        let a = slot(&mut tree, "A", "");
        let b = slot(&mut tree, "B", "");
        assert!(tree.add(a, WindowPosition::Right));
        assert!(tree.add(b, WindowPosition::Left));
        tree.validate().unwrap();

        let shape = tree.shape();
        assert_eq!(
            shape.main,
            Some(ShapeNode::Split {
                orientation: Orientation::Horizontal,
                first: Box::new(ShapeNode::tabs([("Owner", "B")])),
                second: Box::new(ShapeNode::tabs([("Owner", "A")])),
            })
        );
    }

    #[test]
    fn test_stack_joins_first_component() {
        let mut tree = tree();
        let a = slot(&mut tree, "A", "");
        let b = slot(&mut tree, "B", "");
        tree.add(a, WindowPosition::Bottom);
        tree.add(b, WindowPosition::Stack);

        let node = tree.placeholder(a).and_then(Placeholder::node).unwrap();
        assert_eq!(tree.component_placeholders(node), &[a, b]);
        assert_eq!(tree.top_placeholder(node), Some(b));
        tree.validate().unwrap();
    }

    #[test]
    fn test_remove_collapses_split() {
        let mut tree = tree();
        let a = slot(&mut tree, "A", "");
        let b = slot(&mut tree, "B", "");
        let c = slot(&mut tree, "C", "");
        tree.add(a, WindowPosition::Right);
        tree.add(b, WindowPosition::Bottom);
        tree.add(c, WindowPosition::Left);

        tree.remove(b, false);
        tree.validate().unwrap();
        assert_eq!(
            tree.shape().main,
            Some(ShapeNode::Split {
                orientation: Orientation::Horizontal,
                first: Box::new(ShapeNode::tabs([("Owner", "C")])),
                second: Box::new(ShapeNode::tabs([("Owner", "A")])),
            })
        );

        tree.remove(c, false);
        tree.remove(a, false);
        assert_eq!(tree.shape().main, None);
        tree.validate().unwrap();
    }

    #[test]
    fn test_keep_around_leaves_slot() {
        let mut tree = tree();
        let a = slot(&mut tree, "A", "");
        tree.add(a, WindowPosition::Right);
        let node = tree.placeholder(a).and_then(Placeholder::node);
        tree.remove(a, true);
        assert_eq!(tree.placeholder(a).and_then(Placeholder::node), node);
    }

    #[test]
    fn test_detached_window_lifecycle() {
        let mut tree = tree();
        let a = slot(&mut tree, "A", "");
        let window = tree.add_at_point(a, Point::new(50, 60)).unwrap();
        assert_eq!(tree.window_of(a), Some(WindowId::Detached(window)));
        assert_eq!(
            tree.window_bounds(WindowId::Detached(window)),
            Some(Rect::new(50, 60, 300, 200))
        );

        tree.remove(a, false);
        assert!(tree.detached_windows().is_empty());
        assert!(!tree.contains_window(WindowId::Detached(window)));
        tree.validate().unwrap();
    }

    #[test]
    fn test_group_placement() {
        let mut tree = tree();
        let a = slot(&mut tree, "A", "Debugger");
        let b = slot(&mut tree, "B", "Debugger");
        let c = slot(&mut tree, "C", "");
        tree.add(c, WindowPosition::Right);
        tree.add(a, WindowPosition::Bottom);
        tree.add_default(b);

        assert_eq!(tree.placeholder(a).and_then(Placeholder::node), tree.placeholder(b).and_then(Placeholder::node));
    }

    #[test]
    fn test_split_existing_node() {
        let mut tree = tree();
        let a = slot(&mut tree, "A", "");
        let b = slot(&mut tree, "B", "");
        let c = slot(&mut tree, "C", "");
        tree.add(a, WindowPosition::Right);
        tree.add(b, WindowPosition::Stack);
        let node = tree.placeholder(a).and_then(Placeholder::node).unwrap();

        assert!(tree.split(c, node, WindowPosition::Top));
        tree.validate().unwrap();
        assert_eq!(
            tree.shape().main,
            Some(ShapeNode::Split {
                orientation: Orientation::Vertical,
                first: Box::new(ShapeNode::tabs([("Owner", "C")])),
                second: Box::new(ShapeNode::tabs([("Owner", "A"), ("Owner", "B")])),
            })
        );

        // Moving a tab out of its own node splits that node.
        assert!(tree.split(b, node, WindowPosition::Right));
        tree.validate().unwrap();
    }

    #[test]
    fn test_update_prunes_empty_windows() {
        let mut tree = tree();
        let window = tree.insert_window(Rect::new(0, 0, 10, 10));
        assert_eq!(tree.windows().len(), 2);
        assert!(tree.update() >= 1);
        assert!(!tree.contains_window(WindowId::Detached(window)));
    }

    #[test]
    fn test_delete_placeholder() {
        let mut tree = tree();
        let a = slot(&mut tree, "A", "");
        tree.add(a, WindowPosition::Right);
        assert!(tree.delete_placeholder(a).is_some());
        assert!(!tree.contains_placeholder(a));
        assert!(tree.window_child(WindowId::Main).is_none());
    }
}
