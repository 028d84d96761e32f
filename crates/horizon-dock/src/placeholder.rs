//! Placeholders: a provider's slot in the layout.

use slotmap::new_key_type;

use crate::provider::{ProviderRef, WindowPosition};
use crate::tree::NodeId;

new_key_type! {
    /// Handle of a placeholder in a window tree.
    ///
    /// Handles are invalidated when the tree is rebuilt from persisted state.
    pub struct PlaceholderId;
}

/// The engine's record of one provider's place in the layout.
///
/// A placeholder without a provider is an inert slot: it remembers where a
/// component used to be (or where a restored layout put it) until a
/// matching provider claims it.
#[derive(Debug, Clone)]
pub struct Placeholder {
    provider: Option<ProviderRef>,
    owner: String,
    name: String,
    title: String,
    group: String,
    sub_title: Option<String>,
    icon: Option<String>,
    transient: bool,
    showing: bool,
    header_shown: bool,
    selected: bool,
    node: Option<NodeId>,
}

impl Placeholder {
    /// A hidden, uninstalled placeholder for `provider`.
    pub(crate) fn for_provider(provider: &ProviderRef) -> Self {
        let mut placeholder = Self::inert(
            provider.owner(),
            provider.name(),
            provider.title(),
            provider.window_group(),
            false,
        );
        placeholder.attach(provider.clone());
        placeholder
    }

    /// A slot with no provider, as restored from persisted state.
    pub(crate) fn inert(
        owner: impl Into<String>,
        name: impl Into<String>,
        title: impl Into<String>,
        group: impl Into<String>,
        showing: bool,
    ) -> Self {
        Self {
            provider: None,
            owner: owner.into(),
            name: name.into(),
            title: title.into(),
            group: group.into(),
            sub_title: None,
            icon: None,
            transient: false,
            showing,
            header_shown: true,
            selected: false,
            node: None,
        }
    }

    // ========================================================================
    // Identity
    // ========================================================================

    pub fn provider(&self) -> Option<&ProviderRef> {
        self.provider.as_ref()
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn sub_title(&self) -> Option<&str> {
        self.sub_title.as_deref()
    }

    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    pub fn is_transient(&self) -> bool {
        self.transient
    }

    /// Whether this slot has no provider.
    pub fn is_inert(&self) -> bool {
        self.provider.is_none()
    }

    pub fn matches(&self, owner: &str, name: &str) -> bool {
        self.owner == owner && self.name == name
    }

    /// Position preferred by this placeholder's provider, or `Right` when inert.
    pub fn default_position(&self) -> WindowPosition {
        self.provider
            .as_ref()
            .map_or(WindowPosition::Right, |p| p.default_window_position())
    }

    /// Position relative to a group sibling, or `Stack` when inert.
    pub fn intra_group_position(&self) -> WindowPosition {
        self.provider
            .as_ref()
            .map_or(WindowPosition::Stack, |p| p.intra_group_position())
    }

    // ========================================================================
    // State
    // ========================================================================

    pub fn is_showing(&self) -> bool {
        self.showing
    }

    pub(crate) fn set_showing(&mut self, showing: bool) {
        self.showing = showing;
    }

    pub fn is_header_shown(&self) -> bool {
        self.header_shown
    }

    pub(crate) fn set_header_shown(&mut self, shown: bool) {
        self.header_shown = shown;
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub(crate) fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    /// The component node holding this placeholder, if installed.
    pub fn node(&self) -> Option<NodeId> {
        self.node
    }

    pub(crate) fn set_node(&mut self, node: Option<NodeId>) {
        self.node = node;
    }

    pub(crate) fn set_icon(&mut self, icon: Option<String>) {
        self.icon = icon;
    }

    /// Bind a provider and take over its presentation.
    pub(crate) fn attach(&mut self, provider: ProviderRef) {
        self.transient = provider.is_transient();
        self.group = provider.window_group().to_string();
        self.provider = Some(provider);
        self.refresh();
    }

    /// Unbind the provider, leaving an inert slot.
    pub(crate) fn detach(&mut self) -> Option<ProviderRef> {
        self.selected = false;
        self.provider.take()
    }

    /// Re-read title, sub-title and icon from the provider.
    pub(crate) fn refresh(&mut self) {
        if let Some(provider) = &self.provider {
            self.title = provider.title();
            self.sub_title = provider.sub_title();
            self.icon = provider.icon();
        }
    }

    /// Text for tabs and headers: title plus sub-title.
    pub fn full_title(&self) -> String {
        match self.sub_title.as_deref() {
            Some(sub) if !sub.is_empty() => format!("{} - {}", self.title, sub),
            _ => self.title.clone(),
        }
    }
}
