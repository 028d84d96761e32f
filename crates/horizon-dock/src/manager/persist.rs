//! Saving and restoring the layout.

use horizon_dock_core::logging::{span_names, targets};
use horizon_dock_core::PerfSpan;

use super::DockingWindowManager;
use crate::error::{DockingError, Result};
use crate::placeholder::PlaceholderId;
use crate::placeholder_manager::PlaceholderInfo;
use crate::preferences::PREFERENCES;
use crate::provider::ProviderRef;
use crate::tree::xml::{read_tree, write_tree, ROOT_NODE};
use crate::xml::XmlElement;

const FOCUSED_OWNER: &str = "FOCUSED_OWNER";
const FOCUSED_NAME: &str = "FOCUSED_NAME";
const FOCUSED_TITLE: &str = "FOCUSED_TITLE";

impl DockingWindowManager {
    /// Write the layout and preferences into `parent`, replacing any
    /// `ROOT_NODE` and `PREFERENCES` children it already has.
    pub fn save_to_xml(&self, parent: &mut XmlElement) -> Result<()> {
        let mut root = self.save_window_data_to_xml()?;
        if let Some(placeholder) = self.focus.focused().and_then(|id| self.placeholder(id)) {
            root.set_attribute(FOCUSED_OWNER, placeholder.owner());
            root.set_attribute(FOCUSED_NAME, placeholder.name());
            root.set_attribute(FOCUSED_TITLE, placeholder.title());
        }
        parent.replace_child(root);
        parent.replace_child(self.preferences.to_xml());
        tracing::debug!(target: targets::PERSIST, "layout saved");
        Ok(())
    }

    /// The `ROOT_NODE` element for the current layout.
    pub fn save_window_data_to_xml(&self) -> Result<XmlElement> {
        let tree = self.tree.as_ref().ok_or(DockingError::Disposed)?;
        Ok(write_tree(tree))
    }

    /// Restore the layout and preferences saved by [`save_to_xml`](Self::save_to_xml).
    ///
    /// A `parent` without a `ROOT_NODE` leaves the layout as it is.
    pub fn restore_from_xml(&mut self, parent: &XmlElement) -> Result<()> {
        if self.tree.is_none() {
            return Err(DockingError::Disposed);
        }
        match parent.child(ROOT_NODE) {
            Some(root) => self.restore_window_data_from_xml(root)?,
            None => tracing::debug!(target: targets::PERSIST, "no saved layout to restore"),
        }
        if let Some(preferences) = parent.child(PREFERENCES) {
            self.preferences.restore_from_xml(preferences);
        }
        Ok(())
    }

    /// Replace the layout with the one in a `ROOT_NODE` element.
    ///
    /// Every registered provider is carried over into the new layout,
    /// claiming its saved slot when there is one. All placeholder ids from
    /// before the call are invalid afterwards. A malformed element leaves
    /// the current layout untouched.
    #[tracing::instrument(skip(self, element), target = "horizon_dock::persist", level = "debug")]
    pub fn restore_window_data_from_xml(&mut self, element: &XmlElement) -> Result<()> {
        let _span = PerfSpan::new(span_names::RESTORE);
        let Some(old_tree) = self.tree.as_ref() else {
            return Err(DockingError::Disposed);
        };
        let mut tree = read_tree(
            element,
            &self.tool_name,
            self.config.main_window_bounds,
            self.config.detached_window_size,
        )?;

        self.focus.clear();
        self.focus.clear_history();
        self.activation.clear();

        let mut active: Vec<(ProviderRef, PlaceholderInfo)> = self
            .placeholders
            .active_providers_to_placeholders()
            .into_iter()
            .filter_map(|(provider, id)| {
                let info = PlaceholderInfo::of(old_tree.placeholder(id)?);
                Some((provider, info))
            })
            .collect();

        // Old ids alias keys of the new tree, so nothing queued may survive.
        self.rebuild.cancel();
        self.deferred.clear();
        for (_, mut manager) in self.window_actions.drain() {
            manager.dispose();
        }
        self.placeholders.clear();
        self.name_cache.clear();

        // Groups are re-attached in order so a group's anchor exists before
        // the members that dock beside it.
        active.sort_by_cached_key(|(provider, _)| provider.window_group().to_lowercase());

        let focused_title = element.attribute(FOCUSED_TITLE);
        let mut title_match: Option<PlaceholderId> = None;
        for (provider, info) in &active {
            let id = self.placeholders.replace_placeholder(&mut tree, provider, info);
            if focused_title == Some(info.title.as_str()) {
                title_match = Some(id);
            }
        }

        let target = title_match
            .or_else(|| {
                let owner = element.attribute(FOCUSED_OWNER)?;
                let name = element.attribute(FOCUSED_NAME)?;
                active
                    .iter()
                    .find(|(p, _)| p.owner() == owner && p.name() == name)
                    .and_then(|(p, _)| self.placeholders.active_placeholder(p))
            })
            .or_else(|| {
                self.default_provider
                    .as_ref()
                    .and_then(|p| self.placeholders.active_placeholder(p))
            });
        self.focus.stage(target);

        let hidden = self.placeholders.reset_placeholders_without_providers(&mut tree);
        self.tree = Some(tree);
        tracing::debug!(
            target: targets::PERSIST,
            providers = active.len(),
            unclaimed = hidden,
            "layout restored"
        );
        self.schedule_update();
        Ok(())
    }
}
