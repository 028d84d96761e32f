//! Key chord dispatch.

use horizon_dock_core::logging::{span_names, targets};
use horizon_dock_core::PerfSpan;

use super::DockingWindowManager;
use crate::action::{KeyBindingPrecedence, KeyResolution};
use crate::keys::KeyChord;

impl DockingWindowManager {
    /// Resolve and act on a key chord the host did not consume.
    ///
    /// A single applicable action runs at once. Several applicable actions
    /// go to the host on `action_choice_requested`. A bound chord with
    /// nothing applicable sets the status text and raises `alert`. A chord
    /// nobody bound resolves to `NotApplicable` without any notice.
    #[tracing::instrument(skip(self, chord), fields(chord = %chord), target = "horizon_dock::keys", level = "trace")]
    pub fn dispatch_key(&mut self, chord: KeyChord) -> KeyResolution {
        if self.tree.is_none() {
            return KeyResolution::NotApplicable;
        }
        let _span = PerfSpan::new(span_names::KEY_DISPATCH);
        let Some(bucket) = self.actions.key_bindings().bucket(chord) else {
            return KeyResolution::NotApplicable;
        };

        let focused = self.active_component_provider();
        let local = self.local_context();
        let global = self.global_context();
        let resolution = bucket.resolve(focused.as_ref(), &local, &global, self.menu_showing);

        match &resolution {
            KeyResolution::Suppressed => {
                tracing::trace!(target: targets::KEYS, %chord, "menu open, chord suppressed");
            }
            KeyResolution::NotApplicable => {
                tracing::debug!(target: targets::KEYS, %chord, "no applicable action");
                self.set_status_text(format!("Action ({chord}) not valid in this context!"));
                self.signals.alert.emit(());
            }
            KeyResolution::Single(action) => {
                tracing::debug!(target: targets::KEYS, %chord, action = %action.action().full_name(), "executing");
                self.set_status_text("");
                action.execute();
            }
            KeyResolution::Multiple(actions) => {
                tracing::debug!(target: targets::KEYS, %chord, count = actions.len(), "asking host to choose");
                self.signals.action_choice_requested.emit(actions.clone());
            }
        }
        resolution
    }

    /// The precedence `chord` would have if pressed now, or `None` when
    /// nothing bound to it applies.
    pub fn key_binding_precedence(&self, chord: KeyChord) -> Option<KeyBindingPrecedence> {
        let bucket = self.actions.key_bindings().bucket(chord)?;
        let focused = self.active_component_provider();
        bucket.precedence(focused.as_ref(), &self.local_context(), &self.global_context())
    }
}
