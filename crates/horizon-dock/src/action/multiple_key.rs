//! Resolution of one key chord among competing actions.

use std::fmt;
use std::sync::Arc;

use horizon_dock_core::logging::targets;
use parking_lot::RwLock;

use super::{same_action, ActionRef, KeyBindingPrecedence};
use crate::context::ActionContext;
use crate::error::{DockingError, Result};
use crate::keys::KeyChord;
use crate::provider::{ProviderKey, ProviderRef};

/// An action paired with the context it should be performed in.
#[derive(Clone)]
pub struct ExecutableAction {
    action: ActionRef,
    context: ActionContext,
}

impl ExecutableAction {
    pub fn new(action: ActionRef, context: ActionContext) -> Self {
        Self { action, context }
    }

    pub fn action(&self) -> &ActionRef {
        &self.action
    }

    pub fn context(&self) -> &ActionContext {
        &self.context
    }

    /// Perform the action in its context.
    pub fn execute(&self) {
        self.action.perform(&self.context);
    }
}

impl fmt::Debug for ExecutableAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutableAction")
            .field("action", &self.action.full_name())
            .finish()
    }
}

/// The outcome of resolving a key chord.
#[derive(Debug, Clone)]
pub enum KeyResolution {
    /// A menu is open and no reserved binding claims the chord.
    Suppressed,
    /// No action bound to the chord applies in the current context.
    NotApplicable,
    /// Exactly one action applies.
    Single(ExecutableAction),
    /// Several actions apply; the user must pick one.
    Multiple(Vec<ExecutableAction>),
}

impl KeyResolution {
    /// The actions this resolution offers, in binding order.
    pub fn actions(&self) -> Vec<&ActionRef> {
        match self {
            Self::Single(exec) => vec![exec.action()],
            Self::Multiple(list) => list.iter().map(ExecutableAction::action).collect(),
            Self::Suppressed | Self::NotApplicable => Vec::new(),
        }
    }
}

struct Binding {
    action: ActionRef,
    /// `None` for tool-wide actions.
    provider: Option<ProviderRef>,
}

impl Binding {
    fn is_global(&self) -> bool {
        self.provider.is_none()
    }

    fn belongs_to(&self, provider: Option<ProviderKey>) -> bool {
        match (&self.provider, provider) {
            (Some(own), Some(other)) => ProviderKey::of(own) == other,
            _ => false,
        }
    }
}

/// Every action bound to one key chord.
///
/// Local actions belong to a provider and win whenever that provider is
/// focused; tool-wide actions are considered only when the focused
/// provider has no binding of its own for the chord.
pub struct MultipleKeyAction {
    chord: KeyChord,
    bindings: RwLock<Vec<Binding>>,
}

impl MultipleKeyAction {
    pub fn new(chord: KeyChord) -> Self {
        Self {
            chord,
            bindings: RwLock::new(Vec::new()),
        }
    }

    pub fn chord(&self) -> KeyChord {
        self.chord
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.read().is_empty()
    }

    pub fn len(&self) -> usize {
        self.bindings.read().len()
    }

    /// Add an action to this chord. Adding an action twice does nothing.
    pub fn add_action(&self, action: ActionRef, provider: Option<ProviderRef>) -> Result<()> {
        let mut bindings = self.bindings.write();
        if bindings.iter().any(|b| same_action(&b.action, &action)) {
            return Ok(());
        }
        let actual = action.key_binding();
        if actual != Some(self.chord) {
            tracing::warn!(
                target: targets::KEYS,
                action = %action.full_name(),
                expected = %self.chord,
                "key binding mismatch"
            );
            return Err(DockingError::KeyBindingMismatch {
                action: action.full_name(),
                expected: self.chord.to_string(),
                actual: actual.map_or_else(|| "none".to_string(), |c| c.to_string()),
            });
        }
        bindings.push(Binding { action, provider });
        Ok(())
    }

    /// Remove an action, returning whether it was bound here.
    pub fn remove_action(&self, action: &ActionRef) -> bool {
        let mut bindings = self.bindings.write();
        let before = bindings.len();
        bindings.retain(|b| !same_action(&b.action, action));
        bindings.len() != before
    }

    /// Remove every binding the predicate selects, returning their actions.
    pub(crate) fn remove_where(
        &self,
        mut remove: impl FnMut(&ActionRef, Option<&ProviderRef>) -> bool,
    ) -> Vec<ActionRef> {
        let mut bindings = self.bindings.write();
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut *bindings)
            .into_iter()
            .partition(|b| remove(&b.action, b.provider.as_ref()));
        *bindings = kept;
        removed.into_iter().map(|b| b.action).collect()
    }

    pub fn actions(&self) -> Vec<ActionRef> {
        self.bindings.read().iter().map(|b| b.action.clone()).collect()
    }

    /// The actions that apply, each paired with the context to perform it in.
    ///
    /// `focused` is the provider that owns keyboard focus, `local` its
    /// context, and `global` the tool-wide default context.
    pub fn valid_actions(
        &self,
        focused: Option<&ProviderRef>,
        local: &ActionContext,
        global: &ActionContext,
    ) -> Vec<ExecutableAction> {
        let focused = focused.map(ProviderKey::of);
        let bindings = self.bindings.read();

        let mut list = Vec::new();
        let mut has_local = false;
        for binding in bindings.iter().filter(|b| b.belongs_to(focused)) {
            has_local = true;
            if binding.action.is_enabled_for_context(local) {
                list.push(ExecutableAction::new(binding.action.clone(), local.clone()));
            }
        }
        if has_local {
            return list;
        }

        for binding in bindings.iter().filter(|b| b.is_global()) {
            let action = &binding.action;
            if action.is_valid_context(local) {
                if action.is_enabled_for_context(local) {
                    list.push(ExecutableAction::new(action.clone(), local.clone()));
                }
            } else if action.is_valid_global_context(global)
                && action.is_enabled_for_context(global)
            {
                list.push(ExecutableAction::new(action.clone(), global.clone()));
            }
        }
        list
    }

    /// The effective precedence of this chord right now.
    ///
    /// `None` when nothing applies, `Default` when several actions apply,
    /// and the single applicable action's own precedence otherwise.
    pub fn precedence(
        &self,
        focused: Option<&ProviderRef>,
        local: &ActionContext,
        global: &ActionContext,
    ) -> Option<KeyBindingPrecedence> {
        precedence_of(&self.valid_actions(focused, local, global))
    }

    /// Resolve the chord. While a menu is open only a reserved binding fires.
    pub fn resolve(
        &self,
        focused: Option<&ProviderRef>,
        local: &ActionContext,
        global: &ActionContext,
        menu_showing: bool,
    ) -> KeyResolution {
        let mut list = self.valid_actions(focused, local, global);
        if menu_showing && precedence_of(&list) != Some(KeyBindingPrecedence::Reserved) {
            return KeyResolution::Suppressed;
        }
        match list.len() {
            0 => KeyResolution::NotApplicable,
            1 => KeyResolution::Single(list.remove(0)),
            _ => KeyResolution::Multiple(list),
        }
    }
}

fn precedence_of(list: &[ExecutableAction]) -> Option<KeyBindingPrecedence> {
    match list {
        [] => None,
        [single] => Some(
            single
                .action()
                .key_binding_data()
                .map_or(KeyBindingPrecedence::Default, |data| data.precedence()),
        ),
        _ => Some(KeyBindingPrecedence::Default),
    }
}

impl fmt::Debug for MultipleKeyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self
            .bindings
            .read()
            .iter()
            .map(|b| b.action.full_name())
            .collect();
        f.debug_struct("MultipleKeyAction")
            .field("chord", &self.chord.to_string())
            .field("actions", &names)
            .finish()
    }
}

static_assertions::assert_impl_all!(MultipleKeyAction: Send, Sync);
static_assertions::assert_impl_all!(Arc<MultipleKeyAction>: Send, Sync);
