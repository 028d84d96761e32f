//! Action contexts.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::provider::ProviderRef;

/// What an action is being evaluated or performed against.
///
/// A context names the provider it came from (if any), an optional
/// application object (the current selection, say) and an optional source
/// description for diagnostics.
#[derive(Clone, Default)]
pub struct ActionContext {
    provider: Option<ProviderRef>,
    context_object: Option<Arc<dyn Any + Send + Sync>>,
    source: Option<String>,
}

impl ActionContext {
    /// An empty context with no provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// A context that names `provider`.
    pub fn for_provider(provider: ProviderRef) -> Self {
        Self {
            provider: Some(provider),
            ..Self::default()
        }
    }

    /// Attach an application object.
    pub fn with_context_object<T: Any + Send + Sync>(mut self, object: T) -> Self {
        self.context_object = Some(Arc::new(object));
        self
    }

    /// Attach a source description.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn provider(&self) -> Option<&ProviderRef> {
        self.provider.as_ref()
    }

    /// The attached application object, if it is a `T`.
    pub fn context_object<T: Any + Send + Sync>(&self) -> Option<&T> {
        self.context_object.as_ref()?.downcast_ref::<T>()
    }

    pub fn has_context_object(&self) -> bool {
        self.context_object.is_some()
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Whether this context came from a provider with the given identity.
    pub fn is_from(&self, owner: &str, name: &str) -> bool {
        self.provider
            .as_ref()
            .is_some_and(|p| p.owner() == owner && p.name() == name)
    }
}

impl fmt::Debug for ActionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionContext")
            .field("provider", &self.provider.as_ref().map(|p| p.name().to_string()))
            .field("has_context_object", &self.context_object.is_some())
            .field("source", &self.source)
            .finish()
    }
}

/// The context a provider's actions see: its own, or a plain one naming it.
pub(crate) fn context_of(provider: &ProviderRef) -> ActionContext {
    provider
        .action_context()
        .unwrap_or_else(|| ActionContext::for_provider(provider.clone()))
}
