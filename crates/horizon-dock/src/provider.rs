//! Component providers.
//!
//! A [`ComponentProvider`] is the application's side of a dockable
//! component: it knows what the component is called, who owns it and where
//! it would like to be placed. The engine never creates providers; it only
//! holds shared references to them.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::context::ActionContext;
use crate::help::HelpLocation;

/// Where a component is placed relative to another part of the layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum WindowPosition {
    Left,
    #[default]
    Right,
    Top,
    Bottom,
    /// As another tab in the same stack.
    Stack,
    /// In a new detached window.
    Window,
}

impl WindowPosition {
    /// Whether this position splits its target side by side.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    /// Whether the placed component goes before (left of or above) its sibling.
    pub fn is_leading(self) -> bool {
        matches!(self, Self::Left | Self::Top)
    }
}

/// The application's description of one dockable component.
///
/// Identity is `(owner, name)`. Everything else may change over the
/// provider's life; call the manager's `update_title` after the title
/// changes.
///
/// ```ignore
/// struct Listing;
///
/// impl ComponentProvider for Listing {
///     fn name(&self) -> &str { "Listing" }
///     fn owner(&self) -> &str { "CodeBrowserPlugin" }
///     fn title(&self) -> String { "Listing: notepad.exe".into() }
///     fn window_group(&self) -> &str { "Core" }
/// }
/// ```
pub trait ComponentProvider: AsAnyProvider + Send + Sync {
    /// The provider's name, unique within its owner.
    fn name(&self) -> &str;

    /// The name of the plugin or subsystem that owns the provider.
    fn owner(&self) -> &str;

    /// Title shown on the component's tab and header.
    fn title(&self) -> String;

    /// Secondary text shown after the title.
    fn sub_title(&self) -> Option<String> {
        None
    }

    /// Icon resource name.
    fn icon(&self) -> Option<String> {
        None
    }

    /// Where help for this provider lives.
    fn help_location(&self) -> Option<HelpLocation> {
        None
    }

    /// Providers sharing a non-empty group are placed together.
    fn window_group(&self) -> &str {
        ""
    }

    /// Submenu of the Window menu that lists this provider.
    fn window_sub_menu_name(&self) -> Option<String> {
        None
    }

    /// Transient providers are never persisted.
    fn is_transient(&self) -> bool {
        false
    }

    /// Position used when no group member is showing.
    fn default_window_position(&self) -> WindowPosition {
        WindowPosition::Right
    }

    /// Position relative to a showing member of the same window group.
    fn intra_group_position(&self) -> WindowPosition {
        WindowPosition::Stack
    }

    /// The context actions are evaluated against while this provider is
    /// focused. `None` means a plain context naming the provider.
    fn action_context(&self) -> Option<ActionContext> {
        None
    }
}

/// Upcast helper for downcasting providers to their concrete type.
///
/// Implemented for every sized provider.
pub trait AsAnyProvider {
    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
    fn as_any(&self) -> &dyn Any;
}

impl<T: ComponentProvider + 'static> AsAnyProvider for T {
    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A shared provider reference.
pub type ProviderRef = Arc<dyn ComponentProvider>;

/// Identity of a provider instance, derived from its allocation.
///
/// Two providers with equal `(owner, name)` are still different instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProviderKey(usize);

impl ProviderKey {
    pub fn of(provider: &ProviderRef) -> Self {
        Self(Arc::as_ptr(provider) as *const () as usize)
    }
}

/// Downcast a provider to its concrete type.
pub fn downcast_provider<T: ComponentProvider + 'static>(provider: &ProviderRef) -> Option<Arc<T>> {
    provider.clone().as_any_arc().downcast::<T>().ok()
}

/// `"name (owner)"`, for logs and messages.
pub(crate) fn describe(provider: &dyn ComponentProvider) -> String {
    format!("{} ({})", provider.name(), provider.owner())
}

impl fmt::Debug for dyn ComponentProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentProvider")
            .field("owner", &self.owner())
            .field("name", &self.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Listing;

    impl ComponentProvider for Listing {
        fn name(&self) -> &str {
            "Listing"
        }
        fn owner(&self) -> &str {
            "CodeBrowserPlugin"
        }
        fn title(&self) -> String {
            "Listing".to_string()
        }
    }

    struct Console;

    impl ComponentProvider for Console {
        fn name(&self) -> &str {
            "Console"
        }
        fn owner(&self) -> &str {
            "ConsolePlugin"
        }
        fn title(&self) -> String {
            "Console".to_string()
        }
        fn default_window_position(&self) -> WindowPosition {
            WindowPosition::Bottom
        }
    }

    #[test]
    fn test_downcast() {
        let provider: ProviderRef = Arc::new(Listing);
        assert!(downcast_provider::<Listing>(&provider).is_some());
        assert!(downcast_provider::<Console>(&provider).is_none());
    }

    #[test]
    fn test_keys_are_per_instance() {
        let a: ProviderRef = Arc::new(Listing);
        let b: ProviderRef = Arc::new(Listing);
        assert_eq!(ProviderKey::of(&a), ProviderKey::of(&a.clone()));
        assert_ne!(ProviderKey::of(&a), ProviderKey::of(&b));
    }

    #[test]
    fn test_defaults() {
        let provider: ProviderRef = Arc::new(Console);
        assert_eq!(provider.window_group(), "");
        assert!(!provider.is_transient());
        assert_eq!(provider.intra_group_position(), WindowPosition::Stack);
        assert_eq!(provider.default_window_position(), WindowPosition::Bottom);
        assert_eq!(describe(provider.as_ref()), "Console (ConsolePlugin)");
    }

    #[test]
    fn test_positions() {
        assert!(WindowPosition::Left.is_horizontal());
        assert!(WindowPosition::Left.is_leading());
        assert!(!WindowPosition::Bottom.is_horizontal());
        assert!(!WindowPosition::Bottom.is_leading());
    }
}
