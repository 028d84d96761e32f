//! Horizon Dock - a docking window management engine.
//!
//! Applications register [`ComponentProvider`]s with a
//! [`DockingWindowManager`]. The manager arranges their components in a
//! tree of splits and tabbed stacks across a main window and any number of
//! detached windows, arbitrates keyboard focus between them, routes key
//! chords to the right action and persists the arrangement as XML.
//!
//! The engine does not draw anything. A host toolkit listens on
//! [`ManagerSignals`], renders each [`LayoutSnapshot`] it is handed and
//! reports focus changes, window activation and key chords back.
//!
//! - **Window tree**: splits, tabbed component nodes and detached windows
//!   ([`tree`])
//! - **Placeholders**: stable slots that survive their provider's removal
//! - **Actions**: tool-wide and per-provider actions with menu, toolbar and
//!   key binding data
//! - **Key routing**: one chord, many competing actions, resolved against the
//!   focused component
//! - **Persistence**: layout and preference state as XML
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_dock::{ComponentProvider, DockingWindowManager, ManagerRegistry, ProviderRef};
//!
//! struct Listing;
//!
//! impl ComponentProvider for Listing {
//!     fn name(&self) -> &str { "Listing" }
//!     fn owner(&self) -> &str { "CodeBrowserPlugin" }
//!     fn title(&self) -> String { "Listing".into() }
//! }
//!
//! let mut manager = DockingWindowManager::builder("CodeBrowser")
//!     .registry(ManagerRegistry::new())
//!     .build();
//! manager.signals().rebuilt.connect(|snapshot| {
//!     println!("{} tabs to draw", snapshot.tabs().len());
//! });
//!
//! let listing: ProviderRef = Arc::new(Listing);
//! manager.add_component(listing.clone(), true)?;
//! manager.set_visible(true);
//! manager.process_events();
//! assert!(manager.contains_provider(&listing));
//! # Ok::<(), horizon_dock::DockingError>(())
//! ```

pub mod action;
mod config;
mod context;
mod dialog;
mod error;
mod focus;
pub mod geometry;
mod handle;
mod help;
pub mod keys;
mod manager;
mod menu;
mod placeholder;
mod placeholder_manager;
mod preferences;
mod provider;
mod registry;
pub mod tree;
mod window_action;
mod window_menu;
mod xml;

pub use action::{
    ActionRef, DockingAction, DockingActionIf, ExecutableAction, KeyBindingData, KeyBindingPrecedence,
    KeyResolution, MenuData, PopupActionProvider, ToolBarData,
};
pub use config::DockingConfig;
pub use context::ActionContext;
pub use dialog::{parent_window_for_dialog, HostWindow};
pub use error::{DockingError, Result};
pub use focus::FocusOwner;
pub use geometry::{Point, Rect, Size};
pub use handle::{Command, ManagerHandle, PendingResult};
pub use help::{DefaultHelpService, HelpLocation, HelpService, HelpTarget};
pub use keys::{Key, KeyChord, KeyboardModifiers};
pub use manager::{DockingWindowManager, DockingWindowManagerBuilder, FocusRequest, ManagerSignals};
pub use menu::{MenuBarModel, MenuItem, MenuModel, ToolBarModel};
pub use placeholder::{Placeholder, PlaceholderId};
pub use preferences::{PreferenceState, PreferenceValue};
pub use provider::{downcast_provider, ComponentProvider, ProviderKey, ProviderRef, WindowPosition};
pub use registry::{ManagerId, ManagerRegistry};
pub use tree::{LayoutNode, LayoutSnapshot, TabSnapshot, TreeShape, WindowId, WindowSnapshot};
pub use window_menu::{DOCKING_WINDOWS_OWNER, WINDOW_MENU};
pub use xml::XmlElement;
