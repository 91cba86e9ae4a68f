//! `backoffice-access`: what the current actor may see and invoke.
//!
//! Everything here is a pure function of a [`PermissionSet`]: navigation
//! pruning, conditional rendering and context-menu filtering. Rendering
//! concerns (icons, handlers) live in side tables keyed by id so the
//! authorization decisions stay declarative.
//!
//! [`PermissionSet`]: backoffice_auth::PermissionSet

pub mod context_menu;
pub mod gate;
pub mod navigation;
pub mod presentation;

pub use context_menu::{
    ActionRegistry, ActionTone, ContextAction, ContextMenu, InvokeOutcome, MenuError,
    authorize_actions,
};
pub use gate::CapabilityGate;
pub use navigation::{CatalogError, NavChild, NavGroup, NavItem, NavigationCatalog, filter_navigation};
pub use presentation::{Presentation, PresentationMap};
