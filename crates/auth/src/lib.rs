//! `backoffice-auth`: client-side permission model and pure evaluation.
//!
//! Permissions are granted by the remote identity service; this crate only
//! decides, from an already-fetched actor, what that actor may see or invoke.
//! No I/O, no async.

pub mod actor;
pub mod evaluator;
pub mod explain;
pub mod permission_set;
pub mod permissions;
pub mod requirement;
pub mod roles;

pub use actor::{Actor, ActorPatch};
pub use explain::{AccessExplanation, DenialKind};
pub use permission_set::PermissionSet;
pub use permissions::{ALL, Permission, PermissionRecord};
pub use requirement::PermissionSpec;
pub use roles::Role;
