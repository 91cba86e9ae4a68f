//! `backoffice-core`: identifiers and the error model shared by every crate.
//!
//! This crate has no I/O and no async runtime dependency.

pub mod error;
pub mod id;

pub use error::{DomainError, DomainResult};
pub use id::{ActionId, ActorId, NodeId};
