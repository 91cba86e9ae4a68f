//! `backoffice-session`: the authenticated session and its lifecycle.
//!
//! [`SessionStore`] owns the actor and its permissions, talks to the remote
//! identity service through [`IdentityService`], persists the credential via
//! [`TokenStore`] and publishes every transition. [`HeartbeatScheduler`]
//! signals liveness while authenticated; [`AccessView`] turns the published
//! session into render decisions.

pub mod client;
pub mod config;
pub mod error;
pub mod heartbeat;
pub mod store;
pub mod token_store;
pub mod types;
pub mod view;

pub use client::{HttpIdentityClient, IdentityService};
pub use config::{ConfigError, SessionConfig};
pub use error::{ServiceError, TokenStoreError};
pub use heartbeat::{HEARTBEAT_PERIOD, HeartbeatHandle, HeartbeatScheduler, HeartbeatStats};
pub use store::SessionStore;
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore};
pub use types::{AuthOutcome, Session, SessionStatus};
pub use view::{AccessView, ViewState};
