//! Authentication module for session state and route gating.
//!
//! This module provides:
//! - `SessionContext`: the storage and navigator a gateway client is bound to
//! - `AuthStore`: observable mirror of the authentication state
//! - `flows`: login, registration and startup bootstrap
//! - `RouteGuard`: token-presence gate for protected routes
//!
//! Tokens are persisted in a [`Storage`](crate::storage::Storage) backend;
//! the persisted copy is authoritative across restarts.

pub mod context;
pub mod flows;
pub mod guard;
pub mod store;

pub use context::{Navigator, RecordingNavigator, SessionContext};
pub use flows::{bootstrap, login, register, RegisterForm, RegisterOutcome};
pub use guard::{Route, RouteDecision, RouteGuard};
pub use store::{AuthState, AuthStore};
