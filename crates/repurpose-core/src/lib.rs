//! Core library for repurpose - gateway client, session handling, models.
//!
//! The crate is front-end agnostic: a terminal, desktop or web shell binds
//! an [`ApiClient`] to a [`SessionContext`] (storage + navigator) and calls
//! the endpoint wrappers and auth flows from there.

pub mod api;
pub mod auth;
pub mod config;
pub mod content_store;
pub mod models;
pub mod notify;
pub mod storage;
pub mod utils;
pub mod validation;

pub use api::{ApiClient, ApiError, RefreshPolicy};
pub use auth::{AuthState, AuthStore, Navigator, Route, RouteGuard, SessionContext};
pub use config::Config;
pub use content_store::ContentStore;
pub use notify::Notice;
pub use storage::{SharedStorage, Storage, StorageError};
pub use validation::ValidationError;
