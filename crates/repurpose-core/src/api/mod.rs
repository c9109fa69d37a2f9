//! REST API client module for the repurposing backend.
//!
//! `ApiClient` is the single gateway for backend calls. It attaches the
//! stored bearer token to every request and, when the backend answers 401,
//! refreshes the access token once and resends.
//!
//! Endpoint wrappers are grouped by backend area:
//! - `auth`: register, login, profile
//! - `content`: uploads and the content library
//! - `generate`: repurposing and generation history
//! - `brand_voice`: brand voice presets

pub mod auth;
pub mod brand_voice;
pub mod client;
pub mod content;
pub mod error;
pub mod generate;
pub mod request;

pub use auth::{ProfileUpdate, TokenPair};
pub use brand_voice::BrandVoiceUpdate;
pub use client::{ApiClient, RefreshPolicy, DEFAULT_API_URL, DEFAULT_REQUEST_TIMEOUT_SECS};
pub use error::ApiError;
pub use request::{FilePart, MultipartUpload, PendingRequest, RequestBody};
