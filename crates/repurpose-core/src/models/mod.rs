//! Data models for the repurposing backend.
//!
//! This module contains the records exchanged with the backend:
//!
//! - `User`: account profile
//! - `Content`, `ContentType`: uploaded source material
//! - `Generation`, `RepurposeResult`, `Platform`, `Tone`: AI rewrites
//! - `BrandVoice`: named style presets applied during generation

pub mod brand_voice;
pub mod content;
pub mod generation;
pub mod user;

pub use brand_voice::BrandVoice;
pub use content::{Content, ContentType};
pub use generation::{Generation, Platform, RepurposeResult, Tone};
pub use user::User;
