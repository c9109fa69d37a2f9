use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Target platform for a rewrite. Serialized as the backend's lowercase id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Twitter,
    Linkedin,
    Instagram,
    Facebook,
    Tiktok,
    Email,
    Summary,
}

impl Platform {
    pub const ALL: [Platform; 7] = [
        Platform::Twitter,
        Platform::Linkedin,
        Platform::Instagram,
        Platform::Facebook,
        Platform::Tiktok,
        Platform::Email,
        Platform::Summary,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Platform::Twitter => "twitter",
            Platform::Linkedin => "linkedin",
            Platform::Instagram => "instagram",
            Platform::Facebook => "facebook",
            Platform::Tiktok => "tiktok",
            Platform::Email => "email",
            Platform::Summary => "summary",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Platform::Twitter => "Twitter/X",
            Platform::Linkedin => "LinkedIn",
            Platform::Instagram => "Instagram",
            Platform::Facebook => "Facebook",
            Platform::Tiktok => "TikTok",
            Platform::Email => "Email",
            Platform::Summary => "Summary",
        }
    }

    /// Parse a platform id or label, ignoring case. "x" is accepted for Twitter.
    pub fn from_str(s: &str) -> Option<Self> {
        let lower = s.trim().to_lowercase();
        if lower == "x" || lower == "twitter/x" {
            return Some(Platform::Twitter);
        }
        Self::ALL
            .into_iter()
            .find(|p| p.id() == lower || p.label().to_lowercase() == lower)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Tone presets offered by the client. Any tone string of valid length may
/// be sent; these are just the suggestions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    #[default]
    Professional,
    Casual,
    Enthusiastic,
    Educational,
    Humorous,
}

impl Tone {
    pub const ALL: [Tone; 5] = [
        Tone::Professional,
        Tone::Casual,
        Tone::Enthusiastic,
        Tone::Educational,
        Tone::Humorous,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Professional => "Professional",
            Tone::Casual => "Casual",
            Tone::Enthusiastic => "Enthusiastic",
            Tone::Educational => "Educational",
            Tone::Humorous => "Humorous",
        }
    }
}

/// One generated rewrite for one platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    pub id: i64,
    pub content_id: i64,
    pub platform: String,
    pub generated_text: String,
    pub tone: String,
    pub created_at: NaiveDateTime,
}

impl Generation {
    pub fn platform_label(&self) -> String {
        Platform::from_str(&self.platform)
            .map(|p| p.label().to_string())
            .unwrap_or_else(|| self.platform.clone())
    }
}

/// Response of `POST /api/generate/repurpose`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepurposeResult {
    pub content_id: i64,
    #[serde(default)]
    pub platform_results: BTreeMap<String, String>,
    #[serde(default)]
    pub generations: Vec<Generation>,
}
