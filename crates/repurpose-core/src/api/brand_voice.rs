use anyhow::{Context, Result};
use serde::Serialize;

use crate::models::BrandVoice;
use crate::validation;

use super::ApiClient;

#[derive(Debug, Serialize)]
struct CreateBrandVoice<'a> {
    name: &'a str,
    instructions: &'a str,
}

/// Partial update for a brand voice. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BrandVoiceUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
}

impl ApiClient {
    pub async fn create_brand_voice(&self, name: &str, instructions: &str) -> Result<BrandVoice> {
        validation::validate_brand_voice(name, instructions)?;
        self.post(
            "/api/user/brand-voice",
            &CreateBrandVoice { name, instructions },
        )
        .await
        .context("Failed to create brand voice")
    }

    pub async fn list_brand_voices(&self) -> Result<Vec<BrandVoice>> {
        self.get("/api/user/brand-voices", &[])
            .await
            .context("Failed to load brand voices")
    }

    pub async fn get_brand_voice(&self, id: i64) -> Result<BrandVoice> {
        self.get(&format!("/api/user/brand-voice/{}", id), &[])
            .await
            .with_context(|| format!("Failed to fetch brand voice {}", id))
    }

    pub async fn update_brand_voice(&self, id: i64, update: &BrandVoiceUpdate) -> Result<BrandVoice> {
        if let Some(ref name) = update.name {
            validation::validate_brand_voice_name(name)?;
        }
        if let Some(ref instructions) = update.instructions {
            validation::validate_brand_voice_instructions(instructions)?;
        }
        self.put(&format!("/api/user/brand-voice/{}", id), update)
            .await
            .with_context(|| format!("Failed to update brand voice {}", id))
    }

    pub async fn delete_brand_voice(&self, id: i64) -> Result<()> {
        self.delete(&format!("/api/user/brand-voice/{}", id))
            .await
            .with_context(|| format!("Failed to delete brand voice {}", id))
    }
}
