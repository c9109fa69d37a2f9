use anyhow::{Context, Result};
use serde::Serialize;

use crate::models::{Generation, Platform, RepurposeResult};
use crate::validation;

use super::ApiClient;

/// Default page size for generation history
pub const DEFAULT_HISTORY_PAGE_SIZE: u32 = 50;

#[derive(Debug, Serialize)]
struct RepurposeRequest<'a> {
    content_id: i64,
    platforms: &'a [Platform],
    tone: &'a str,
    brand_voice_id: Option<i64>,
}

#[derive(Debug, Serialize)]
struct RegenerateRequest<'a> {
    generation_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    tone: Option<&'a str>,
}

impl ApiClient {
    /// Generate rewrites of a piece of content for each platform
    pub async fn repurpose(
        &self,
        content_id: i64,
        platforms: &[Platform],
        tone: &str,
        brand_voice_id: Option<i64>,
    ) -> Result<RepurposeResult> {
        validation::validate_repurpose(platforms, tone)?;
        let request = RepurposeRequest {
            content_id,
            platforms,
            tone,
            brand_voice_id,
        };
        self.post("/api/generate/repurpose", &request)
            .await
            .with_context(|| format!("Failed to repurpose content {}", content_id))
    }

    pub async fn generation_history(&self, skip: u32, limit: u32) -> Result<Vec<Generation>> {
        self.get(
            "/api/generate/history",
            &[("skip", skip.to_string()), ("limit", limit.to_string())],
        )
        .await
        .context("Failed to fetch generation history")
    }

    pub async fn get_generation(&self, generation_id: i64) -> Result<Generation> {
        self.get(&format!("/api/generate/{}", generation_id), &[])
            .await
            .with_context(|| format!("Failed to fetch generation {}", generation_id))
    }

    /// Produce a new rewrite from an existing one, optionally changing tone
    pub async fn regenerate(&self, generation_id: i64, tone: Option<&str>) -> Result<Generation> {
        if let Some(tone) = tone {
            validation::validate_tone(tone)?;
        }
        self.post(
            &format!("/api/generate/regenerate/{}", generation_id),
            &RegenerateRequest {
                generation_id,
                tone,
            },
        )
        .await
        .with_context(|| format!("Failed to regenerate {}", generation_id))
    }

    pub async fn delete_generation(&self, generation_id: i64) -> Result<()> {
        self.delete(&format!("/api/generate/{}", generation_id))
            .await
            .with_context(|| format!("Failed to delete generation {}", generation_id))
    }
}
