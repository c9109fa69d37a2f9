use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A named style preset applied during generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandVoice {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub instructions: String,
    #[serde(default)]
    pub is_default: bool,
    pub created_at: NaiveDateTime,
}
