use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::utils::truncate_string;

/// How a piece of source content entered the library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Text,
    Url,
    File,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Text => "text",
            ContentType::Url => "url",
            ContentType::File => "file",
        }
    }
}

/// Source material stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    pub id: i64,
    pub user_id: i64,
    pub title: Option<String>,
    pub original_content: String,
    pub content_type: ContentType,
    pub word_count: Option<i64>,
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

impl Content {
    pub fn title_display(&self) -> &str {
        match self.title.as_deref() {
            Some(t) if !t.trim().is_empty() => t,
            _ => "Untitled",
        }
    }

    /// Short single-line preview of the body for list views.
    pub fn preview(&self, max_len: usize) -> String {
        let flat: String = self
            .original_content
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        truncate_string(&flat, max_len)
    }
}
