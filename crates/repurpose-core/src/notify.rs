//! User-facing notifications for completed and failed actions.

use std::fmt;

use crate::api::ApiError;
use crate::validation::ValidationError;

/// Message shown when the backend has ended the session.
pub const SESSION_EXPIRED_MESSAGE: &str = "Session expired. Please log in again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A transient notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    /// Turn a failed action into an error notice.
    ///
    /// Validation errors are shown verbatim. Backend errors show the
    /// backend's own message when it sent one; anything else gets
    /// `fallback`.
    pub fn from_error(err: &anyhow::Error, fallback: &str) -> Self {
        if let Some(invalid) = err.downcast_ref::<ValidationError>() {
            return Self::error(invalid.to_string());
        }
        match err.downcast_ref::<ApiError>() {
            Some(ApiError::SessionExpired) => Self::error(SESSION_EXPIRED_MESSAGE),
            Some(api) => Self::error(api.detail().unwrap_or_else(|| fallback.to_string())),
            None => Self::error(fallback),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self.level {
            NoticeLevel::Success => "✓",
            NoticeLevel::Error => "✗",
        };
        write!(f, "{} {}", marker, self.message)
    }
}
