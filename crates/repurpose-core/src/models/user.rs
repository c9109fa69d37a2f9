use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Account profile as returned by `GET /api/user/profile`.
///
/// Only `email` is guaranteed: right after login the client stores a
/// placeholder user built from the login form until the real profile
/// arrives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: Option<i64>,
    pub email: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub plan: Option<String>,
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl User {
    /// Placeholder user known only by the email typed at login.
    pub fn placeholder(email: impl Into<String>) -> Self {
        Self {
            id: None,
            email: email.into(),
            username: None,
            created_at: None,
            plan: None,
            is_active: None,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// True once the record came from the backend rather than the login form.
    pub fn is_confirmed(&self) -> bool {
        self.id.is_some()
    }

    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.email)
    }

    pub fn plan_display(&self) -> &str {
        self.plan.as_deref().unwrap_or("free")
    }
}
