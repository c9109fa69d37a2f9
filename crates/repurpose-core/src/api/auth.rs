use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::User;

use super::ApiClient;

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    email: &'a str,
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// Credentials issued by `POST /api/auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

/// Fields accepted by `PUT /api/user/profile`. `None` leaves a field as is.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
}

impl ApiClient {
    /// Create an account. Does not log in.
    pub async fn register(&self, email: &str, username: &str, password: &str) -> Result<User> {
        self.post(
            "/api/auth/register",
            &RegisterRequest {
                email,
                username,
                password,
            },
        )
        .await
        .context("Registration request failed")
    }

    /// Log in and persist the issued tokens and the login email.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair> {
        let tokens: TokenPair = self
            .post("/api/auth/login", &LoginRequest { email, password })
            .await
            .context("Login request failed")?;

        self.session()
            .store_tokens(&tokens.access_token, &tokens.refresh_token, email)
            .context("Failed to persist session tokens")?;

        info!("Login tokens stored");
        Ok(tokens)
    }

    /// Fetch the profile of the logged-in user
    pub async fn fetch_profile(&self) -> Result<User> {
        self.get("/api/user/profile", &[])
            .await
            .context("Failed to fetch user profile")
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User> {
        self.put("/api/user/profile", update)
            .await
            .context("Failed to update user profile")
    }
}
