//! Multi-step authentication flows built on the gateway client.

use anyhow::Result;
use tracing::{info, warn};

use crate::api::{ApiClient, ApiError};
use crate::models::User;
use crate::validation;

use super::store::AuthState;

/// Registration form as typed by the user.
#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub email: String,
    pub username: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RegisterOutcome {
    /// Account created and the automatic login succeeded.
    LoggedIn(User),
    /// Account created but the automatic login failed; the user has to
    /// log in by hand.
    LoginRequired(User),
}

/// Replace the placeholder user with the real profile if it can be fetched.
async fn confirm_profile(api: &ApiClient, placeholder: User) -> User {
    let auth = api.session().auth();
    match api.fetch_profile().await {
        Ok(profile) => {
            auth.set_user(Some(profile.clone()));
            profile
        }
        Err(e) => {
            warn!(error = %e, "Failed to fetch profile after login");
            placeholder
        }
    }
}

/// Log in, persist the tokens and mark the user as signed in.
///
/// A placeholder user carrying only the email is set as soon as the
/// tokens are stored; the full profile replaces it if it can be fetched.
pub async fn login(api: &ApiClient, email: &str, password: &str) -> Result<User> {
    validation::validate_login(email, password)?;
    api.login(email, password).await?;

    let placeholder = User::placeholder(email);
    api.session().auth().set_user(Some(placeholder.clone()));
    info!("Login successful");

    Ok(confirm_profile(api, placeholder).await)
}

/// Create an account, then log straight in with the same credentials.
pub async fn register(api: &ApiClient, form: &RegisterForm) -> Result<RegisterOutcome> {
    validation::validate_registration(
        &form.email,
        &form.username,
        &form.password,
        &form.confirm_password,
    )?;

    let account = api
        .register(&form.email, &form.username, &form.password)
        .await?;
    info!("Account created");

    if let Err(e) = api.login(&form.email, &form.password).await {
        warn!(error = %e, "Automatic login after registration failed");
        return Ok(RegisterOutcome::LoginRequired(account));
    }

    let placeholder = User::placeholder(&form.email).with_username(&form.username);
    api.session().auth().set_user(Some(placeholder.clone()));

    Ok(RegisterOutcome::LoggedIn(confirm_profile(api, placeholder).await))
}

/// Restore the session on startup.
///
/// A stored token makes the store optimistically authenticated right away;
/// the profile fetch then confirms it. If the backend rejects the session
/// the store is logged out. Transport failures leave the session
/// unverified so that an offline start does not discard valid credentials.
pub async fn bootstrap(api: &ApiClient) -> Result<AuthState> {
    let auth = api.session().auth();
    if !auth.init_auth()? {
        return Ok(auth.state());
    }

    match api.fetch_profile().await {
        Ok(user) => {
            info!(email = %user.email, "Session restored");
            auth.set_user(Some(user));
        }
        Err(e) => match e.downcast_ref::<ApiError>() {
            Some(ApiError::NetworkError(_)) => {
                warn!(error = %e, "Could not reach backend, keeping unverified session");
            }
            _ => {
                warn!(error = %e, "Stored session rejected");
                auth.logout()?;
            }
        },
    }

    Ok(auth.state())
}
