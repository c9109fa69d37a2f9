//! Client-side form checks.
//!
//! Only presence and length are checked here; everything else (email
//! format, duplicate accounts, file types) is left to the backend. A
//! request that fails these checks is never sent.

use thiserror::Error;

use crate::models::Platform;

pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MAX_USERNAME_LENGTH: usize = 50;
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MIN_TONE_LENGTH: usize = 3;
pub const MIN_BRAND_VOICE_NAME_LENGTH: usize = 3;
pub const MAX_BRAND_VOICE_NAME_LENGTH: usize = 100;
pub const MIN_BRAND_VOICE_INSTRUCTIONS_LENGTH: usize = 10;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Please enter content")]
    EmptyContent,

    #[error("Please enter a URL")]
    EmptyUrl,

    #[error("Please select a file")]
    NoFile,

    #[error("Please select at least one platform")]
    NoPlatforms,
}

pub type ValidationResult = std::result::Result<(), ValidationError>;

fn require(field: &'static str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        Err(ValidationError::Missing(field))
    } else {
        Ok(())
    }
}

fn length_between(field: &'static str, value: &str, min: usize, max: Option<usize>) -> ValidationResult {
    let len = value.chars().count();
    if len < min {
        return Err(ValidationError::TooShort { field, min });
    }
    if let Some(max) = max {
        if len > max {
            return Err(ValidationError::TooLong { field, max });
        }
    }
    Ok(())
}

pub fn validate_login(email: &str, password: &str) -> ValidationResult {
    require("Email", email)?;
    if password.is_empty() {
        return Err(ValidationError::Missing("Password"));
    }
    Ok(())
}

pub fn validate_registration(
    email: &str,
    username: &str,
    password: &str,
    confirm_password: &str,
) -> ValidationResult {
    require("Email", email)?;
    require("Username", username)?;
    length_between("Username", username, MIN_USERNAME_LENGTH, Some(MAX_USERNAME_LENGTH))?;
    if password.is_empty() {
        return Err(ValidationError::Missing("Password"));
    }
    if password != confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }
    length_between("Password", password, MIN_PASSWORD_LENGTH, None)
}

pub fn validate_text_content(text: &str) -> ValidationResult {
    if text.trim().is_empty() {
        return Err(ValidationError::EmptyContent);
    }
    Ok(())
}

pub fn validate_url(url: &str) -> ValidationResult {
    if url.trim().is_empty() {
        return Err(ValidationError::EmptyUrl);
    }
    Ok(())
}

pub fn validate_file_name(file_name: &str) -> ValidationResult {
    if file_name.trim().is_empty() {
        return Err(ValidationError::NoFile);
    }
    Ok(())
}

pub fn validate_tone(tone: &str) -> ValidationResult {
    require("Tone", tone)?;
    length_between("Tone", tone, MIN_TONE_LENGTH, None)
}

pub fn validate_repurpose(platforms: &[Platform], tone: &str) -> ValidationResult {
    if platforms.is_empty() {
        return Err(ValidationError::NoPlatforms);
    }
    validate_tone(tone)
}

pub fn validate_brand_voice_name(name: &str) -> ValidationResult {
    require("Name", name)?;
    length_between(
        "Name",
        name,
        MIN_BRAND_VOICE_NAME_LENGTH,
        Some(MAX_BRAND_VOICE_NAME_LENGTH),
    )
}

pub fn validate_brand_voice_instructions(instructions: &str) -> ValidationResult {
    require("Instructions", instructions)?;
    length_between(
        "Instructions",
        instructions,
        MIN_BRAND_VOICE_INSTRUCTIONS_LENGTH,
        None,
    )
}

pub fn validate_brand_voice(name: &str, instructions: &str) -> ValidationResult {
    validate_brand_voice_name(name)?;
    validate_brand_voice_instructions(instructions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_password_mismatch() {
        assert_eq!(
            validate_registration("a@b.c", "ada", "password1", "password2"),
            Err(ValidationError::PasswordMismatch)
        );
        assert_eq!(
            ValidationError::PasswordMismatch.to_string(),
            "Passwords do not match"
        );
    }

    #[test]
    fn test_registration_lengths() {
        assert_eq!(
            validate_registration("a@b.c", "ad", "password1", "password1"),
            Err(ValidationError::TooShort { field: "Username", min: 3 })
        );
        let long_name = "a".repeat(51);
        assert_eq!(
            validate_registration("a@b.c", &long_name, "password1", "password1"),
            Err(ValidationError::TooLong { field: "Username", max: 50 })
        );
        assert_eq!(
            validate_registration("a@b.c", "ada", "short", "short"),
            Err(ValidationError::TooShort { field: "Password", min: 8 })
        );
        assert!(validate_registration("a@b.c", "ada", "password1", "password1").is_ok());
    }

    #[test]
    fn test_registration_presence() {
        assert_eq!(
            validate_registration("  ", "ada", "password1", "password1"),
            Err(ValidationError::Missing("Email"))
        );
        assert_eq!(
            ValidationError::Missing("Email").to_string(),
            "Email is required"
        );
    }

    #[test]
    fn test_login() {
        assert!(validate_login("a@b.c", "x").is_ok());
        assert_eq!(validate_login("a@b.c", ""), Err(ValidationError::Missing("Password")));
        assert_eq!(validate_login("", "x"), Err(ValidationError::Missing("Email")));
    }

    #[test]
    fn test_uploads() {
        assert_eq!(validate_text_content(" \n "), Err(ValidationError::EmptyContent));
        assert!(validate_text_content("hello").is_ok());
        assert_eq!(validate_url(""), Err(ValidationError::EmptyUrl));
        assert_eq!(validate_file_name(""), Err(ValidationError::NoFile));
    }

    #[test]
    fn test_repurpose() {
        assert_eq!(
            validate_repurpose(&[], "Casual"),
            Err(ValidationError::NoPlatforms)
        );
        assert_eq!(
            validate_repurpose(&[Platform::Twitter], "ok"),
            Err(ValidationError::TooShort { field: "Tone", min: 3 })
        );
        assert!(validate_repurpose(&[Platform::Twitter], "Casual").is_ok());
    }

    #[test]
    fn test_brand_voice() {
        assert!(validate_brand_voice("Crisp", "Short sentences, no jargon.").is_ok());
        assert_eq!(
            validate_brand_voice("Crisp", "Short"),
            Err(ValidationError::TooShort { field: "Instructions", min: 10 })
        );
        assert_eq!(
            validate_brand_voice("Cr", "Short sentences, no jargon."),
            Err(ValidationError::TooShort { field: "Name", min: 3 })
        );
    }
}
