//! Registration field validation.
//!
//! Rules run fail-fast in a fixed order; the first failure is returned and
//! no further rules are checked.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ValidationError;

const USERNAME_MIN_LENGTH: usize = 3;
const USERNAME_MAX_LENGTH: usize = 20;
const EMAIL_MAX_LENGTH: usize = 80;

lazy_static! {
    // RFC 5322 simplified email regex (practical validation)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).unwrap();

    // Platform snowflake: 17 to 21 digits
    static ref DISCORD_ID_REGEX: Regex = Regex::new(r"^[0-9]{17,21}").unwrap();
}

/// Validates and normalizes a username.
///
/// Must be non-empty after trimming, already lowercase, and 3-20 characters.
pub fn validate_username(raw: &str) -> Result<String, ValidationError> {
    let username = raw.trim();

    if username.is_empty() {
        return Err(ValidationError::EmptyField("username"));
    }
    if username != username.to_lowercase() {
        return Err(ValidationError::NotLowercase("username"));
    }
    if username.len() < USERNAME_MIN_LENGTH {
        return Err(ValidationError::TooShort("username", USERNAME_MIN_LENGTH));
    }
    if username.len() > USERNAME_MAX_LENGTH {
        return Err(ValidationError::TooLong("username", USERNAME_MAX_LENGTH));
    }

    Ok(username.to_string())
}

/// Validates an email address and returns its canonical (trimmed) form.
pub fn validate_email(raw: &str) -> Result<String, ValidationError> {
    let email = raw.trim();

    if email.is_empty() {
        return Err(ValidationError::EmptyField("email"));
    }
    if email.len() > EMAIL_MAX_LENGTH {
        return Err(ValidationError::TooLong("email", EMAIL_MAX_LENGTH));
    }
    if !EMAIL_REGEX.is_match(email) {
        return Err(ValidationError::InvalidFormat("email"));
    }

    Ok(email.to_string())
}

/// Validates an external platform identifier, when one was supplied.
pub fn validate_discord_id(raw: &str) -> Result<(), ValidationError> {
    if !DISCORD_ID_REGEX.is_match(raw) {
        return Err(ValidationError::InvalidFormat("discordID"));
    }
    Ok(())
}

/// Only presence is required of passwords.
pub fn validate_password(raw: &str) -> Result<(), ValidationError> {
    if raw.is_empty() {
        return Err(ValidationError::EmptyField("password"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_usernames() {
        assert_eq!(validate_username("gyro").unwrap(), "gyro");
        assert_eq!(validate_username("  padded  ").unwrap(), "padded");
        assert_eq!(validate_username("with_under.score").unwrap(), "with_under.score");
    }

    #[test]
    fn rejects_empty_username() {
        assert_eq!(
            validate_username("   "),
            Err(ValidationError::EmptyField("username"))
        );
    }

    #[test]
    fn rejects_uppercase_username() {
        assert_eq!(
            validate_username("Gyro"),
            Err(ValidationError::NotLowercase("username"))
        );
    }

    #[test]
    fn username_length_boundaries() {
        assert!(validate_username("ab").is_err());
        assert!(validate_username("abc").is_ok());
        assert!(validate_username(&"a".repeat(20)).is_ok());
        assert!(validate_username(&"a".repeat(21)).is_err());
    }

    #[test]
    fn lowercase_is_checked_before_length() {
        // Both rules fail; the lowercase rule reports first.
        assert_eq!(
            validate_username("AB"),
            Err(ValidationError::NotLowercase("username"))
        );
    }

    #[test]
    fn accepts_valid_emails() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("user+tag@domain.co.uk").is_ok());
    }

    #[test]
    fn rejects_invalid_emails() {
        assert!(validate_email("").is_err());
        assert!(validate_email("notanemail").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("@example.com").is_err());
    }

    #[test]
    fn rejects_overlong_email() {
        let email = format!("{}@example.com", "a".repeat(80));
        assert_eq!(
            validate_email(&email),
            Err(ValidationError::TooLong("email", 80))
        );
    }

    #[test]
    fn email_is_trimmed() {
        assert_eq!(
            validate_email(" user@example.com ").unwrap(),
            "user@example.com"
        );
    }

    #[test]
    fn discord_id_requires_17_to_21_digits() {
        assert!(validate_discord_id("12345678901234567").is_ok());
        assert!(validate_discord_id("123456789012345678901").is_ok());
        assert!(validate_discord_id("1234567890123456").is_err());
        assert!(validate_discord_id("abcdefghijklmnopq").is_err());
    }

    #[test]
    fn password_must_be_present() {
        assert_eq!(
            validate_password(""),
            Err(ValidationError::EmptyField("password"))
        );
        assert!(validate_password("123").is_ok());
    }
}
