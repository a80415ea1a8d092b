//! Token issuance and verification.

use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};

use crate::auth::claims::Claims;
use crate::configuration::AuthSettings;
use crate::error::{ApiError, AuthError};

/// Signs a token for a user with the access level read at login time.
///
/// Every token carries an expiration, `token_expiry` seconds from now.
pub fn issue_token(
    username: &str,
    access_level: i32,
    settings: &AuthSettings,
) -> Result<String, ApiError> {
    if settings.secret.is_empty() {
        return Err(ApiError::Auth(AuthError::Signing(
            "signing secret is empty".to_string(),
        )));
    }

    let claims = Claims::new(
        username.to_string(),
        access_level,
        settings.token_expiry,
        settings.issuer.clone(),
    );

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(settings.secret.as_bytes()),
    )
    .map_err(|e| ApiError::Auth(AuthError::Signing(e.to_string())))
}

/// Checks a bearer token's signature and envelope, returning its claims.
pub fn verify_token(token: &str, settings: &AuthSettings) -> Result<Claims, ApiError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[&settings.issuer]);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(settings.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => ApiError::Auth(AuthError::TokenExpired),
        _ => {
            tracing::warn!(error = %e, "token rejected");
            ApiError::Auth(AuthError::TokenInvalid)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_settings() -> AuthSettings {
        AuthSettings {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            token_expiry: 3600,
            issuer: "concord".to_string(),
        }
    }

    #[test]
    fn issue_then_verify_round_trips_the_claims() {
        let settings = test_settings();

        let token = issue_token("gyro", 2, &settings).expect("failed to issue token");
        let claims = verify_token(&token, &settings).expect("failed to verify token");

        assert_eq!(claims.username, "gyro");
        assert_eq!(claims.access_level, 2);
        assert_eq!(claims.iss, "concord");
        assert_eq!(claims.exp, claims.iat + 3600);
    }

    #[test]
    fn verifying_twice_yields_identical_claims() {
        let settings = test_settings();
        let token = issue_token("gyro", 1, &settings).unwrap();

        let first = verify_token(&token, &settings).unwrap();
        let second = verify_token(&token, &settings).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn garbage_tokens_are_invalid() {
        let result = verify_token("not.a.token", &test_settings());
        assert!(matches!(result, Err(ApiError::Auth(AuthError::TokenInvalid))));
    }

    #[test]
    fn tampered_tokens_are_invalid() {
        let settings = test_settings();
        let token = issue_token("gyro", 2, &settings).unwrap();

        let tampered = format!("{}X", token);
        let result = verify_token(&tampered, &settings);
        assert!(matches!(result, Err(ApiError::Auth(AuthError::TokenInvalid))));
    }

    #[test]
    fn wrong_issuer_is_rejected() {
        let settings = test_settings();
        let token = issue_token("gyro", 2, &settings).unwrap();

        let mut other = settings;
        other.issuer = "someone-else".to_string();
        assert!(verify_token(&token, &other).is_err());
    }

    #[test]
    fn expired_tokens_are_reported_as_expired() {
        let mut settings = test_settings();
        settings.token_expiry = -120; // beyond the default leeway

        let token = issue_token("gyro", 2, &settings).unwrap();
        let result = verify_token(&token, &settings);
        assert!(matches!(result, Err(ApiError::Auth(AuthError::TokenExpired))));
    }

    #[test]
    fn empty_secret_fails_signing() {
        let settings = AuthSettings {
            secret: String::new(),
            token_expiry: 3600,
            issuer: "concord".to_string(),
        };
        let result = issue_token("gyro", 2, &settings);
        assert!(matches!(result, Err(ApiError::Auth(AuthError::Signing(_)))));
    }
}
