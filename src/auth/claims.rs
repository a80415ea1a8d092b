//! Token claim set.

use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};

use crate::error::{ApiError, AuthError};

/// Claims carried by an access token.
///
/// The access level is copied from the credential record at issuance and is
/// not re-read on later requests; a level change takes effect at next login.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub username: String,
    #[serde(rename = "access_lvl")]
    pub access_level: i32,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Issuer
    pub iss: String,
}

impl Claims {
    pub fn new(username: String, access_level: i32, expiry_seconds: i64, issuer: String) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            username,
            access_level,
            exp: now + expiry_seconds,
            iat: now,
            iss: issuer,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.exp < chrono::Utc::now().timestamp()
    }
}

/// Typed accessor for the claims attached by the auth gate.
///
/// Fails with an explicit error when no claims are present instead of
/// panicking on a missing request extension.
impl FromRequest for Claims {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<Claims>()
                .cloned()
                .ok_or(ApiError::Auth(AuthError::MissingClaims)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claims_carry_username_and_level() {
        let claims = Claims::new("gyro".to_string(), 2, 3600, "concord".to_string());

        assert_eq!(claims.username, "gyro");
        assert_eq!(claims.access_level, 2);
        assert_eq!(claims.iss, "concord");
        assert_eq!(claims.exp, claims.iat + 3600);
        assert!(!claims.is_expired());
    }

    #[test]
    fn negative_expiry_is_already_expired() {
        let claims = Claims::new("gyro".to_string(), 2, -60, "concord".to_string());
        assert!(claims.is_expired());
    }
}
