//! Access policy.
//!
//! Privilege tiers: 0 = admin, 1 = moderator, 2 = standard user; lower is
//! more privileged. `decide` is the gate-level check applied to every
//! request; the `require_*` guards are the per-route checks handlers call.

use actix_web::http::Method;

use crate::auth::claims::Claims;
use crate::error::{ApiError, AuthError};

pub const LEVEL_ADMIN: i32 = 0;
pub const LEVEL_MODERATOR: i32 = 1;
pub const LEVEL_USER: i32 = 2;

/// The two routes exempted from the gate entirely.
pub fn is_public(path: &str) -> bool {
    matches!(path, "/api/v1/users/register" | "/api/v1/users/login")
}

/// Username addressed by a user self-service route, if the path is one.
fn self_service_target(path: &str) -> Option<&str> {
    let rest = path.strip_prefix("/api/v1/users/")?;
    let target = rest.split('/').next().unwrap_or(rest);
    if target.is_empty() {
        None
    } else {
        Some(target)
    }
}

/// Gate decision for a request whose token (if any) already verified.
pub fn decide(path: &str, method: &Method, claims: Option<&Claims>) -> bool {
    if is_public(path) {
        return true;
    }

    let claims = match claims {
        Some(claims) => claims,
        None => return false,
    };

    if claims.access_level > LEVEL_USER {
        return false;
    }

    if *method == Method::GET {
        return true;
    }

    // Ownership wins over the write floor inside the self-service namespace.
    if let Some(target) = self_service_target(path) {
        if target == claims.username {
            return true;
        }
    }

    claims.access_level <= LEVEL_MODERATOR
}

/// Admin-only operations: exactly level 0.
pub fn require_admin(claims: &Claims) -> Result<(), ApiError> {
    if claims.access_level != LEVEL_ADMIN {
        return Err(ApiError::Auth(AuthError::Forbidden));
    }
    Ok(())
}

/// Self-service operations: admin, or the actor's own record.
pub fn require_admin_or_self(claims: &Claims, username: &str) -> Result<(), ApiError> {
    if claims.access_level != LEVEL_ADMIN && claims.username != username {
        return Err(ApiError::Auth(AuthError::Forbidden));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(username: &str, level: i32) -> Claims {
        Claims::new(username.to_string(), level, 3600, "concord".to_string())
    }

    #[test]
    fn register_and_login_are_public() {
        assert!(decide("/api/v1/users/register", &Method::POST, None));
        assert!(decide("/api/v1/users/login", &Method::POST, None));
    }

    #[test]
    fn everything_else_needs_claims() {
        assert!(!decide("/api/v1/guilds", &Method::GET, None));
        assert!(!decide("/api/v1/users/me", &Method::GET, None));
    }

    #[test]
    fn reads_are_open_to_any_authenticated_level() {
        for level in [LEVEL_ADMIN, LEVEL_MODERATOR, LEVEL_USER] {
            let c = claims("gyro", level);
            assert!(decide("/api/v1/guilds", &Method::GET, Some(&c)));
        }
    }

    #[test]
    fn writes_outside_self_service_need_moderator() {
        let moderator = claims("mod", LEVEL_MODERATOR);
        let user = claims("pleb", LEVEL_USER);

        assert!(decide("/api/v1/guilds", &Method::POST, Some(&moderator)));
        assert!(!decide("/api/v1/guilds", &Method::POST, Some(&user)));
        assert!(!decide(
            "/api/v1/guilds/42/members/7",
            &Method::DELETE,
            Some(&user)
        ));
    }

    #[test]
    fn ownership_beats_the_write_floor() {
        let user = claims("pleb", LEVEL_USER);

        // Level 2 fails the floor, but it is their own record.
        assert!(decide("/api/v1/users/pleb", &Method::PATCH, Some(&user)));
        assert!(decide("/api/v1/users/pleb", &Method::DELETE, Some(&user)));
        // Someone else's record falls back to the floor and fails.
        assert!(!decide("/api/v1/users/other", &Method::PATCH, Some(&user)));
    }

    #[test]
    fn moderators_pass_the_floor_even_for_other_users() {
        // The gate lets it through; the route guard still rejects.
        let moderator = claims("mod", LEVEL_MODERATOR);
        assert!(decide("/api/v1/users/other", &Method::PATCH, Some(&moderator)));
        assert!(require_admin_or_self(&moderator, "other").is_err());
    }

    #[test]
    fn require_admin_is_level_zero_exactly() {
        assert!(require_admin(&claims("root", LEVEL_ADMIN)).is_ok());
        assert!(require_admin(&claims("mod", LEVEL_MODERATOR)).is_err());
        assert!(require_admin(&claims("pleb", LEVEL_USER)).is_err());
    }

    #[test]
    fn require_admin_or_self_accepts_owner_and_admin() {
        assert!(require_admin_or_self(&claims("pleb", LEVEL_USER), "pleb").is_ok());
        assert!(require_admin_or_self(&claims("root", LEVEL_ADMIN), "pleb").is_ok());
        assert!(require_admin_or_self(&claims("pleb", LEVEL_USER), "other").is_err());
    }
}
