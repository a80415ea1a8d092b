//! User account routes: registration, login, and user administration.

use actix_web::{web, Either, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::auth::{
    decode_salt, encode_salt, generate_salt, hash_password, issue_token, policy, verify_password,
    Claims,
};
use crate::configuration::AuthSettings;
use crate::error::{ApiError, AuthError, ErrorContext, ValidationError};
use crate::validators::{
    validate_discord_id, validate_email, validate_password, validate_username,
};

/// A credential record. The digest and salt never serialize.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct User {
    pub username: String,
    pub email: String,
    #[serde(rename = "discordID")]
    pub discord_id: Option<String>,
    #[serde(skip_serializing)]
    pub pwd_hash: String,
    #[serde(skip_serializing)]
    pub salt: String,
    #[serde(rename = "accessLvl")]
    pub access_lvl: i32,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    pub banned: bool,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    #[serde(rename = "discordID")]
    pub discord_id: Option<String>,
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Partial update; a password change requires the old password.
#[derive(Deserialize)]
pub struct UserUpdate {
    pub email: Option<String>,
    #[serde(rename = "discordID")]
    pub discord_id: Option<String>,
    #[serde(rename = "oldPassword")]
    pub old_password: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct AccessLevelQuery {
    pub access_level: i32,
}

async fn fetch_user(pool: &PgPool, username: &str) -> Result<User, ApiError> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("user {} not found", username)))
}

/// POST /users/register
///
/// Creates a credential record at the least-privileged access level.
/// Validation runs fail-fast: username, email, discordID, password.
pub async fn register(
    body: web::Json<RegisterRequest>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let context = ErrorContext::new("register");

    let username = validate_username(&body.username)?;
    let email = validate_email(&body.email)?;
    if let Some(discord_id) = body.discord_id.as_deref() {
        validate_discord_id(discord_id)?;
    }
    validate_password(&body.password)?;

    let salt = generate_salt()?;
    let user = User {
        username,
        email,
        discord_id: body.discord_id.clone(),
        pwd_hash: hash_password(&body.password, &salt),
        salt: encode_salt(&salt),
        access_lvl: policy::LEVEL_USER,
        created_at: Utc::now(),
        banned: false,
    };

    sqlx::query(
        r#"
        INSERT INTO users (username, email, discord_id, pwd_hash, salt, access_lvl, created_at, banned)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.discord_id)
    .bind(&user.pwd_hash)
    .bind(&user.salt)
    .bind(user.access_lvl)
    .bind(user.created_at)
    .bind(user.banned)
    .execute(pool.get_ref())
    .await
    .map_err(|e| match ApiError::from(e) {
        ApiError::Conflict(_) => ApiError::Conflict("username already taken"),
        other => other,
    })?;

    tracing::info!(
        request_id = %context.request_id,
        username = %user.username,
        "user registered"
    );

    Ok(HttpResponse::Created().json(user))
}

/// POST /users/login
///
/// Accepts JSON or form credentials. Unknown usernames and wrong passwords
/// produce the same response; ban status is only checked after the password
/// verifies, so it is not an enumeration oracle.
pub async fn login(
    body: Either<web::Json<LoginRequest>, web::Form<LoginRequest>>,
    pool: web::Data<PgPool>,
    auth: web::Data<AuthSettings>,
) -> Result<HttpResponse, ApiError> {
    let context = ErrorContext::new("login");
    let credentials = match body {
        Either::Left(web::Json(c)) => c,
        Either::Right(web::Form(c)) => c,
    };

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
        .bind(&credentials.username)
        .fetch_optional(pool.get_ref())
        .await?
        .ok_or(ApiError::Auth(AuthError::InvalidCredentials))?;

    let salt = decode_salt(&user.salt)?;
    if !verify_password(&credentials.password, &salt, &user.pwd_hash) {
        return Err(ApiError::Auth(AuthError::InvalidCredentials));
    }

    if user.banned {
        return Err(ApiError::Auth(AuthError::Banned));
    }

    let token = issue_token(&user.username, user.access_lvl, auth.get_ref())?;

    tracing::info!(
        request_id = %context.request_id,
        username = %user.username,
        "login succeeded"
    );

    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}

/// GET /users — admin only.
pub async fn get_users(claims: Claims, pool: web::Data<PgPool>) -> Result<HttpResponse, ApiError> {
    policy::require_admin(&claims)?;

    let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY username")
        .fetch_all(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(users))
}

/// GET /users/me
pub async fn get_logged_user(
    claims: Claims,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let user = fetch_user(pool.get_ref(), &claims.username).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// GET /users/{username} — admin or self.
pub async fn get_user(
    claims: Claims,
    path: web::Path<String>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let username = path.into_inner();
    policy::require_admin_or_self(&claims, &username)?;

    let user = fetch_user(pool.get_ref(), &username).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// PATCH /users/{username} — admin or self.
pub async fn update_user(
    claims: Claims,
    path: web::Path<String>,
    body: web::Json<UserUpdate>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let context = ErrorContext::new("update_user");
    let username = path.into_inner();
    policy::require_admin_or_self(&claims, &username)?;

    let mut user = fetch_user(pool.get_ref(), &username).await?;

    if let Some(email) = body.email.as_deref() {
        user.email = validate_email(email)?;
    }
    if let Some(discord_id) = body.discord_id.as_deref() {
        validate_discord_id(discord_id)?;
        user.discord_id = Some(discord_id.to_string());
    }
    if let Some(new_password) = body.password.as_deref() {
        let old_password = body
            .old_password
            .as_deref()
            .ok_or(ApiError::Validation(ValidationError::EmptyField("oldPassword")))?;

        let salt = decode_salt(&user.salt)?;
        if !verify_password(old_password, &salt, &user.pwd_hash) {
            return Err(ApiError::Auth(AuthError::InvalidCredentials));
        }

        validate_password(new_password)?;

        // A password change always gets a fresh salt.
        let new_salt = generate_salt()?;
        user.pwd_hash = hash_password(new_password, &new_salt);
        user.salt = encode_salt(&new_salt);
    }

    sqlx::query(
        "UPDATE users SET email = $1, discord_id = $2, pwd_hash = $3, salt = $4 WHERE username = $5",
    )
    .bind(&user.email)
    .bind(&user.discord_id)
    .bind(&user.pwd_hash)
    .bind(&user.salt)
    .bind(&user.username)
    .execute(pool.get_ref())
    .await?;

    tracing::info!(
        request_id = %context.request_id,
        username = %user.username,
        "user updated"
    );

    Ok(HttpResponse::Ok().json(user))
}

/// POST /users/{username}?access_level=N — admin only.
pub async fn update_access_level(
    claims: Claims,
    path: web::Path<String>,
    query: web::Query<AccessLevelQuery>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    policy::require_admin(&claims)?;

    let level = query.access_level;
    if !(policy::LEVEL_ADMIN..=policy::LEVEL_USER).contains(&level) {
        return Err(ApiError::Validation(ValidationError::OutOfRange(
            "access_level",
        )));
    }

    let username = path.into_inner();
    let mut user = fetch_user(pool.get_ref(), &username).await?;

    sqlx::query("UPDATE users SET access_lvl = $1 WHERE username = $2")
        .bind(level)
        .bind(&username)
        .execute(pool.get_ref())
        .await?;

    user.access_lvl = level;

    Ok(HttpResponse::Ok().json(user))
}

/// POST /users/{username}/ban — admin only.
pub async fn ban_user(
    claims: Claims,
    path: web::Path<String>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    policy::require_admin(&claims)?;
    set_banned(pool.get_ref(), &path.into_inner(), true).await
}

/// DELETE /users/{username}/ban — admin only.
pub async fn unban_user(
    claims: Claims,
    path: web::Path<String>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    policy::require_admin(&claims)?;
    set_banned(pool.get_ref(), &path.into_inner(), false).await
}

async fn set_banned(pool: &PgPool, username: &str, banned: bool) -> Result<HttpResponse, ApiError> {
    let result = sqlx::query("UPDATE users SET banned = $1 WHERE username = $2")
        .bind(banned)
        .bind(username)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound(format!("user {} not found", username)));
    }

    tracing::info!(username = %username, banned = banned, "user ban flag updated");

    Ok(HttpResponse::Ok().finish())
}

/// DELETE /users/{username} — admin or self. Hard delete.
pub async fn delete_user(
    claims: Claims,
    path: web::Path<String>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let username = path.into_inner();
    policy::require_admin_or_self(&claims, &username)?;

    let result = sqlx::query("DELETE FROM users WHERE username = $1")
        .bind(&username)
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound(format!("user {} not found", username)));
    }

    Ok(HttpResponse::NoContent().finish())
}
