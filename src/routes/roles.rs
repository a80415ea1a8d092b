//! Guild role routes.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::{ApiError, ValidationError};

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Role {
    #[serde(rename = "roleID")]
    pub role_id: String,
    #[serde(rename = "guildID")]
    pub guild_id: String,
    #[serde(rename = "isDefault", default)]
    pub is_default: bool,
    /// Level at which the role is granted as a reward; 0 means none.
    #[serde(default)]
    pub reward: i32,
    #[serde(default)]
    pub ignored: bool,
    #[serde(rename = "xpBlacklisted", default)]
    pub xp_blacklisted: bool,
}

#[derive(Debug, Deserialize)]
pub struct RoleUpdate {
    #[serde(rename = "isDefault")]
    pub is_default: Option<bool>,
    pub reward: Option<i32>,
    pub ignored: Option<bool>,
    #[serde(rename = "xpBlacklisted")]
    pub xp_blacklisted: Option<bool>,
}

#[derive(Deserialize)]
pub struct RoleListQuery {
    #[serde(default)]
    pub ignored: bool,
    #[serde(rename = "xpBlacklist", default)]
    pub xp_blacklist: bool,
    #[serde(default)]
    pub reward: i32,
}

async fn fetch_role(pool: &PgPool, guild_id: &str, role_id: &str) -> Result<Role, ApiError> {
    sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE guild_id = $1 AND role_id = $2")
        .bind(guild_id)
        .bind(role_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!("role {} not found in guild {}", role_id, guild_id))
        })
}

/// GET /guilds/{guild_id}/roles?ignored=&xpBlacklist=&reward=
pub async fn get_roles(
    path: web::Path<String>,
    query: web::Query<RoleListQuery>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let guild_id = path.into_inner();

    let roles = sqlx::query_as::<_, Role>(
        r#"
        SELECT * FROM roles
        WHERE guild_id = $1
          AND ($2 = false OR ignored)
          AND ($3 = false OR xp_blacklisted)
          AND ($4 = 0 OR reward = $4)
        ORDER BY role_id
        "#,
    )
    .bind(&guild_id)
    .bind(query.ignored)
    .bind(query.xp_blacklist)
    .bind(query.reward)
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(roles))
}

/// GET /guilds/{guild_id}/roles/{role_id}
pub async fn get_role(
    path: web::Path<(String, String)>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let (guild_id, role_id) = path.into_inner();
    let role = fetch_role(pool.get_ref(), &guild_id, &role_id).await?;
    Ok(HttpResponse::Ok().json(role))
}

/// POST /guilds/{guild_id}/roles
pub async fn create_role(
    path: web::Path<String>,
    body: web::Json<Role>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let guild_id = path.into_inner();
    let role = body.into_inner();

    if role.guild_id != guild_id {
        return Err(ApiError::Validation(ValidationError::Mismatch("guildID")));
    }

    sqlx::query(
        r#"
        INSERT INTO roles (role_id, guild_id, is_default, reward, ignored, xp_blacklisted)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(&role.role_id)
    .bind(&role.guild_id)
    .bind(role.is_default)
    .bind(role.reward)
    .bind(role.ignored)
    .bind(role.xp_blacklisted)
    .execute(pool.get_ref())
    .await
    .map_err(|e| match ApiError::from(e) {
        ApiError::Conflict(_) => ApiError::Conflict("role already exists"),
        other => other,
    })?;

    Ok(HttpResponse::Created().json(role))
}

/// PATCH /guilds/{guild_id}/roles/{role_id}
pub async fn update_role(
    path: web::Path<(String, String)>,
    body: web::Json<RoleUpdate>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let (guild_id, role_id) = path.into_inner();
    let mut role = fetch_role(pool.get_ref(), &guild_id, &role_id).await?;

    let update = body.into_inner();
    if let Some(is_default) = update.is_default {
        role.is_default = is_default;
    }
    if let Some(reward) = update.reward {
        role.reward = reward;
    }
    if let Some(ignored) = update.ignored {
        role.ignored = ignored;
    }
    if let Some(xp_blacklisted) = update.xp_blacklisted {
        role.xp_blacklisted = xp_blacklisted;
    }

    sqlx::query(
        r#"
        UPDATE roles SET is_default = $1, reward = $2, ignored = $3, xp_blacklisted = $4
        WHERE guild_id = $5 AND role_id = $6
        "#,
    )
    .bind(role.is_default)
    .bind(role.reward)
    .bind(role.ignored)
    .bind(role.xp_blacklisted)
    .bind(&guild_id)
    .bind(&role_id)
    .execute(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(role))
}

/// DELETE /guilds/{guild_id}/roles/{role_id}
pub async fn delete_role(
    path: web::Path<(String, String)>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let (guild_id, role_id) = path.into_inner();

    let result = sqlx::query("DELETE FROM roles WHERE guild_id = $1 AND role_id = $2")
        .bind(&guild_id)
        .bind(&role_id)
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound(format!(
            "role {} not found in guild {}",
            role_id, guild_id
        )));
    }

    Ok(HttpResponse::NoContent().finish())
}
