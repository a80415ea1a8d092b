//! Ban record routes, scoped to a guild member.

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::ApiError;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Ban {
    /// Assigned by the store on insert.
    #[serde(rename = "banID", default)]
    pub ban_id: i32,
    #[serde(rename = "memberID", default)]
    pub member_id: String,
    #[serde(rename = "guildID", default)]
    pub guild_id: String,
    #[serde(rename = "bannerID", default)]
    pub banner_id: Option<String>,
    #[serde(rename = "bannedAt", default = "Utc::now")]
    pub banned_at: DateTime<Utc>,
    #[serde(rename = "banReason", default)]
    pub ban_reason: Option<String>,
    #[serde(rename = "autoBan", default)]
    pub auto_ban: bool,
}

/// GET /guilds/{guild_id}/members/{member_id}/bans
pub async fn get_bans(
    path: web::Path<(String, String)>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let (guild_id, member_id) = path.into_inner();

    let bans = sqlx::query_as::<_, Ban>(
        "SELECT * FROM bans WHERE guild_id = $1 AND member_id = $2 ORDER BY ban_id",
    )
    .bind(&guild_id)
    .bind(&member_id)
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(bans))
}

/// GET /guilds/{guild_id}/members/{member_id}/bans/{ban_id}
pub async fn get_ban(
    path: web::Path<(String, String, i32)>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let (guild_id, member_id, ban_id) = path.into_inner();

    let ban = sqlx::query_as::<_, Ban>(
        "SELECT * FROM bans WHERE guild_id = $1 AND member_id = $2 AND ban_id = $3",
    )
    .bind(&guild_id)
    .bind(&member_id)
    .bind(ban_id)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("ban {} not found", ban_id)))?;

    Ok(HttpResponse::Ok().json(ban))
}

/// POST /guilds/{guild_id}/members/{member_id}/bans
///
/// The record is tied to the member addressed by the path.
pub async fn create_ban(
    path: web::Path<(String, String)>,
    body: web::Json<Ban>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let (guild_id, member_id) = path.into_inner();
    let mut ban = body.into_inner();
    ban.guild_id = guild_id;
    ban.member_id = member_id;

    let ban_id = sqlx::query_scalar::<_, i32>(
        r#"
        INSERT INTO bans (member_id, guild_id, banner_id, banned_at, ban_reason, auto_ban)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING ban_id
        "#,
    )
    .bind(&ban.member_id)
    .bind(&ban.guild_id)
    .bind(&ban.banner_id)
    .bind(ban.banned_at)
    .bind(&ban.ban_reason)
    .bind(ban.auto_ban)
    .fetch_one(pool.get_ref())
    .await?;

    ban.ban_id = ban_id;

    Ok(HttpResponse::Created().json(ban))
}

/// DELETE /guilds/{guild_id}/members/{member_id}/bans/{ban_id}
pub async fn delete_ban(
    path: web::Path<(String, String, i32)>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let (guild_id, member_id, ban_id) = path.into_inner();

    let result =
        sqlx::query("DELETE FROM bans WHERE guild_id = $1 AND member_id = $2 AND ban_id = $3")
            .bind(&guild_id)
            .bind(&member_id)
            .bind(ban_id)
            .execute(pool.get_ref())
            .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound(format!("ban {} not found", ban_id)));
    }

    Ok(HttpResponse::NoContent().finish())
}
