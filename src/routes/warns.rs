//! Warning record routes, scoped to a guild member.

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::ApiError;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Warn {
    /// Assigned by the store on insert.
    #[serde(rename = "warnID", default)]
    pub warn_id: i32,
    #[serde(rename = "memberID", default)]
    pub member_id: String,
    #[serde(rename = "guildID", default)]
    pub guild_id: String,
    #[serde(rename = "warnerID", default)]
    pub warner_id: Option<String>,
    #[serde(rename = "warnedAt", default = "Utc::now")]
    pub warned_at: DateTime<Utc>,
    #[serde(rename = "warnReason", default)]
    pub warn_reason: Option<String>,
}

/// GET /guilds/{guild_id}/members/{member_id}/warns
pub async fn get_warns(
    path: web::Path<(String, String)>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let (guild_id, member_id) = path.into_inner();

    let warns = sqlx::query_as::<_, Warn>(
        "SELECT * FROM warns WHERE guild_id = $1 AND member_id = $2 ORDER BY warn_id",
    )
    .bind(&guild_id)
    .bind(&member_id)
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(warns))
}

/// GET /guilds/{guild_id}/members/{member_id}/warns/{warn_id}
pub async fn get_warn(
    path: web::Path<(String, String, i32)>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let (guild_id, member_id, warn_id) = path.into_inner();

    let warn = sqlx::query_as::<_, Warn>(
        "SELECT * FROM warns WHERE guild_id = $1 AND member_id = $2 AND warn_id = $3",
    )
    .bind(&guild_id)
    .bind(&member_id)
    .bind(warn_id)
    .fetch_optional(pool.get_ref())
    .await?
    .ok_or_else(|| ApiError::NotFound(format!("warn {} not found", warn_id)))?;

    Ok(HttpResponse::Ok().json(warn))
}

/// POST /guilds/{guild_id}/members/{member_id}/warns
pub async fn create_warn(
    path: web::Path<(String, String)>,
    body: web::Json<Warn>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let (guild_id, member_id) = path.into_inner();
    let mut warn = body.into_inner();
    warn.guild_id = guild_id;
    warn.member_id = member_id;

    let warn_id = sqlx::query_scalar::<_, i32>(
        r#"
        INSERT INTO warns (member_id, guild_id, warner_id, warned_at, warn_reason)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING warn_id
        "#,
    )
    .bind(&warn.member_id)
    .bind(&warn.guild_id)
    .bind(&warn.warner_id)
    .bind(warn.warned_at)
    .bind(&warn.warn_reason)
    .fetch_one(pool.get_ref())
    .await?;

    warn.warn_id = warn_id;

    Ok(HttpResponse::Created().json(warn))
}

/// DELETE /guilds/{guild_id}/members/{member_id}/warns/{warn_id}
pub async fn delete_warn(
    path: web::Path<(String, String, i32)>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let (guild_id, member_id, warn_id) = path.into_inner();

    let result =
        sqlx::query("DELETE FROM warns WHERE guild_id = $1 AND member_id = $2 AND warn_id = $3")
            .bind(&guild_id)
            .bind(&member_id)
            .bind(warn_id)
            .execute(pool.get_ref())
            .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound(format!("warn {} not found", warn_id)));
    }

    Ok(HttpResponse::NoContent().finish())
}
