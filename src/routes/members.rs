//! Guild member routes.

use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::{ApiError, ValidationError};

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Member {
    #[serde(rename = "memberID")]
    pub member_id: String,
    #[serde(rename = "guildID")]
    pub guild_id: String,
    #[serde(rename = "joinedAt", default)]
    pub joined_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub left: i32,
    #[serde(default)]
    pub xp: i32,
    #[serde(default)]
    pub level: i32,
}

#[derive(Debug, Deserialize)]
pub struct MemberUpdate {
    pub left: Option<i32>,
    pub xp: Option<i32>,
    pub level: Option<i32>,
}

fn default_after() -> String {
    "0".to_string()
}

fn default_limit() -> i64 {
    1
}

/// Keyset pagination: members with an id greater than `after`, up to `limit`.
#[derive(Deserialize)]
pub struct MemberListQuery {
    #[serde(default = "default_after")]
    pub after: String,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

async fn fetch_member(pool: &PgPool, guild_id: &str, member_id: &str) -> Result<Member, ApiError> {
    sqlx::query_as::<_, Member>("SELECT * FROM members WHERE guild_id = $1 AND member_id = $2")
        .bind(guild_id)
        .bind(member_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!(
                "member {} not found in guild {}",
                member_id, guild_id
            ))
        })
}

pub(crate) async fn insert_member(pool: &PgPool, member: &Member) -> Result<(), ApiError> {
    sqlx::query(
        r#"
        INSERT INTO members (member_id, guild_id, joined_at, "left", xp, level)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(&member.member_id)
    .bind(&member.guild_id)
    .bind(member.joined_at)
    .bind(member.left)
    .bind(member.xp)
    .bind(member.level)
    .execute(pool)
    .await
    .map_err(|e| match ApiError::from(e) {
        ApiError::Conflict(_) => ApiError::Conflict("member already exists"),
        other => other,
    })?;

    Ok(())
}

/// GET /guilds/{guild_id}/members?after=&limit=
pub async fn get_guild_members(
    path: web::Path<String>,
    query: web::Query<MemberListQuery>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let guild_id = path.into_inner();

    let members = sqlx::query_as::<_, Member>(
        r#"
        SELECT * FROM members
        WHERE guild_id = $1 AND member_id > $2
        ORDER BY member_id ASC
        LIMIT $3
        "#,
    )
    .bind(&guild_id)
    .bind(&query.after)
    .bind(query.limit)
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(members))
}

/// GET /guilds/{guild_id}/members/{member_id}
pub async fn get_member(
    path: web::Path<(String, String)>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let (guild_id, member_id) = path.into_inner();
    let member = fetch_member(pool.get_ref(), &guild_id, &member_id).await?;
    Ok(HttpResponse::Ok().json(member))
}

/// POST /guilds/{guild_id}/members
pub async fn create_member(
    path: web::Path<String>,
    body: web::Json<Member>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let guild_id = path.into_inner();
    let member = body.into_inner();

    if member.guild_id != guild_id {
        return Err(ApiError::Validation(ValidationError::Mismatch("guildID")));
    }

    insert_member(pool.get_ref(), &member).await?;

    Ok(HttpResponse::Created().json(member))
}

/// POST /guilds/{guild_id}/members/reset
///
/// Resets activity columns for every member of the guild.
pub async fn reset_guild_members(
    path: web::Path<String>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let guild_id = path.into_inner();

    sqlx::query(
        r#"UPDATE members SET "left" = DEFAULT, xp = DEFAULT, level = DEFAULT WHERE guild_id = $1"#,
    )
    .bind(&guild_id)
    .execute(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().finish())
}

/// POST /guilds/{guild_id}/members/{member_id}/reset
pub async fn reset_member(
    path: web::Path<(String, String)>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let (guild_id, member_id) = path.into_inner();

    let result = sqlx::query(
        r#"
        UPDATE members SET "left" = DEFAULT, xp = DEFAULT, level = DEFAULT
        WHERE guild_id = $1 AND member_id = $2
        "#,
    )
    .bind(&guild_id)
    .bind(&member_id)
    .execute(pool.get_ref())
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound(format!(
            "member {} not found in guild {}",
            member_id, guild_id
        )));
    }

    let member = fetch_member(pool.get_ref(), &guild_id, &member_id).await?;
    Ok(HttpResponse::Ok().json(member))
}

/// PATCH /guilds/{guild_id}/members/{member_id}
pub async fn update_member(
    path: web::Path<(String, String)>,
    body: web::Json<MemberUpdate>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let (guild_id, member_id) = path.into_inner();
    let mut member = fetch_member(pool.get_ref(), &guild_id, &member_id).await?;

    let update = body.into_inner();
    if let Some(left) = update.left {
        member.left = left;
    }
    if let Some(xp) = update.xp {
        member.xp = xp;
    }
    if let Some(level) = update.level {
        member.level = level;
    }

    sqlx::query(
        r#"
        UPDATE members SET "left" = $1, xp = $2, level = $3
        WHERE guild_id = $4 AND member_id = $5
        "#,
    )
    .bind(member.left)
    .bind(member.xp)
    .bind(member.level)
    .bind(&guild_id)
    .bind(&member_id)
    .execute(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(member))
}

/// DELETE /guilds/{guild_id}/members/{member_id}
pub async fn delete_member(
    path: web::Path<(String, String)>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let (guild_id, member_id) = path.into_inner();

    let result = sqlx::query("DELETE FROM members WHERE guild_id = $1 AND member_id = $2")
        .bind(&guild_id)
        .bind(&member_id)
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound(format!(
            "member {} not found in guild {}",
            member_id, guild_id
        )));
    }

    Ok(HttpResponse::NoContent().finish())
}
