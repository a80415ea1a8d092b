//! Guild channel routes.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::{ApiError, ValidationError};

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Channel {
    #[serde(rename = "channelID")]
    pub channel_id: String,
    #[serde(rename = "guildID")]
    pub guild_id: String,
    /// Whether the bot ignores the channel entirely.
    #[serde(default)]
    pub ignored: bool,
    /// Whether activity in the channel earns xp.
    #[serde(rename = "xpBlacklisted", default)]
    pub xp_blacklisted: bool,
}

#[derive(Debug, Deserialize)]
pub struct ChannelUpdate {
    pub ignored: Option<bool>,
    #[serde(rename = "xpBlacklisted")]
    pub xp_blacklisted: Option<bool>,
}

#[derive(Deserialize)]
pub struct ChannelListQuery {
    #[serde(default)]
    pub ignored: bool,
    #[serde(rename = "xpBlacklist", default)]
    pub xp_blacklist: bool,
}

async fn fetch_channel(
    pool: &PgPool,
    guild_id: &str,
    channel_id: &str,
) -> Result<Channel, ApiError> {
    sqlx::query_as::<_, Channel>("SELECT * FROM channels WHERE guild_id = $1 AND channel_id = $2")
        .bind(guild_id)
        .bind(channel_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!(
                "channel {} not found in guild {}",
                channel_id, guild_id
            ))
        })
}

/// GET /guilds/{guild_id}/channels?ignored=&xpBlacklist=
///
/// Each flag, when true, narrows the listing to channels with that flag set.
pub async fn get_channels(
    path: web::Path<String>,
    query: web::Query<ChannelListQuery>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let guild_id = path.into_inner();

    let channels = sqlx::query_as::<_, Channel>(
        r#"
        SELECT * FROM channels
        WHERE guild_id = $1
          AND ($2 = false OR ignored)
          AND ($3 = false OR xp_blacklisted)
        ORDER BY channel_id
        "#,
    )
    .bind(&guild_id)
    .bind(query.ignored)
    .bind(query.xp_blacklist)
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(channels))
}

/// GET /guilds/{guild_id}/channels/{channel_id}
pub async fn get_channel(
    path: web::Path<(String, String)>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let (guild_id, channel_id) = path.into_inner();
    let channel = fetch_channel(pool.get_ref(), &guild_id, &channel_id).await?;
    Ok(HttpResponse::Ok().json(channel))
}

/// POST /guilds/{guild_id}/channels
pub async fn create_channel(
    path: web::Path<String>,
    body: web::Json<Channel>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let guild_id = path.into_inner();
    let channel = body.into_inner();

    if channel.guild_id != guild_id {
        return Err(ApiError::Validation(ValidationError::Mismatch("guildID")));
    }

    sqlx::query(
        r#"
        INSERT INTO channels (channel_id, guild_id, ignored, xp_blacklisted)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(&channel.channel_id)
    .bind(&channel.guild_id)
    .bind(channel.ignored)
    .bind(channel.xp_blacklisted)
    .execute(pool.get_ref())
    .await
    .map_err(|e| match ApiError::from(e) {
        ApiError::Conflict(_) => ApiError::Conflict("channel already exists"),
        other => other,
    })?;

    Ok(HttpResponse::Created().json(channel))
}

/// PATCH /guilds/{guild_id}/channels/{channel_id}
pub async fn update_channel(
    path: web::Path<(String, String)>,
    body: web::Json<ChannelUpdate>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let (guild_id, channel_id) = path.into_inner();
    let mut channel = fetch_channel(pool.get_ref(), &guild_id, &channel_id).await?;

    let update = body.into_inner();
    if let Some(ignored) = update.ignored {
        channel.ignored = ignored;
    }
    if let Some(xp_blacklisted) = update.xp_blacklisted {
        channel.xp_blacklisted = xp_blacklisted;
    }

    sqlx::query(
        r#"
        UPDATE channels SET ignored = $1, xp_blacklisted = $2
        WHERE guild_id = $3 AND channel_id = $4
        "#,
    )
    .bind(channel.ignored)
    .bind(channel.xp_blacklisted)
    .bind(&guild_id)
    .bind(&channel_id)
    .execute(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(channel))
}

/// DELETE /guilds/{guild_id}/channels/{channel_id}
pub async fn delete_channel(
    path: web::Path<(String, String)>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let (guild_id, channel_id) = path.into_inner();

    let result = sqlx::query("DELETE FROM channels WHERE guild_id = $1 AND channel_id = $2")
        .bind(&guild_id)
        .bind(&channel_id)
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound(format!(
            "channel {} not found in guild {}",
            channel_id, guild_id
        )));
    }

    Ok(HttpResponse::NoContent().finish())
}
