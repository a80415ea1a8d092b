//! Guild configuration routes.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::ApiError;
use crate::routes::members::Member;

fn default_prefix() -> String {
    "!".to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_warns() -> i32 {
    3
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Guild {
    #[serde(rename = "guildID")]
    pub guild_id: String,
    #[serde(rename = "guildName")]
    pub guild_name: String,
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(rename = "reportChannel", default)]
    pub report_channel: Option<String>,
    #[serde(rename = "welcomeChannel", default)]
    pub welcome_channel: Option<String>,
    #[serde(rename = "welcomeMsg", default)]
    pub welcome_message: Option<String>,
    #[serde(rename = "privateWelcomeMsg", default)]
    pub private_welcome_msg: Option<String>,
    #[serde(rename = "lvlChannel", default)]
    pub level_channel: Option<String>,
    #[serde(rename = "lvlReplace", default)]
    pub level_replace: bool,
    #[serde(rename = "lvlResponse", default)]
    pub level_response: i32,
    #[serde(rename = "disabledCommands", default)]
    pub disabled_commands: Option<String>,
    #[serde(rename = "allowModeration", default = "default_true")]
    pub allow_moderation: bool,
    #[serde(rename = "maxWarns", default = "default_max_warns")]
    pub max_warns: i32,
    #[serde(rename = "banTime", default)]
    pub ban_time: i32,
}

/// Guild plus its member list, when requested.
#[derive(Debug, Serialize)]
pub struct GuildDetail {
    #[serde(flatten)]
    pub guild: Guild,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<Member>>,
}

/// Creation payload; members are inserted alongside the guild.
#[derive(Debug, Deserialize)]
pub struct GuildCreate {
    #[serde(flatten)]
    pub guild: Guild,
    #[serde(default)]
    pub members: Option<Vec<Member>>,
}

#[derive(Debug, Deserialize)]
pub struct GuildUpdate {
    #[serde(rename = "guildName")]
    pub guild_name: Option<String>,
    pub prefix: Option<String>,
    #[serde(rename = "reportChannel")]
    pub report_channel: Option<String>,
    #[serde(rename = "welcomeChannel")]
    pub welcome_channel: Option<String>,
    #[serde(rename = "welcomeMsg")]
    pub welcome_message: Option<String>,
    #[serde(rename = "privateWelcomeMsg")]
    pub private_welcome_msg: Option<String>,
    #[serde(rename = "lvlChannel")]
    pub level_channel: Option<String>,
    #[serde(rename = "lvlReplace")]
    pub level_replace: Option<bool>,
    #[serde(rename = "lvlResponse")]
    pub level_response: Option<i32>,
    #[serde(rename = "disabledCommands")]
    pub disabled_commands: Option<String>,
    #[serde(rename = "allowModeration")]
    pub allow_moderation: Option<bool>,
    #[serde(rename = "maxWarns")]
    pub max_warns: Option<i32>,
    #[serde(rename = "banTime")]
    pub ban_time: Option<i32>,
}

#[derive(Deserialize)]
pub struct GuildQuery {
    #[serde(default)]
    pub members: bool,
}

async fn fetch_guild(pool: &PgPool, guild_id: &str) -> Result<Guild, ApiError> {
    sqlx::query_as::<_, Guild>("SELECT * FROM guilds WHERE guild_id = $1")
        .bind(guild_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("guild {} not found", guild_id)))
}

/// GET /guilds
pub async fn get_guilds(pool: web::Data<PgPool>) -> Result<HttpResponse, ApiError> {
    let guilds = sqlx::query_as::<_, Guild>("SELECT * FROM guilds ORDER BY guild_id")
        .fetch_all(pool.get_ref())
        .await?;

    Ok(HttpResponse::Ok().json(guilds))
}

/// GET /guilds/{guild_id}?members=bool
pub async fn get_guild(
    path: web::Path<String>,
    query: web::Query<GuildQuery>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let guild_id = path.into_inner();
    let guild = fetch_guild(pool.get_ref(), &guild_id).await?;

    let members = if query.members {
        let rows = sqlx::query_as::<_, Member>(
            "SELECT * FROM members WHERE guild_id = $1 ORDER BY member_id",
        )
        .bind(&guild_id)
        .fetch_all(pool.get_ref())
        .await?;
        Some(rows)
    } else {
        None
    };

    Ok(HttpResponse::Ok().json(GuildDetail { guild, members }))
}

/// POST /guilds
pub async fn create_guild(
    body: web::Json<GuildCreate>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let GuildCreate { guild, members } = body.into_inner();

    sqlx::query(
        r#"
        INSERT INTO guilds
            (guild_id, guild_name, prefix, report_channel, welcome_channel, welcome_message,
             private_welcome_msg, level_channel, level_replace, level_response, disabled_commands,
             allow_moderation, max_warns, ban_time)
        VALUES
            ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
        "#,
    )
    .bind(&guild.guild_id)
    .bind(&guild.guild_name)
    .bind(&guild.prefix)
    .bind(&guild.report_channel)
    .bind(&guild.welcome_channel)
    .bind(&guild.welcome_message)
    .bind(&guild.private_welcome_msg)
    .bind(&guild.level_channel)
    .bind(guild.level_replace)
    .bind(guild.level_response)
    .bind(&guild.disabled_commands)
    .bind(guild.allow_moderation)
    .bind(guild.max_warns)
    .bind(guild.ban_time)
    .execute(pool.get_ref())
    .await
    .map_err(|e| match ApiError::from(e) {
        ApiError::Conflict(_) => ApiError::Conflict("guild already exists"),
        other => other,
    })?;

    if let Some(members) = &members {
        for member in members.iter().filter(|m| m.guild_id == guild.guild_id) {
            crate::routes::members::insert_member(pool.get_ref(), member).await?;
        }
    }

    Ok(HttpResponse::Created().json(GuildDetail { guild, members }))
}

/// PATCH /guilds/{guild_id}
pub async fn update_guild(
    path: web::Path<String>,
    body: web::Json<GuildUpdate>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let guild_id = path.into_inner();
    let mut guild = fetch_guild(pool.get_ref(), &guild_id).await?;

    let update = body.into_inner();
    if let Some(guild_name) = update.guild_name {
        guild.guild_name = guild_name;
    }
    if let Some(prefix) = update.prefix {
        guild.prefix = prefix;
    }
    if update.report_channel.is_some() {
        guild.report_channel = update.report_channel;
    }
    if update.welcome_channel.is_some() {
        guild.welcome_channel = update.welcome_channel;
    }
    if update.welcome_message.is_some() {
        guild.welcome_message = update.welcome_message;
    }
    if update.private_welcome_msg.is_some() {
        guild.private_welcome_msg = update.private_welcome_msg;
    }
    if update.level_channel.is_some() {
        guild.level_channel = update.level_channel;
    }
    if let Some(level_replace) = update.level_replace {
        guild.level_replace = level_replace;
    }
    if let Some(level_response) = update.level_response {
        guild.level_response = level_response;
    }
    if update.disabled_commands.is_some() {
        guild.disabled_commands = update.disabled_commands;
    }
    if let Some(allow_moderation) = update.allow_moderation {
        guild.allow_moderation = allow_moderation;
    }
    if let Some(max_warns) = update.max_warns {
        guild.max_warns = max_warns;
    }
    if let Some(ban_time) = update.ban_time {
        guild.ban_time = ban_time;
    }

    sqlx::query(
        r#"
        UPDATE guilds SET
            guild_name = $1, prefix = $2, report_channel = $3, welcome_channel = $4,
            welcome_message = $5, private_welcome_msg = $6, level_channel = $7,
            level_replace = $8, level_response = $9, disabled_commands = $10,
            allow_moderation = $11, max_warns = $12, ban_time = $13
        WHERE guild_id = $14
        "#,
    )
    .bind(&guild.guild_name)
    .bind(&guild.prefix)
    .bind(&guild.report_channel)
    .bind(&guild.welcome_channel)
    .bind(&guild.welcome_message)
    .bind(&guild.private_welcome_msg)
    .bind(&guild.level_channel)
    .bind(guild.level_replace)
    .bind(guild.level_response)
    .bind(&guild.disabled_commands)
    .bind(guild.allow_moderation)
    .bind(guild.max_warns)
    .bind(guild.ban_time)
    .bind(&guild.guild_id)
    .execute(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(guild))
}

/// POST /guilds/{guild_id}/reset
///
/// Resets settings columns to their defaults. Member data is untouched.
pub async fn reset_guild(
    path: web::Path<String>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let guild_id = path.into_inner();

    let result = sqlx::query(
        r#"
        UPDATE guilds SET
            prefix = DEFAULT, report_channel = DEFAULT, welcome_channel = DEFAULT,
            welcome_message = DEFAULT, private_welcome_msg = DEFAULT, level_channel = DEFAULT,
            level_replace = DEFAULT, level_response = DEFAULT, allow_moderation = DEFAULT,
            max_warns = DEFAULT, ban_time = DEFAULT
        WHERE guild_id = $1
        "#,
    )
    .bind(&guild_id)
    .execute(pool.get_ref())
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound(format!("guild {} not found", guild_id)));
    }

    let guild = fetch_guild(pool.get_ref(), &guild_id).await?;
    Ok(HttpResponse::Ok().json(guild))
}

/// DELETE /guilds/{guild_id}
pub async fn delete_guild(
    path: web::Path<String>,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, ApiError> {
    let guild_id = path.into_inner();

    let result = sqlx::query("DELETE FROM guilds WHERE guild_id = $1")
        .bind(&guild_id)
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::NotFound(format!("guild {} not found", guild_id)));
    }

    Ok(HttpResponse::NoContent().finish())
}
