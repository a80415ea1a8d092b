use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use sqlx::PgPool;
use std::net::TcpListener;

use crate::configuration::AuthSettings;
use crate::middleware::{AuthGate, RequestTimer};
use crate::routes::{
    ban_user, create_ban, create_channel, create_guild, create_member, create_role, create_warn,
    delete_ban, delete_channel, delete_guild, delete_member, delete_role, delete_user, delete_warn,
    get_ban, get_bans, get_channel, get_channels, get_guild, get_guild_members, get_guilds,
    get_logged_user, get_member, get_role, get_roles, get_user, get_users, get_warn, get_warns,
    health_check, login, register, reset_guild, reset_guild_members, reset_member, unban_user,
    update_access_level, update_channel, update_guild, update_member, update_role, update_user,
};

pub fn run(
    listener: TcpListener,
    connection: PgPool,
    auth_settings: AuthSettings,
) -> Result<Server, std::io::Error> {
    let connection = web::Data::new(connection);
    let auth_data = web::Data::new(auth_settings.clone());

    let server = HttpServer::new(move || {
        App::new()
            .wrap(RequestTimer)
            .app_data(connection.clone())
            .app_data(auth_data.clone())
            .route("/health_check", web::get().to(health_check))
            .service(
                web::scope("/api/v1")
                    .wrap(AuthGate::new(auth_settings.clone()))
                    // Users. Literal paths register before `{username}`.
                    .route("/users/register", web::post().to(register))
                    .route("/users/login", web::post().to(login))
                    .route("/users/me", web::get().to(get_logged_user))
                    .route("/users", web::get().to(get_users))
                    .service(
                        web::resource("/users/{username}")
                            .route(web::get().to(get_user))
                            .route(web::patch().to(update_user))
                            .route(web::post().to(update_access_level))
                            .route(web::delete().to(delete_user)),
                    )
                    .service(
                        web::resource("/users/{username}/ban")
                            .route(web::post().to(ban_user))
                            .route(web::delete().to(unban_user)),
                    )
                    // Guilds
                    .service(
                        web::resource("/guilds")
                            .route(web::get().to(get_guilds))
                            .route(web::post().to(create_guild)),
                    )
                    .service(
                        web::resource("/guilds/{guild_id}")
                            .route(web::get().to(get_guild))
                            .route(web::patch().to(update_guild))
                            .route(web::delete().to(delete_guild)),
                    )
                    .route("/guilds/{guild_id}/reset", web::post().to(reset_guild))
                    // Members
                    .service(
                        web::resource("/guilds/{guild_id}/members")
                            .route(web::get().to(get_guild_members))
                            .route(web::post().to(create_member)),
                    )
                    .route(
                        "/guilds/{guild_id}/members/reset",
                        web::post().to(reset_guild_members),
                    )
                    .service(
                        web::resource("/guilds/{guild_id}/members/{member_id}")
                            .route(web::get().to(get_member))
                            .route(web::patch().to(update_member))
                            .route(web::delete().to(delete_member)),
                    )
                    .route(
                        "/guilds/{guild_id}/members/{member_id}/reset",
                        web::post().to(reset_member),
                    )
                    // Channels
                    .service(
                        web::resource("/guilds/{guild_id}/channels")
                            .route(web::get().to(get_channels))
                            .route(web::post().to(create_channel)),
                    )
                    .service(
                        web::resource("/guilds/{guild_id}/channels/{channel_id}")
                            .route(web::get().to(get_channel))
                            .route(web::patch().to(update_channel))
                            .route(web::delete().to(delete_channel)),
                    )
                    // Roles
                    .service(
                        web::resource("/guilds/{guild_id}/roles")
                            .route(web::get().to(get_roles))
                            .route(web::post().to(create_role)),
                    )
                    .service(
                        web::resource("/guilds/{guild_id}/roles/{role_id}")
                            .route(web::get().to(get_role))
                            .route(web::patch().to(update_role))
                            .route(web::delete().to(delete_role)),
                    )
                    // Bans
                    .service(
                        web::resource("/guilds/{guild_id}/members/{member_id}/bans")
                            .route(web::get().to(get_bans))
                            .route(web::post().to(create_ban)),
                    )
                    .service(
                        web::resource("/guilds/{guild_id}/members/{member_id}/bans/{ban_id}")
                            .route(web::get().to(get_ban))
                            .route(web::delete().to(delete_ban)),
                    )
                    // Warnings
                    .service(
                        web::resource("/guilds/{guild_id}/members/{member_id}/warns")
                            .route(web::get().to(get_warns))
                            .route(web::post().to(create_warn)),
                    )
                    .service(
                        web::resource("/guilds/{guild_id}/members/{member_id}/warns/{warn_id}")
                            .route(web::get().to(get_warn))
                            .route(web::delete().to(delete_warn)),
                    ),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
