mod bans;
mod channels;
mod guilds;
mod health_check;
mod members;
mod roles;
mod users;
mod warns;

pub use bans::{create_ban, delete_ban, get_ban, get_bans, Ban};
pub use channels::{
    create_channel, delete_channel, get_channel, get_channels, update_channel, Channel,
    ChannelUpdate,
};
pub use guilds::{
    create_guild, delete_guild, get_guild, get_guilds, reset_guild, update_guild, Guild,
    GuildUpdate,
};
pub use health_check::health_check;
pub use members::{
    create_member, delete_member, get_guild_members, get_member, reset_guild_members,
    reset_member, update_member, Member, MemberUpdate,
};
pub use roles::{create_role, delete_role, get_role, get_roles, update_role, Role, RoleUpdate};
pub use users::{
    ban_user, delete_user, get_logged_user, get_user, get_users, login, register, unban_user,
    update_access_level, update_user, LoginRequest, RegisterRequest, TokenResponse, User,
    UserUpdate,
};
pub use warns::{create_warn, delete_warn, get_warn, get_warns, Warn};
