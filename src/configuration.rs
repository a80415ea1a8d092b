use config::ConfigError;

#[derive(serde::Deserialize, Clone)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub auth: AuthSettings,
}

#[derive(serde::Deserialize, Clone)]
pub struct ApplicationSettings {
    pub port: u16,
}

#[derive(serde::Deserialize, Clone)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: String,
    pub port: u16,
    pub host: String,
    pub database_name: String,
}

impl DatabaseSettings {
    pub fn connection_string(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database_name
        )
    }

    pub fn connection_string_without_db(&self) -> String {
        format!(
            "postgres://{}:{}@{}:{}",
            self.username, self.password, self.host, self.port
        )
    }
}

/// Token signing settings.
///
/// Constructed once at startup and injected wherever tokens are issued or
/// verified; nothing reads the secret from ambient process state.
#[derive(serde::Deserialize, Clone)]
pub struct AuthSettings {
    pub secret: String,
    pub token_expiry: i64, // seconds (86400 = 24 hours)
    pub issuer: String,
}

/// Reads `configuration.yaml`, then environment overrides.
///
/// `APP_AUTH__SECRET=...` overrides `auth.secret`, which is how the signing
/// secret is supplied in deployment.
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("configuration").required(false))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;
    settings.try_deserialize::<Settings>()
}
