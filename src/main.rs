use std::net::TcpListener;

use concord::configuration::get_configuration;
use concord::startup::run;
use concord::telemetry::init_telemetry;
use sqlx::postgres::PgPoolOptions;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_telemetry();

    tracing::info!("starting concord api");

    let configuration = match get_configuration() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("failed to read configuration: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "configuration error",
            ));
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&configuration.database.connection_string())
        .await
        .map_err(|e| {
            tracing::error!("failed to create connection pool: {}", e);
            std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "database error")
        })?;

    tracing::info!("database connection pool created");

    let address = format!("127.0.0.1:{}", configuration.application.port);
    let listener = TcpListener::bind(&address)?;
    tracing::info!(%address, "listening");

    run(listener, pool, configuration.auth)?.await
}
