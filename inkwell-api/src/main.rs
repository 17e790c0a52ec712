use inkwell_db::client::{DbClient, DbError};
use serde::Deserialize;
use server::ServerState;
use sqlx::postgres::PgPoolOptions;
use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod server;

#[derive(Debug, Error)]
enum InitError {
    #[error("Error parsing .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),
    #[error("Error parsing environment: {0}")]
    Envy(#[from] envy::Error),
    #[error("Error connecting to database: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Error migrating database: {0}")]
    Migrate(#[from] DbError),
    #[error("Error binding tcp listener: {0}")]
    TcpBind(std::io::Error),
    #[error("Error serving server: {0}")]
    TcpServe(std::io::Error),
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Clone, Eq, PartialEq, Debug, Hash, Deserialize)]
struct Env {
    server_address: IpAddr,
    server_port: u16,
    database_url: String,
    #[serde(default = "default_max_connections")]
    database_max_connections: u32,
}

fn install_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "inkwell_api=debug,\
                inkwell_core=debug,\
                inkwell_db=debug,\
                tower_http=debug,axum::rejection=trace,sqlx=debug"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn get_env() -> Result<Env, InitError> {
    if let Err(e) = dotenvy::dotenv() {
        if e.not_found() {
            debug!("No .dotenv file found");
        } else {
            return Err(e.into());
        }
    }

    envy::from_env().map_err(InitError::from)
}

/// Cancels `token` once the process receives ctrl-c.
fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(%err, "Could not listen for ctrl-c, shutting down");
        } else {
            info!("Received ctrl-c, shutting down");
        }
        token.cancel();
    });
}

#[tokio::main]
async fn main() -> Result<(), InitError> {
    install_tracing();
    let env = get_env()?;

    let pool = PgPoolOptions::new()
        .max_connections(env.database_max_connections)
        .connect(&env.database_url)
        .await?;
    let db = DbClient::new(pool);
    db.migrate().await?;

    let tracing_layer = TraceLayer::new_for_http();
    let app = server::routes::<DbClient>()
        .with_state(ServerState::new(Arc::new(db)))
        .layer(tracing_layer);

    let shutdown = CancellationToken::new();
    cancel_on_ctrl_c(shutdown.clone());

    let server_address = SocketAddr::new(env.server_address, env.server_port);
    let listener = tokio::net::TcpListener::bind(server_address)
        .await
        .map_err(InitError::TcpBind)?;
    info!(%server_address, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(InitError::TcpServe)?;

    Ok(())
}
