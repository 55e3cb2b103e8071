//! Backend entry-point: configuration, migrations, pool, and HTTP server.

use actix_web::web;
use diesel::pg::PgConnection;
use diesel::Connection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use storefront_backend::inbound::http::health::HealthState;
use storefront_backend::outbound::persistence::{DbPool, PoolConfig};
use storefront_backend::server::{create_server, AppConfig};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Apply pending migrations over a short-lived synchronous connection.
fn run_migrations(database_url: &str) -> std::io::Result<()> {
    let mut conn = PgConnection::establish(database_url)
        .map_err(|err| std::io::Error::other(format!("database connection failed: {err}")))?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| std::io::Error::other(format!("migrations failed: {err}")))?;
    if !applied.is_empty() {
        info!(count = applied.len(), "applied pending migrations");
    }
    Ok(())
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let config = AppConfig::from_env()
        .map_err(|err| std::io::Error::other(format!("configuration error: {err}")))?;

    let database_url = config.database_url.clone();
    web::block(move || run_migrations(&database_url))
        .await
        .map_err(|err| std::io::Error::other(format!("migration task failed: {err}")))??;

    let pool = DbPool::new(
        PoolConfig::new(&config.database_url).with_max_size(config.pool_max_size),
    )
    .await
    .map_err(|err| std::io::Error::other(format!("pool construction failed: {err}")))?;

    let health_state = web::Data::new(HealthState::new());
    info!(bind_addr = %config.bind_addr, "starting storefront backend");
    let server = create_server(health_state, &config, pool)?;
    server.await
}
