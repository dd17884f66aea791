//! For interacting with the database.

use super::{config::DatabaseConfig, error::ApiResult};
use sqlx::{
    pool::PoolOptions,
    postgres::{PgConnectOptions, PgSslMode},
    ConnectOptions, PgPool, Postgres, Transaction,
};
use tracing::log::LevelFilter;

/// A common transaction type.
/// Use this for the business and persistence layer.
pub type Tx = Transaction<'static, Postgres>;

/// A common database pool type.
pub type DbPool = PgPool;

/// Connects to the database based on some configuration.
pub fn init_db(config: &DatabaseConfig) -> DbPool {
    let db_options = PgConnectOptions::default()
        .username(&config.username)
        .password(&config.password)
        .host(&config.host)
        .port(config.port)
        .database(&config.database_name)
        .ssl_mode(PgSslMode::Prefer)
        .log_statements(LevelFilter::Debug);
    PoolOptions::default()
        .acquire_timeout(config.acquire_timeout)
        .min_connections(1)
        .max_connections(config.max_connections)
        .connect_lazy_with(db_options)
}

/// Brings the schema up to date.
#[tracing::instrument(skip(db))]
pub async fn migrate(db: &DbPool) -> ApiResult<()> {
    sqlx::migrate!("./migrations").run(db).await?;
    tracing::info!("Migrations applied");
    Ok(())
}
