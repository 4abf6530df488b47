use db_pool::{create_pool as create_pg_pool, DbConfig as DbPoolConfig};
use sqlx::migrate::Migrator;
use sqlx::{Pool, Postgres};

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

const SERVICE_NAME: &str = "messaging-service";

pub async fn init_pool(database_url: &str) -> Result<Pool<Postgres>, sqlx::Error> {
    let mut cfg = DbPoolConfig::from_env(SERVICE_NAME).unwrap_or_else(|_| DbPoolConfig {
        service_name: SERVICE_NAME.to_string(),
        ..DbPoolConfig::default()
    });
    if cfg.database_url.is_empty() {
        cfg.database_url = database_url.to_string();
    }
    cfg.log_config();
    create_pg_pool(cfg).await
}

/// Apply embedded migrations; idempotent
pub async fn run_migrations(pool: &Pool<Postgres>) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}
