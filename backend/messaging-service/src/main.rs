use actix_middleware::{
    CorrelationIdMiddleware, JwtAuthMiddleware, JwtValidator, Logging, MetricsMiddleware,
};
use actix_web::{web, App, HttpServer};
use messaging_service::{
    config::{self, NotificationSink, StoreBackend},
    db, error, logging, metrics,
    repository::{InMemoryMessagingRepository, MessagingRepository, PgMessagingRepository},
    routes,
    services::{LoggingNotificationHook, NotificationHook, PgNotificationHook},
    state::AppState,
};
use std::sync::Arc;

#[actix_web::main]
async fn main() -> Result<(), error::AppError> {
    logging::init_tracing();
    let cfg = Arc::new(config::Config::from_env()?);
    tracing::info!(config = ?cfg, "configuration loaded");

    let (repo, notifier): (Arc<dyn MessagingRepository>, Arc<dyn NotificationHook>) =
        match cfg.store_backend {
            StoreBackend::Postgres => {
                let database_url = cfg
                    .database_url
                    .as_deref()
                    .ok_or_else(|| error::AppError::Config("DATABASE_URL missing".into()))?;
                let pool = db::init_pool(database_url)
                    .await
                    .map_err(|e| error::AppError::StartServer(format!("db: {e}")))?;

                // The schema must be in sync before serving
                db::run_migrations(&pool).await.map_err(|e| {
                    error::AppError::StartServer(format!("database migrations failed: {e}"))
                })?;

                let notifier: Arc<dyn NotificationHook> = match cfg.notification_sink {
                    NotificationSink::Postgres => Arc::new(PgNotificationHook::new(pool.clone())),
                    NotificationSink::Log => Arc::new(LoggingNotificationHook),
                };
                let repo: Arc<dyn MessagingRepository> = Arc::new(PgMessagingRepository::new(pool));
                (repo, notifier)
            }
            StoreBackend::Memory => {
                tracing::warn!("using in-memory store; data is lost on restart");
                let repo: Arc<dyn MessagingRepository> = Arc::new(InMemoryMessagingRepository::new());
                let notifier: Arc<dyn NotificationHook> = Arc::new(LoggingNotificationHook);
                (repo, notifier)
            }
        };

    metrics::init();

    let state = AppState::new(cfg.clone(), repo, notifier);
    let validator = Arc::new(JwtValidator::hs256(cfg.jwt_secret.as_bytes()));

    let bind_addr = format!("0.0.0.0:{}", cfg.port);
    tracing::info!(%bind_addr, "starting messaging-service");

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .configure(routes::configure_routes)
            .wrap(MetricsMiddleware)
            .wrap(Logging)
            .wrap(JwtAuthMiddleware::new(validator.clone()))
            .wrap(CorrelationIdMiddleware)
    })
    .bind(&bind_addr)
    .map_err(|e| error::AppError::StartServer(e.to_string()))?
    .run()
    .await
    .map_err(|e| error::AppError::StartServer(e.to_string()))?;

    Ok(())
}
