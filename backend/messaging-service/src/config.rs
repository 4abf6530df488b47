use crate::error::AppError;
use db_pool::env_utils::parse_env_with_default;
use dotenvy::dotenv;
use std::env;
use std::fmt;
use std::str::FromStr;

/// Where conversations and messages are persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(AppError::Config(format!(
                "STORE_BACKEND must be `postgres` or `memory`, got `{other}`"
            ))),
        }
    }
}

/// Where new-message notifications go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationSink {
    Postgres,
    Log,
}

impl FromStr for NotificationSink {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(NotificationSink::Postgres),
            "log" => Ok(NotificationSink::Log),
            other => Err(AppError::Config(format!(
                "NOTIFICATION_SINK must be `postgres` or `log`, got `{other}`"
            ))),
        }
    }
}

#[derive(Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub store_backend: StoreBackend,
    pub port: u16,
    pub jwt_secret: String,
    pub message_page_size_max: u32,
    pub message_max_length: usize,
    pub conversation_poll_interval_ms: u64,
    pub message_poll_interval_ms: u64,
    pub notification_sink: NotificationSink,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &self.database_url.as_ref().map(|_| "[REDACTED]"))
            .field("store_backend", &self.store_backend)
            .field("port", &self.port)
            .field("jwt_secret", &"[REDACTED]")
            .field("message_page_size_max", &self.message_page_size_max)
            .field("message_max_length", &self.message_max_length)
            .field("conversation_poll_interval_ms", &self.conversation_poll_interval_ms)
            .field("message_poll_interval_ms", &self.message_poll_interval_ms)
            .field("notification_sink", &self.notification_sink)
            .finish()
    }
}

pub const DEFAULT_PORT: u16 = 8085;
pub const DEFAULT_PAGE_SIZE_MAX: u32 = 50;
pub const DEFAULT_MESSAGE_MAX_LENGTH: usize = 2000;
pub const DEFAULT_CONVERSATION_POLL_INTERVAL_MS: u64 = 5000;
pub const DEFAULT_MESSAGE_POLL_INTERVAL_MS: u64 = 3000;

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();

        let store_backend = match env::var("STORE_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => StoreBackend::Postgres,
        };

        let database_url = env::var("DATABASE_URL").ok().filter(|s| !s.is_empty());
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(AppError::Config("DATABASE_URL missing".into()));
        }

        let jwt_secret = env::var("JWT_SECRET")
            .ok()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AppError::Config("JWT_SECRET missing".into()))?;

        let notification_sink = match env::var("NOTIFICATION_SINK") {
            Ok(value) => value.parse()?,
            // Without a database there is nowhere to write notifications
            Err(_) if store_backend == StoreBackend::Memory => NotificationSink::Log,
            Err(_) => NotificationSink::Postgres,
        };
        if notification_sink == NotificationSink::Postgres && store_backend == StoreBackend::Memory
        {
            return Err(AppError::Config(
                "NOTIFICATION_SINK=postgres requires STORE_BACKEND=postgres".into(),
            ));
        }

        Ok(Self {
            database_url,
            store_backend,
            port: parse_env_with_default("PORT", DEFAULT_PORT),
            jwt_secret,
            message_page_size_max: parse_env_with_default(
                "MESSAGE_PAGE_SIZE_MAX",
                DEFAULT_PAGE_SIZE_MAX,
            )
            .max(1),
            message_max_length: parse_env_with_default(
                "MESSAGE_MAX_LENGTH",
                DEFAULT_MESSAGE_MAX_LENGTH,
            )
            .max(1),
            conversation_poll_interval_ms: parse_env_with_default(
                "CONVERSATION_POLL_INTERVAL_MS",
                DEFAULT_CONVERSATION_POLL_INTERVAL_MS,
            ),
            message_poll_interval_ms: parse_env_with_default(
                "MESSAGE_POLL_INTERVAL_MS",
                DEFAULT_MESSAGE_POLL_INTERVAL_MS,
            ),
            notification_sink,
        })
    }

    /// In-memory configuration with default limits, used by tests and local runs
    pub fn in_memory(jwt_secret: impl Into<String>) -> Self {
        Self {
            database_url: None,
            store_backend: StoreBackend::Memory,
            port: DEFAULT_PORT,
            jwt_secret: jwt_secret.into(),
            message_page_size_max: DEFAULT_PAGE_SIZE_MAX,
            message_max_length: DEFAULT_MESSAGE_MAX_LENGTH,
            conversation_poll_interval_ms: DEFAULT_CONVERSATION_POLL_INTERVAL_MS,
            message_poll_interval_ms: DEFAULT_MESSAGE_POLL_INTERVAL_MS,
            notification_sink: NotificationSink::Log,
        }
    }
}
