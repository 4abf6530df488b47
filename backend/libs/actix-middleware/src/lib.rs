//! # Actix Middleware Library
//!
//! Shared middleware components for AfriFound Actix services
//!
//! ## Modules
//! - `jwt_auth`: optional caller resolution from access tokens
//! - `correlation_id`: request correlation IDs
//! - `logging`: request/response logging
//! - `metrics`: Prometheus metrics middleware

pub mod correlation_id;
pub mod jwt_auth;
pub mod logging;
pub mod metrics;

pub use correlation_id::{get_correlation_id, CorrelationId, CorrelationIdMiddleware};
pub use jwt_auth::{Claims, JwtAuthMiddleware, JwtValidator, UserId};
pub use logging::Logging;
pub use metrics::MetricsMiddleware;
