//! Service-level Prometheus counters and the `/metrics` exposition.
//!
//! HTTP request metrics come from `actix_middleware::MetricsMiddleware`.

use actix_web::HttpResponse;
use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounter, Opts, TextEncoder};

fn register_counter(name: &str, help: &str) -> IntCounter {
    let counter = IntCounter::with_opts(Opts::new(name, help))
        .unwrap_or_else(|e| panic!("failed to create {name}: {e}"));
    prometheus::default_registry()
        .register(Box::new(counter.clone()))
        .unwrap_or_else(|e| panic!("failed to register {name}: {e}"));
    counter
}

pub static MESSAGES_SENT_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_counter(
        "messaging_messages_sent_total",
        "Messages appended to conversations",
    )
});

pub static CONVERSATIONS_CREATED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_counter(
        "messaging_conversations_created_total",
        "Conversations created by get-or-create",
    )
});

pub static NOTIFICATION_FAILURES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_counter(
        "messaging_notification_failures_total",
        "New-message notifications that could not be delivered",
    )
});

/// Force registration so counters show up at zero before first use
pub fn init() {
    Lazy::force(&MESSAGES_SENT_TOTAL);
    Lazy::force(&CONVERSATIONS_CREATED_TOTAL);
    Lazy::force(&NOTIFICATION_FAILURES_TOTAL);
}

pub async fn metrics_handler() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %err, "failed to encode metrics");
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
