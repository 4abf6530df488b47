use crate::error::AppError;
use crate::openapi::ApiDoc;
use actix_web::{
    get,
    http::header::{self, HeaderName, HeaderValue},
    web, HttpResponse, HttpResponseBuilder,
};
use utoipa::OpenApi;

pub mod conversations;
pub mod messages;

/// Client re-poll hint, in milliseconds
pub const POLL_INTERVAL_HEADER: &str = "x-poll-interval-ms";

/// 200 builder for polled reads: never cached, carries the re-poll interval
pub(crate) fn poll_response(interval_ms: u64) -> HttpResponseBuilder {
    let mut builder = HttpResponse::Ok();
    builder.insert_header((header::CACHE_CONTROL, "no-store"));
    if let Ok(value) = HeaderValue::from_str(&interval_ms.to_string()) {
        builder.insert_header((HeaderName::from_static(POLL_INTERVAL_HEADER), value));
    }
    builder
}

#[get("/health")]
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

#[get("/api/v1/openapi.json")]
pub async fn openapi_json() -> HttpResponse {
    HttpResponse::Ok().json(ApiDoc::openapi())
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::BadRequest(err.to_string()).into()),
    )
    .service(health)
    .service(openapi_json)
    .route("/metrics", web::get().to(crate::metrics::metrics_handler))
    .service(conversations::list_conversations)
    .service(conversations::create_conversation)
    .service(messages::list_messages)
    .service(messages::send_message);
}
