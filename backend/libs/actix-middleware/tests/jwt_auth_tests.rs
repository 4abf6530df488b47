/// Caller resolution tests
/// The middleware must never reject; it only decides who the caller is.
use actix_middleware::{Claims, JwtAuthMiddleware, JwtValidator, UserId};
use actix_web::{cookie::Cookie, test, web, App, HttpResponse};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use std::sync::Arc;
use uuid::Uuid;

const JWT_SECRET: &str = "test-secret-key-min-32-chars-long!!!";

fn create_token(user_id: Uuid, exp_offset_secs: i64) -> String {
    create_typed_token(user_id, exp_offset_secs, None)
}

fn create_typed_token(user_id: Uuid, exp_offset_secs: i64, token_type: Option<&str>) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        user_id: user_id.to_string(),
        email: "investor@example.com".into(),
        role: "INVESTOR".into(),
        token_type: token_type.map(str::to_string),
        iat: Some(now),
        exp: now + exp_offset_secs,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .expect("Failed to encode JWT")
}

async fn whoami(user: Option<UserId>) -> HttpResponse {
    match user {
        Some(UserId(id)) => HttpResponse::Ok().json(serde_json::json!({"userId": id})),
        None => HttpResponse::Ok().json(serde_json::json!({"userId": null})),
    }
}

async fn strict(user: UserId) -> HttpResponse {
    HttpResponse::Ok().body(user.0.to_string())
}

macro_rules! app {
    () => {
        test::init_service(
            App::new()
                .wrap(JwtAuthMiddleware::new(Arc::new(JwtValidator::hs256(
                    JWT_SECRET.as_bytes(),
                ))))
                .route("/whoami", web::get().to(whoami))
                .route("/strict", web::get().to(strict)),
        )
        .await
    };
}

#[actix_rt::test]
async fn test_bearer_token_resolves_caller() {
    let app = app!();
    let id = Uuid::new_v4();

    let req = test::TestRequest::get()
        .uri("/whoami")
        .insert_header(("Authorization", format!("Bearer {}", create_token(id, 900))))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["userId"], serde_json::json!(id));
}

#[actix_rt::test]
async fn test_cookie_token_resolves_caller() {
    let app = app!();
    let id = Uuid::new_v4();

    let req = test::TestRequest::get()
        .uri("/whoami")
        .cookie(Cookie::new("access_token", create_token(id, 900)))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["userId"], serde_json::json!(id));
}

#[actix_rt::test]
async fn test_missing_token_is_anonymous_not_rejected() {
    let app = app!();

    let req = test::TestRequest::get().uri("/whoami").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["userId"].is_null());
}

#[actix_rt::test]
async fn test_expired_token_is_anonymous() {
    let app = app!();

    let req = test::TestRequest::get()
        .uri("/whoami")
        .insert_header((
            "Authorization",
            format!("Bearer {}", create_token(Uuid::new_v4(), -3600)),
        ))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

    assert!(body["userId"].is_null());
}

#[actix_rt::test]
async fn test_refresh_token_is_anonymous() {
    let app = app!();
    let refresh = create_typed_token(Uuid::new_v4(), 7 * 24 * 3600, Some("refresh"));

    let req = test::TestRequest::get()
        .uri("/whoami")
        .insert_header(("Authorization", format!("Bearer {refresh}")))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["userId"].is_null());

    let req = test::TestRequest::get()
        .uri("/whoami")
        .cookie(Cookie::new("access_token", refresh))
        .to_request();
    let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert!(body["userId"].is_null());
}

#[actix_rt::test]
async fn test_strict_extractor_rejects_anonymous() {
    let app = app!();

    let req = test::TestRequest::get().uri("/strict").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), 401);
}
