//! Polling feed surface over actix-web

mod common;

use actix_middleware::{JwtAuthMiddleware, JwtValidator};
use actix_web::{test, web, App};
use common::{bearer, refresh_token_for, Fixture, UnavailableRepository, JWT_SECRET};
use messaging_service::{
    config::Config, routes, services::LoggingNotificationHook, state::AppState,
};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .configure(routes::configure_routes)
                .wrap(JwtAuthMiddleware::new(Arc::new(JwtValidator::hs256(
                    JWT_SECRET.as_bytes(),
                )))),
        )
        .await
    };
}

#[actix_rt::test]
async fn test_health() {
    let fx = Fixture::new();
    let app = app!(fx.state.clone());

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "status": "ok" }));
}

#[actix_rt::test]
async fn test_openapi_document_is_served() {
    let fx = Fixture::new();
    let app = app!(fx.state.clone());

    let req = test::TestRequest::get()
        .uri("/api/v1/openapi.json")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert!(body.get("openapi").is_some());
    assert!(body["components"]["schemas"].get("MessagePage").is_some());
}

#[actix_rt::test]
async fn test_anonymous_list_is_empty_and_uncached() {
    let fx = Fixture::new();
    let app = app!(fx.state.clone());

    let req = test::TestRequest::get().uri("/conversations").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers().get("cache-control").unwrap(), "no-store");
    assert_eq!(resp.headers().get(routes::POLL_INTERVAL_HEADER).unwrap(), "5000");

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!([]));
}

#[actix_rt::test]
async fn test_create_conversation_requires_login() {
    let fx = Fixture::new();
    let investor = fx.user("Kofi", "INVESTOR").await;
    let app = app!(fx.state.clone());

    let req = test::TestRequest::post()
        .uri("/conversations")
        .set_json(json!({ "userId": investor }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "You must be logged in");
}

#[actix_rt::test]
async fn test_refresh_token_does_not_authenticate() {
    let fx = Fixture::new();
    let founder = fx.user("Ada", "FOUNDER").await;
    let investor = fx.user("Kofi", "INVESTOR").await;
    let app = app!(fx.state.clone());

    let req = test::TestRequest::post()
        .uri("/conversations")
        .insert_header(("Authorization", format!("Bearer {}", refresh_token_for(founder))))
        .set_json(json!({ "userId": investor }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    let listed = fx
        .state
        .conversations
        .list_conversations(Some(founder))
        .await
        .unwrap();
    assert!(listed.is_empty());
}

#[actix_rt::test]
async fn test_create_conversation_validates_target() {
    let fx = Fixture::new();
    let founder = fx.user("Ada", "FOUNDER").await;
    let app = app!(fx.state.clone());

    let req = test::TestRequest::post()
        .uri("/conversations")
        .insert_header(bearer(founder))
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "User ID is required");

    let req = test::TestRequest::post()
        .uri("/conversations")
        .insert_header(bearer(founder))
        .set_json(json!({ "userId": founder }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Cannot message yourself");

    let req = test::TestRequest::post()
        .uri("/conversations")
        .insert_header(bearer(founder))
        .set_json(json!({ "userId": "not-a-uuid" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_rt::test]
async fn test_conversation_round_trip() {
    let fx = Fixture::new();
    let founder = fx.user("Ada", "FOUNDER").await;
    let investor = fx.user("Kofi", "INVESTOR").await;
    let app = app!(fx.state.clone());

    let req = test::TestRequest::post()
        .uri("/conversations")
        .insert_header(bearer(founder))
        .set_json(json!({ "userId": investor }))
        .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    let conversation_id = created["conversationId"].as_str().unwrap().to_string();

    let req = test::TestRequest::post()
        .uri("/messages")
        .insert_header(bearer(founder))
        .set_json(json!({ "conversationId": conversation_id, "content": "  Hello Kofi  " }))
        .to_request();
    let sent: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(sent["content"], "Hello Kofi");
    assert_eq!(sent["senderId"], json!(founder));
    assert_eq!(sent["receiverId"], json!(investor));
    assert_eq!(sent["read"], false);
    assert_eq!(sent["sender"]["name"], "Ada");
    assert_eq!(sent["receiver"]["role"], "INVESTOR");

    let req = test::TestRequest::get()
        .uri("/conversations")
        .insert_header(bearer(investor))
        .to_request();
    let listed: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
    assert_eq!(listed[0]["id"], json!(conversation_id));
    assert_eq!(listed[0]["otherParticipant"]["name"], "Ada");
    assert_eq!(listed[0]["lastMessage"]["content"], "Hello Kofi");
    assert_eq!(listed[0]["unreadCount"], 1);

    let req = test::TestRequest::get()
        .uri(&format!("/messages?conversationId={conversation_id}"))
        .insert_header(bearer(investor))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers().get("cache-control").unwrap(), "no-store");
    assert_eq!(resp.headers().get(routes::POLL_INTERVAL_HEADER).unwrap(), "3000");
    let page: Value = test::read_body_json(resp).await;
    assert_eq!(page["items"].as_array().unwrap().len(), 1);
    assert_eq!(page["total"], 1);
    assert_eq!(page["page"], 1);
    assert_eq!(page["pageSize"], 50);
    assert_eq!(page["totalPages"], 1);
    assert_eq!(page["items"][0]["sender"]["id"], json!(founder));

    let req = test::TestRequest::get()
        .uri("/conversations")
        .insert_header(bearer(investor))
        .to_request();
    let listed: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed[0]["unreadCount"], 0);
}

#[actix_rt::test]
async fn test_send_rejects_empty_content() {
    let fx = Fixture::new();
    let founder = fx.user("Ada", "FOUNDER").await;
    let investor = fx.user("Kofi", "INVESTOR").await;
    let conversation_id = fx
        .state
        .conversations
        .get_or_create_conversation(Some(founder), investor)
        .await
        .unwrap();
    let app = app!(fx.state.clone());

    let req = test::TestRequest::post()
        .uri("/messages")
        .insert_header(bearer(founder))
        .set_json(json!({ "conversationId": conversation_id, "content": "   " }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Message cannot be empty");

    let req = test::TestRequest::post()
        .uri("/messages")
        .insert_header(bearer(founder))
        .set_json(json!({ "conversationId": conversation_id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_rt::test]
async fn test_send_error_statuses() {
    let fx = Fixture::new();
    let founder = fx.user("Ada", "FOUNDER").await;
    let investor = fx.user("Kofi", "INVESTOR").await;
    let outsider = fx.user("Zed", "INVESTOR").await;
    let conversation_id = fx
        .state
        .conversations
        .get_or_create_conversation(Some(founder), investor)
        .await
        .unwrap();
    let app = app!(fx.state.clone());

    let req = test::TestRequest::post()
        .uri("/messages")
        .set_json(json!({ "conversationId": conversation_id, "content": "hi" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 401);

    let req = test::TestRequest::post()
        .uri("/messages")
        .insert_header(bearer(outsider))
        .set_json(json!({ "conversationId": conversation_id, "content": "hi" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 403);

    let req = test::TestRequest::post()
        .uri("/messages")
        .insert_header(bearer(founder))
        .set_json(json!({ "conversationId": Uuid::new_v4(), "content": "hi" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Conversation not found");
}

#[actix_rt::test]
async fn test_messages_query_validation() {
    let fx = Fixture::new();
    let founder = fx.user("Ada", "FOUNDER").await;
    let app = app!(fx.state.clone());

    let req = test::TestRequest::get()
        .uri("/messages")
        .insert_header(bearer(founder))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);

    let req = test::TestRequest::get()
        .uri("/messages?conversationId=abc")
        .insert_header(bearer(founder))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 400);

    // Unknown conversations read as empty rather than erroring
    let req = test::TestRequest::get()
        .uri(&format!("/messages?conversationId={}", Uuid::new_v4()))
        .insert_header(bearer(founder))
        .to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["items"], json!([]));
    assert_eq!(page["totalPages"], 0);
}

#[actix_rt::test]
async fn test_negative_paging_values_are_clamped() {
    let fx = Fixture::new();
    let founder = fx.user("Ada", "FOUNDER").await;
    let investor = fx.user("Kofi", "INVESTOR").await;
    let conversation_id = fx
        .state
        .conversations
        .get_or_create_conversation(Some(founder), investor)
        .await
        .unwrap();
    fx.state
        .messages
        .send_message(Some(founder), conversation_id, "hello")
        .await
        .unwrap();
    let app = app!(fx.state.clone());

    let req = test::TestRequest::get()
        .uri(&format!("/messages?conversationId={conversation_id}&page=-1"))
        .insert_header(bearer(investor))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 200);
    let page: Value = test::read_body_json(resp).await;
    assert_eq!(page["page"], 1);
    assert_eq!(page["pageSize"], 50);
    assert_eq!(page["items"].as_array().unwrap().len(), 1);

    let req = test::TestRequest::get()
        .uri(&format!(
            "/messages?conversationId={conversation_id}&page=-3&pageSize=-10"
        ))
        .insert_header(bearer(investor))
        .to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["page"], 1);
    assert_eq!(page["pageSize"], 1);
    assert_eq!(page["totalPages"], 1);
}

#[actix_rt::test]
async fn test_store_failure_is_generic_500() {
    let state = AppState::new(
        Arc::new(Config::in_memory(JWT_SECRET)),
        Arc::new(UnavailableRepository),
        Arc::new(LoggingNotificationHook),
    );
    let app = app!(state);

    let req = test::TestRequest::get()
        .uri("/conversations")
        .insert_header(bearer(Uuid::new_v4()))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 500);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Internal server error");
    assert!(!body.to_string().contains("connection refused"));
}
