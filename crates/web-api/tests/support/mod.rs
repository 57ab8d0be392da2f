#![allow(dead_code)]

use std::{sync::Arc, time::Duration};

use application::{ChatService, ChatServiceDependencies, ManualClock, MemoryChatStore};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use time::OffsetDateTime;
use tower::ServiceExt;

use web_api::{router, AppState};

pub const LIVENESS_TIMEOUT: Duration = Duration::from_secs(15);

pub struct TestApp {
    pub router: Router,
    pub service: Arc<ChatService>,
    pub clock: Arc<ManualClock>,
}

pub fn test_app() -> TestApp {
    let clock = Arc::new(ManualClock::new(OffsetDateTime::now_utc()));
    let service = Arc::new(ChatService::new(ChatServiceDependencies {
        store: Arc::new(MemoryChatStore::new()),
        clock: clock.clone(),
        liveness_timeout: LIVENESS_TIMEOUT,
    }));

    TestApp {
        router: router(AppState::new(service.clone()), &[]),
        service,
        clock,
    }
}

pub async fn send_request(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("request");
    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body = serde_json::from_slice(&body_bytes).unwrap_or(json!({}));
    (status, body)
}

pub fn register_request(name: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/participants")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "name": name }).to_string()))
        .unwrap()
}

pub fn post_message_request(user: &str, to: &str, text: &str, kind: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/messages")
        .header("content-type", "application/json")
        .header("user", user)
        .body(Body::from(
            json!({ "to": to, "text": text, "type": kind }).to_string(),
        ))
        .unwrap()
}

pub fn read_messages_request(user: &str, query: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(format!("/messages{}", query))
        .header("user", user)
        .body(Body::empty())
        .unwrap()
}

pub fn user_request(method: &str, uri: &str, user: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("user", user)
        .body(Body::empty())
        .unwrap()
}
