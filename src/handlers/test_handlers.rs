use super::*;
use crate::dispatch::tests::{StubSource, dispatcher};
use crate::models::Platform;
use crate::synth::GENERAL_HELP_REPLY;

use axum::http::{StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

fn app_with(config: Config) -> Router {
    let state = AppState {
        dispatcher: Arc::new(dispatcher(
            StubSource::new(Platform::Meta, 100.0),
            StubSource::new(Platform::Google, 250.0),
        )),
        config: Arc::new(config),
    };
    router(state)
}

fn app() -> Router {
    app_with(Config::default())
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(req).await.expect("router is infallible");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON body")
    };
    (status, body)
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("valid request")
}

fn get_req(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).expect("valid request")
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(app(), get_req("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "healthy"}));
}

#[tokio::test]
async fn test_root_banner_lists_endpoints() {
    let (status, body) = send(app(), get_req("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Marketing Agent API is running");
    assert_eq!(body["name"], "marketing-agent");
    assert_eq!(body["endpoints"]["chat"], "/api/chat");
}

#[tokio::test]
async fn test_root_banner_uses_configured_name() {
    let mut config = Config::default();
    config.server.name = "acme-ads".to_string();
    let (_, body) = send(app_with(config), get_req("/")).await;
    assert_eq!(body["name"], "acme-ads");
}

#[tokio::test]
async fn test_chat_returns_reply_with_chart_data() {
    let (status, body) = send(
        app(),
        post_json("/chat", r#"{"message": "How is meta doing?", "conversation_id": "c-1"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "assistant");
    assert_eq!(body["tool_call"], "meta_performance_chart");
    let rows = body["data"].as_array().expect("insight rows");
    assert_eq!(rows.len(), 7);
    assert_eq!(rows[0]["Spend"], 100.0);
    assert!(rows[0].get("ROAS").is_some());
}

#[tokio::test]
async fn test_chat_is_also_served_under_api_prefix() {
    let (status, body) = send(app(), post_json("/api/chat", r#"{"message": "hello"}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tool_call"], Value::Null);
    assert_eq!(body["data"], Value::Null);
    assert_eq!(body["content"], GENERAL_HELP_REPLY);
}

#[tokio::test]
async fn test_comparison_payload_is_keyed_by_platform() {
    let (_, body) = send(app(), post_json("/chat", r#"{"message": "meta vs google"}"#)).await;
    assert_eq!(body["tool_call"], "comparison_chart");
    assert_eq!(body["data"]["meta"].as_array().map(Vec::len), Some(7));
    assert_eq!(body["data"]["google"][0]["Spend"], 250.0);
}

#[tokio::test]
async fn test_missing_message_is_a_client_error() {
    let (status, body) = send(app(), post_json("/chat", r#"{"conversation_id": "c-1"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().is_some_and(|e| e.contains("message")));

    let (status, _) = send(app(), post_json("/chat", "not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_summary_totals() {
    let (status, body) = send(app(), get_req("/api/summary")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["period"], "Last 7 days");
    assert_eq!(body["meta"]["total_spend"], 700.0);
    assert_eq!(body["google"]["total_spend"], 1750.0);
    assert_eq!(body["combined"]["total_spend"], 2450.0);
    assert_eq!(body["combined"]["avg_roas"], 2.0);
}

#[tokio::test]
async fn test_keywords_route() {
    let (status, body) = send(app(), get_req("/keywords")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["keyword"], "ppc management");
}

#[tokio::test]
async fn test_bearer_token_guards_data_routes_only() {
    let mut config = Config::default();
    config.server.bearer_token = Some("s3cret".to_string());

    let (status, _) = send(app_with(config.clone()), get_req("/summary")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(app_with(config.clone()), get_req("/health")).await;
    assert_eq!(status, StatusCode::OK);

    let authorized = Request::get("/summary")
        .header(header::AUTHORIZATION, "Bearer s3cret")
        .body(Body::empty())
        .expect("valid request");
    let (status, _) = send(app_with(config.clone()), authorized).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(app_with(config), get_req("/api/keywords?token=s3cret")).await;
    assert_eq!(status, StatusCode::OK);
}
