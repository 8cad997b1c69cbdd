//! Gemini wire behavior against a local stub server

mod common;

use std::sync::Arc;

use citytime::core::{CityTimeError, Config, Message, ToolDefinition};
use citytime::llm::{GeminiClient, LLMProvider};
use citytime::time::LocalResolver;
use citytime::{Agent, Session};
use serde_json::json;

use common::spawn_stub;

fn time_tool() -> ToolDefinition {
    ToolDefinition::function(
        "get_current_time",
        "time",
        json!({"type": "object", "properties": {"timezone": {"type": "string"}}, "required": ["timezone"]}),
    )
}

#[tokio::test]
async fn function_call_response_becomes_tool_call() {
    let stub = spawn_stub(vec![(
        200,
        json!({
            "candidates": [{
                "content": {"role": "model", "parts": [
                    {"functionCall": {"name": "get_current_time", "args": {"timezone": "Asia/Dubai"}}}
                ]},
                "finishReason": "STOP"
            }]
        })
        .to_string(),
    )])
    .await;

    let client = GeminiClient::with_base_url(&stub.base_url, "test-key").unwrap();
    let response = client
        .chat_with_tools(
            "gemini-2.5-flash",
            &[Message::system("be brief"), Message::user("Dubai?")],
            &[time_tool()],
            None,
        )
        .await
        .unwrap();

    assert_eq!(response.tool_calls.len(), 1);
    assert_eq!(response.tool_calls[0].name, "get_current_time");

    let request = &stub.requests()[0];
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "/v1beta/models/gemini-2.5-flash:generateContent");
    assert_eq!(request.header("x-goog-api-key"), Some("test-key"));
    let body: serde_json::Value = serde_json::from_str(&request.body).unwrap();
    assert_eq!(
        body["tools"][0]["functionDeclarations"][0]["name"],
        "get_current_time"
    );
    assert_eq!(body["systemInstruction"]["parts"][0]["text"], "be brief");
}

#[tokio::test]
async fn quota_error_maps_to_backend_429() {
    let stub = spawn_stub(vec![(
        429,
        r#"{"error":{"code":429,"message":"Quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#
            .to_string(),
    )])
    .await;

    let client = GeminiClient::with_base_url(&stub.base_url, "test-key").unwrap();
    let err = client
        .chat_with_tools("gemini-2.5-flash", &[Message::user("hi")], &[], None)
        .await
        .unwrap_err();

    match err {
        CityTimeError::Backend { status, message } => {
            assert_eq!(status, Some(429));
            assert_eq!(message, "RESOURCE_EXHAUSTED: Quota exceeded");
        }
        other => panic!("expected backend error, got {:?}", other),
    }
}

#[tokio::test]
async fn auth_error_maps_to_backend_401() {
    let stub = spawn_stub(vec![(
        401,
        r#"{"error":{"code":401,"message":"API key not valid","status":"UNAUTHENTICATED"}}"#
            .to_string(),
    )])
    .await;

    let client = GeminiClient::with_base_url(&stub.base_url, "bad-key").unwrap();
    let err = client
        .chat_with_tools("gemini-2.5-flash", &[Message::user("hi")], &[], None)
        .await
        .unwrap_err();
    assert!(matches!(err, CityTimeError::Backend { status: Some(401), .. }));
}

#[tokio::test]
async fn garbage_body_is_backend_error() {
    let stub = spawn_stub(vec![(200, "not json".to_string())]).await;
    let client = GeminiClient::with_base_url(&stub.base_url, "k").unwrap();
    let err = client
        .chat_with_tools("gemini-2.5-flash", &[Message::user("hi")], &[], None)
        .await
        .unwrap_err();
    assert!(matches!(err, CityTimeError::Backend { status: None, .. }));
}

#[tokio::test]
async fn full_turn_over_the_wire() {
    let stub = spawn_stub(vec![
        (
            200,
            json!({"candidates": [{"content": {"role": "model", "parts": [
                {"functionCall": {"name": "get_current_time", "args": {"timezone": "Asia/Dubai"}}}
            ]}}]})
            .to_string(),
        ),
        (
            200,
            json!({"candidates": [{"content": {"role": "model", "parts": [
                {"text": "It is evening in Dubai."}
            ]}}]})
            .to_string(),
        ),
    ])
    .await;

    let client = GeminiClient::with_base_url(&stub.base_url, "test-key").unwrap();
    let mut agent = Agent::from_parts(
        Config::default(),
        Arc::new(client),
        Arc::new(LocalResolver::new()),
    );
    let mut session = Session::new();

    let reply = tokio_test::assert_ok!(
        agent
            .process_turn(&mut session, "What time is it in Dubai?")
            .await
    );
    assert_eq!(reply, "It is evening in Dubai.");
    assert_eq!(session.len(), 2);

    // Second request carries the call and its response in Gemini's shapes
    let requests = stub.requests();
    assert_eq!(requests.len(), 2);
    let body: serde_json::Value = serde_json::from_str(&requests[1].body).unwrap();
    let contents = body["contents"].as_array().unwrap();
    assert_eq!(contents.len(), 3);
    assert_eq!(contents[1]["role"], "model");
    assert_eq!(
        contents[2]["parts"][0]["functionResponse"]["response"]["timezone"],
        "Asia/Dubai"
    );
    assert_eq!(
        contents[2]["parts"][0]["functionResponse"]["response"]["status"],
        "success"
    );
}
