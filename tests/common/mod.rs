//! Shared test helpers: a scripted LLM provider and an axum stub server

#![allow(dead_code)]

use async_trait::async_trait;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::Router;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

use citytime::core::{CityTimeError, Message, Result, ToolCall, ToolDefinition};
use citytime::llm::{GenerateOptions, LLMProvider, LLMResponse};

/// Provider that replays canned responses and records what it was sent
#[derive(Default)]
pub struct ScriptedProvider {
    responses: Mutex<VecDeque<Result<LLMResponse>>>,
    calls: Mutex<Vec<Vec<Message>>>,
    tools_seen: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<Result<LLMResponse>>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            ..Default::default()
        })
    }

    /// Queue more responses
    pub fn push(&self, response: Result<LLMResponse>) {
        self.responses.lock().unwrap().push_back(response);
    }

    /// Messages received on each call, in order
    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn tools_seen(&self) -> Vec<String> {
        self.tools_seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    async fn chat_with_tools(
        &self,
        _model: &str,
        messages: &[Message],
        tools: &[ToolDefinition],
        _options: Option<GenerateOptions>,
    ) -> Result<LLMResponse> {
        self.calls.lock().unwrap().push(messages.to_vec());
        *self.tools_seen.lock().unwrap() = tools.iter().map(|t| t.name().to_string()).collect();
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(CityTimeError::backend(None, "script exhausted")))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

pub fn time_call(timezone: &str) -> LLMResponse {
    LLMResponse::tool_calls(vec![ToolCall::new(
        "get_current_time",
        serde_json::json!({ "timezone": timezone }),
    )])
}

pub fn quota_error() -> CityTimeError {
    CityTimeError::backend(Some(429), "RESOURCE_EXHAUSTED: Quota exceeded")
}

/// A request the stub server received
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

struct StubState {
    responses: Mutex<VecDeque<(u16, String)>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// A running stub server
pub struct Stub {
    pub base_url: String,
    state: Arc<StubState>,
}

impl Stub {
    /// Requests received so far, in arrival order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }
}

async fn stub_handler(
    State(state): State<Arc<StubState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    state.requests.lock().unwrap().push(RecordedRequest {
        method,
        path: uri.path().to_string(),
        headers,
        body,
    });

    let (status, body) = {
        let mut queue = state.responses.lock().unwrap();
        if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue.front().cloned().unwrap_or((500, String::new()))
        }
    };

    (
        StatusCode::from_u16(status).unwrap(),
        [(header::CONTENT_TYPE, "application/json")],
        body,
    )
}

/// Serve `responses` in order, one per request; the last one repeats
pub async fn spawn_stub(responses: Vec<(u16, String)>) -> Stub {
    let state = Arc::new(StubState {
        responses: Mutex::new(responses.into()),
        requests: Mutex::new(Vec::new()),
    });
    let app = Router::new()
        .fallback(stub_handler)
        .with_state(Arc::clone(&state));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Stub { base_url, state }
}

/// Accept connections and never answer
pub async fn spawn_silent() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    base_url
}

/// An address nothing listens on
pub async fn closed_port() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}
