//! In-process mock `SecureChat` server shared by the integration tests.
//!
//! Serves the four client endpoints from an [`axum`] router bound to an
//! OS-assigned port and records every request so tests can assert on what
//! the client actually sent.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::Mutex;
use securechat::api::http::HttpChatApi;
use securechat_proto::message::Message;
use serde_json::{Value, json};
use url::Url;

/// Recorded state of the mock server.
#[derive(Default)]
pub struct MockState {
    /// Message log served by `GET /get_messages`.
    pub messages: Mutex<Vec<Message>>,
    /// Raw bodies received by `POST /submit_message`.
    pub submissions: Mutex<Vec<Value>>,
    /// `(path, body)` of every switch update received.
    pub switch_updates: Mutex<Vec<(String, Value)>>,
    /// Number of `GET /get_messages` requests served.
    pub fetches: AtomicUsize,
    /// Answer `GET /get_messages` with HTTP 500.
    pub fail_fetches: AtomicBool,
    /// Answer `POST /submit_message` with HTTP 500.
    pub fail_submissions: AtomicBool,
    /// Answer `POST /submit_message` with `{"success": false}`.
    pub reject_submissions: AtomicBool,
}

impl MockState {
    pub fn set_messages(&self, messages: Vec<Message>) {
        *self.messages.lock() = messages;
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

/// A running mock server.
pub struct MockServer {
    pub addr: SocketAddr,
    pub state: Arc<MockState>,
    handle: tokio::task::JoinHandle<()>,
}

impl MockServer {
    /// Start a mock server on `127.0.0.1:0`.
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new()
            .route("/get_messages", get(get_messages))
            .route("/submit_message", post(submit_message))
            .route("/update_ssh", post(update_ssh))
            .route("/update_encryption", post(update_encryption))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}/", self.addr)).unwrap()
    }

    /// An HTTP client pointed at this server.
    pub fn api(&self) -> HttpChatApi {
        HttpChatApi::new(self.base_url(), Duration::from_secs(5)).unwrap()
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn get_messages(State(state): State<Arc<MockState>>) -> Response {
    state.fetches.fetch_add(1, Ordering::SeqCst);
    if state.fail_fetches.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    Json(state.messages.lock().clone()).into_response()
}

async fn submit_message(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    state.submissions.lock().push(body.clone());

    if state.fail_submissions.load(Ordering::SeqCst) {
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    if state.reject_submissions.load(Ordering::SeqCst) {
        return Json(json!({ "success": false })).into_response();
    }

    let mut messages = state.messages.lock();
    let timestamp = format!("t{}", messages.len() + 1);
    messages.push(Message {
        user_id: body["user_id"].as_str().unwrap_or("anonymous").to_string(),
        message: body["message_content"].as_str().unwrap_or_default().to_string(),
        timestamp,
        encrypted: body["message_encrypted"].as_bool().unwrap_or(false),
    });
    drop(messages);

    Json(json!({ "success": true })).into_response()
}

async fn update_ssh(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Response {
    state
        .switch_updates
        .lock()
        .push(("/update_ssh".to_string(), body));
    Json(json!({ "success": true })).into_response()
}

async fn update_encryption(
    State(state): State<Arc<MockState>>,
    Json(body): Json<Value>,
) -> Response {
    state
        .switch_updates
        .lock()
        .push(("/update_encryption".to_string(), body));
    Json(json!({ "success": true })).into_response()
}

/// Poll `condition` every 10ms until it holds or `timeout` elapses.
pub async fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
