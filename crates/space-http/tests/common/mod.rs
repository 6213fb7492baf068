//! In-process space server for integration tests.
//!
//! Speaks the space wire protocol on `http://127.0.0.1:<port>/.fs`, backed
//! by an `InMemorySpace`. Switches on `ServerState` make it misbehave.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Redirect, Response};
use space_core::{
    ClientHooks, Encoding, FileData, FileMeta, InMemorySpace, RestartReason, Space, SpaceError,
};
use space_http::{HttpSpace, HttpSpaceConfig};

pub const SPACE_PATH: &str = "/srv/space";
const PREFIX: &str = "/.fs";

pub struct ServerState {
    pub space: InMemorySpace,
    /// Reported in `X-Space-Path` on the file list
    pub space_path: Mutex<String>,
    /// Cookie a request must carry, if any
    pub required_cookie: Option<String>,
    /// Answer every request with 401
    pub reject_all: AtomicBool,
    /// Redirect every request to the login page
    pub redirect_all: AtomicBool,
    /// Answer every request with a 302 that has no Location but valid metadata
    pub bare_redirect: AtomicBool,
    /// Requests that reached the login page
    pub login_hits: AtomicUsize,
    /// Answer file requests with this status and body "boom"
    pub fail_with: Mutex<Option<StatusCode>>,
    /// Headers of the most recent request
    pub last_headers: Mutex<Option<HeaderMap>>,
}

impl ServerState {
    pub fn new() -> Self {
        Self {
            space: InMemorySpace::new(),
            space_path: Mutex::new(SPACE_PATH.to_string()),
            required_cookie: None,
            reject_all: AtomicBool::new(false),
            redirect_all: AtomicBool::new(false),
            bare_redirect: AtomicBool::new(false),
            login_hits: AtomicUsize::new(0),
            fail_with: Mutex::new(None),
            last_headers: Mutex::new(None),
        }
    }

    pub fn with_required_cookie(mut self, cookie: &str) -> Self {
        self.required_cookie = Some(cookie.to_string());
        self
    }

    pub fn last_header(&self, name: &str) -> Option<String> {
        self.last_headers
            .lock()
            .unwrap()
            .as_ref()
            .and_then(|h| h.get(name))
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub state: Arc<ServerState>,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with(ServerState::new()).await
    }

    pub async fn start_with(state: ServerState) -> Self {
        let state = Arc::new(state);
        let app = Router::new().fallback(handle).with_state(Arc::clone(&state));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server failed");
        });
        Self { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}{}", self.addr, PREFIX)
    }

    pub fn config(&self) -> HttpSpaceConfig {
        HttpSpaceConfig::new(self.url())
    }

    pub fn client(&self, hooks: &Arc<RecordingHooks>) -> HttpSpace {
        self.client_with(self.config(), hooks)
    }

    pub fn client_with(&self, config: HttpSpaceConfig, hooks: &Arc<RecordingHooks>) -> HttpSpace {
        let hooks: Arc<dyn ClientHooks> = hooks.clone();
        HttpSpace::new(config, hooks).expect("Failed to create client")
    }
}

/// Hook invocations in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookEvent {
    Restart(RestartReason),
    FlushCaches,
    Alert(String),
}

#[derive(Default)]
pub struct RecordingHooks {
    events: Mutex<Vec<HookEvent>>,
}

impl RecordingHooks {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<HookEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn restarts(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, HookEvent::Restart(_)))
            .count()
    }
}

impl ClientHooks for RecordingHooks {
    fn restart(&self, reason: RestartReason) {
        self.events.lock().unwrap().push(HookEvent::Restart(reason));
    }

    fn flush_caches(&self) {
        self.events.lock().unwrap().push(HookEvent::FlushCaches);
    }

    fn alert(&self, message: &str) {
        self.events
            .lock()
            .unwrap()
            .push(HookEvent::Alert(message.to_string()));
    }
}

fn meta_response(status: StatusCode, meta: &FileMeta, body: Vec<u8>) -> Response {
    Response::builder()
        .status(status)
        .header("x-content-length", meta.size.to_string())
        .header(header::CONTENT_TYPE, meta.content_type.as_str())
        .header("x-last-modified", meta.last_modified.to_string())
        .header("x-permission", meta.perm.as_str())
        .body(Body::from(body))
        .unwrap()
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not found").into_response()
}

async fn handle(
    State(state): State<Arc<ServerState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    if path == "/login" {
        state.login_hits.fetch_add(1, Ordering::SeqCst);
        return (StatusCode::OK, "Please log in").into_response();
    }

    *state.last_headers.lock().unwrap() = Some(headers.clone());

    if state.reject_all.load(Ordering::SeqCst) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if state.redirect_all.load(Ordering::SeqCst) {
        return Redirect::to("/login").into_response();
    }
    if state.bare_redirect.load(Ordering::SeqCst) {
        return Response::builder()
            .status(StatusCode::FOUND)
            .header("x-content-length", "5")
            .header("x-last-modified", "1700000000000")
            .header("x-permission", "ro")
            .body(Body::empty())
            .unwrap();
    }
    if let Some(required) = &state.required_cookie {
        let cookie = headers.get(header::COOKIE).and_then(|v| v.to_str().ok());
        if cookie != Some(required.as_str()) {
            return StatusCode::UNAUTHORIZED.into_response();
        }
    }

    let Some(rel) = path.strip_prefix(PREFIX) else {
        return not_found();
    };
    let rel = rel.trim_start_matches('/');

    if rel.is_empty() {
        if method != Method::GET {
            return StatusCode::METHOD_NOT_ALLOWED.into_response();
        }
        let files = state.space.fetch_file_list().await.unwrap();
        let space_path = state.space_path.lock().unwrap().clone();
        return Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-space-path", space_path)
            .body(Body::from(serde_json::to_vec(&files).unwrap()))
            .unwrap();
    }

    let name = urlencoding::decode(rel).unwrap().into_owned();

    let fail_with = *state.fail_with.lock().unwrap();
    if let Some(status) = fail_with {
        return (status, "boom").into_response();
    }

    match method {
        Method::GET => match state.space.read_file(&name, Encoding::Binary).await {
            Ok(content) => {
                let FileData::Binary(bytes) = content.data else {
                    unreachable!("binary read")
                };
                meta_response(StatusCode::OK, &content.meta, bytes)
            }
            Err(SpaceError::NotFound(_)) => not_found(),
            Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
        },
        Method::PUT => {
            let last_modified = headers
                .get("x-last-modified")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<i64>().ok());
            match state
                .space
                .write_file(&name, FileData::Binary(body.to_vec()), last_modified)
                .await
            {
                Ok(meta) => meta_response(StatusCode::OK, &meta, Vec::new()),
                Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
            }
        }
        Method::DELETE => match state.space.delete_file(&name).await {
            Ok(()) => (StatusCode::OK, "OK").into_response(),
            Err(_) => not_found(),
        },
        Method::OPTIONS => match state.space.get_file_meta(&name).await {
            Ok(meta) => meta_response(StatusCode::OK, &meta, Vec::new()),
            Err(_) => not_found(),
        },
        _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
    }
}
