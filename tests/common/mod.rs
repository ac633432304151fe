// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared test helpers: an in-process fake of the GitHub Gist API and
//! builders for the app wired against it.

#![allow(dead_code)]

use axum::{
    body::Body,
    extract::{Path, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use gist_tracker::config::Config;
use gist_tracker::db::AccountStore;
use gist_tracker::routes::create_router;
use gist_tracker::AppState;
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

/// Gist id whose GET never answers within a test timeout.
pub const SLOW_GIST_ID: &str = "slowgist";

pub const TEST_PASSWORD: &str = "correct horse battery";

/// Recorded state of the fake GitHub.
#[derive(Default)]
pub struct FakeState {
    pub base_url: String,
    pub gists: Mutex<BTreeMap<String, Value>>,
    pub starred: Mutex<HashSet<String>>,
    /// Full file contents served from `raw_url`, keyed by "id/filename".
    pub raw: Mutex<HashMap<String, String>>,
    pub list_calls: AtomicUsize,
    pub get_calls: AtomicUsize,
    pub star_checks: AtomicUsize,
    pub raw_fetches: AtomicUsize,
    pub rate_limited: AtomicBool,
    next_id: AtomicUsize,
}

/// Fake GitHub API listening on a random local port.
pub struct FakeGitHub {
    pub base_url: String,
    pub state: Arc<FakeState>,
}

impl FakeGitHub {
    pub async fn start() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let state = Arc::new(FakeState {
            base_url: base_url.clone(),
            ..Default::default()
        });

        let api = Router::new()
            .route("/gists", get(list_gists).post(create_gist))
            .route("/gists/starred", get(list_starred))
            .route(
                "/gists/{id}",
                get(get_gist).patch(update_gist).delete(delete_gist),
            )
            .route(
                "/gists/{id}/star",
                get(check_star).put(put_star).delete(delete_star),
            )
            .route("/gists/{id}/forks", post(fork_gist))
            .layer(middleware::from_fn_with_state(state.clone(), github_gate));

        let app = Router::new()
            .merge(api)
            .route("/raw/{id}/{filename}", get(raw_file))
            .with_state(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, state }
    }

    /// Add a gist owned by the test user.
    pub fn seed_gist(&self, id: &str, description: &str, files: &[(&str, &str)]) {
        let mut file_map = Map::new();
        for (name, content) in files {
            file_map.insert(name.to_string(), file_json(&self.base_url, id, name, content));
            self.state
                .raw
                .lock()
                .unwrap()
                .insert(format!("{id}/{name}"), content.to_string());
        }
        let gist = gist_json(id, Some(description), true, file_map);
        self.state.gists.lock().unwrap().insert(id.to_string(), gist);
    }

    /// Add a gist whose single file GitHub reports as truncated.
    pub fn seed_truncated_gist(&self, id: &str, filename: &str, full_content: &str) {
        let mut file = file_json(&self.base_url, id, filename, full_content);
        file["content"] = json!(&full_content[..full_content.len() / 2]);
        file["truncated"] = json!(true);
        let mut file_map = Map::new();
        file_map.insert(filename.to_string(), file);
        self.state
            .raw
            .lock()
            .unwrap()
            .insert(format!("{id}/{filename}"), full_content.to_string());
        let gist = gist_json(id, Some("big"), true, file_map);
        self.state.gists.lock().unwrap().insert(id.to_string(), gist);
    }

    pub fn star(&self, id: &str) {
        self.state.starred.lock().unwrap().insert(id.to_string());
    }

    pub fn is_starred(&self, id: &str) -> bool {
        self.state.starred.lock().unwrap().contains(id)
    }

    pub fn has_gist(&self, id: &str) -> bool {
        self.state.gists.lock().unwrap().contains_key(id)
    }

    pub fn set_rate_limited(&self, limited: bool) {
        self.state.rate_limited.store(limited, Ordering::SeqCst);
    }

    pub fn list_calls(&self) -> usize {
        self.state.list_calls.load(Ordering::SeqCst)
    }

    pub fn get_calls(&self) -> usize {
        self.state.get_calls.load(Ordering::SeqCst)
    }

    pub fn star_checks(&self) -> usize {
        self.state.star_checks.load(Ordering::SeqCst)
    }

    pub fn raw_fetches(&self) -> usize {
        self.state.raw_fetches.load(Ordering::SeqCst)
    }
}

fn file_json(base_url: &str, id: &str, name: &str, content: &str) -> Value {
    json!({
        "filename": name,
        "type": "text/plain",
        "language": "Text",
        "raw_url": format!("{base_url}/raw/{id}/{name}"),
        "size": content.len(),
        "truncated": false,
        "content": content,
    })
}

fn gist_json(
    id: &str,
    description: Option<&str>,
    public: bool,
    files: Map<String, Value>,
) -> Value {
    json!({
        "id": id,
        "description": description,
        "public": public,
        "files": files,
        "created_at": "2026-01-01T00:00:00Z",
        "updated_at": "2026-01-01T00:00:00Z",
        "owner": { "login": "octocat", "id": 1 },
        "html_url": format!("https://gist.github.com/{id}"),
        "comments": 0,
    })
}

fn github_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

/// Authentication and rate limiting, applied to every API route.
async fn github_gate(
    State(state): State<Arc<FakeState>>,
    request: Request,
    next: Next,
) -> Response {
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("token ") && v.len() > "token ".len());
    if !authorized {
        return github_error(StatusCode::UNAUTHORIZED, "Requires authentication");
    }

    if state.rate_limited.load(Ordering::SeqCst) {
        let mut response = github_error(StatusCode::FORBIDDEN, "API rate limit exceeded");
        response
            .headers_mut()
            .insert("x-ratelimit-remaining", "0".parse().unwrap());
        return response;
    }

    next.run(request).await
}

async fn list_gists(State(state): State<Arc<FakeState>>) -> Json<Vec<Value>> {
    state.list_calls.fetch_add(1, Ordering::SeqCst);
    let gists = state.gists.lock().unwrap();
    // The list endpoint never includes file content.
    let list = gists
        .values()
        .map(|gist| {
            let mut gist = gist.clone();
            if let Some(files) = gist["files"].as_object_mut() {
                for file in files.values_mut() {
                    if let Some(file) = file.as_object_mut() {
                        file.remove("content");
                        file.remove("truncated");
                    }
                }
            }
            gist
        })
        .collect();
    Json(list)
}

async fn list_starred(State(state): State<Arc<FakeState>>) -> Json<Vec<Value>> {
    let starred = state.starred.lock().unwrap().clone();
    let gists = state.gists.lock().unwrap();
    Json(
        gists
            .iter()
            .filter(|(id, _)| starred.contains(*id))
            .map(|(_, gist)| gist.clone())
            .collect(),
    )
}

async fn get_gist(State(state): State<Arc<FakeState>>, Path(id): Path<String>) -> Response {
    state.get_calls.fetch_add(1, Ordering::SeqCst);
    if id == SLOW_GIST_ID {
        tokio::time::sleep(Duration::from_secs(5)).await;
    }
    match state.gists.lock().unwrap().get(&id) {
        Some(gist) => Json(gist.clone()).into_response(),
        None => github_error(StatusCode::NOT_FOUND, "Not Found"),
    }
}

async fn create_gist(State(state): State<Arc<FakeState>>, Json(body): Json<Value>) -> Response {
    let n = state.next_id.fetch_add(1, Ordering::SeqCst) + 1;
    let id = format!("created{n}");
    let mut files = Map::new();
    if let Some(requested) = body["files"].as_object() {
        for (name, file) in requested {
            let content = file["content"].as_str().unwrap_or_default();
            files.insert(name.clone(), file_json(&state.base_url, &id, name, content));
            state
                .raw
                .lock()
                .unwrap()
                .insert(format!("{id}/{name}"), content.to_string());
        }
    }
    let gist = gist_json(
        &id,
        body["description"].as_str(),
        body["public"].as_bool().unwrap_or(false),
        files,
    );
    state.gists.lock().unwrap().insert(id, gist.clone());
    (StatusCode::CREATED, Json(gist)).into_response()
}

async fn update_gist(
    State(state): State<Arc<FakeState>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut gists = state.gists.lock().unwrap();
    let Some(gist) = gists.get_mut(&id) else {
        return github_error(StatusCode::NOT_FOUND, "Not Found");
    };

    if let Some(description) = body.get("description") {
        gist["description"] = description.clone();
    }
    if let Some(changes) = body["files"].as_object() {
        for (name, change) in changes {
            let files = gist["files"].as_object_mut().unwrap();
            if change.is_null() {
                files.remove(name);
                continue;
            }
            let target = change["filename"].as_str().unwrap_or(name).to_string();
            let content = change["content"]
                .as_str()
                .map(str::to_string)
                .or_else(|| files.get(name).and_then(|f| f["content"].as_str()).map(str::to_string))
                .unwrap_or_default();
            files.remove(name);
            files.insert(target.clone(), file_json(&state.base_url, &id, &target, &content));
        }
    }
    gist["updated_at"] = json!("2026-02-01T00:00:00Z");
    Json(gist.clone()).into_response()
}

async fn delete_gist(State(state): State<Arc<FakeState>>, Path(id): Path<String>) -> StatusCode {
    match state.gists.lock().unwrap().remove(&id) {
        Some(_) => StatusCode::NO_CONTENT,
        None => StatusCode::NOT_FOUND,
    }
}

async fn check_star(State(state): State<Arc<FakeState>>, Path(id): Path<String>) -> StatusCode {
    state.star_checks.fetch_add(1, Ordering::SeqCst);
    if state.starred.lock().unwrap().contains(&id) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

async fn put_star(State(state): State<Arc<FakeState>>, Path(id): Path<String>) -> Response {
    if !state.gists.lock().unwrap().contains_key(&id) {
        return github_error(StatusCode::NOT_FOUND, "Not Found");
    }
    state.starred.lock().unwrap().insert(id);
    StatusCode::NO_CONTENT.into_response()
}

async fn delete_star(State(state): State<Arc<FakeState>>, Path(id): Path<String>) -> StatusCode {
    state.starred.lock().unwrap().remove(&id);
    StatusCode::NO_CONTENT
}

async fn fork_gist(State(state): State<Arc<FakeState>>, Path(id): Path<String>) -> Response {
    let mut gists = state.gists.lock().unwrap();
    let Some(source) = gists.get(&id).cloned() else {
        return github_error(StatusCode::NOT_FOUND, "Not Found");
    };
    let n = state.next_id.fetch_add(1, Ordering::SeqCst) + 1;
    let fork_id = format!("fork{n}");
    let mut fork = source;
    fork["id"] = json!(fork_id);
    fork["html_url"] = json!(format!("https://gist.github.com/{fork_id}"));
    gists.insert(fork_id, fork.clone());
    (StatusCode::CREATED, Json(fork)).into_response()
}

async fn raw_file(
    State(state): State<Arc<FakeState>>,
    Path((id, filename)): Path<(String, String)>,
) -> Response {
    state.raw_fetches.fetch_add(1, Ordering::SeqCst);
    match state.raw.lock().unwrap().get(&format!("{id}/{filename}")) {
        Some(content) => content.clone().into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

// ─── App builders ────────────────────────────────────────────────────────────

/// Test config pointed at `github_url`.
pub fn test_config(github_url: &str) -> Config {
    Config {
        github_api_url: github_url.to_string(),
        github_timeout: Duration::from_secs(2),
        ..Config::test_default()
    }
}

/// App against the fake GitHub, with an empty in-memory database.
pub async fn create_test_app(github: &FakeGitHub) -> (Router, Arc<AppState>) {
    create_test_app_with(test_config(&github.base_url)).await
}

pub async fn create_test_app_with(config: Config) -> (Router, Arc<AppState>) {
    let db = AccountStore::in_memory().await.unwrap();
    let state = Arc::new(AppState::new(config, db).unwrap());
    (create_router(state.clone()), state)
}

// ─── Request helpers ─────────────────────────────────────────────────────────

/// Send a request, optionally with a session cookie and JSON body.
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    app.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// All Set-Cookie header values on a response.
pub fn set_cookies(response: &Response) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

/// `name=value` of the session cookie set by `response`, ready for a Cookie header.
pub fn session_cookie(response: &Response) -> String {
    set_cookies(response)
        .into_iter()
        .find(|c| c.starts_with("auth_token="))
        .and_then(|c| c.split(';').next().map(str::to_string))
        .expect("response did not set a session cookie")
}

/// Register an account and return its session cookie.
pub async fn register(app: &Router, email: &str) -> String {
    let response = send(
        app,
        "POST",
        "/auth/register",
        None,
        Some(json!({ "name": "Test User", "email": email, "password": TEST_PASSWORD })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    session_cookie(&response)
}

/// Register an account and store a GitHub token on it.
pub async fn register_with_token(app: &Router, email: &str) -> String {
    let cookie = register(app, email).await;
    let response = send(
        app,
        "PATCH",
        "/profile",
        Some(&cookie),
        Some(json!({ "githubToken": "ghp_testtoken" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    cookie
}
