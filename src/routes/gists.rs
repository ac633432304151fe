// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Gist endpoints, proxied to GitHub with the caller's stored token.

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::middleware::ValidatedJson;
use crate::models::gist::is_valid_gist_id;
use crate::models::{CreateGistRequest, Gist, UpdateGistRequest};
use crate::routes::auth::MessageResponse;
use crate::services::Fetched;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/gists", get(list_gists).post(create_gist))
        .route("/gists/starred", get(list_starred))
        .route(
            "/gists/{id}",
            get(get_gist).patch(update_gist).delete(delete_gist),
        )
        .route("/gists/{id}/star", put(star_gist).delete(unstar_gist))
        .route("/gists/{id}/fork", post(fork_gist))
}

#[derive(Serialize)]
pub struct StarResponse {
    pub message: String,
    pub starred: bool,
}

/// The caller's GitHub token.
async fn github_token(state: &AppState, user: &AuthUser) -> Result<String> {
    let account = state
        .db
        .find_by_id(&user.account_id)
        .await?
        .ok_or(AppError::Unauthorized)?;
    account
        .github_token()
        .map(str::to_string)
        .ok_or(AppError::NoToken)
}

fn check_gist_id(id: &str) -> Result<()> {
    if is_valid_gist_id(id) {
        Ok(())
    } else {
        Err(AppError::Validation("Invalid gist id".to_string()))
    }
}

/// Response headers for a read; stale results carry an HTTP `Warning`.
fn warning_headers<T>(fetched: &Fetched<T>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if let Some(text) = fetched.warning {
        if let Ok(value) = HeaderValue::from_str(&format!("110 - \"{}\"", text)) {
            headers.insert(header::WARNING, value);
        }
    }
    headers
}

async fn list_gists(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<(HeaderMap, Json<Vec<Gist>>)> {
    let token = github_token(&state, &user).await?;
    let fetched = state.gists.list(&user.account_id, &token).await?;
    Ok((warning_headers(&fetched), Json(fetched.value)))
}

async fn list_starred(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Gist>>> {
    let token = github_token(&state, &user).await?;
    Ok(Json(state.gists.list_starred(&user.account_id, &token).await?))
}

async fn get_gist(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<(HeaderMap, Json<Gist>)> {
    check_gist_id(&id)?;
    let token = github_token(&state, &user).await?;
    let fetched = state.gists.get(&user.account_id, &token, &id).await?;
    Ok((warning_headers(&fetched), Json(fetched.value)))
}

async fn create_gist(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(req): ValidatedJson<CreateGistRequest>,
) -> Result<(StatusCode, Json<Gist>)> {
    let token = github_token(&state, &user).await?;
    let gist = state.gists.create(&user.account_id, &token, &req).await?;
    Ok((StatusCode::CREATED, Json(gist)))
}

async fn update_gist(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<UpdateGistRequest>,
) -> Result<Json<Gist>> {
    check_gist_id(&id)?;
    let token = github_token(&state, &user).await?;
    Ok(Json(
        state.gists.update(&user.account_id, &token, &id, &req).await?,
    ))
}

async fn delete_gist(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    check_gist_id(&id)?;
    let token = github_token(&state, &user).await?;
    state.gists.delete(&user.account_id, &token, &id).await?;
    Ok(MessageResponse::new("Gist deleted"))
}

async fn star_gist(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<StarResponse>> {
    check_gist_id(&id)?;
    let token = github_token(&state, &user).await?;
    state.gists.star(&user.account_id, &token, &id).await?;
    Ok(Json(StarResponse {
        message: "Gist starred".to_string(),
        starred: true,
    }))
}

async fn unstar_gist(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<StarResponse>> {
    check_gist_id(&id)?;
    let token = github_token(&state, &user).await?;
    state.gists.unstar(&user.account_id, &token, &id).await?;
    Ok(Json(StarResponse {
        message: "Gist unstarred".to_string(),
        starred: false,
    }))
}

async fn fork_gist(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<Gist>)> {
    check_gist_id(&id)?;
    let token = github_token(&state, &user).await?;
    let fork = state.gists.fork(&user.account_id, &token, &id).await?;
    Ok((StatusCode::CREATED, Json(fork)))
}
