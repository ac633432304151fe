// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account registration, login and logout.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::auth::{issue_token, removal_cookie, session_cookie, AuthUser};
use crate::middleware::ValidatedJson;
use crate::models::account::{normalize_email, LoginRequest, RegisterRequest};
use crate::models::{Account, AccountResponse, SessionResponse};
use crate::services::password::{hash_password_blocking, verify_password_blocking};
use crate::time_utils::now_rfc3339;
use crate::AppState;

/// Public auth routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

/// Auth routes that need a session (auth middleware applied in routes/mod.rs).
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new().route("/auth/me", get(me))
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

/// Create an account and start a session.
async fn register(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<SessionResponse>)> {
    let email = normalize_email(&req.email);

    if state.db.find_by_email(&email).await?.is_some() {
        tracing::info!("Registration rejected: email already registered");
        return Err(AppError::Conflict("User already exists".to_string()));
    }

    let password_hash = hash_password_blocking(req.password).await?;
    let now = now_rfc3339();
    let account = Account {
        id: uuid::Uuid::new_v4().to_string(),
        name: req.name.trim().to_string(),
        email,
        password_hash,
        bio: None,
        avatar_url: None,
        github_token: None,
        created_at: now.clone(),
        updated_at: now,
    };

    // The UNIQUE constraint catches a concurrent registration of the same email.
    state.db.create(&account).await?;
    tracing::info!(account_id = %account.id, "Account registered");

    let jar = start_session(&state, jar, &account)?;
    Ok((
        StatusCode::CREATED,
        jar,
        Json(SessionResponse {
            user: AccountResponse::from(&account),
        }),
    ))
}

/// Check credentials and start a session.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    let email = normalize_email(&req.email);

    let Some(account) = state.db.find_by_email(&email).await? else {
        tracing::info!("Login failed: unknown email");
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password_blocking(req.password, account.password_hash.clone()).await {
        tracing::info!(account_id = %account.id, "Login failed: wrong password");
        return Err(AppError::InvalidCredentials);
    }

    tracing::info!(account_id = %account.id, "Login successful");
    let jar = start_session(&state, jar, &account)?;
    Ok((
        jar,
        Json(SessionResponse {
            user: AccountResponse::from(&account),
        }),
    ))
}

/// End the session by expiring the cookie. Tokens are stateless, so there
/// is nothing to revoke server-side.
async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    (
        jar.add(removal_cookie(state.config.is_production)),
        MessageResponse::new("Logged out successfully"),
    )
}

/// Current account.
async fn me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<SessionResponse>> {
    let account = state
        .db
        .find_by_id(&user.account_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(SessionResponse {
        user: AccountResponse::from(&account),
    }))
}

fn start_session(state: &AppState, jar: CookieJar, account: &Account) -> Result<CookieJar> {
    let token = issue_token(&account.id, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;
    Ok(jar.add(session_cookie(token, state.config.is_production)))
}
