// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile update and account deletion.

use axum::{extract::State, routing::patch, Extension, Json, Router};
use axum_extra::extract::cookie::CookieJar;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::auth::{removal_cookie, AuthUser};
use crate::middleware::ValidatedJson;
use crate::models::account::{normalize_email, UpdateProfileRequest};
use crate::models::{AccountResponse, SessionResponse};
use crate::routes::auth::MessageResponse;
use crate::time_utils::now_rfc3339;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/profile", patch(update_profile).delete(delete_account))
}

/// Empty strings clear optional profile fields.
fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(req): ValidatedJson<UpdateProfileRequest>,
) -> Result<Json<SessionResponse>> {
    let mut account = state
        .db
        .find_by_id(&user.account_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if let Some(email) = req.email {
        let email = normalize_email(&email);
        if email != account.email {
            if state.db.find_by_email(&email).await?.is_some() {
                return Err(AppError::Conflict("Email already in use".to_string()));
            }
            account.email = email;
        }
    }
    if let Some(name) = req.name {
        account.name = name.trim().to_string();
    }
    if let Some(bio) = req.bio {
        account.bio = non_empty(bio);
    }
    if let Some(avatar_url) = req.avatar_url {
        account.avatar_url = non_empty(avatar_url);
    }

    let mut token_changed = false;
    if let Some(token) = req.github_token {
        let token = non_empty(token);
        token_changed = token != account.github_token;
        account.github_token = token;
    }

    account.updated_at = now_rfc3339();
    state.db.update(&account).await?;

    // Cached gists belong to whichever GitHub user the old token named.
    if token_changed {
        state.gists.forget_account(&account.id);
        tracing::info!(account_id = %account.id, "GitHub token changed, gist cache dropped");
    }

    Ok(Json(SessionResponse {
        user: AccountResponse::from(&account),
    }))
}

async fn delete_account(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<MessageResponse>)> {
    if !state.db.delete(&user.account_id).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }
    state.gists.forget_account(&user.account_id);
    tracing::info!(account_id = %user.account_id, "Account deleted");

    Ok((
        jar.add(removal_cookie(state.config.is_production)),
        MessageResponse::new("Account deleted"),
    ))
}
