// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session tokens, the session cookie, and the JWT authentication middleware.

use crate::error::AppError;
use crate::time_utils::unix_now;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Name of the HTTP-only session cookie.
pub const SESSION_COOKIE: &str = "auth_token";

/// Session lifetime: 7 days.
pub const SESSION_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (account ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// Authenticated account extracted from the session token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub account_id: String,
}

/// Middleware that requires a valid session.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    // Try cookie first, then header
    let token = if let Some(cookie) = jar.get(SESSION_COOKIE) {
        cookie.value().to_string()
    } else {
        let auth_header = request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
            Some(token) => token.trim().to_string(),
            None => return Err(AppError::Unauthorized),
        }
    };

    let account_id = verify_token(&token, &state.config.jwt_signing_key)?;
    request.extensions_mut().insert(AuthUser { account_id });

    Ok(next.run(request).await)
}

/// Create a session token for an account, valid for 7 days from now.
pub fn issue_token(account_id: &str, signing_key: &[u8]) -> anyhow::Result<String> {
    issue_token_at(account_id, signing_key, unix_now())
}

/// Create a session token as if issued at `issued_at` (Unix seconds).
pub fn issue_token_at(
    account_id: &str,
    signing_key: &[u8],
    issued_at: i64,
) -> anyhow::Result<String> {
    let claims = Claims {
        sub: account_id.to_string(),
        iat: issued_at,
        exp: issued_at + SESSION_TTL_SECS,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}

/// Verify a session token and return the account ID it names.
pub fn verify_token(token: &str, signing_key: &[u8]) -> Result<String, AppError> {
    verify_token_at(token, signing_key, unix_now())
}

/// Verify a session token against the clock value `now` (Unix seconds).
/// A token is valid while `now < exp`; there is no leeway.
pub fn verify_token_at(token: &str, signing_key: &[u8], now: i64) -> Result<String, AppError> {
    let key = DecodingKey::from_secret(signing_key);
    let mut validation = Validation::new(Algorithm::HS256);
    // Expiry is checked below against `now` so tests can move the clock.
    validation.validate_exp = false;

    let claims = decode::<Claims>(token, &key, &validation)
        .map_err(|e| {
            tracing::debug!(error = %e, "Session token rejected");
            AppError::InvalidToken
        })?
        .claims;

    if now >= claims.exp || claims.sub.is_empty() {
        return Err(AppError::InvalidToken);
    }

    Ok(claims.sub)
}

/// Session cookie carrying `token`.
pub fn session_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(time::Duration::seconds(SESSION_TTL_SECS))
        .build()
}

/// Cookie that clears the session; attributes match `session_cookie`.
pub fn removal_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(time::Duration::ZERO)
        .build()
}
