// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! GitHub Gist API client.
//!
//! Stateless: every call takes the account's personal access token.
//! Handles:
//! - Gist listing, fetching and mutation
//! - Star status probing (204 = starred, 404 = not starred)
//! - Rate limit detection (for the stale-cache fallback)
//! - Request timeouts

use crate::error::AppError;
use crate::models::{CreateGistRequest, Gist, UpdateGistRequest};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";
const CLIENT_USER_AGENT: &str = "gist-tracker";
/// Upstream error bodies are cut to this many characters in error messages.
const MAX_ERROR_BODY: usize = 512;

/// GitHub API client.
#[derive(Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    base_url: String,
}

impl GitHubClient {
    /// Create a client for `base_url` whose calls abort after `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AppError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("HTTP client init failed: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// List the authenticated user's gists.
    pub async fn list_gists(&self, token: &str) -> Result<Vec<Gist>, AppError> {
        self.send_json(self.request(Method::GET, "/gists", token)).await
    }

    /// List gists the authenticated user has starred.
    pub async fn list_starred_gists(&self, token: &str) -> Result<Vec<Gist>, AppError> {
        self.send_json(self.request(Method::GET, "/gists/starred", token))
            .await
    }

    /// Get a single gist.
    pub async fn get_gist(&self, token: &str, gist_id: &str) -> Result<Gist, AppError> {
        let path = format!("/gists/{}", gist_id);
        self.send_json(self.request(Method::GET, &path, token)).await
    }

    pub async fn create_gist(
        &self,
        token: &str,
        params: &CreateGistRequest,
    ) -> Result<Gist, AppError> {
        self.send_json(self.request(Method::POST, "/gists", token).json(params))
            .await
    }

    pub async fn update_gist(
        &self,
        token: &str,
        gist_id: &str,
        params: &UpdateGistRequest,
    ) -> Result<Gist, AppError> {
        let path = format!("/gists/{}", gist_id);
        self.send_json(self.request(Method::PATCH, &path, token).json(params))
            .await
    }

    pub async fn delete_gist(&self, token: &str, gist_id: &str) -> Result<(), AppError> {
        let path = format!("/gists/{}", gist_id);
        self.send(self.request(Method::DELETE, &path, token)).await?;
        Ok(())
    }

    pub async fn star_gist(&self, token: &str, gist_id: &str) -> Result<(), AppError> {
        let path = format!("/gists/{}/star", gist_id);
        // GitHub wants an explicit zero length on bodiless PUTs.
        self.send(
            self.request(Method::PUT, &path, token)
                .header(reqwest::header::CONTENT_LENGTH, "0"),
        )
        .await?;
        Ok(())
    }

    pub async fn unstar_gist(&self, token: &str, gist_id: &str) -> Result<(), AppError> {
        let path = format!("/gists/{}/star", gist_id);
        self.send(self.request(Method::DELETE, &path, token)).await?;
        Ok(())
    }

    /// Fork a gist into the authenticated user's account.
    pub async fn fork_gist(&self, token: &str, gist_id: &str) -> Result<Gist, AppError> {
        let path = format!("/gists/{}/forks", gist_id);
        self.send_json(self.request(Method::POST, &path, token)).await
    }

    /// Probe star status. Only 204 counts as starred; 404 and every other
    /// outcome (including transport failures) count as not starred.
    pub async fn is_starred(&self, token: &str, gist_id: &str) -> bool {
        let path = format!("/gists/{}/star", gist_id);
        match self.request(Method::GET, &path, token).send().await {
            Ok(response) => match response.status() {
                StatusCode::NO_CONTENT => true,
                StatusCode::NOT_FOUND => false,
                other => {
                    tracing::debug!(gist_id, status = %other, "Unexpected star-check status");
                    false
                }
            },
            Err(e) => {
                tracing::debug!(gist_id, error = %e, "Star check failed");
                false
            }
        }
    }

    /// Fetch raw file content (used for files GitHub truncated).
    pub async fn fetch_raw(&self, raw_url: &str) -> Result<String, AppError> {
        let response = self.send(self.http.get(raw_url)).await?;
        response
            .text()
            .await
            .map_err(|e| transport_error("Failed to read raw content", e))
    }

    fn request(&self, method: Method, path: &str, token: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .header(AUTHORIZATION, format!("token {}", token))
    }

    /// Send a request and check the response status.
    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response, AppError> {
        let response = request
            .send()
            .await
            .map_err(|e| transport_error("GitHub request failed", e))?;
        self.check_response(response).await
    }

    /// Send a request and parse the JSON body.
    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, AppError> {
        self.send(request)
            .await?
            .json()
            .await
            .map_err(|e| transport_error("JSON parse error", e))
    }

    /// Check response status and return error if not successful.
    async fn check_response(
        &self,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, AppError> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let remaining = response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.text().await.unwrap_or_default();
        let message = truncate(&body, MAX_ERROR_BODY);

        if is_rate_limited(status, remaining.as_deref(), &body) {
            tracing::warn!(status = %status, "GitHub rate limit hit");
            return Err(AppError::RateLimited {
                status: status.as_u16(),
                message,
            });
        }

        Err(AppError::Upstream {
            status: status.as_u16(),
            message,
        })
    }
}

/// GitHub signals an exhausted quota with 429, or with 403 plus either a
/// zero `x-ratelimit-remaining` header or a "rate limit" message.
pub fn is_rate_limited(status: StatusCode, remaining: Option<&str>, body: &str) -> bool {
    match status {
        StatusCode::TOO_MANY_REQUESTS => true,
        StatusCode::FORBIDDEN => {
            remaining.map(str::trim) == Some("0") || body.to_lowercase().contains("rate limit")
        }
        _ => false,
    }
}

fn transport_error(context: &str, err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        tracing::warn!(error = %err, "GitHub request timed out");
        return AppError::Timeout;
    }
    AppError::Upstream {
        status: StatusCode::BAD_GATEWAY.as_u16(),
        message: format!("{}: {}", context, err),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &text[..idx]),
        None => text.to_string(),
    }
}
