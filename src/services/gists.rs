// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Gist service: GitHub calls routed through the per-account cache.
//!
//! Reads are served from fresh cache entries when possible. When GitHub
//! rate-limits a live read, the last cached copy is returned instead,
//! whatever its age, together with a warning. Writes go straight to GitHub
//! and the cache is updated only after GitHub accepted them.

use crate::error::AppError;
use crate::models::{CreateGistRequest, Gist, UpdateGistRequest};
use crate::services::gist_cache::GistCache;
use crate::services::github::GitHubClient;

/// Warning attached to results served from stale cache.
pub const STALE_CACHE_WARNING: &str = "Using cached data due to GitHub API rate limits";

/// A read result, possibly served from stale cache.
#[derive(Debug, Clone)]
pub struct Fetched<T> {
    pub value: T,
    /// Set when the value is a stale copy served because of rate limiting.
    pub warning: Option<&'static str>,
}

impl<T> Fetched<T> {
    fn live(value: T) -> Self {
        Self {
            value,
            warning: None,
        }
    }

    fn stale(value: T) -> Self {
        Self {
            value,
            warning: Some(STALE_CACHE_WARNING),
        }
    }

    pub fn is_stale(&self) -> bool {
        self.warning.is_some()
    }
}

/// High-level gist operations for one running instance.
pub struct GistService {
    client: GitHubClient,
    cache: GistCache,
}

impl GistService {
    pub fn new(client: GitHubClient, cache: GistCache) -> Self {
        Self { client, cache }
    }

    pub fn cache(&self) -> &GistCache {
        &self.cache
    }

    // ─── Reads ───────────────────────────────────────────────────────────────

    /// The account's gists.
    pub async fn list(
        &self,
        account_id: &str,
        token: &str,
    ) -> Result<Fetched<Vec<Gist>>, AppError> {
        if let Some(gists) = self.cache.fresh_list(account_id) {
            tracing::debug!(account_id, count = gists.len(), "Gist list served from cache");
            return Ok(Fetched::live(gists));
        }

        match self.client.list_gists(token).await {
            Ok(gists) => {
                let gists = self.cache.store_list(account_id, gists);
                tracing::debug!(account_id, count = gists.len(), "Gist list fetched");
                Ok(Fetched::live(gists))
            }
            Err(err) if err.is_rate_limited() => match self.cache.any_list(account_id) {
                Some(gists) => {
                    tracing::warn!(account_id, "Rate limited, serving cached gist list");
                    Ok(Fetched::stale(gists))
                }
                None => Err(err),
            },
            Err(err) => Err(err),
        }
    }

    /// A single gist with full file content and its star status.
    pub async fn get(
        &self,
        account_id: &str,
        token: &str,
        gist_id: &str,
    ) -> Result<Fetched<Gist>, AppError> {
        if let Some(gist) = self.cache.fresh_gist(account_id, gist_id) {
            tracing::debug!(account_id, gist_id, "Gist served from cache");
            return Ok(Fetched::live(gist));
        }

        let mut gist = match self.client.get_gist(token, gist_id).await {
            Ok(gist) => gist,
            Err(err) if err.is_rate_limited() => {
                return match self.cache.any_gist(account_id, gist_id) {
                    Some(gist) => {
                        tracing::warn!(account_id, gist_id, "Rate limited, serving cached gist");
                        Ok(Fetched::stale(gist))
                    }
                    None => Err(err),
                };
            }
            Err(err) => return Err(err),
        };

        self.fill_truncated_files(&mut gist).await;
        gist.starred = self.client.is_starred(token, gist_id).await;
        self.cache.store_gist(account_id, gist.clone());
        Ok(Fetched::live(gist))
    }

    /// Gists the account has starred. Not cached, but the star flags it
    /// reveals are recorded.
    pub async fn list_starred(&self, account_id: &str, token: &str) -> Result<Vec<Gist>, AppError> {
        let mut gists = self.client.list_starred_gists(token).await?;
        for gist in &mut gists {
            gist.starred = true;
            self.cache.record_starred(account_id, &gist.id, true);
        }
        Ok(gists)
    }

    // ─── Writes ──────────────────────────────────────────────────────────────

    /// Create a gist. A new gist is never starred.
    pub async fn create(
        &self,
        account_id: &str,
        token: &str,
        params: &CreateGistRequest,
    ) -> Result<Gist, AppError> {
        let mut gist = self.client.create_gist(token, params).await?;
        gist.starred = false;
        self.cache.record_created(account_id, gist.clone());
        tracing::info!(account_id, gist_id = %gist.id, "Gist created");
        Ok(gist)
    }

    /// Edit a gist, keeping its star status.
    pub async fn update(
        &self,
        account_id: &str,
        token: &str,
        gist_id: &str,
        params: &UpdateGistRequest,
    ) -> Result<Gist, AppError> {
        let mut gist = self.client.update_gist(token, gist_id, params).await?;
        gist.starred = match self.cache.known_star(account_id, gist_id) {
            Some(starred) => starred,
            None => self.client.is_starred(token, gist_id).await,
        };
        self.cache.record_updated(account_id, gist.clone());
        tracing::info!(account_id, gist_id, "Gist updated");
        Ok(gist)
    }

    pub async fn delete(
        &self,
        account_id: &str,
        token: &str,
        gist_id: &str,
    ) -> Result<(), AppError> {
        self.client.delete_gist(token, gist_id).await?;
        self.cache.record_deleted(account_id, gist_id);
        tracing::info!(account_id, gist_id, "Gist deleted");
        Ok(())
    }

    /// Star a gist. Starring an already starred gist is a no-op upstream.
    pub async fn star(&self, account_id: &str, token: &str, gist_id: &str) -> Result<(), AppError> {
        self.client.star_gist(token, gist_id).await?;
        self.cache.record_starred(account_id, gist_id, true);
        Ok(())
    }

    pub async fn unstar(
        &self,
        account_id: &str,
        token: &str,
        gist_id: &str,
    ) -> Result<(), AppError> {
        self.client.unstar_gist(token, gist_id).await?;
        self.cache.record_starred(account_id, gist_id, false);
        Ok(())
    }

    /// Fork someone's gist into the account. The fork starts unstarred.
    pub async fn fork(
        &self,
        account_id: &str,
        token: &str,
        gist_id: &str,
    ) -> Result<Gist, AppError> {
        let mut fork = self.client.fork_gist(token, gist_id).await?;
        fork.starred = false;
        self.cache.record_created(account_id, fork.clone());
        tracing::info!(account_id, source = gist_id, gist_id = %fork.id, "Gist forked");
        Ok(fork)
    }

    /// Drop cached data for an account (token changed or account deleted).
    pub fn forget_account(&self, account_id: &str) {
        self.cache.forget_account(account_id);
    }

    /// Best-effort: files GitHub truncated are completed from `raw_url`.
    async fn fill_truncated_files(&self, gist: &mut Gist) {
        for (filename, file) in gist.files.iter_mut() {
            if !file.needs_content() {
                continue;
            }
            let Some(raw_url) = file.raw_url.as_deref() else {
                continue;
            };
            match self.client.fetch_raw(raw_url).await {
                Ok(content) => {
                    file.content = Some(content);
                    file.truncated = false;
                }
                Err(e) => {
                    tracing::warn!(
                        gist_id = %gist.id,
                        filename = %filename,
                        error = %e,
                        "Failed to fetch file content"
                    );
                }
            }
        }
    }
}
