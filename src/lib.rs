// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Gist Tracker: manage your GitHub Gists behind a small account layer
//!
//! This crate provides the backend API: account registration and cookie
//! sessions, per-account GitHub tokens, and gist operations proxied to the
//! GitHub REST API through a rate-limit-aware in-memory cache.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::AccountStore;
use error::AppError;
use services::{GistCache, GistService, GitHubClient};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: AccountStore,
    pub gists: GistService,
}

impl AppState {
    /// Wire up the GitHub client and a fresh gist cache from `config`.
    pub fn new(config: Config, db: AccountStore) -> Result<Self, AppError> {
        let client = GitHubClient::new(&config.github_api_url, config.github_timeout)?;
        let gists = GistService::new(client, GistCache::new(config.gist_cache_ttl));
        Ok(Self { config, db, gists })
    }
}
