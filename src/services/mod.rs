// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod gist_cache;
pub mod gists;
pub mod github;
pub mod password;

pub use gist_cache::GistCache;
pub use gists::{Fetched, GistService};
pub use github::GitHubClient;
