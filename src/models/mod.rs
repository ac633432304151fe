// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod account;
pub mod gist;

pub use account::{Account, AccountResponse, SessionResponse};
pub use gist::{CreateGistRequest, Gist, GistFile, UpdateGistRequest};
