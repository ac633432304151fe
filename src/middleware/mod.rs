// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Middleware modules (authentication, security headers, request extraction).

pub mod auth;
pub mod extract;
pub mod security;

pub use auth::{require_auth, AuthUser};
pub use extract::ValidatedJson;
