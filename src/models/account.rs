// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account model for storage and API.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Account record stored in the `accounts` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Account {
    /// UUID v4 (also the session token subject)
    pub id: String,
    pub name: String,
    /// Lower-cased, unique
    pub email: String,
    /// Argon2id PHC string
    pub password_hash: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    /// Personal access token used for GitHub calls
    pub github_token: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Account {
    /// The GitHub token, if one has been configured.
    pub fn github_token(&self) -> Option<&str> {
        self.github_token.as_deref().filter(|t| !t.is_empty())
    }
}

/// Emails are compared case-insensitively.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Account as returned to clients. Never carries the password hash or token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AccountResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub bio: Option<String>,
    pub avatar_url: Option<String>,
    pub has_github_token: bool,
    pub created_at: String,
}

impl From<&Account> for AccountResponse {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id.clone(),
            name: account.name.clone(),
            email: account.email.clone(),
            bio: account.bio.clone(),
            avatar_url: account.avatar_url.clone(),
            has_github_token: account.github_token().is_some(),
            created_at: account.created_at.clone(),
        }
    }
}

/// `{ "user": ... }` envelope used by the auth endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub user: AccountResponse,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(custom(function = "validate_name"))]
    pub name: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Partial profile update. Absent fields are left untouched; an empty
/// `bio` or `githubToken` clears the stored value.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(custom(function = "validate_name"))]
    pub name: Option<String>,
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    #[validate(length(max = 200, message = "Bio cannot be more than 200 characters"))]
    pub bio: Option<String>,
    #[validate(custom(function = "validate_avatar_url"))]
    pub avatar_url: Option<String>,
    pub github_token: Option<String>,
}

/// Names are stored trimmed, so the trimmed form must be 1-60 characters.
fn validate_name(name: &str) -> Result<(), ValidationError> {
    let len = name.trim().chars().count();
    if (1..=60).contains(&len) {
        return Ok(());
    }
    Err(ValidationError::new("name").with_message("Name must be 1-60 characters".into()))
}

/// Avatar must be an http(s) URL, or empty to clear it.
fn validate_avatar_url(url: &str) -> Result<(), ValidationError> {
    let url = url.trim();
    if url.is_empty() || url.starts_with("https://") || url.starts_with("http://") {
        return Ok(());
    }
    Err(ValidationError::new("avatar_url").with_message("Avatar must be a URL".into()))
}
