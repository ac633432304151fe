// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Gist payloads exchanged with GitHub and with our clients.
//!
//! GitHub's gist object is passed through mostly untouched: the fields we
//! act on are typed, anything else is kept in `extra` so clients still see
//! it. `starred` is ours; GitHub never sends it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Gist {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub files: BTreeMap<String, GistFile>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub owner: Option<GistOwner>,
    #[serde(default)]
    pub html_url: Option<String>,
    /// Whether the requesting account has starred this gist.
    #[serde(default)]
    pub starred: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GistFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// GitHub omits content beyond ~1 MB and sets this flag.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub truncated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl GistFile {
    /// Content must be fetched separately from `raw_url`.
    pub fn needs_content(&self) -> bool {
        self.raw_url.is_some() && (self.truncated || self.content.is_none())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GistOwner {
    pub login: String,
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

/// Body of `POST /gists`, forwarded to GitHub as-is.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateGistRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub public: bool,
    #[validate(custom(function = "validate_new_files"))]
    pub files: BTreeMap<String, NewGistFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewGistFile {
    pub content: String,
}

/// Body of `PATCH /gists/{id}`. A `null` file entry deletes that file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateGistRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    #[validate(custom(function = "validate_file_updates"))]
    pub files: BTreeMap<String, Option<GistFileUpdate>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GistFileUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// New name for the file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
}

fn validate_new_files(files: &BTreeMap<String, NewGistFile>) -> Result<(), ValidationError> {
    if files.is_empty() {
        return Err(ValidationError::new("files")
            .with_message("A gist needs at least one file".into()));
    }
    for (name, file) in files {
        if name.trim().is_empty() {
            return Err(ValidationError::new("files")
                .with_message("File names cannot be empty".into()));
        }
        if file.content.trim().is_empty() {
            return Err(ValidationError::new("files")
                .with_message(format!("File '{}' has no content", name).into()));
        }
    }
    Ok(())
}

fn validate_file_updates(
    files: &BTreeMap<String, Option<GistFileUpdate>>,
) -> Result<(), ValidationError> {
    if files.keys().any(|name| name.trim().is_empty()) {
        return Err(ValidationError::new("files")
            .with_message("File names cannot be empty".into()));
    }
    Ok(())
}

/// GitHub gist ids are hex strings; anything else never reaches the upstream URL.
pub fn is_valid_gist_id(id: &str) -> bool {
    !id.is_empty() && id.len() <= 64 && id.chars().all(|c| c.is_ascii_alphanumeric())
}
