// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Profile update and account deletion.

use axum::http::StatusCode;
use serde_json::json;

mod common;

use common::{body_json, register, register_with_token, send, set_cookies, FakeGitHub};

#[tokio::test]
async fn test_update_profile_fields() {
    let github = FakeGitHub::start().await;
    let (app, state) = common::create_test_app(&github).await;
    let cookie = register(&app, "edit@example.com").await;

    let response = send(
        &app,
        "PATCH",
        "/profile",
        Some(&cookie),
        Some(json!({
            "name": "New Name",
            "bio": "Writes gists",
            "avatarUrl": "https://example.com/me.png",
            "githubToken": "ghp_abc",
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["user"]["name"], "New Name");
    assert_eq!(json["user"]["bio"], "Writes gists");
    assert_eq!(json["user"]["avatarUrl"], "https://example.com/me.png");
    assert_eq!(json["user"]["hasGithubToken"], true);
    assert!(!json.to_string().contains("ghp_abc"));

    let account = state
        .db
        .find_by_email("edit@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(account.github_token(), Some("ghp_abc"));
}

#[tokio::test]
async fn test_empty_values_clear_fields() {
    let github = FakeGitHub::start().await;
    let (app, _) = common::create_test_app(&github).await;
    let cookie = register_with_token(&app, "clear@example.com").await;

    let response = send(
        &app,
        "PATCH",
        "/profile",
        Some(&cookie),
        Some(json!({ "bio": "temp" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(
        &app,
        "PATCH",
        "/profile",
        Some(&cookie),
        Some(json!({ "bio": "", "githubToken": "" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["user"]["bio"].is_null());
    assert_eq!(json["user"]["hasGithubToken"], false);

    let response = send(&app, "GET", "/gists", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_profile_validation() {
    let github = FakeGitHub::start().await;
    let (app, _) = common::create_test_app(&github).await;
    let cookie = register(&app, "valid@example.com").await;

    for body in [
        json!({ "bio": "x".repeat(201) }),
        json!({ "name": "" }),
        json!({ "name": "   " }),
        json!({ "email": "nope" }),
        json!({ "avatarUrl": "ftp:/broken" }),
    ] {
        let response = send(&app, "PATCH", "/profile", Some(&cookie), Some(body.clone())).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
    }

    let me = send(&app, "GET", "/auth/me", Some(&cookie), None).await;
    assert_eq!(body_json(me).await["user"]["name"], "Test User");
}

#[tokio::test]
async fn test_email_change_conflict() {
    let github = FakeGitHub::start().await;
    let (app, _) = common::create_test_app(&github).await;
    register(&app, "taken@example.com").await;
    let cookie = register(&app, "mine@example.com").await;

    let response = send(
        &app,
        "PATCH",
        "/profile",
        Some(&cookie),
        Some(json!({ "email": "Taken@Example.com" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Re-submitting your own email is not a conflict.
    let response = send(
        &app,
        "PATCH",
        "/profile",
        Some(&cookie),
        Some(json!({ "email": "MINE@example.com" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_token_change_drops_cached_gists() {
    let github = FakeGitHub::start().await;
    github.seed_gist("aaa111", "first", &[("a.txt", "hello")]);
    let (app, _) = common::create_test_app(&github).await;
    let cookie = register_with_token(&app, "swap@example.com").await;

    let response = send(&app, "GET", "/gists", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(github.list_calls(), 1);

    let response = send(
        &app,
        "PATCH",
        "/profile",
        Some(&cookie),
        Some(json!({ "githubToken": "ghp_othertoken" })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, "GET", "/gists", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(github.list_calls(), 2);
}

#[tokio::test]
async fn test_delete_account() {
    let github = FakeGitHub::start().await;
    let (app, state) = common::create_test_app(&github).await;
    let cookie = register(&app, "delete@example.com").await;

    let response = send(&app, "DELETE", "/profile", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(set_cookies(&response)
        .iter()
        .any(|c| c.starts_with("auth_token=") && c.contains("Max-Age=0")));

    assert_eq!(state.db.count().await.unwrap(), 0);

    // The token still verifies, but the account is gone.
    let response = send(&app, "GET", "/auth/me", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, "DELETE", "/profile", Some(&cookie), None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
