//! Feed, trending, profile pages, and suggested users.
//!
//! The feed endpoints are global, and the test database is shared across this
//! binary, so assertions here check relative ordering and membership of the
//! fixtures each test creates rather than exact result sets.

mod common;

use axum::http::StatusCode;
use common::app;
use serde_json::{json, Value};
use uuid::Uuid;

fn position_of(posts: &[Value], id: &str) -> Option<usize> {
    posts.iter().position(|p| p["id"].as_str() == Some(id))
}

async fn set_counters(app: &common::TestApp, post_id: Uuid, views: i64, likes: i64) {
    sqlx::query("UPDATE posts SET view_count = $2, like_count = $3 WHERE id = $1")
        .bind(post_id)
        .bind(views)
        .bind(likes)
        .execute(app.state.db.pool())
        .await
        .expect("failed to set counters");
}

// ===========================================================================
// Global feed
// ===========================================================================

#[tokio::test]
#[ignore = "requires a running postgres"]
async fn feed_lists_published_posts_newest_first() {
    let app = app().await;
    let user = app.create_user("feed_order").await;
    let older = app.publish_post(&user, "Feed older").await;
    let newer = app.publish_post(&user, "Feed newer").await;

    let resp = app.get("/feed?limit=50", None).await;
    assert_eq!(resp.status, StatusCode::OK);
    let body = resp.json();
    let posts = body["posts"].as_array().unwrap();

    let older_pos = position_of(posts, &older.to_string()).expect("older post missing");
    let newer_pos = position_of(posts, &newer.to_string()).expect("newer post missing");
    assert!(newer_pos < older_pos);

    for post in posts {
        assert_eq!(post["status"].as_str().unwrap(), "published");
        assert!(post["author"]["name"].is_string());
    }
}

#[tokio::test]
#[ignore = "requires a running postgres"]
async fn feed_excludes_drafts() {
    let app = app().await;
    let user = app.create_user("feed_drafts").await;
    let draft = app
        .post_json(
            "/posts",
            json!({ "title": "Unseen", "content": "x", "status": "draft" }),
            Some(&user.token),
        )
        .await;
    let draft_id = draft.json()["id"].as_str().unwrap().to_string();

    let resp = app.get("/feed?limit=50", None).await;
    let body = resp.json();
    let posts = body["posts"].as_array().unwrap();
    assert!(position_of(posts, &draft_id).is_none());
}

// ===========================================================================
// Trending
// ===========================================================================

#[tokio::test]
#[ignore = "requires a running postgres"]
async fn trending_ranks_by_weighted_score() {
    let app = app().await;
    let user = app.create_user("trend_rank").await;
    let viewed = app.publish_post(&user, "Trend viewed").await;
    let liked = app.publish_post(&user, "Trend liked").await;

    // 900_000 vs 300_000 * 3 + 10: likes outweigh raw views.
    set_counters(app, viewed, 900_000, 0).await;
    set_counters(app, liked, 10, 300_000).await;

    let resp = app.get("/feed/trending?limit=50", None).await;
    assert_eq!(resp.status, StatusCode::OK);
    let body = resp.json();
    let posts = body.as_array().unwrap();

    let viewed_pos = position_of(posts, &viewed.to_string()).expect("viewed post missing");
    let liked_pos = position_of(posts, &liked.to_string()).expect("liked post missing");
    assert!(liked_pos < viewed_pos);

    assert_eq!(posts[viewed_pos]["trending_score"].as_i64().unwrap(), 900_000);
    assert_eq!(posts[liked_pos]["trending_score"].as_i64().unwrap(), 900_010);
}

#[tokio::test]
#[ignore = "requires a running postgres"]
async fn trending_only_considers_recent_posts() {
    let app = app().await;
    let user = app.create_user("trend_window").await;
    let stale = app.publish_post(&user, "Trend stale").await;
    set_counters(app, stale, 5_000_000, 5_000_000).await;

    sqlx::query("UPDATE posts SET published_at = now() - interval '10 days' WHERE id = $1")
        .bind(stale)
        .execute(app.state.db.pool())
        .await
        .expect("failed to age post");

    let resp = app.get("/feed/trending?limit=50", None).await;
    let body = resp.json();
    let posts = body.as_array().unwrap();
    assert!(position_of(posts, &stale.to_string()).is_none());
}

// ===========================================================================
// Profile pages
// ===========================================================================

#[tokio::test]
#[ignore = "requires a running postgres"]
async fn profile_posts_paginate_with_cursor() {
    let app = app().await;
    let user = app.create_user("profile_page").await;
    for i in 1..=3 {
        app.publish_post(&user, &format!("Page post {}", i)).await;
    }

    let first = app
        .get(&format!("/profiles/{}/posts?limit=2", user.username), None)
        .await;
    assert_eq!(first.status, StatusCode::OK);
    let body = first.json();
    assert_eq!(body["posts"].as_array().unwrap().len(), 2);
    assert!(body["has_more"].as_bool().unwrap());
    let cursor = body["next_cursor"].as_str().unwrap().to_string();
    assert_eq!(
        body["posts"][0]["title"].as_str().unwrap(),
        "Page post 3"
    );

    let second = app
        .get(
            &format!("/profiles/{}/posts?limit=2&cursor={}", user.username, cursor),
            None,
        )
        .await;
    let body = second.json();
    assert_eq!(body["posts"].as_array().unwrap().len(), 1);
    assert!(!body["has_more"].as_bool().unwrap());
    assert!(body["next_cursor"].is_null());
    assert_eq!(
        body["posts"][0]["title"].as_str().unwrap(),
        "Page post 1"
    );
}

#[tokio::test]
#[ignore = "requires a running postgres"]
async fn profile_of_unknown_user_is_empty() {
    let app = app().await;

    let resp = app.get("/profiles/profile_nobody/posts", None).await;
    assert_eq!(resp.status, StatusCode::OK);
    let body = resp.json();
    assert!(body["posts"].as_array().unwrap().is_empty());
    assert!(!body["has_more"].as_bool().unwrap());
}

#[tokio::test]
#[ignore = "requires a running postgres"]
async fn profile_post_detail() {
    let app = app().await;
    let user = app.create_user("profile_detail").await;
    let other = app.create_user("profile_detail_other").await;
    let post_id = app.publish_post(&user, "Detail post").await;

    let resp = app
        .get(&format!("/profiles/{}/posts/{}", user.username, post_id), None)
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json()["title"].as_str().unwrap(), "Detail post");
    assert_eq!(
        resp.json()["author"]["username"].as_str().unwrap(),
        "profile_detail"
    );

    // The same post under someone else's username does not resolve.
    let resp = app
        .get(&format!("/profiles/{}/posts/{}", other.username, post_id), None)
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

// ===========================================================================
// Suggested users
// ===========================================================================

#[tokio::test]
#[ignore = "requires a running postgres"]
async fn suggestions_exclude_self_and_already_followed() {
    let app = app().await;
    let caller = app.create_user("sugg_caller").await;
    let followed = app.create_user("sugg_followed").await;
    let fresh = app.create_user("sugg_fresh").await;
    app.publish_post(&caller, "Caller post").await;
    app.publish_post(&followed, "Followed post").await;
    app.publish_post(&fresh, "Fresh post").await;

    app.post_json(
        &format!("/users/{}/follow", followed.id),
        json!({}),
        Some(&caller.token),
    )
    .await;

    let resp = app.get("/feed/suggested-users?limit=50", Some(&caller.token)).await;
    assert_eq!(resp.status, StatusCode::OK);
    let body = resp.json();
    let suggestions = body.as_array().unwrap();

    let names: Vec<&str> = suggestions
        .iter()
        .map(|s| s["username"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"sugg_fresh"));
    assert!(!names.contains(&"sugg_caller"));
    assert!(!names.contains(&"sugg_followed"));

    let fresh_entry = suggestions
        .iter()
        .find(|s| s["username"].as_str() == Some("sugg_fresh"))
        .unwrap();
    assert_eq!(fresh_entry["post_count"].as_i64().unwrap(), 1);
    assert!(fresh_entry["engagement_score"].is_i64());
}

#[tokio::test]
#[ignore = "requires a running postgres"]
async fn suggestions_require_published_posts() {
    let app = app().await;
    let caller = app.create_user("sugg_min_caller").await;
    let silent = app.create_user("sugg_silent").await;
    // A draft alone does not qualify.
    app.post_json(
        "/posts",
        json!({ "title": "Quiet", "content": "x", "status": "draft" }),
        Some(&silent.token),
    )
    .await;

    let resp = app.get("/feed/suggested-users?limit=50", Some(&caller.token)).await;
    let body = resp.json();
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["username"].as_str().unwrap())
        .collect();
    assert!(!names.contains(&"sugg_silent"));
}
