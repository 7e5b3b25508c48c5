//! Creator dashboard: analytics, activity timeline, per-post stats.

mod common;

use axum::http::StatusCode;
use common::app;
use serde_json::json;
use uuid::Uuid;

async fn set_counters(app: &common::TestApp, post_id: Uuid, views: i64, likes: i64) {
    sqlx::query("UPDATE posts SET view_count = $2, like_count = $3 WHERE id = $1")
        .bind(post_id)
        .bind(views)
        .bind(likes)
        .execute(app.state.db.pool())
        .await
        .expect("failed to set counters");
}

#[tokio::test]
#[ignore = "requires a running postgres"]
async fn analytics_aggregates_all_posts() {
    let app = app().await;
    let creator = app.create_user("dash_totals").await;
    let fan = app.create_user("dash_totals_fan").await;

    let first = app.publish_post(&creator, "Dash first").await;
    let second = app.publish_post(&creator, "Dash second").await;
    set_counters(app, first, 70, 4).await;
    set_counters(app, second, 30, 6).await;

    app.post_json(
        &format!("/posts/{}/comments", first),
        json!({ "content": "nice" }),
        Some(&fan.token),
    )
    .await;
    app.post_json(&format!("/users/{}/follow", creator.id), json!({}), Some(&fan.token))
        .await;

    let resp = app.get("/dashboard/analytics", Some(&creator.token)).await;
    assert_eq!(resp.status, StatusCode::OK);
    let body = resp.json();
    assert_eq!(body["total_views"].as_i64().unwrap(), 100);
    assert_eq!(body["total_likes"].as_i64().unwrap(), 10);
    assert_eq!(body["total_comments"].as_i64().unwrap(), 1);
    assert_eq!(body["total_followers"].as_i64().unwrap(), 1);
    // Everything was created just now, inside the growth window.
    assert_eq!(body["views_growth"].as_f64().unwrap(), 100.0);
    assert_eq!(body["likes_growth"].as_f64().unwrap(), 100.0);
    assert_eq!(body["comments_growth"].as_f64().unwrap(), 15.0);
    assert_eq!(body["followers_growth"].as_f64().unwrap(), 12.0);
}

#[tokio::test]
#[ignore = "requires a running postgres"]
async fn analytics_counts_drafts_too() {
    let app = app().await;
    let creator = app.create_user("dash_drafts").await;
    let draft = app
        .post_json(
            "/posts",
            json!({ "title": "Counted", "content": "x", "status": "draft" }),
            Some(&creator.token),
        )
        .await;
    let draft_id: Uuid = draft.json()["id"].as_str().unwrap().parse().unwrap();
    set_counters(app, draft_id, 42, 0).await;

    let resp = app.get("/dashboard/analytics", Some(&creator.token)).await;
    assert_eq!(resp.json()["total_views"].as_i64().unwrap(), 42);
}

#[tokio::test]
#[ignore = "requires a running postgres"]
async fn analytics_degrades_without_auth() {
    let app = app().await;

    let resp = app.get("/dashboard/analytics", None).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.json().is_null());

    let resp = app.get("/dashboard/activity", None).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.json().as_array().unwrap().is_empty());

    let resp = app.get("/dashboard/posts", None).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert!(resp.json().as_array().unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires a running postgres"]
async fn activity_merges_likes_comments_and_follows() {
    let app = app().await;
    let creator = app.create_user("dash_activity").await;
    let fan = app.create_user("dash_activity_fan").await;
    let post_id = app.publish_post(&creator, "Active post").await;

    app.post_json(&format!("/posts/{}/like", post_id), json!({}), Some(&fan.token))
        .await;
    app.post_json(
        &format!("/posts/{}/comments", post_id),
        json!({ "content": "great read" }),
        Some(&fan.token),
    )
    .await;
    app.post_json(&format!("/users/{}/follow", creator.id), json!({}), Some(&fan.token))
        .await;

    let resp = app.get("/dashboard/activity", Some(&creator.token)).await;
    assert_eq!(resp.status, StatusCode::OK);
    let body = resp.json();
    let events = body.as_array().unwrap();
    assert_eq!(events.len(), 3);

    let kinds: Vec<&str> = events.iter().map(|e| e["kind"].as_str().unwrap()).collect();
    assert!(kinds.contains(&"like"));
    assert!(kinds.contains(&"comment"));
    assert!(kinds.contains(&"follow"));

    for pair in events.windows(2) {
        assert!(pair[0]["at"].as_str().unwrap() >= pair[1]["at"].as_str().unwrap());
    }
    let like = events.iter().find(|e| e["kind"] == "like").unwrap();
    assert_eq!(like["post"].as_str().unwrap(), "Active post");
    let follow = events.iter().find(|e| e["kind"] == "follow").unwrap();
    assert!(follow["post"].is_null());
}

#[tokio::test]
#[ignore = "requires a running postgres"]
async fn activity_truncates_to_limit() {
    let app = app().await;
    let creator = app.create_user("dash_act_limit").await;
    let post_id = app.publish_post(&creator, "Busy post").await;

    for i in 0..4 {
        let fan = app.create_user(&format!("dash_act_fan_{}", i)).await;
        app.post_json(&format!("/posts/{}/like", post_id), json!({}), Some(&fan.token))
            .await;
    }

    let resp = app.get("/dashboard/activity?limit=2", Some(&creator.token)).await;
    assert_eq!(resp.json().as_array().unwrap().len(), 2);
}

#[tokio::test]
#[ignore = "requires a running postgres"]
async fn dashboard_posts_carry_comment_counts() {
    let app = app().await;
    let creator = app.create_user("dash_posts").await;
    let fan = app.create_user("dash_posts_fan").await;
    let post_id = app.publish_post(&creator, "Commented").await;

    for text in ["one", "two"] {
        app.post_json(
            &format!("/posts/{}/comments", post_id),
            json!({ "content": text }),
            Some(&fan.token),
        )
        .await;
    }

    let resp = app.get("/dashboard/posts", Some(&creator.token)).await;
    assert_eq!(resp.status, StatusCode::OK);
    let body = resp.json();
    let posts = body.as_array().unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["title"].as_str().unwrap(), "Commented");
    assert_eq!(posts[0]["comment_count"].as_i64().unwrap(), 2);
}
