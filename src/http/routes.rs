use axum::extract::DefaultBodyLimit;
use axum::{routing::delete, routing::get, routing::patch, routing::post, Router};

use crate::http::handlers;
use crate::AppState;

pub fn health() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health))
}

pub fn users() -> Router<AppState> {
    Router::new()
        .route("/users/store", post(handlers::store_user))
        .route("/users/me", get(handlers::get_current_user))
        .route("/users/me/username", patch(handlers::update_username))
        .route("/users/by-username/:username", get(handlers::get_by_username))
}

pub fn posts() -> Router<AppState> {
    Router::new()
        .route("/posts", post(handlers::create_post))
        .route("/posts/draft", get(handlers::my_draft))
        .route("/posts/mine", get(handlers::my_posts))
        .route("/posts/:id", get(handlers::get_post))
        .route("/posts/:id", patch(handlers::update_post))
        .route("/posts/:id", delete(handlers::delete_post))
        .route("/posts/:id/view", post(handlers::record_view))
        .route("/posts/:id/stats/daily", get(handlers::daily_stats))
        .route("/posts/:id/like", post(handlers::like_post))
        .route("/posts/:id/like", delete(handlers::unlike_post))
        .route("/posts/:id/comments", post(handlers::add_comment))
        .route("/posts/:id/comments", get(handlers::list_comments))
        .route(
            "/posts/:id/comments/:comment_id",
            delete(handlers::delete_comment),
        )
}

pub fn feed() -> Router<AppState> {
    Router::new()
        .route("/feed", get(handlers::get_feed))
        .route("/feed/trending", get(handlers::trending_posts))
        .route("/feed/suggested-users", get(handlers::suggested_users))
        .route("/profiles/:username/posts", get(handlers::profile_posts))
        .route(
            "/profiles/:username/posts/:post_id",
            get(handlers::profile_post),
        )
}

pub fn social() -> Router<AppState> {
    Router::new()
        .route("/users/:id/follow", post(handlers::toggle_follow))
        .route("/users/:id/follow", get(handlers::following_state))
        .route("/users/:id/followers/count", get(handlers::follower_count))
        .route("/social/followers", get(handlers::my_followers))
        .route("/social/following", get(handlers::my_following))
}

pub fn dashboard() -> Router<AppState> {
    Router::new()
        .route("/dashboard/analytics", get(handlers::analytics))
        .route("/dashboard/activity", get(handlers::recent_activity))
        .route("/dashboard/posts", get(handlers::dashboard_posts))
}

pub fn assistant() -> Router<AppState> {
    Router::new()
        .route("/assistant/generate", post(handlers::generate_content))
        .route("/assistant/improve", post(handlers::improve_content))
}

pub fn media(upload_max_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/media/upload", post(handlers::upload_image))
        .layer(DefaultBodyLimit::max(upload_max_bytes))
}
