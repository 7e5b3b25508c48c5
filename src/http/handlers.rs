use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::Json;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::app::assistant::{AssistantService, ImprovementMode};
use crate::app::dashboard::{DashboardService, PostAnalytics};
use crate::app::engagement::EngagementService;
use crate::app::feed::FeedService;
use crate::app::media::MediaService;
use crate::app::posts::{PostDraftInput, PostPatch, PostService};
use crate::app::social::{FollowerEdge, FollowingEdge, SocialService};
use crate::app::suggestions::SuggestionService;
use crate::app::users::UserService;
use crate::domain::post::{Post, PostStatus, PostWithAuthor};
use crate::domain::ranking::{ActivityEvent, CreatorAnalytics, RankedSuggestion, Scored};
use crate::domain::stats::DailyStat;
use crate::domain::user::{PublicProfile, User};
use crate::http::{AppError, Identity};
use crate::AppState;

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
}

#[derive(Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

pub(crate) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = if state.db.ping().await.is_ok() {
        "ok"
    } else {
        "degraded"
    };
    Json(HealthResponse { status })
}

// ---------------------------------------------------------------------------
// Caller resolution
// ---------------------------------------------------------------------------

/// Map the provider identity to a local user row, failing when the caller
/// has not gone through the `store` bootstrap yet.
async fn require_user(state: &AppState, identity: &Identity) -> Result<User, AppError> {
    let service = UserService::new(state.db.clone());
    let user = service
        .find_by_token(&identity.token_identifier)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "failed to resolve caller");
            AppError::internal("failed to resolve caller")
        })?;
    user.ok_or_else(|| AppError::not_found("user not found"))
}

/// Same mapping for optionally-authenticated queries: no identity or no user
/// row degrades to `None` instead of failing.
async fn maybe_user(
    state: &AppState,
    identity: Option<&Identity>,
) -> Result<Option<User>, AppError> {
    let Some(identity) = identity else {
        return Ok(None);
    };
    let service = UserService::new(state.db.clone());
    service
        .find_by_token(&identity.token_identifier)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "failed to resolve caller");
            AppError::internal("failed to resolve caller")
        })
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

pub async fn store_user(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<User>, AppError> {
    let service = UserService::new(state.db.clone());
    let user = service.store(&identity).await.map_err(|err| {
        tracing::error!(error = ?err, "failed to store user");
        AppError::internal("failed to store user")
    })?;

    Ok(Json(user))
}

pub async fn get_current_user(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<User>, AppError> {
    let user = require_user(&state, &identity).await?;
    Ok(Json(user))
}

#[derive(Deserialize)]
pub struct UpdateUsernameRequest {
    pub username: String,
}

pub async fn update_username(
    identity: Identity,
    State(state): State<AppState>,
    Json(payload): Json<UpdateUsernameRequest>,
) -> Result<Json<User>, AppError> {
    let username = payload.username.trim();
    if username.len() < 3 || username.len() > 20 {
        return Err(AppError::bad_request(
            "username must be between 3 and 20 characters",
        ));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(AppError::bad_request(
            "username can only contain letters, numbers, underscores, and hyphens",
        ));
    }

    let user = require_user(&state, &identity).await?;
    let service = UserService::new(state.db.clone());
    let updated = service
        .update_username(user.id, username)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, user_id = %user.id, "failed to update username");
            AppError::internal("failed to update username")
        })?;

    match updated {
        Some(user) => Ok(Json(user)),
        None => Err(AppError::conflict("username is already taken")),
    }
}

pub async fn get_by_username(
    Path(username): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<PublicProfile>, AppError> {
    let service = UserService::new(state.db.clone());
    let profile = service.get_by_username(&username).await.map_err(|err| {
        tracing::error!(error = ?err, username = %username, "failed to fetch profile");
        AppError::internal("failed to fetch profile")
    })?;

    match profile {
        Some(profile) => Ok(Json(profile)),
        None => Err(AppError::not_found("user not found")),
    }
}

// ---------------------------------------------------------------------------
// Posts
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    pub status: PostStatus,
    #[serde(default)]
    pub tags: Vec<String>,
    pub category: Option<String>,
    pub featured_image: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub scheduled_for: Option<OffsetDateTime>,
}

pub async fn create_post(
    identity: Identity,
    State(state): State<AppState>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<Json<Post>, AppError> {
    if payload.title.trim().is_empty() {
        return Err(AppError::bad_request("title is required"));
    }

    let user = require_user(&state, &identity).await?;
    let service = PostService::new(state.db.clone());
    let post = service
        .create(
            user.id,
            PostDraftInput {
                title: payload.title,
                content: payload.content,
                status: payload.status,
                tags: payload.tags,
                category: payload.category,
                featured_image: payload.featured_image,
                scheduled_for: payload.scheduled_for,
            },
        )
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, user_id = %user.id, "failed to create post");
            AppError::internal("failed to create post")
        })?;

    Ok(Json(post))
}

#[derive(Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub status: Option<PostStatus>,
    pub tags: Option<Vec<String>>,
    pub category: Option<String>,
    pub featured_image: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub scheduled_for: Option<OffsetDateTime>,
}

pub async fn update_post(
    identity: Identity,
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(payload): Json<UpdatePostRequest>,
) -> Result<Json<Post>, AppError> {
    let user = require_user(&state, &identity).await?;
    let service = PostService::new(state.db.clone());
    let post = service
        .update(
            id,
            user.id,
            PostPatch {
                title: payload.title,
                content: payload.content,
                status: payload.status,
                tags: payload.tags,
                category: payload.category,
                featured_image: payload.featured_image,
                scheduled_for: payload.scheduled_for,
            },
        )
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, post_id = %id, "failed to update post");
            AppError::internal("failed to update post")
        })?;

    match post {
        Some(post) => Ok(Json(post)),
        None => Err(AppError::not_found("post not found")),
    }
}

pub async fn delete_post(
    identity: Identity,
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let user = require_user(&state, &identity).await?;
    let service = PostService::new(state.db.clone());
    let deleted = service.delete(id, user.id).await.map_err(|err| {
        tracing::error!(error = ?err, post_id = %id, "failed to delete post");
        AppError::internal("failed to delete post")
    })?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("post not found"))
    }
}

pub async fn get_post(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<Post>, AppError> {
    let service = PostService::new(state.db.clone());
    let post = service.get(id).await.map_err(|err| {
        tracing::error!(error = ?err, post_id = %id, "failed to fetch post");
        AppError::internal("failed to fetch post")
    })?;

    match post {
        Some(post) => Ok(Json(post)),
        None => Err(AppError::not_found("post not found")),
    }
}

#[derive(Deserialize)]
pub struct MyPostsQuery {
    pub status: Option<String>,
}

pub async fn my_posts(
    identity: Identity,
    Query(query): Query<MyPostsQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Post>>, AppError> {
    let status = match query.status.as_deref() {
        Some(value) => Some(
            PostStatus::from_db(value)
                .ok_or_else(|| AppError::bad_request("status must be draft or published"))?,
        ),
        None => None,
    };

    let user = require_user(&state, &identity).await?;
    let service = PostService::new(state.db.clone());
    let posts = service.user_posts(user.id, status).await.map_err(|err| {
        tracing::error!(error = ?err, user_id = %user.id, "failed to list posts");
        AppError::internal("failed to list posts")
    })?;

    Ok(Json(posts))
}

pub async fn my_draft(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<Option<Post>>, AppError> {
    let user = require_user(&state, &identity).await?;
    let service = PostService::new(state.db.clone());
    let draft = service.user_draft(user.id).await.map_err(|err| {
        tracing::error!(error = ?err, user_id = %user.id, "failed to fetch draft");
        AppError::internal("failed to fetch draft")
    })?;

    Ok(Json(draft))
}

#[derive(Serialize)]
pub struct ViewResponse {
    pub recorded: bool,
}

pub async fn record_view(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<ViewResponse>, AppError> {
    let service = FeedService::new(state.db.clone());
    let recorded = service.record_view(id).await.map_err(|err| {
        tracing::error!(error = ?err, post_id = %id, "failed to record view");
        AppError::internal("failed to record view")
    })?;

    Ok(Json(ViewResponse { recorded }))
}

#[derive(Deserialize)]
pub struct DailyStatsQuery {
    pub days: Option<i64>,
}

pub async fn daily_stats(
    Path(id): Path<Uuid>,
    Query(query): Query<DailyStatsQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<DailyStat>>, AppError> {
    let days = query.days.unwrap_or(30);
    let service = FeedService::new(state.db.clone());
    let stats = service.daily_views(id, days).await.map_err(|err| {
        tracing::error!(error = ?err, post_id = %id, "failed to fetch daily stats");
        AppError::internal("failed to fetch daily stats")
    })?;

    Ok(Json(stats))
}

#[derive(Serialize)]
pub struct LikeResponse {
    pub liked: bool,
}

pub async fn like_post(
    identity: Identity,
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<LikeResponse>, AppError> {
    let user = require_user(&state, &identity).await?;
    let service = EngagementService::new(state.db.clone());
    let like = service.like_post(user.id, id).await.map_err(|err| {
        tracing::error!(error = ?err, post_id = %id, "failed to like post");
        AppError::internal("failed to like post")
    })?;

    if like.is_some() {
        return Ok(Json(LikeResponse { liked: true }));
    }

    // No row inserted: either already liked, or the post is not there.
    let posts = PostService::new(state.db.clone());
    match posts.get(id).await.map_err(|err| {
        tracing::error!(error = ?err, post_id = %id, "failed to fetch post");
        AppError::internal("failed to like post")
    })? {
        Some(post) if post.status == PostStatus::Published => {
            Ok(Json(LikeResponse { liked: true }))
        }
        _ => Err(AppError::not_found("post not found or not published")),
    }
}

pub async fn unlike_post(
    identity: Identity,
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<LikeResponse>, AppError> {
    let user = require_user(&state, &identity).await?;
    let service = EngagementService::new(state.db.clone());
    service.unlike_post(user.id, id).await.map_err(|err| {
        tracing::error!(error = ?err, post_id = %id, "failed to unlike post");
        AppError::internal("failed to unlike post")
    })?;

    Ok(Json(LikeResponse { liked: false }))
}

// ---------------------------------------------------------------------------
// Comments
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct AddCommentRequest {
    pub content: String,
}

pub async fn add_comment(
    identity: Identity,
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(payload): Json<AddCommentRequest>,
) -> Result<Json<crate::domain::engagement::Comment>, AppError> {
    let content = payload.content.trim();
    if content.is_empty() || content.len() > 1000 {
        return Err(AppError::bad_request(
            "comment must be between 1-1000 characters",
        ));
    }

    let user = require_user(&state, &identity).await?;
    let service = EngagementService::new(state.db.clone());
    let comment = service
        .add_comment(user.id, &user.name, id, content)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, post_id = %id, "failed to add comment");
            AppError::internal("failed to add comment")
        })?;

    match comment {
        Some(comment) => Ok(Json(comment)),
        None => Err(AppError::not_found("post not found or not published")),
    }
}

pub async fn list_comments(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<Vec<crate::domain::engagement::CommentWithAuthor>>, AppError> {
    let service = EngagementService::new(state.db.clone());
    let comments = service.post_comments(id).await.map_err(|err| {
        tracing::error!(error = ?err, post_id = %id, "failed to list comments");
        AppError::internal("failed to list comments")
    })?;

    Ok(Json(comments))
}

pub async fn delete_comment(
    identity: Identity,
    Path((_post_id, comment_id)): Path<(Uuid, Uuid)>,
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    let user = require_user(&state, &identity).await?;
    let service = EngagementService::new(state.db.clone());
    let deleted = service
        .delete_comment(comment_id, user.id)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, comment_id = %comment_id, "failed to delete comment");
            AppError::internal("failed to delete comment")
        })?;

    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::not_found("comment not found"))
    }
}

// ---------------------------------------------------------------------------
// Feed
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct FeedResponse {
    pub posts: Vec<PostWithAuthor>,
    pub has_more: bool,
}

pub async fn get_feed(
    Query(query): Query<LimitQuery>,
    State(state): State<AppState>,
) -> Result<Json<FeedResponse>, AppError> {
    let limit = query.limit.unwrap_or(10).clamp(1, 50);
    let service = FeedService::new(state.db.clone());
    let page = service.global_feed(limit).await.map_err(|err| {
        tracing::error!(error = ?err, "failed to fetch feed");
        AppError::internal("failed to fetch feed")
    })?;

    Ok(Json(FeedResponse {
        posts: page.posts,
        has_more: page.has_more,
    }))
}

pub async fn trending_posts(
    Query(query): Query<LimitQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Scored<PostWithAuthor>>>, AppError> {
    let limit = query.limit.unwrap_or(10).clamp(1, 50) as usize;
    let service = FeedService::new(state.db.clone());
    let posts = service.trending(limit).await.map_err(|err| {
        tracing::error!(error = ?err, "failed to fetch trending posts");
        AppError::internal("failed to fetch trending posts")
    })?;

    Ok(Json(posts))
}

pub async fn suggested_users(
    identity: Option<Identity>,
    Query(query): Query<LimitQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<RankedSuggestion>>, AppError> {
    let limit = query.limit.unwrap_or(10).clamp(1, 50) as usize;
    let caller = maybe_user(&state, identity.as_ref()).await?;
    let service = SuggestionService::new(state.db.clone());
    let suggestions = service
        .suggested_users(caller.map(|user| user.id), limit)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "failed to fetch suggested users");
            AppError::internal("failed to fetch suggested users")
        })?;

    Ok(Json(suggestions))
}

#[derive(Deserialize)]
pub struct ProfilePostsQuery {
    pub limit: Option<i64>,
    pub cursor: Option<Uuid>,
}

#[derive(Serialize)]
pub struct ProfilePostsResponse {
    pub posts: Vec<PostWithAuthor>,
    pub has_more: bool,
    pub next_cursor: Option<Uuid>,
}

pub async fn profile_posts(
    Path(username): Path<String>,
    Query(query): Query<ProfilePostsQuery>,
    State(state): State<AppState>,
) -> Result<Json<ProfilePostsResponse>, AppError> {
    let limit = query.limit.unwrap_or(10).clamp(1, 50);
    let service = FeedService::new(state.db.clone());
    let page = service
        .published_by_username(&username, limit, query.cursor)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, username = %username, "failed to fetch profile posts");
            AppError::internal("failed to fetch profile posts")
        })?;

    Ok(Json(ProfilePostsResponse {
        posts: page.posts,
        has_more: page.has_more,
        next_cursor: page.next_cursor,
    }))
}

pub async fn profile_post(
    Path((username, post_id)): Path<(String, Uuid)>,
    State(state): State<AppState>,
) -> Result<Json<PostWithAuthor>, AppError> {
    let service = FeedService::new(state.db.clone());
    let post = service
        .published_post(&username, post_id)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, post_id = %post_id, "failed to fetch post");
            AppError::internal("failed to fetch post")
        })?;

    match post {
        Some(post) => Ok(Json(post)),
        None => Err(AppError::not_found("post not found")),
    }
}

// ---------------------------------------------------------------------------
// Social graph
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct FollowResponse {
    pub following: bool,
}

pub async fn toggle_follow(
    identity: Identity,
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<FollowResponse>, AppError> {
    let user = require_user(&state, &identity).await?;
    if user.id == id {
        return Err(AppError::bad_request("you cannot follow yourself"));
    }

    let service = SocialService::new(state.db.clone());
    let exists = service.user_exists(id).await.map_err(|err| {
        tracing::error!(error = ?err, user_id = %id, "failed to toggle follow");
        AppError::internal("failed to toggle follow")
    })?;
    if !exists {
        return Err(AppError::not_found("user not found"));
    }

    let following = service.toggle_follow(user.id, id).await.map_err(|err| {
        tracing::error!(error = ?err, user_id = %id, "failed to toggle follow");
        AppError::internal("failed to toggle follow")
    })?;

    Ok(Json(FollowResponse { following }))
}

pub async fn following_state(
    identity: Option<Identity>,
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<FollowResponse>, AppError> {
    let Some(user) = maybe_user(&state, identity.as_ref()).await? else {
        return Ok(Json(FollowResponse { following: false }));
    };

    let service = SocialService::new(state.db.clone());
    let following = service.is_following(user.id, id).await.map_err(|err| {
        tracing::error!(error = ?err, user_id = %id, "failed to fetch follow state");
        AppError::internal("failed to fetch follow state")
    })?;

    Ok(Json(FollowResponse { following }))
}

#[derive(Serialize)]
pub struct FollowerCountResponse {
    pub followers: i64,
}

pub async fn follower_count(
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<FollowerCountResponse>, AppError> {
    let service = SocialService::new(state.db.clone());
    let followers = service.follower_count(id).await.map_err(|err| {
        tracing::error!(error = ?err, user_id = %id, "failed to count followers");
        AppError::internal("failed to count followers")
    })?;

    Ok(Json(FollowerCountResponse { followers }))
}

pub async fn my_followers(
    identity: Identity,
    Query(query): Query<LimitQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<FollowerEdge>>, AppError> {
    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let user = require_user(&state, &identity).await?;
    let service = SocialService::new(state.db.clone());
    let followers = service.my_followers(user.id, limit).await.map_err(|err| {
        tracing::error!(error = ?err, user_id = %user.id, "failed to list followers");
        AppError::internal("failed to list followers")
    })?;

    Ok(Json(followers))
}

pub async fn my_following(
    identity: Identity,
    Query(query): Query<LimitQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<FollowingEdge>>, AppError> {
    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let user = require_user(&state, &identity).await?;
    let service = SocialService::new(state.db.clone());
    let following = service.my_following(user.id, limit).await.map_err(|err| {
        tracing::error!(error = ?err, user_id = %user.id, "failed to list following");
        AppError::internal("failed to list following")
    })?;

    Ok(Json(following))
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

pub async fn analytics(
    identity: Option<Identity>,
    State(state): State<AppState>,
) -> Result<Json<Option<CreatorAnalytics>>, AppError> {
    let Some(user) = maybe_user(&state, identity.as_ref()).await? else {
        return Ok(Json(None));
    };

    let service = DashboardService::new(state.db.clone());
    let analytics = service.analytics(user.id).await.map_err(|err| {
        tracing::error!(error = ?err, user_id = %user.id, "failed to compute analytics");
        AppError::internal("failed to compute analytics")
    })?;

    Ok(Json(Some(analytics)))
}

pub async fn recent_activity(
    identity: Option<Identity>,
    Query(query): Query<LimitQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<ActivityEvent>>, AppError> {
    let limit = query.limit.unwrap_or(10).clamp(1, 50) as usize;
    let Some(user) = maybe_user(&state, identity.as_ref()).await? else {
        return Ok(Json(Vec::new()));
    };

    let service = DashboardService::new(state.db.clone());
    let activity = service
        .recent_activity(user.id, limit)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, user_id = %user.id, "failed to fetch activity");
            AppError::internal("failed to fetch activity")
        })?;

    Ok(Json(activity))
}

pub async fn dashboard_posts(
    identity: Option<Identity>,
    Query(query): Query<LimitQuery>,
    State(state): State<AppState>,
) -> Result<Json<Vec<PostAnalytics>>, AppError> {
    let limit = query.limit.unwrap_or(5).clamp(1, 50);
    let Some(user) = maybe_user(&state, identity.as_ref()).await? else {
        return Ok(Json(Vec::new()));
    };

    let service = DashboardService::new(state.db.clone());
    let posts = service
        .posts_with_analytics(user.id, limit)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, user_id = %user.id, "failed to fetch dashboard posts");
            AppError::internal("failed to fetch dashboard posts")
        })?;

    Ok(Json(posts))
}

// ---------------------------------------------------------------------------
// AI assistant
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct GenerateContentRequest {
    pub title: String,
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Serialize)]
pub struct AssistantResponse {
    pub content: String,
}

pub async fn generate_content(
    identity: Identity,
    State(state): State<AppState>,
    Json(payload): Json<GenerateContentRequest>,
) -> Result<Json<AssistantResponse>, AppError> {
    if payload.title.trim().is_empty() {
        return Err(AppError::bad_request("title is required to generate content"));
    }

    let _user = require_user(&state, &identity).await?;
    let service = AssistantService::new(state.ai.clone());
    let content = service
        .generate_content(&payload.title, payload.category.as_deref(), &payload.tags)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "failed to generate content");
            AppError::internal("failed to generate content")
        })?;

    Ok(Json(AssistantResponse { content }))
}

#[derive(Deserialize)]
pub struct ImproveContentRequest {
    pub content: String,
    pub mode: Option<String>,
}

pub async fn improve_content(
    identity: Identity,
    State(state): State<AppState>,
    Json(payload): Json<ImproveContentRequest>,
) -> Result<Json<AssistantResponse>, AppError> {
    if payload.content.trim().is_empty() {
        return Err(AppError::bad_request("content is required for improvement"));
    }
    let mode = match payload.mode.as_deref() {
        Some(value) => ImprovementMode::parse(value)
            .ok_or_else(|| AppError::bad_request("mode must be enhance, expand, or simplify"))?,
        None => ImprovementMode::Enhance,
    };

    let _user = require_user(&state, &identity).await?;
    let service = AssistantService::new(state.ai.clone());
    let content = service
        .improve_content(&payload.content, mode)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, "failed to improve content");
            AppError::internal("failed to improve content")
        })?;

    Ok(Json(AssistantResponse { content }))
}

// ---------------------------------------------------------------------------
// Media
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct UploadResponse {
    pub url: String,
}

pub async fn upload_image(
    identity: Identity,
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<UploadResponse>, AppError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::bad_request("missing content-type header"))?
        .to_string();

    if body.is_empty() {
        return Err(AppError::bad_request("empty upload body"));
    }
    if body.len() > state.upload_max_bytes {
        return Err(AppError::payload_too_large("upload exceeds size limit"));
    }

    let user = require_user(&state, &identity).await?;
    let service = MediaService::new(state.storage.clone());
    let url = service
        .upload_image(user.id, &content_type, body)
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, user_id = %user.id, "failed to upload image");
            AppError::bad_request(err.to_string())
        })?;

    Ok(Json(UploadResponse { url }))
}
