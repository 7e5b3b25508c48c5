//! Feed ranking and analytics aggregation.
//!
//! Pure functions over snapshots the services read from Postgres. Nothing in
//! here performs I/O; the services fetch bounded slices (top-5 posts per
//! candidate, top-5 likes/comments per post, ...) and hand them to these
//! functions, so the observable scoring behavior is independent of how the
//! rows were fetched.

use serde::Serialize;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::domain::post::Post;
use crate::domain::user::AuthorSummary;

/// Lookback window for trending posts and the suggestion recency bucket.
pub const RECENCY_WINDOW: Duration = Duration::days(7);

/// Trailing window for the analytics growth comparison.
pub const GROWTH_WINDOW: Duration = Duration::days(30);

// ---------------------------------------------------------------------------
// Trending
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct Scored<T> {
    #[serde(flatten)]
    pub item: T,
    pub trending_score: i64,
}

pub fn trending_score(view_count: i64, like_count: i64) -> i64 {
    view_count + like_count * 3
}

/// Score a snapshot of recently published posts and keep the top `limit`.
///
/// The sort is stable, so posts with equal scores keep the order the scan
/// returned them in.
pub fn rank_trending(posts: Vec<Post>, limit: usize) -> Vec<Scored<Post>> {
    let mut scored: Vec<Scored<Post>> = posts
        .into_iter()
        .map(|post| {
            let trending_score = trending_score(post.view_count, post.like_count);
            Scored {
                item: post,
                trending_score,
            }
        })
        .collect();

    scored.sort_by(|a, b| b.trending_score.cmp(&a.trending_score));
    scored.truncate(limit);
    scored
}

// ---------------------------------------------------------------------------
// Suggested users
// ---------------------------------------------------------------------------

/// Compact post shape carried inside suggestion results.
#[derive(Debug, Clone, Serialize)]
pub struct PostDigest {
    pub id: Uuid,
    pub title: String,
    pub view_count: i64,
    pub like_count: i64,
    #[serde(with = "time::serde::rfc3339::option")]
    pub published_at: Option<OffsetDateTime>,
}

/// One candidate for the suggested-user ranking: the user plus a bounded
/// sample of their newest published posts (at most 5, newest first).
#[derive(Debug, Clone)]
pub struct SuggestionCandidate {
    pub author: AuthorSummary,
    pub follower_count: i64,
    pub posts: Vec<PostDigest>,
}

impl SuggestionCandidate {
    pub fn engagement_score(&self) -> i64 {
        let total_views: i64 = self.posts.iter().map(|p| p.view_count).sum();
        let total_likes: i64 = self.posts.iter().map(|p| p.like_count).sum();
        total_views + total_likes * 5 + self.follower_count * 10
    }

    pub fn last_post_at(&self) -> Option<OffsetDateTime> {
        self.posts.first().and_then(|p| p.published_at)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedSuggestion {
    #[serde(flatten)]
    pub author: AuthorSummary,
    pub follower_count: i64,
    pub post_count: i64,
    pub engagement_score: i64,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_post_at: Option<OffsetDateTime>,
    pub recent_posts: Vec<PostDigest>,
}

/// Rank candidates with a two-level sort: anyone whose newest post landed
/// within the recency window sorts before everyone who has not posted lately,
/// regardless of engagement score; within each bucket, descending score.
/// Candidates with no published posts are excluded.
pub fn rank_suggestions(
    candidates: Vec<SuggestionCandidate>,
    now: OffsetDateTime,
    limit: usize,
) -> Vec<RankedSuggestion> {
    let cutoff = now - RECENCY_WINDOW;

    let mut ranked: Vec<(bool, RankedSuggestion)> = candidates
        .into_iter()
        .filter(|candidate| !candidate.posts.is_empty())
        .map(|candidate| {
            let recent = candidate
                .last_post_at()
                .map(|at| at > cutoff)
                .unwrap_or(false);
            let engagement_score = candidate.engagement_score();
            let last_post_at = candidate.last_post_at();
            let post_count = candidate.posts.len() as i64;
            let mut recent_posts = candidate.posts;
            recent_posts.truncate(2);

            (
                recent,
                RankedSuggestion {
                    author: candidate.author,
                    follower_count: candidate.follower_count,
                    post_count,
                    engagement_score,
                    last_post_at,
                    recent_posts,
                },
            )
        })
        .collect();

    ranked.sort_by(|(a_recent, a), (b_recent, b)| {
        b_recent
            .cmp(a_recent)
            .then(b.engagement_score.cmp(&a.engagement_score))
    });
    ranked.truncate(limit);
    ranked.into_iter().map(|(_, suggestion)| suggestion).collect()
}

// ---------------------------------------------------------------------------
// Creator analytics
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct CreatorAnalytics {
    pub total_views: i64,
    pub total_likes: i64,
    pub total_comments: i64,
    pub total_followers: i64,
    pub views_growth: f64,
    pub likes_growth: f64,
    pub comments_growth: f64,
    pub followers_growth: f64,
}

/// Share of lifetime volume produced in the trailing window, as a percentage
/// rounded to one decimal. Zero when there is no lifetime volume.
pub fn growth_percent(recent: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    let percent = recent as f64 / total as f64 * 100.0;
    (percent * 10.0).round() / 10.0
}

/// Aggregate lifetime and trailing-30-day counters over all of a creator's
/// posts (drafts included).
///
/// The comment and follower "growth" numbers are fixed presence markers (15
/// and 12), not period-over-period deltas. That matches the product's current
/// dashboard and is deliberately not strengthened here.
pub fn compute_analytics(
    posts: &[Post],
    total_comments: i64,
    total_followers: i64,
    now: OffsetDateTime,
) -> CreatorAnalytics {
    let total_views: i64 = posts.iter().map(|p| p.view_count).sum();
    let total_likes: i64 = posts.iter().map(|p| p.like_count).sum();

    let cutoff = now - GROWTH_WINDOW;
    let recent: Vec<&Post> = posts.iter().filter(|p| p.created_at > cutoff).collect();
    let recent_views: i64 = recent.iter().map(|p| p.view_count).sum();
    let recent_likes: i64 = recent.iter().map(|p| p.like_count).sum();

    CreatorAnalytics {
        total_views,
        total_likes,
        total_comments,
        total_followers,
        views_growth: growth_percent(recent_views, total_views),
        likes_growth: growth_percent(recent_likes, total_likes),
        comments_growth: if total_comments > 0 { 15.0 } else { 0.0 },
        followers_growth: if total_followers > 0 { 12.0 } else { 0.0 },
    }
}

// ---------------------------------------------------------------------------
// Activity timeline
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    Like,
    Comment,
    Follow,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivityEvent {
    pub kind: ActivityKind,
    /// Display name of the acting user.
    pub user: String,
    /// Title of the related post; absent for follow events.
    pub post: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub at: OffsetDateTime,
}

/// Merge independently fetched event samples into one timeline, newest first,
/// truncated to `limit`.
///
/// Each source is already capped (5 likes and 5 comments per post, 5 recent
/// followers), so a busy post's older events can be absent even when they are
/// newer than another post's included ones. That truncation is the documented
/// contract, not an ordering bug.
pub fn merge_recent(mut events: Vec<ActivityEvent>, limit: usize) -> Vec<ActivityEvent> {
    events.sort_by(|a, b| b.at.cmp(&a.at));
    events.truncate(limit);
    events
}

// ---------------------------------------------------------------------------
// Cursor pagination
// ---------------------------------------------------------------------------

/// Over-fetch-by-one page trim: callers request `limit + 1` rows; a full
/// overflow row proves a later page exists and is dropped from the result.
pub fn trim_page<T>(mut rows: Vec<T>, limit: usize) -> (Vec<T>, bool) {
    let has_more = rows.len() > limit;
    if has_more {
        rows.truncate(limit);
    }
    (rows, has_more)
}
