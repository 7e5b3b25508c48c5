use anyhow::Result;
use serde::Serialize;
use sqlx::Row;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::app::posts::{post_from_row, POST_COLUMNS};
use crate::domain::post::Post;
use crate::domain::ranking::{self, ActivityEvent, ActivityKind, CreatorAnalytics};
use crate::infra::db::Db;

#[derive(Clone)]
pub struct DashboardService {
    db: Db,
}

/// Per-source sample size for the activity timeline. Older events on a busy
/// post fall outside the sample; see [`ranking::merge_recent`].
const ACTIVITY_SAMPLE: i64 = 5;

#[derive(Debug, Clone, Serialize)]
pub struct PostAnalytics {
    #[serde(flatten)]
    pub post: Post,
    pub comment_count: i64,
}

impl DashboardService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Lifetime and trailing-30-day engagement totals across all of the
    /// creator's posts. Issues one comment-count read per post; the composite
    /// is a best-effort snapshot, not a transactional one.
    pub async fn analytics(&self, user_id: Uuid) -> Result<CreatorAnalytics> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM posts WHERE author_id = $1",
            POST_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(self.db.pool())
        .await?;
        let posts = rows.iter().map(post_from_row).collect::<Result<Vec<Post>>>()?;

        let mut total_comments: i64 = 0;
        for post in &posts {
            let count: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM comments WHERE post_id = $1 AND status = 'approved'",
            )
            .bind(post.id)
            .fetch_one(self.db.pool())
            .await?;
            total_comments += count;
        }

        let total_followers: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM follows WHERE following_id = $1")
                .bind(user_id)
                .fetch_one(self.db.pool())
                .await?;

        Ok(ranking::compute_analytics(
            &posts,
            total_comments,
            total_followers,
            OffsetDateTime::now_utc(),
        ))
    }

    /// Recent likes and comments on the creator's posts plus recent new
    /// followers, merged into one timeline. Each source is sampled (newest
    /// `ACTIVITY_SAMPLE` per post), then merged and truncated to `limit`.
    pub async fn recent_activity(&self, user_id: Uuid, limit: usize) -> Result<Vec<ActivityEvent>> {
        let posts = sqlx::query("SELECT id, title FROM posts WHERE author_id = $1")
            .bind(user_id)
            .fetch_all(self.db.pool())
            .await?;

        let mut events: Vec<ActivityEvent> = Vec::new();

        for post in &posts {
            let post_id: Uuid = post.get("id");
            let title: String = post.get("title");

            let likes = sqlx::query(
                "SELECT u.name, l.created_at \
                 FROM likes l \
                 JOIN users u ON u.id = l.user_id \
                 WHERE l.post_id = $1 \
                 ORDER BY l.created_at DESC \
                 LIMIT $2",
            )
            .bind(post_id)
            .bind(ACTIVITY_SAMPLE)
            .fetch_all(self.db.pool())
            .await?;

            for like in likes {
                events.push(ActivityEvent {
                    kind: ActivityKind::Like,
                    user: like.get("name"),
                    post: Some(title.clone()),
                    at: like.get("created_at"),
                });
            }

            let comments = sqlx::query(
                "SELECT author_name, created_at \
                 FROM comments \
                 WHERE post_id = $1 AND status = 'approved' \
                 ORDER BY created_at DESC \
                 LIMIT $2",
            )
            .bind(post_id)
            .bind(ACTIVITY_SAMPLE)
            .fetch_all(self.db.pool())
            .await?;

            for comment in comments {
                events.push(ActivityEvent {
                    kind: ActivityKind::Comment,
                    user: comment.get("author_name"),
                    post: Some(title.clone()),
                    at: comment.get("created_at"),
                });
            }
        }

        let followers = sqlx::query(
            "SELECT u.name, f.created_at \
             FROM follows f \
             JOIN users u ON u.id = f.follower_id \
             WHERE f.following_id = $1 \
             ORDER BY f.created_at DESC \
             LIMIT $2",
        )
        .bind(user_id)
        .bind(ACTIVITY_SAMPLE)
        .fetch_all(self.db.pool())
        .await?;

        for follow in followers {
            events.push(ActivityEvent {
                kind: ActivityKind::Follow,
                user: follow.get("name"),
                post: None,
                at: follow.get("created_at"),
            });
        }

        Ok(ranking::merge_recent(events, limit))
    }

    /// The creator's newest posts with their approved comment counts.
    pub async fn posts_with_analytics(
        &self,
        user_id: Uuid,
        limit: i64,
    ) -> Result<Vec<PostAnalytics>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM posts \
             WHERE author_id = $1 \
             ORDER BY created_at DESC \
             LIMIT $2",
            POST_COLUMNS
        ))
        .bind(user_id)
        .bind(limit)
        .fetch_all(self.db.pool())
        .await?;
        let posts = rows.iter().map(post_from_row).collect::<Result<Vec<Post>>>()?;

        let mut analytics = Vec::with_capacity(posts.len());
        for post in posts {
            let comment_count: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM comments WHERE post_id = $1 AND status = 'approved'",
            )
            .bind(post.id)
            .fetch_one(self.db.pool())
            .await?;
            analytics.push(PostAnalytics {
                post,
                comment_count,
            });
        }

        Ok(analytics)
    }
}
