use anyhow::Result;
use serde::Serialize;
use sqlx::Row;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::ranking::PostDigest;
use crate::domain::user::AuthorSummary;
use crate::infra::db::Db;

#[derive(Clone)]
pub struct SocialService {
    db: Db,
}

/// A follower of the caller, with enough context to render a "follows you"
/// row: whether the caller follows back and how active they are.
#[derive(Debug, Clone, Serialize)]
pub struct FollowerEdge {
    #[serde(flatten)]
    pub user: AuthorSummary,
    #[serde(with = "time::serde::rfc3339")]
    pub followed_at: OffsetDateTime,
    pub follows_back: bool,
    pub post_count: i64,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_post_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FollowingEdge {
    #[serde(flatten)]
    pub user: AuthorSummary,
    #[serde(with = "time::serde::rfc3339")]
    pub followed_at: OffsetDateTime,
    pub follower_count: i64,
    pub post_count: i64,
    #[serde(with = "time::serde::rfc3339::option")]
    pub last_post_at: Option<OffsetDateTime>,
    pub recent_posts: Vec<PostDigest>,
}

impl SocialService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Follow when no edge exists, unfollow when one does. Returns the state
    /// after the call. The target must exist; self-follow is the caller's
    /// responsibility to reject before getting here.
    pub async fn toggle_follow(&self, follower_id: Uuid, following_id: Uuid) -> Result<bool> {
        let mut tx = self.db.pool().begin().await?;

        let removed = sqlx::query(
            "DELETE FROM follows WHERE follower_id = $1 AND following_id = $2",
        )
        .bind(follower_id)
        .bind(following_id)
        .execute(&mut *tx)
        .await?;

        let following = if removed.rows_affected() > 0 {
            false
        } else {
            sqlx::query(
                "INSERT INTO follows (follower_id, following_id) \
                 SELECT $1, $2 WHERE $1 <> $2 \
                 ON CONFLICT DO NOTHING",
            )
            .bind(follower_id)
            .bind(following_id)
            .execute(&mut *tx)
            .await?;
            true
        };

        tx.commit().await?;
        Ok(following)
    }

    pub async fn user_exists(&self, user_id: Uuid) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
                .bind(user_id)
                .fetch_one(self.db.pool())
                .await?;
        Ok(exists)
    }

    pub async fn is_following(&self, follower_id: Uuid, following_id: Uuid) -> Result<bool> {
        let following: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM follows WHERE follower_id = $1 AND following_id = $2)",
        )
        .bind(follower_id)
        .bind(following_id)
        .fetch_one(self.db.pool())
        .await?;
        Ok(following)
    }

    pub async fn follower_count(&self, user_id: Uuid) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM follows WHERE following_id = $1")
                .bind(user_id)
                .fetch_one(self.db.pool())
                .await?;
        Ok(count)
    }

    /// Newest followers of the caller, annotated per edge with a bounded
    /// (3-post) sample of the follower's publishing activity.
    pub async fn my_followers(&self, user_id: Uuid, limit: i64) -> Result<Vec<FollowerEdge>> {
        let rows = sqlx::query(
            "SELECT u.id, u.name, u.username, u.avatar_url, f.created_at AS followed_at, \
                    EXISTS ( \
                        SELECT 1 FROM follows b \
                        WHERE b.follower_id = $1 AND b.following_id = u.id \
                    ) AS follows_back \
             FROM follows f \
             JOIN users u ON u.id = f.follower_id \
             WHERE f.following_id = $1 \
             ORDER BY f.created_at DESC \
             LIMIT $2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(self.db.pool())
        .await?;

        let mut edges = Vec::with_capacity(rows.len());
        for row in rows {
            let follower_id: Uuid = row.get("id");
            let posts = self.recent_published_digests(follower_id, 3).await?;

            edges.push(FollowerEdge {
                user: AuthorSummary {
                    id: follower_id,
                    name: row.get("name"),
                    username: row.get("username"),
                    avatar_url: row.get("avatar_url"),
                },
                followed_at: row.get("followed_at"),
                follows_back: row.get("follows_back"),
                post_count: posts.len() as i64,
                last_post_at: posts.first().and_then(|p| p.published_at),
            });
        }

        Ok(edges)
    }

    /// Newest accounts the caller follows, each with follower count and up to
    /// 3 recent published post summaries.
    pub async fn my_following(&self, user_id: Uuid, limit: i64) -> Result<Vec<FollowingEdge>> {
        let rows = sqlx::query(
            "SELECT u.id, u.name, u.username, u.avatar_url, f.created_at AS followed_at, \
                    (SELECT COUNT(*) FROM follows c WHERE c.following_id = u.id) AS follower_count \
             FROM follows f \
             JOIN users u ON u.id = f.following_id \
             WHERE f.follower_id = $1 \
             ORDER BY f.created_at DESC \
             LIMIT $2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(self.db.pool())
        .await?;

        let mut edges = Vec::with_capacity(rows.len());
        for row in rows {
            let following_id: Uuid = row.get("id");
            let posts = self.recent_published_digests(following_id, 3).await?;

            edges.push(FollowingEdge {
                user: AuthorSummary {
                    id: following_id,
                    name: row.get("name"),
                    username: row.get("username"),
                    avatar_url: row.get("avatar_url"),
                },
                followed_at: row.get("followed_at"),
                follower_count: row.get("follower_count"),
                post_count: posts.len() as i64,
                last_post_at: posts.first().and_then(|p| p.published_at),
                recent_posts: posts,
            });
        }

        Ok(edges)
    }

    pub(crate) async fn recent_published_digests(
        &self,
        author_id: Uuid,
        limit: i64,
    ) -> Result<Vec<PostDigest>> {
        let rows = sqlx::query(
            "SELECT id, title, view_count, like_count, published_at \
             FROM posts \
             WHERE author_id = $1 AND status = 'published' \
             ORDER BY published_at DESC \
             LIMIT $2",
        )
        .bind(author_id)
        .bind(limit)
        .fetch_all(self.db.pool())
        .await?;

        let digests = rows
            .iter()
            .map(|row| PostDigest {
                id: row.get("id"),
                title: row.get("title"),
                view_count: row.get("view_count"),
                like_count: row.get("like_count"),
                published_at: row.get("published_at"),
            })
            .collect();

        Ok(digests)
    }
}
