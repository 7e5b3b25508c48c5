use anyhow::Result;
use sqlx::Row;
use uuid::Uuid;

use crate::domain::engagement::{Comment, CommentWithAuthor, Like};
use crate::domain::user::AuthorSummary;
use crate::infra::db::Db;

#[derive(Clone)]
pub struct EngagementService {
    db: Db,
}

impl EngagementService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Add an approved comment to a published post. Returns `None` when the
    /// post is missing or not published; content is assumed validated
    /// (trimmed, 1-1000 chars) by the caller.
    pub async fn add_comment(
        &self,
        author_id: Uuid,
        author_name: &str,
        post_id: Uuid,
        content: &str,
    ) -> Result<Option<Comment>> {
        let publishable: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM posts WHERE id = $1 AND status = 'published')",
        )
        .bind(post_id)
        .fetch_one(self.db.pool())
        .await?;

        if !publishable {
            return Ok(None);
        }

        let row = sqlx::query(
            "INSERT INTO comments (post_id, author_id, author_name, content) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, post_id, author_id, author_name, content, status, created_at",
        )
        .bind(post_id)
        .bind(author_id)
        .bind(author_name)
        .bind(content)
        .fetch_one(self.db.pool())
        .await?;

        Ok(Some(Comment {
            id: row.get("id"),
            post_id: row.get("post_id"),
            author_id: row.get("author_id"),
            author_name: row.get("author_name"),
            content: row.get("content"),
            status: row.get("status"),
            created_at: row.get("created_at"),
        }))
    }

    /// Approved comments on a post, oldest first, annotated with the
    /// commenting user. Comments whose author no longer resolves drop out.
    pub async fn post_comments(&self, post_id: Uuid) -> Result<Vec<CommentWithAuthor>> {
        let rows = sqlx::query(
            "SELECT c.id, c.post_id, c.author_id, c.author_name, c.content, c.status, \
                    c.created_at, \
                    u.name, u.username, u.avatar_url \
             FROM comments c \
             JOIN users u ON u.id = c.author_id \
             WHERE c.post_id = $1 AND c.status = 'approved' \
             ORDER BY c.created_at ASC",
        )
        .bind(post_id)
        .fetch_all(self.db.pool())
        .await?;

        let comments = rows
            .iter()
            .map(|row| CommentWithAuthor {
                comment: Comment {
                    id: row.get("id"),
                    post_id: row.get("post_id"),
                    author_id: row.get("author_id"),
                    author_name: row.get("author_name"),
                    content: row.get("content"),
                    status: row.get("status"),
                    created_at: row.get("created_at"),
                },
                author: AuthorSummary {
                    id: row.get("author_id"),
                    name: row.get("name"),
                    username: row.get("username"),
                    avatar_url: row.get("avatar_url"),
                },
            })
            .collect();

        Ok(comments)
    }

    /// Delete a comment on behalf of either its author or the post's author.
    pub async fn delete_comment(&self, comment_id: Uuid, caller_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            "DELETE FROM comments c \
             WHERE c.id = $1 \
               AND (c.author_id = $2 OR EXISTS ( \
                   SELECT 1 FROM posts p WHERE p.id = c.post_id AND p.author_id = $2 \
               ))",
        )
        .bind(comment_id)
        .bind(caller_id)
        .execute(self.db.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Like a published post, keeping the denormalized counter in step.
    /// Returns `None` when the edge already existed.
    pub async fn like_post(&self, user_id: Uuid, post_id: Uuid) -> Result<Option<Like>> {
        let mut tx = self.db.pool().begin().await?;

        let row = sqlx::query(
            "INSERT INTO likes (user_id, post_id) \
             SELECT $1, $2 WHERE EXISTS ( \
                 SELECT 1 FROM posts WHERE id = $2 AND status = 'published' \
             ) \
             ON CONFLICT DO NOTHING \
             RETURNING id, user_id, post_id, created_at",
        )
        .bind(user_id)
        .bind(post_id)
        .fetch_optional(&mut *tx)
        .await?;

        let like = match row {
            Some(row) => {
                sqlx::query("UPDATE posts SET like_count = like_count + 1 WHERE id = $1")
                    .bind(post_id)
                    .execute(&mut *tx)
                    .await?;
                Some(Like {
                    id: row.get("id"),
                    user_id: row.get("user_id"),
                    post_id: row.get("post_id"),
                    created_at: row.get("created_at"),
                })
            }
            None => None,
        };

        tx.commit().await?;
        Ok(like)
    }

    pub async fn unlike_post(&self, user_id: Uuid, post_id: Uuid) -> Result<bool> {
        let mut tx = self.db.pool().begin().await?;

        let result = sqlx::query("DELETE FROM likes WHERE user_id = $1 AND post_id = $2")
            .bind(user_id)
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        let removed = result.rows_affected() > 0;
        if removed {
            sqlx::query(
                "UPDATE posts SET like_count = GREATEST(like_count - 1, 0) WHERE id = $1",
            )
            .bind(post_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(removed)
    }
}
