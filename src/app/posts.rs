use anyhow::{anyhow, Result};
use sqlx::postgres::PgRow;
use sqlx::Row;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::post::{Post, PostStatus};
use crate::infra::db::Db;

#[derive(Clone)]
pub struct PostService {
    db: Db,
}

#[derive(Debug, Clone)]
pub struct PostDraftInput {
    pub title: String,
    pub content: String,
    pub status: PostStatus,
    pub tags: Vec<String>,
    pub category: Option<String>,
    pub featured_image: Option<String>,
    pub scheduled_for: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub status: Option<PostStatus>,
    pub tags: Option<Vec<String>>,
    pub category: Option<String>,
    pub featured_image: Option<String>,
    pub scheduled_for: Option<OffsetDateTime>,
}

pub(crate) const POST_COLUMNS: &str =
    "id, author_id, title, content, status, tags, category, featured_image, \
     created_at, updated_at, published_at, scheduled_for, view_count, like_count";

pub(crate) fn post_from_row(row: &PgRow) -> Result<Post> {
    let status: String = row.get("status");
    let status = PostStatus::from_db(&status)
        .ok_or_else(|| anyhow!("unknown post status: {}", status))?;

    Ok(Post {
        id: row.get("id"),
        author_id: row.get("author_id"),
        title: row.get("title"),
        content: row.get("content"),
        status,
        tags: row.get("tags"),
        category: row.get("category"),
        featured_image: row.get("featured_image"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        published_at: row.get("published_at"),
        scheduled_for: row.get("scheduled_for"),
        view_count: row.get("view_count"),
        like_count: row.get("like_count"),
    })
}

impl PostService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Create a post with draft-overwrite semantics: while a draft exists,
    /// a new draft submission patches it in place and a published submission
    /// publishes it. `published_at` is set exactly once, on the
    /// draft-to-published transition.
    pub async fn create(&self, author_id: Uuid, input: PostDraftInput) -> Result<Post> {
        let mut tx = self.db.pool().begin().await?;

        let existing_draft: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM posts WHERE author_id = $1 AND status = 'draft' FOR UPDATE",
        )
        .bind(author_id)
        .fetch_optional(&mut *tx)
        .await?;

        let row = match existing_draft {
            Some(draft_id) => {
                sqlx::query(&format!(
                    "UPDATE posts \
                     SET title = $2, content = $3, status = $4, tags = $5, category = $6, \
                         featured_image = $7, scheduled_for = $8, updated_at = now(), \
                         published_at = CASE WHEN $4 = 'published' THEN now() ELSE published_at END \
                     WHERE id = $1 \
                     RETURNING {}",
                    POST_COLUMNS
                ))
                .bind(draft_id)
                .bind(&input.title)
                .bind(&input.content)
                .bind(input.status.as_db())
                .bind(&input.tags)
                .bind(&input.category)
                .bind(&input.featured_image)
                .bind(input.scheduled_for)
                .fetch_one(&mut *tx)
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "INSERT INTO posts (author_id, title, content, status, tags, category, \
                                        featured_image, scheduled_for, published_at) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, \
                             CASE WHEN $4 = 'published' THEN now() ELSE NULL END) \
                     RETURNING {}",
                    POST_COLUMNS
                ))
                .bind(author_id)
                .bind(&input.title)
                .bind(&input.content)
                .bind(input.status.as_db())
                .bind(&input.tags)
                .bind(&input.category)
                .bind(&input.featured_image)
                .bind(input.scheduled_for)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        tx.commit().await?;
        post_from_row(&row)
    }

    /// Partial update, ownership folded into the WHERE clause. A draft moving
    /// to published picks up `published_at`; it is never regressed after.
    pub async fn update(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        patch: PostPatch,
    ) -> Result<Option<Post>> {
        let row = sqlx::query(&format!(
            "UPDATE posts \
             SET title = COALESCE($3, title), \
                 content = COALESCE($4, content), \
                 tags = COALESCE($5, tags), \
                 category = COALESCE($6, category), \
                 featured_image = COALESCE($7, featured_image), \
                 scheduled_for = COALESCE($8, scheduled_for), \
                 published_at = CASE \
                     WHEN $9 = 'published' AND status = 'draft' THEN now() \
                     ELSE published_at \
                 END, \
                 status = COALESCE($9, status), \
                 updated_at = now() \
             WHERE id = $1 AND author_id = $2 \
             RETURNING {}",
            POST_COLUMNS
        ))
        .bind(post_id)
        .bind(author_id)
        .bind(&patch.title)
        .bind(&patch.content)
        .bind(&patch.tags)
        .bind(&patch.category)
        .bind(&patch.featured_image)
        .bind(patch.scheduled_for)
        .bind(patch.status.map(|status| status.as_db()))
        .fetch_optional(self.db.pool())
        .await?;

        row.map(|row| post_from_row(&row)).transpose()
    }

    pub async fn delete(&self, post_id: Uuid, author_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1 AND author_id = $2")
            .bind(post_id)
            .bind(author_id)
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn get(&self, post_id: Uuid) -> Result<Option<Post>> {
        let row = sqlx::query(&format!("SELECT {} FROM posts WHERE id = $1", POST_COLUMNS))
            .bind(post_id)
            .fetch_optional(self.db.pool())
            .await?;

        row.map(|row| post_from_row(&row)).transpose()
    }

    pub async fn user_posts(
        &self,
        author_id: Uuid,
        status: Option<PostStatus>,
    ) -> Result<Vec<Post>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM posts \
             WHERE author_id = $1 AND ($2::text IS NULL OR status = $2) \
             ORDER BY created_at DESC",
            POST_COLUMNS
        ))
        .bind(author_id)
        .bind(status.map(|status| status.as_db()))
        .fetch_all(self.db.pool())
        .await?;

        rows.iter().map(post_from_row).collect()
    }

    pub async fn user_draft(&self, author_id: Uuid) -> Result<Option<Post>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM posts WHERE author_id = $1 AND status = 'draft'",
            POST_COLUMNS
        ))
        .bind(author_id)
        .fetch_optional(self.db.pool())
        .await?;

        row.map(|row| post_from_row(&row)).transpose()
    }
}
