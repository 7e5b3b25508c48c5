use anyhow::Result;
use sqlx::Row;
use std::collections::HashMap;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::app::posts::{post_from_row, POST_COLUMNS};
use crate::domain::post::{Post, PostWithAuthor};
use crate::domain::ranking::{self, Scored};
use crate::domain::stats::DailyStat;
use crate::domain::user::AuthorSummary;
use crate::infra::db::Db;

#[derive(Clone)]
pub struct FeedService {
    db: Db,
}

#[derive(Debug)]
pub struct FeedPage {
    pub posts: Vec<PostWithAuthor>,
    pub has_more: bool,
    pub next_cursor: Option<Uuid>,
}

impl FeedService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Global feed of published posts, newest first. Over-fetches by one row
    /// to detect a later page; rows whose author cannot be resolved are
    /// filtered out by the inner join.
    pub async fn global_feed(&self, limit: i64) -> Result<FeedPage> {
        let rows = sqlx::query(
            "SELECT p.id, p.author_id, p.title, p.content, p.status, p.tags, p.category, \
                    p.featured_image, p.created_at, p.updated_at, p.published_at, \
                    p.scheduled_for, p.view_count, p.like_count, \
                    u.name AS author_name, u.username AS author_username, \
                    u.avatar_url AS author_avatar_url \
             FROM posts p \
             JOIN users u ON u.id = p.author_id \
             WHERE p.status = 'published' \
             ORDER BY p.published_at DESC, p.id DESC \
             LIMIT $1",
        )
        .bind(limit + 1)
        .fetch_all(self.db.pool())
        .await?;

        let posts = rows
            .iter()
            .map(|row| {
                let post = post_from_row(row)?;
                Ok(PostWithAuthor {
                    author: AuthorSummary {
                        id: post.author_id,
                        name: row.get("author_name"),
                        username: row.get("author_username"),
                        avatar_url: row.get("author_avatar_url"),
                    },
                    post,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let (posts, has_more) = ranking::trim_page(posts, limit as usize);
        let next_cursor = if has_more {
            posts.last().map(|p| p.post.id)
        } else {
            None
        };

        Ok(FeedPage {
            posts,
            has_more,
            next_cursor,
        })
    }

    /// Published posts of one author, addressed by username. The cursor is
    /// the id of the last row of the previous page; an unknown username
    /// yields an empty page rather than an error.
    pub async fn published_by_username(
        &self,
        username: &str,
        limit: i64,
        cursor: Option<Uuid>,
    ) -> Result<FeedPage> {
        let author = sqlx::query(
            "SELECT id, name, username, avatar_url FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(self.db.pool())
        .await?;

        let Some(author) = author else {
            return Ok(FeedPage {
                posts: Vec::new(),
                has_more: false,
                next_cursor: None,
            });
        };

        let author = AuthorSummary {
            id: author.get("id"),
            name: author.get("name"),
            username: author.get("username"),
            avatar_url: author.get("avatar_url"),
        };

        let rows = sqlx::query(&format!(
            "SELECT {} FROM posts \
             WHERE author_id = $1 AND status = 'published' \
               AND ($2::uuid IS NULL OR (published_at, id) < ( \
                   SELECT published_at, id FROM posts WHERE id = $2 \
               )) \
             ORDER BY published_at DESC, id DESC \
             LIMIT $3",
            POST_COLUMNS
        ))
        .bind(author.id)
        .bind(cursor)
        .bind(limit + 1)
        .fetch_all(self.db.pool())
        .await?;

        let posts = rows.iter().map(post_from_row).collect::<Result<Vec<_>>>()?;
        let (posts, has_more) = ranking::trim_page(posts, limit as usize);
        let next_cursor = if has_more {
            posts.last().map(|p| p.id)
        } else {
            None
        };

        let posts = posts
            .into_iter()
            .map(|post| PostWithAuthor {
                author: author.clone(),
                post,
            })
            .collect();

        Ok(FeedPage {
            posts,
            has_more,
            next_cursor,
        })
    }

    /// A single published post on an author's public profile. `None` unless
    /// the post exists, belongs to that username, and is published.
    pub async fn published_post(
        &self,
        username: &str,
        post_id: Uuid,
    ) -> Result<Option<PostWithAuthor>> {
        let row = sqlx::query(
            "SELECT p.id, p.author_id, p.title, p.content, p.status, p.tags, p.category, \
                    p.featured_image, p.created_at, p.updated_at, p.published_at, \
                    p.scheduled_for, p.view_count, p.like_count, \
                    u.name AS author_name, u.username AS author_username, \
                    u.avatar_url AS author_avatar_url \
             FROM posts p \
             JOIN users u ON u.id = p.author_id \
             WHERE p.id = $1 AND u.username = $2 AND p.status = 'published'",
        )
        .bind(post_id)
        .bind(username)
        .fetch_optional(self.db.pool())
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let post = post_from_row(&row)?;
        Ok(Some(PostWithAuthor {
            author: AuthorSummary {
                id: post.author_id,
                name: row.get("author_name"),
                username: row.get("author_username"),
                avatar_url: row.get("author_avatar_url"),
            },
            post,
        }))
    }

    /// Top posts published within the last 7 days, scored by the trending
    /// formula. Authors that no longer resolve are dropped after ranking, so
    /// a page can come back shorter than `limit`.
    pub async fn trending(&self, limit: usize) -> Result<Vec<Scored<PostWithAuthor>>> {
        let week_ago = OffsetDateTime::now_utc() - ranking::RECENCY_WINDOW;

        let rows = sqlx::query(&format!(
            "SELECT {} FROM posts \
             WHERE status = 'published' AND published_at >= $1",
            POST_COLUMNS
        ))
        .bind(week_ago)
        .fetch_all(self.db.pool())
        .await?;

        let posts = rows.iter().map(post_from_row).collect::<Result<Vec<Post>>>()?;
        let ranked = ranking::rank_trending(posts, limit);

        let author_ids: Vec<Uuid> = ranked.iter().map(|scored| scored.item.author_id).collect();
        let author_rows = sqlx::query(
            "SELECT id, name, username, avatar_url FROM users WHERE id = ANY($1)",
        )
        .bind(&author_ids)
        .fetch_all(self.db.pool())
        .await?;

        let authors: HashMap<Uuid, AuthorSummary> = author_rows
            .iter()
            .map(|row| {
                let author = AuthorSummary {
                    id: row.get("id"),
                    name: row.get("name"),
                    username: row.get("username"),
                    avatar_url: row.get("avatar_url"),
                };
                (author.id, author)
            })
            .collect();

        let trending = ranked
            .into_iter()
            .filter_map(|scored| {
                let author = authors.get(&scored.item.author_id)?.clone();
                Some(Scored {
                    item: PostWithAuthor {
                        post: scored.item,
                        author,
                    },
                    trending_score: scored.trending_score,
                })
            })
            .collect();

        Ok(trending)
    }

    /// Count one view: bump the post counter and the per-day stat row. Both
    /// statements are atomic increments, so concurrent views cannot lose
    /// updates; a missing or unpublished post is a silent no-op.
    pub async fn record_view(&self, post_id: Uuid) -> Result<bool> {
        let updated = sqlx::query(
            "UPDATE posts SET view_count = view_count + 1 \
             WHERE id = $1 AND status = 'published'",
        )
        .bind(post_id)
        .execute(self.db.pool())
        .await?;

        if updated.rows_affected() == 0 {
            return Ok(false);
        }

        let today = OffsetDateTime::now_utc().date().to_string();
        sqlx::query(
            "INSERT INTO daily_stats (post_id, date, views) VALUES ($1, $2, 1) \
             ON CONFLICT (post_id, date) \
             DO UPDATE SET views = daily_stats.views + 1, updated_at = now()",
        )
        .bind(post_id)
        .bind(today)
        .execute(self.db.pool())
        .await?;

        Ok(true)
    }

    pub async fn daily_views(&self, post_id: Uuid, days: i64) -> Result<Vec<DailyStat>> {
        let rows = sqlx::query(
            "SELECT post_id, date, views, updated_at \
             FROM daily_stats \
             WHERE post_id = $1 \
             ORDER BY date DESC \
             LIMIT $2",
        )
        .bind(post_id)
        .bind(days)
        .fetch_all(self.db.pool())
        .await?;

        let stats = rows
            .iter()
            .map(|row| DailyStat {
                post_id: row.get("post_id"),
                date: row.get("date"),
                views: row.get("views"),
                updated_at: row.get("updated_at"),
            })
            .collect();

        Ok(stats)
    }
}
