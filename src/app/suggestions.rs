use anyhow::Result;
use futures::future::try_join_all;
use sqlx::Row;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::app::social::SocialService;
use crate::domain::ranking::{self, RankedSuggestion, SuggestionCandidate};
use crate::domain::user::AuthorSummary;
use crate::infra::db::Db;

#[derive(Clone)]
pub struct SuggestionService {
    db: Db,
}

/// How many recent posts feed a candidate's engagement score.
const POSTS_PER_CANDIDATE: i64 = 5;

impl SuggestionService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Suggest authors for the caller to follow. Candidates are every user
    /// with a username, minus the caller and anyone they already follow; an
    /// anonymous caller gets the unfiltered pool. Scoring and ordering live
    /// in [`ranking::rank_suggestions`].
    pub async fn suggested_users(
        &self,
        caller_id: Option<Uuid>,
        limit: usize,
    ) -> Result<Vec<RankedSuggestion>> {
        let rows = sqlx::query(
            "SELECT id, name, username, avatar_url \
             FROM users \
             WHERE username IS NOT NULL \
               AND ($1::uuid IS NULL OR ( \
                   id <> $1 \
                   AND NOT EXISTS ( \
                       SELECT 1 FROM follows \
                       WHERE follower_id = $1 AND following_id = users.id \
                   ) \
               ))",
        )
        .bind(caller_id)
        .fetch_all(self.db.pool())
        .await?;

        let social = SocialService::new(self.db.clone());
        let candidates = try_join_all(rows.iter().map(|row| {
            let author = AuthorSummary {
                id: row.get("id"),
                name: row.get("name"),
                username: row.get("username"),
                avatar_url: row.get("avatar_url"),
            };
            let social = social.clone();
            async move {
                let posts = social
                    .recent_published_digests(author.id, POSTS_PER_CANDIDATE)
                    .await?;
                let follower_count = social.follower_count(author.id).await?;
                Ok::<_, anyhow::Error>(SuggestionCandidate {
                    author,
                    follower_count,
                    posts,
                })
            }
        }))
        .await?;

        Ok(ranking::rank_suggestions(
            candidates,
            OffsetDateTime::now_utc(),
            limit,
        ))
    }
}
