use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::Row;
use uuid::Uuid;

use crate::domain::user::{PublicProfile, User};
use crate::http::Identity;
use crate::infra::db::Db;

#[derive(Clone)]
pub struct UserService {
    db: Db,
}

const USER_COLUMNS: &str =
    "id, token_identifier, name, username, email, avatar_url, created_at, last_active_at";

pub(crate) fn user_from_row(row: &PgRow) -> User {
    User {
        id: row.get("id"),
        token_identifier: row.get("token_identifier"),
        name: row.get("name"),
        username: row.get("username"),
        email: row.get("email"),
        avatar_url: row.get("avatar_url"),
        created_at: row.get("created_at"),
        last_active_at: row.get("last_active_at"),
    }
}

impl UserService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Resolve the provider identity to a local user row, if one exists.
    pub async fn find_by_token(&self, token_identifier: &str) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM users WHERE token_identifier = $1",
            USER_COLUMNS
        ))
        .bind(token_identifier)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.map(|row| user_from_row(&row)))
    }

    /// Session bootstrap: create the caller's user row on first sight, and
    /// pick up display-name changes from the identity provider afterwards.
    pub async fn store(&self, identity: &Identity) -> Result<User> {
        let name = identity.name.as_deref().unwrap_or("Anonymous");
        let row = sqlx::query(&format!(
            "INSERT INTO users (token_identifier, name, email, avatar_url) \
             VALUES ($1, $2, $3, $4) \
             ON CONFLICT (token_identifier) \
             DO UPDATE SET name = EXCLUDED.name, last_active_at = now() \
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(&identity.token_identifier)
        .bind(name)
        .bind(&identity.email)
        .bind(&identity.picture_url)
        .fetch_one(self.db.pool())
        .await?;

        Ok(user_from_row(&row))
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<PublicProfile>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM users WHERE username = $1",
            USER_COLUMNS
        ))
        .bind(username)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.map(|row| user_from_row(&row).into()))
    }

    /// Rename the caller. Returns `None` when the username is already taken
    /// by someone else; renaming to the current username is a no-op success.
    pub async fn update_username(&self, user_id: Uuid, username: &str) -> Result<Option<User>> {
        let taken: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM users WHERE username = $1 AND id <> $2)",
        )
        .bind(username)
        .bind(user_id)
        .fetch_one(self.db.pool())
        .await?;

        if taken {
            return Ok(None);
        }

        let row = sqlx::query(&format!(
            "UPDATE users SET username = $2, last_active_at = now() \
             WHERE id = $1 \
             RETURNING {}",
            USER_COLUMNS
        ))
        .bind(user_id)
        .bind(username)
        .fetch_one(self.db.pool())
        .await?;

        Ok(Some(user_from_row(&row)))
    }
}
