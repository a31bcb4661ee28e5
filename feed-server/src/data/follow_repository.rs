use crate::domain::error::DomainError;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

/// Directed follow edges. At most one edge per `(user, author)` pair; the
/// store's unique constraint is the only thing enforcing that.
#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Returns `false` when the edge already existed.
    async fn insert(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, DomainError>;
    /// Returns `false` when there was nothing to remove.
    async fn delete(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, DomainError>;
    async fn exists(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, DomainError>;
    async fn followed_authors(&self, user_id: Uuid) -> Result<Vec<Uuid>, DomainError>;
}

#[derive(Clone)]
pub struct PostgresFollowRepository {
    pool: PgPool,
}

impl PostgresFollowRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FollowRepository for PostgresFollowRepository {
    async fn insert(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, DomainError> {
        // concurrent subscribers race on the constraint, the loser inserts nothing
        let inserted = sqlx::query(
            r#"
            INSERT INTO follows (user_id, author_id)
            VALUES ($1, $2)
            ON CONFLICT ON CONSTRAINT follows_unique_subscription DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(author_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            error!("failed to insert follow {} -> {}: {}", user_id, author_id, e);
            match e.as_database_error().and_then(|db| db.constraint()) {
                Some("follows_user_id_fkey") => DomainError::UserNotFound(user_id),
                Some("follows_author_id_fkey") => DomainError::AuthorNotFound(author_id.to_string()),
                _ => DomainError::from(e),
            }
        })?;

        let created = inserted.rows_affected() > 0;
        if created {
            info!(user_id = %user_id, author_id = %author_id, "follow created");
        }
        Ok(created)
    }

    async fn delete(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, DomainError> {
        let deleted = sqlx::query("DELETE FROM follows WHERE user_id = $1 AND author_id = $2")
            .bind(user_id)
            .bind(author_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("failed to delete follow {} -> {}: {}", user_id, author_id, e);
                DomainError::from(e)
            })?;

        let removed = deleted.rows_affected() > 0;
        if removed {
            info!(user_id = %user_id, author_id = %author_id, "follow removed");
        }
        Ok(removed)
    }

    async fn exists(&self, user_id: Uuid, author_id: Uuid) -> Result<bool, DomainError> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM follows WHERE user_id = $1 AND author_id = $2)",
        )
        .bind(user_id)
        .bind(author_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("db error checking follow {} -> {}: {}", user_id, author_id, e);
            DomainError::from(e)
        })
    }

    async fn followed_authors(&self, user_id: Uuid) -> Result<Vec<Uuid>, DomainError> {
        sqlx::query_scalar("SELECT author_id FROM follows WHERE user_id = $1 ORDER BY id")
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!("db error listing authors followed by {}: {}", user_id, e);
                DomainError::from(e)
            })
    }
}
