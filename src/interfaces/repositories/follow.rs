use async_trait::async_trait;
use uuid::Uuid;
use std::borrow::Cow;

use crate::{
    entities::{follow::Follow, user::UserSummary},
    errors::AppError,
    repositories::sqlx_repo::SqlxFollowRepo,
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FollowRepository: Send + Sync {
    async fn find_follow(&self, follower_id: &Uuid, following_id: &Uuid) -> Result<Option<Follow>, AppError>;
    /// Inserts the edge. A duplicate pair surfaces as `AlreadyExists`, a missing user as `NotFound`.
    async fn create_follow(&self, follower_id: &Uuid, following_id: &Uuid) -> Result<Follow, AppError>;
    /// Returns whether an edge was removed.
    async fn delete_follow(&self, follower_id: &Uuid, following_id: &Uuid) -> Result<bool, AppError>;
    async fn list_followers(&self, user_id: &Uuid) -> Result<Vec<UserSummary>, AppError>;
    async fn list_following(&self, user_id: &Uuid) -> Result<Vec<UserSummary>, AppError>;
    async fn discover_users(&self, actor_id: &Uuid, limit: u32) -> Result<Vec<UserSummary>, AppError>;
    async fn count_followers(&self, user_id: &Uuid) -> Result<i64, AppError>;
    async fn count_following(&self, user_id: &Uuid) -> Result<i64, AppError>;
}

impl SqlxFollowRepo {
    pub fn new(pool: sqlx::PgPool) -> Self {
        SqlxFollowRepo { pool }
    }
}

#[async_trait]
impl FollowRepository for SqlxFollowRepo {
    async fn find_follow(&self, follower_id: &Uuid, following_id: &Uuid) -> Result<Option<Follow>, AppError> {
        let follow = sqlx::query_as::<_, Follow>(
            r#"
            SELECT id, follower_id, following_id, created_at
            FROM follows
            WHERE follower_id = $1 AND following_id = $2
            "#,
        )
        .bind(follower_id)
        .bind(following_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(follow)
    }

    async fn create_follow(&self, follower_id: &Uuid, following_id: &Uuid) -> Result<Follow, AppError> {
        sqlx::query_as::<_, Follow>(
            r#"
            INSERT INTO follows (follower_id, following_id, created_at)
            VALUES ($1, $2, NOW())
            RETURNING id, follower_id, following_id, created_at
            "#,
        )
        .bind(follower_id)
        .bind(following_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            match e {
                sqlx::Error::Database(db_err) if db_err.code() == Some(Cow::Borrowed("23505")) => {
                    AppError::AlreadyExists("Already following this user".to_string())
                }
                sqlx::Error::Database(db_err) if db_err.code() == Some(Cow::Borrowed("23503")) => {
                    AppError::NotFound("User not found".to_string())
                }
                _ => AppError::from(e),
            }
        })
    }

    async fn delete_follow(&self, follower_id: &Uuid, following_id: &Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND following_id = $2")
            .bind(follower_id)
            .bind(following_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_followers(&self, user_id: &Uuid) -> Result<Vec<UserSummary>, AppError> {
        let users = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT u.id, u.name, u.email, u.image
            FROM follows f
            JOIN users u ON u.id = f.follower_id
            WHERE f.following_id = $1
            ORDER BY f.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn list_following(&self, user_id: &Uuid) -> Result<Vec<UserSummary>, AppError> {
        let users = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT u.id, u.name, u.email, u.image
            FROM follows f
            JOIN users u ON u.id = f.following_id
            WHERE f.follower_id = $1
            ORDER BY f.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn discover_users(&self, actor_id: &Uuid, limit: u32) -> Result<Vec<UserSummary>, AppError> {
        let users = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT u.id, u.name, u.email, u.image
            FROM users u
            WHERE u.id <> $1
              AND NOT EXISTS (
                  SELECT 1 FROM follows f
                  WHERE f.follower_id = $1 AND f.following_id = u.id
              )
            ORDER BY u.created_at DESC
            LIMIT $2
            "#,
        )
        .bind(actor_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn count_followers(&self, user_id: &Uuid) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM follows WHERE following_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn count_following(&self, user_id: &Uuid) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM follows WHERE follower_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
