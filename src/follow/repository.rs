//! Follow repository for Chirp.

use sqlx::SqlitePool;

use crate::db::User;
use crate::{ChirpError, Result};

/// Repository for follow relationships.
pub struct FollowRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> FollowRepository<'a> {
    /// Create a new FollowRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Record a follow relationship. Fails on duplicate (primary key) —
    /// callers check `is_following` first to surface a conflict.
    pub async fn add(&self, follower_id: i64, followee_id: i64) -> Result<()> {
        sqlx::query("INSERT INTO follows (follower_id, followee_id) VALUES (?, ?)")
            .bind(follower_id)
            .bind(followee_id)
            .execute(self.pool)
            .await
            .map_err(|e| ChirpError::Database(e.to_string()))?;
        Ok(())
    }

    /// Remove a follow relationship. Returns true if one was removed.
    pub async fn remove(&self, follower_id: i64, followee_id: i64) -> Result<bool> {
        let result =
            sqlx::query("DELETE FROM follows WHERE follower_id = ? AND followee_id = ?")
                .bind(follower_id)
                .bind(followee_id)
                .execute(self.pool)
                .await
                .map_err(|e| ChirpError::Database(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }

    /// Check whether follower follows followee.
    pub async fn is_following(&self, follower_id: i64, followee_id: i64) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM follows WHERE follower_id = ? AND followee_id = ?)",
        )
        .bind(follower_id)
        .bind(followee_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| ChirpError::Database(e.to_string()))?;
        Ok(exists)
    }

    /// List the users following `user_id`, oldest follow first.
    pub async fn followers(&self, user_id: i64, offset: i64, limit: i64) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT u.id, u.email, u.password, u.name, u.avatar, u.profile, u.roles,
                    u.created_at, u.updated_at
             FROM follows f JOIN users u ON u.id = f.follower_id
             WHERE f.followee_id = ?
             ORDER BY f.created_at, u.id LIMIT ? OFFSET ?",
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await
        .map_err(|e| ChirpError::Database(e.to_string()))?;

        Ok(users)
    }

    /// List the users that `user_id` follows, oldest follow first.
    pub async fn following(&self, user_id: i64, offset: i64, limit: i64) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT u.id, u.email, u.password, u.name, u.avatar, u.profile, u.roles,
                    u.created_at, u.updated_at
             FROM follows f JOIN users u ON u.id = f.followee_id
             WHERE f.follower_id = ?
             ORDER BY f.created_at, u.id LIMIT ? OFFSET ?",
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await
        .map_err(|e| ChirpError::Database(e.to_string()))?;

        Ok(users)
    }

    /// Count the followers of a user.
    pub async fn count_followers(&self, user_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM follows WHERE followee_id = ?")
            .bind(user_id)
            .fetch_one(self.pool)
            .await
            .map_err(|e| ChirpError::Database(e.to_string()))?;
        Ok(count)
    }

    /// Count the users a user follows.
    pub async fn count_following(&self, user_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM follows WHERE follower_id = ?")
            .bind(user_id)
            .fetch_one(self.pool)
            .await
            .map_err(|e| ChirpError::Database(e.to_string()))?;
        Ok(count)
    }

    /// Users ranked by follower count, descending. Returns (user_id, count).
    pub async fn most_followed(&self, limit: i64) -> Result<Vec<(i64, i64)>> {
        let rows: Vec<(i64, i64)> = sqlx::query_as(
            "SELECT followee_id, COUNT(*) AS follower_count
             FROM follows GROUP BY followee_id
             ORDER BY follower_count DESC, followee_id LIMIT ?",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await
        .map_err(|e| ChirpError::Database(e.to_string()))?;
        Ok(rows)
    }
}
