//! Like repository for Chirp.

use sqlx::SqlitePool;

use crate::{ChirpError, Result};

/// Repository for post likes.
pub struct LikeRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> LikeRepository<'a> {
    /// Create a new LikeRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Record a like. Fails on duplicate (primary key) — callers check
    /// `is_liked` first to surface a conflict.
    pub async fn add(&self, user_id: i64, post_id: i64) -> Result<()> {
        sqlx::query("INSERT INTO likes (user_id, post_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(post_id)
            .execute(self.pool)
            .await
            .map_err(|e| ChirpError::Database(e.to_string()))?;
        Ok(())
    }

    /// Remove a like. Returns true if a like was removed.
    pub async fn remove(&self, user_id: i64, post_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM likes WHERE user_id = ? AND post_id = ?")
            .bind(user_id)
            .bind(post_id)
            .execute(self.pool)
            .await
            .map_err(|e| ChirpError::Database(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }

    /// Check whether a user has liked a post.
    pub async fn is_liked(&self, user_id: i64, post_id: i64) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM likes WHERE user_id = ? AND post_id = ?)",
        )
        .bind(user_id)
        .bind(post_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| ChirpError::Database(e.to_string()))?;
        Ok(exists)
    }

    /// Count likes for a post.
    pub async fn count_for_post(&self, post_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM likes WHERE post_id = ?")
            .bind(post_id)
            .fetch_one(self.pool)
            .await
            .map_err(|e| ChirpError::Database(e.to_string()))?;
        Ok(count)
    }

    /// Posts ranked by like count, descending. Returns (post_id, count).
    pub async fn top_posts(&self, limit: i64) -> Result<Vec<(i64, i64)>> {
        let rows: Vec<(i64, i64)> = sqlx::query_as(
            "SELECT post_id, COUNT(*) AS like_count
             FROM likes GROUP BY post_id
             ORDER BY like_count DESC, post_id LIMIT ?",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await
        .map_err(|e| ChirpError::Database(e.to_string()))?;
        Ok(rows)
    }
}
