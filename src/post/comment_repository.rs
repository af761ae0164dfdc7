//! Comment repository for Chirp.

use sqlx::SqlitePool;

use super::types::{Comment, NewComment};
use crate::{ChirpError, Result};

/// Repository for post comments.
pub struct CommentRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CommentRepository<'a> {
    /// Create a new CommentRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new comment.
    ///
    /// Returns the created comment with the assigned ID.
    pub async fn create(&self, new_comment: &NewComment) -> Result<Comment> {
        let result =
            sqlx::query("INSERT INTO comments (post_id, author_id, body) VALUES (?, ?, ?)")
                .bind(new_comment.post_id)
                .bind(new_comment.author_id)
                .bind(&new_comment.body)
                .execute(self.pool)
                .await
                .map_err(|e| ChirpError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| ChirpError::NotFound("comment".to_string()))
    }

    /// Get a comment by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Comment>> {
        let result = sqlx::query_as::<_, Comment>(
            "SELECT id, post_id, author_id, body, created_at FROM comments WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| ChirpError::Database(e.to_string()))?;

        Ok(result)
    }

    /// Delete a comment by ID. Returns true if a comment was deleted.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| ChirpError::Database(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }

    /// List comments on a post, oldest first.
    pub async fn list_by_post(&self, post_id: i64, offset: i64, limit: i64) -> Result<Vec<Comment>> {
        let comments = sqlx::query_as::<_, Comment>(
            "SELECT id, post_id, author_id, body, created_at
             FROM comments WHERE post_id = ? ORDER BY id LIMIT ? OFFSET ?",
        )
        .bind(post_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await
        .map_err(|e| ChirpError::Database(e.to_string()))?;

        Ok(comments)
    }

    /// Count comments on a post.
    pub async fn count_by_post(&self, post_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE post_id = ?")
            .bind(post_id)
            .fetch_one(self.pool)
            .await
            .map_err(|e| ChirpError::Database(e.to_string()))?;
        Ok(count)
    }
}
