//! Post repository for Chirp.

use sqlx::SqlitePool;

use super::types::{NewPost, Post};
use crate::{ChirpError, Result};

/// Repository for micropost CRUD and timeline queries.
pub struct PostRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> PostRepository<'a> {
    /// Create a new PostRepository with the given database pool reference.
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new post.
    ///
    /// Returns the created post with the assigned ID.
    pub async fn create(&self, new_post: &NewPost) -> Result<Post> {
        let result = sqlx::query("INSERT INTO posts (author_id, body, image) VALUES (?, ?, ?)")
            .bind(new_post.author_id)
            .bind(&new_post.body)
            .bind(&new_post.image)
            .execute(self.pool)
            .await
            .map_err(|e| ChirpError::Database(e.to_string()))?;

        let id = result.last_insert_rowid();
        self.get_by_id(id)
            .await?
            .ok_or_else(|| ChirpError::NotFound("post".to_string()))
    }

    /// Get a post by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Post>> {
        let result = sqlx::query_as::<_, Post>(
            "SELECT id, author_id, body, image, created_at FROM posts WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await
        .map_err(|e| ChirpError::Database(e.to_string()))?;

        Ok(result)
    }

    /// Delete a post by ID.
    ///
    /// Likes and comments cascade with the post row.
    /// Returns true if a post was deleted, false if not found.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| ChirpError::Database(e.to_string()))?;
        Ok(result.rows_affected() > 0)
    }

    /// List recent posts across all users, newest first.
    pub async fn list_recent(&self, offset: i64, limit: i64) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(
            "SELECT id, author_id, body, image, created_at
             FROM posts ORDER BY id DESC LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await
        .map_err(|e| ChirpError::Database(e.to_string()))?;

        Ok(posts)
    }

    /// Count all posts.
    pub async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(self.pool)
            .await
            .map_err(|e| ChirpError::Database(e.to_string()))?;
        Ok(count)
    }

    /// List posts by a single author, newest first.
    pub async fn list_by_author(&self, author_id: i64, offset: i64, limit: i64) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(
            "SELECT id, author_id, body, image, created_at
             FROM posts WHERE author_id = ? ORDER BY id DESC LIMIT ? OFFSET ?",
        )
        .bind(author_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await
        .map_err(|e| ChirpError::Database(e.to_string()))?;

        Ok(posts)
    }

    /// Count posts by a single author.
    pub async fn count_by_author(&self, author_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE author_id = ?")
            .bind(author_id)
            .fetch_one(self.pool)
            .await
            .map_err(|e| ChirpError::Database(e.to_string()))?;
        Ok(count)
    }

    /// Home timeline for a user: own posts plus posts by followed users,
    /// newest first.
    pub async fn feed(&self, user_id: i64, offset: i64, limit: i64) -> Result<Vec<Post>> {
        let posts = sqlx::query_as::<_, Post>(
            "SELECT id, author_id, body, image, created_at
             FROM posts
             WHERE author_id = ?
                OR author_id IN (SELECT followee_id FROM follows WHERE follower_id = ?)
             ORDER BY id DESC LIMIT ? OFFSET ?",
        )
        .bind(user_id)
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await
        .map_err(|e| ChirpError::Database(e.to_string()))?;

        Ok(posts)
    }

    /// Count the posts in a user's home timeline.
    pub async fn count_feed(&self, user_id: i64) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM posts
             WHERE author_id = ?
                OR author_id IN (SELECT followee_id FROM follows WHERE follower_id = ?)",
        )
        .bind(user_id)
        .bind(user_id)
        .fetch_one(self.pool)
        .await
        .map_err(|e| ChirpError::Database(e.to_string()))?;
        Ok(count)
    }

    /// Authors ranked by post count, descending. Returns (author_id, count).
    pub async fn top_authors(&self, limit: i64) -> Result<Vec<(i64, i64)>> {
        let rows: Vec<(i64, i64)> = sqlx::query_as(
            "SELECT author_id, COUNT(*) AS post_count
             FROM posts GROUP BY author_id
             ORDER BY post_count DESC, author_id LIMIT ?",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await
        .map_err(|e| ChirpError::Database(e.to_string()))?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::NewUser;
    use crate::{Database, UserRepository};

    async fn setup() -> (Database, i64, i64) {
        let db = Database::open_in_memory().await.unwrap();
        let users = UserRepository::new(db.pool());
        let alice = users
            .create(&NewUser::new("alice@example.com", "pw", "Alice"))
            .await
            .unwrap();
        let bob = users
            .create(&NewUser::new("bob@example.com", "pw", "Bob"))
            .await
            .unwrap();
        (db, alice.id, bob.id)
    }

    #[tokio::test]
    async fn test_create_and_get_post() {
        let (db, alice, _) = setup().await;
        let repo = PostRepository::new(db.pool());

        let post = repo.create(&NewPost::new(alice, "first post")).await.unwrap();
        assert_eq!(post.author_id, alice);
        assert_eq!(post.body, "first post");
        assert!(post.image.is_none());

        let found = repo.get_by_id(post.id).await.unwrap().unwrap();
        assert_eq!(found.body, "first post");

        assert!(repo.get_by_id(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_post_with_image() {
        let (db, alice, _) = setup().await;
        let repo = PostRepository::new(db.pool());

        let post = repo
            .create(&NewPost::new(alice, "look at this").with_image("/images/cat.png"))
            .await
            .unwrap();
        assert_eq!(post.image, Some("/images/cat.png".to_string()));
    }

    #[tokio::test]
    async fn test_delete_post() {
        let (db, alice, _) = setup().await;
        let repo = PostRepository::new(db.pool());

        let post = repo.create(&NewPost::new(alice, "to delete")).await.unwrap();
        assert!(repo.delete(post.id).await.unwrap());
        assert!(repo.get_by_id(post.id).await.unwrap().is_none());
        assert!(!repo.delete(post.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_list_recent_newest_first() {
        let (db, alice, bob) = setup().await;
        let repo = PostRepository::new(db.pool());

        repo.create(&NewPost::new(alice, "one")).await.unwrap();
        repo.create(&NewPost::new(bob, "two")).await.unwrap();
        repo.create(&NewPost::new(alice, "three")).await.unwrap();

        let posts = repo.list_recent(0, 10).await.unwrap();
        assert_eq!(posts.len(), 3);
        assert_eq!(posts[0].body, "three");
        assert_eq!(posts[2].body, "one");

        let page = repo.list_recent(1, 1).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].body, "two");

        assert_eq!(repo.count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_list_by_author() {
        let (db, alice, bob) = setup().await;
        let repo = PostRepository::new(db.pool());

        repo.create(&NewPost::new(alice, "a1")).await.unwrap();
        repo.create(&NewPost::new(bob, "b1")).await.unwrap();
        repo.create(&NewPost::new(alice, "a2")).await.unwrap();

        let posts = repo.list_by_author(alice, 0, 10).await.unwrap();
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].body, "a2");

        assert_eq!(repo.count_by_author(alice).await.unwrap(), 2);
        assert_eq!(repo.count_by_author(bob).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_feed_includes_own_and_followed() {
        let (db, alice, bob) = setup().await;
        let users = UserRepository::new(db.pool());
        let carol = users
            .create(&NewUser::new("carol@example.com", "pw", "Carol"))
            .await
            .unwrap();
        let repo = PostRepository::new(db.pool());

        repo.create(&NewPost::new(alice, "by alice")).await.unwrap();
        repo.create(&NewPost::new(bob, "by bob")).await.unwrap();
        repo.create(&NewPost::new(carol.id, "by carol")).await.unwrap();

        // Alice follows Bob only
        sqlx::query("INSERT INTO follows (follower_id, followee_id) VALUES (?, ?)")
            .bind(alice)
            .bind(bob)
            .execute(db.pool())
            .await
            .unwrap();

        let feed = repo.feed(alice, 0, 10).await.unwrap();
        let bodies: Vec<_> = feed.iter().map(|p| p.body.as_str()).collect();
        assert_eq!(bodies, vec!["by bob", "by alice"]);
        assert_eq!(repo.count_feed(alice).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_top_authors() {
        let (db, alice, bob) = setup().await;
        let repo = PostRepository::new(db.pool());

        repo.create(&NewPost::new(alice, "a1")).await.unwrap();
        repo.create(&NewPost::new(bob, "b1")).await.unwrap();
        repo.create(&NewPost::new(bob, "b2")).await.unwrap();

        let top = repo.top_authors(10).await.unwrap();
        assert_eq!(top[0], (bob, 2));
        assert_eq!(top[1], (alice, 1));

        let top1 = repo.top_authors(1).await.unwrap();
        assert_eq!(top1.len(), 1);
    }
}
