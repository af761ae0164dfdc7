//! Post and comment entities.

use sqlx::FromRow;

/// A micropost.
#[derive(Debug, Clone, FromRow)]
pub struct Post {
    /// Unique post ID.
    pub id: i64,
    /// Author user ID.
    pub author_id: i64,
    /// Post body.
    pub body: String,
    /// Optional image reference.
    pub image: Option<String>,
    /// Creation timestamp.
    pub created_at: String,
}

/// Data for creating a new post.
#[derive(Debug, Clone)]
pub struct NewPost {
    /// Author user ID.
    pub author_id: i64,
    /// Post body.
    pub body: String,
    /// Optional image reference.
    pub image: Option<String>,
}

impl NewPost {
    /// Create a new post with the required fields.
    pub fn new(author_id: i64, body: impl Into<String>) -> Self {
        Self {
            author_id,
            body: body.into(),
            image: None,
        }
    }

    /// Attach an image reference.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}

/// A comment on a post.
#[derive(Debug, Clone, FromRow)]
pub struct Comment {
    /// Unique comment ID.
    pub id: i64,
    /// Post the comment belongs to.
    pub post_id: i64,
    /// Author user ID.
    pub author_id: i64,
    /// Comment body.
    pub body: String,
    /// Creation timestamp.
    pub created_at: String,
}

/// Data for creating a new comment.
#[derive(Debug, Clone)]
pub struct NewComment {
    /// Post the comment belongs to.
    pub post_id: i64,
    /// Author user ID.
    pub author_id: i64,
    /// Comment body.
    pub body: String,
}

impl NewComment {
    /// Create a new comment with the required fields.
    pub fn new(post_id: i64, author_id: i64, body: impl Into<String>) -> Self {
        Self {
            post_id,
            author_id,
            body: body.into(),
        }
    }
}
