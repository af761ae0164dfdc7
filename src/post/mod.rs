//! Micropost module for Chirp.
//!
//! Posts, likes and comments, with a repository per aggregate.

mod comment_repository;
mod like_repository;
mod repository;
mod types;

pub use comment_repository::CommentRepository;
pub use like_repository::LikeRepository;
pub use repository::PostRepository;
pub use types::{Comment, NewComment, NewPost, Post};
