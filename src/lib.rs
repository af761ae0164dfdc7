//! Chirp - a micropost social network backend.
//!
//! Users register and authenticate, post short messages with an optional
//! image reference, follow other users, like and comment on posts, and
//! administrators view rankings and manage roles. The server exposes a JSON
//! REST API guarded by signed, stateless session tokens.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod follow;
pub mod logging;
pub mod post;
pub mod web;

pub use auth::{hash_password, validate_password, verify_password, PasswordError};
pub use config::Config;
pub use db::{Database, NewUser, Role, RoleSet, User, UserRepository, UserUpdate};
pub use error::{ChirpError, Result};
pub use follow::FollowRepository;
pub use post::{
    Comment, CommentRepository, LikeRepository, NewComment, NewPost, Post, PostRepository,
};
pub use web::WebServer;
