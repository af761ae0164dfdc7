//! Follow relationships between users.

mod repository;

pub use repository::FollowRepository;
