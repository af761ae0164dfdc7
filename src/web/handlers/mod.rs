//! API handlers for the Chirp web API.

pub mod admin;
pub mod auth;
pub mod follow;
pub mod post;
pub mod user;

pub use admin::*;
pub use auth::*;
pub use follow::*;
pub use post::*;
pub use user::*;

use crate::db::{User, UserRepository};
use crate::follow::FollowRepository;
use crate::post::{CommentRepository, LikeRepository, PostRepository};
use crate::web::dto::{AuthorInfo, PostResponse, UserDetailResponse};
use crate::web::error::ApiError;

/// Build the author block for a post or comment. Authors are never missing
/// while their content exists (deletes cascade), but a placeholder keeps the
/// response well-formed if a row disappears mid-request.
pub(crate) async fn author_info(state: &AppState, author_id: i64) -> AuthorInfo {
    let users = UserRepository::new(state.db.pool());
    users
        .get_by_id(author_id)
        .await
        .ok()
        .flatten()
        .map(|u| AuthorInfo {
            id: u.id,
            name: u.name,
            avatar: u.avatar,
        })
        .unwrap_or_else(|| AuthorInfo {
            id: author_id,
            name: "unknown".to_string(),
            avatar: None,
        })
}

/// Build a full post response: author block, like/comment counts and,
/// for authenticated viewers, the viewer's own like state.
pub(crate) async fn post_response(
    state: &AppState,
    post: crate::post::Post,
    viewer: Option<i64>,
) -> Result<PostResponse, ApiError> {
    let likes = LikeRepository::new(state.db.pool());
    let comments = CommentRepository::new(state.db.pool());

    let author = author_info(state, post.author_id).await;
    let like_count = likes.count_for_post(post.id).await.map_err(ApiError::from)?;
    let comment_count = comments
        .count_by_post(post.id)
        .await
        .map_err(ApiError::from)?;

    let liked_by_me = match viewer {
        Some(viewer_id) => Some(
            likes
                .is_liked(viewer_id, post.id)
                .await
                .map_err(ApiError::from)?,
        ),
        None => None,
    };

    Ok(PostResponse {
        id: post.id,
        author,
        body: post.body,
        image: post.image,
        like_count: like_count as u64,
        comment_count: comment_count as u64,
        liked_by_me,
        created_at: post.created_at,
    })
}

/// Build a full profile response with post/follower/following counts and,
/// for authenticated viewers, the viewer's follow state.
pub(crate) async fn profile_response(
    state: &AppState,
    user: &User,
    viewer: Option<i64>,
) -> Result<UserDetailResponse, ApiError> {
    let posts = PostRepository::new(state.db.pool());
    let follows = FollowRepository::new(state.db.pool());

    let post_count = posts.count_by_author(user.id).await.map_err(ApiError::from)?;
    let follower_count = follows
        .count_followers(user.id)
        .await
        .map_err(ApiError::from)?;
    let following_count = follows
        .count_following(user.id)
        .await
        .map_err(ApiError::from)?;

    let followed_by_me = match viewer {
        Some(viewer_id) => Some(
            follows
                .is_following(viewer_id, user.id)
                .await
                .map_err(ApiError::from)?,
        ),
        None => None,
    };

    Ok(UserDetailResponse {
        id: user.id,
        name: user.name.clone(),
        avatar: user.avatar.clone(),
        profile: user.profile.clone(),
        post_count: post_count as u64,
        follower_count: follower_count as u64,
        following_count: following_count as u64,
        followed_by_me,
        created_at: user.created_at.clone(),
    })
}
