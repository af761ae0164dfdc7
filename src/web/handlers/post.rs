//! Micropost handlers.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;

use crate::post::{
    CommentRepository, LikeRepository, NewComment, NewPost, PostRepository,
};
use crate::web::dto::{
    normalize_optional, ApiResponse, CommentResponse, CreateCommentRequest, CreatePostRequest,
    PaginatedResponse, PaginationQuery, PostResponse, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::{AuthUser, OptionalAuthUser};

use super::{author_info, post_response};

/// GET /api/posts - List recent posts across all users (public).
pub async fn list_posts(
    State(state): State<Arc<AppState>>,
    OptionalAuthUser(auth): OptionalAuthUser,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<PaginatedResponse<PostResponse>>, ApiError> {
    let (offset, limit) = pagination.to_offset_limit();

    let posts = PostRepository::new(state.db.pool());
    let page = posts.list_recent(offset, limit).await.map_err(ApiError::from)?;
    let total = posts.count().await.map_err(ApiError::from)?;

    let viewer = auth.map(|c| c.sub);
    let mut responses = Vec::with_capacity(page.len());
    for post in page {
        responses.push(post_response(&state, post, viewer).await?);
    }

    Ok(Json(PaginatedResponse::new(
        responses,
        pagination.page,
        pagination.per_page,
        total as u64,
    )))
}

/// GET /api/feed - The current user's home timeline.
pub async fn feed(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<PaginatedResponse<PostResponse>>, ApiError> {
    let (offset, limit) = pagination.to_offset_limit();

    let posts = PostRepository::new(state.db.pool());
    let page = posts
        .feed(claims.sub, offset, limit)
        .await
        .map_err(ApiError::from)?;
    let total = posts.count_feed(claims.sub).await.map_err(ApiError::from)?;

    let mut responses = Vec::with_capacity(page.len());
    for post in page {
        responses.push(post_response(&state, post, Some(claims.sub)).await?);
    }

    Ok(Json(PaginatedResponse::new(
        responses,
        pagination.page,
        pagination.per_page,
        total as u64,
    )))
}

/// POST /api/posts - Create a micropost.
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    ValidatedJson(req): ValidatedJson<CreatePostRequest>,
) -> Result<Json<ApiResponse<PostResponse>>, ApiError> {
    if req.body.trim().is_empty() {
        return Err(ApiError::bad_request("Post body is required"));
    }

    let mut new_post = NewPost::new(claims.sub, req.body);
    if let Some(image) = req.image.and_then(normalize_optional) {
        new_post = new_post.with_image(image);
    }

    let posts = PostRepository::new(state.db.pool());
    let post = posts.create(&new_post).await.map_err(|e| {
        tracing::error!("Failed to create post: {}", e);
        ApiError::internal("Failed to create post")
    })?;

    let response = post_response(&state, post, Some(claims.sub)).await?;

    Ok(Json(ApiResponse::new(response)))
}

/// GET /api/posts/:id - Get a single post (public).
pub async fn get_post(
    State(state): State<Arc<AppState>>,
    OptionalAuthUser(auth): OptionalAuthUser,
    Path(post_id): Path<i64>,
) -> Result<Json<ApiResponse<PostResponse>>, ApiError> {
    let posts = PostRepository::new(state.db.pool());
    let post = posts
        .get_by_id(post_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;

    let viewer = auth.map(|c| c.sub);
    let response = post_response(&state, post, viewer).await?;

    Ok(Json(ApiResponse::new(response)))
}

/// DELETE /api/posts/:id - Delete a post.
///
/// Only the author or an administrator may delete a post.
pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(post_id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let posts = PostRepository::new(state.db.pool());
    let post = posts
        .get_by_id(post_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;

    if post.author_id != claims.sub && !claims.is_admin() {
        return Err(ApiError::forbidden("You can only delete your own posts"));
    }

    posts.delete(post_id).await.map_err(|e| {
        tracing::error!("Failed to delete post: {}", e);
        ApiError::internal("Failed to delete post")
    })?;

    Ok(Json(ApiResponse::new(())))
}

/// POST /api/posts/:id/like - Like a post.
pub async fn like_post(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(post_id): Path<i64>,
) -> Result<Json<ApiResponse<PostResponse>>, ApiError> {
    let posts = PostRepository::new(state.db.pool());
    let post = posts
        .get_by_id(post_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;

    let likes = LikeRepository::new(state.db.pool());
    if likes
        .is_liked(claims.sub, post_id)
        .await
        .map_err(ApiError::from)?
    {
        return Err(ApiError::conflict("Post is already liked"));
    }

    likes.add(claims.sub, post_id).await.map_err(|e| {
        tracing::error!("Failed to like post: {}", e);
        ApiError::internal("Failed to like post")
    })?;

    let response = post_response(&state, post, Some(claims.sub)).await?;

    Ok(Json(ApiResponse::new(response)))
}

/// DELETE /api/posts/:id/like - Remove a like.
pub async fn unlike_post(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(post_id): Path<i64>,
) -> Result<Json<ApiResponse<PostResponse>>, ApiError> {
    let posts = PostRepository::new(state.db.pool());
    let post = posts
        .get_by_id(post_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("Post not found"))?;

    let likes = LikeRepository::new(state.db.pool());
    let removed = likes
        .remove(claims.sub, post_id)
        .await
        .map_err(ApiError::from)?;
    if !removed {
        return Err(ApiError::not_found("Like not found"));
    }

    let response = post_response(&state, post, Some(claims.sub)).await?;

    Ok(Json(ApiResponse::new(response)))
}

/// GET /api/posts/:id/comments - List comments on a post (public).
pub async fn list_comments(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<i64>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<PaginatedResponse<CommentResponse>>, ApiError> {
    let posts = PostRepository::new(state.db.pool());
    if posts
        .get_by_id(post_id)
        .await
        .map_err(ApiError::from)?
        .is_none()
    {
        return Err(ApiError::not_found("Post not found"));
    }

    let (offset, limit) = pagination.to_offset_limit();
    let comments = CommentRepository::new(state.db.pool());
    let page = comments
        .list_by_post(post_id, offset, limit)
        .await
        .map_err(ApiError::from)?;
    let total = comments.count_by_post(post_id).await.map_err(ApiError::from)?;

    let mut responses = Vec::with_capacity(page.len());
    for comment in page {
        let author = author_info(&state, comment.author_id).await;
        responses.push(CommentResponse {
            id: comment.id,
            post_id: comment.post_id,
            author,
            body: comment.body,
            created_at: comment.created_at,
        });
    }

    Ok(Json(PaginatedResponse::new(
        responses,
        pagination.page,
        pagination.per_page,
        total as u64,
    )))
}

/// POST /api/posts/:id/comments - Comment on a post.
pub async fn create_comment(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(post_id): Path<i64>,
    ValidatedJson(req): ValidatedJson<CreateCommentRequest>,
) -> Result<Json<ApiResponse<CommentResponse>>, ApiError> {
    if req.body.trim().is_empty() {
        return Err(ApiError::bad_request("Comment body is required"));
    }

    let posts = PostRepository::new(state.db.pool());
    if posts
        .get_by_id(post_id)
        .await
        .map_err(ApiError::from)?
        .is_none()
    {
        return Err(ApiError::not_found("Post not found"));
    }

    let comments = CommentRepository::new(state.db.pool());
    let comment = comments
        .create(&NewComment::new(post_id, claims.sub, req.body))
        .await
        .map_err(|e| {
            tracing::error!("Failed to create comment: {}", e);
            ApiError::internal("Failed to create comment")
        })?;

    let author = author_info(&state, comment.author_id).await;
    let response = CommentResponse {
        id: comment.id,
        post_id: comment.post_id,
        author,
        body: comment.body,
        created_at: comment.created_at,
    };

    Ok(Json(ApiResponse::new(response)))
}

/// DELETE /api/comments/:id - Delete a comment.
///
/// The comment author, the post author, and administrators may delete.
pub async fn delete_comment(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(comment_id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let comments = CommentRepository::new(state.db.pool());
    let comment = comments
        .get_by_id(comment_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("Comment not found"))?;

    let posts = PostRepository::new(state.db.pool());
    let post = posts
        .get_by_id(comment.post_id)
        .await
        .map_err(ApiError::from)?;
    let is_post_author = post.map(|p| p.author_id == claims.sub).unwrap_or(false);

    if comment.author_id != claims.sub && !is_post_author && !claims.is_admin() {
        return Err(ApiError::forbidden("You can only delete your own comments"));
    }

    comments.delete(comment_id).await.map_err(|e| {
        tracing::error!("Failed to delete comment: {}", e);
        ApiError::internal("Failed to delete comment")
    })?;

    Ok(Json(ApiResponse::new(())))
}
