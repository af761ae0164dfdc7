//! User profile handlers.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;

use crate::auth::{hash_password, validate_password, verify_password};
use crate::db::{UserRepository, UserUpdate};
use crate::follow::FollowRepository;
use crate::post::PostRepository;
use crate::web::dto::{
    normalize_optional, ApiResponse, ChangePasswordRequest, PaginatedResponse, PaginationQuery,
    UpdateProfileRequest, UserDetailResponse, UserListResponse, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::{AuthUser, OptionalAuthUser};

use super::profile_response;

/// GET /api/users - List users (paginated, public).
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<PaginatedResponse<UserListResponse>>, ApiError> {
    let (offset, limit) = pagination.to_offset_limit();

    let repo = UserRepository::new(state.db.pool());
    let users = repo
        .list_paginated(offset, limit)
        .await
        .map_err(ApiError::from)?;
    let total = repo.count().await.map_err(ApiError::from)?;

    let responses: Vec<_> = users
        .into_iter()
        .map(|u| UserListResponse {
            id: u.id,
            name: u.name,
            avatar: u.avatar,
        })
        .collect();

    Ok(Json(PaginatedResponse::new(
        responses,
        pagination.page,
        pagination.per_page,
        total as u64,
    )))
}

/// GET /api/users/:id - Get a user profile (public).
///
/// When the request carries a valid token, the response also says whether
/// the viewer follows this user.
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    OptionalAuthUser(auth): OptionalAuthUser,
    Path(user_id): Path<i64>,
) -> Result<Json<ApiResponse<UserDetailResponse>>, ApiError> {
    let repo = UserRepository::new(state.db.pool());
    let user = repo
        .get_by_id(user_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let viewer = auth.map(|c| c.sub);
    let response = profile_response(&state, &user, viewer).await?;

    Ok(Json(ApiResponse::new(response)))
}

/// PUT /api/users/me - Update the current user's profile.
pub async fn update_my_profile(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    ValidatedJson(req): ValidatedJson<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<UserDetailResponse>>, ApiError> {
    let mut update = UserUpdate::new();

    if let Some(name) = req.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(ApiError::bad_request("Name cannot be empty"));
        }
        update = update.name(name);
    }
    if let Some(profile) = req.profile {
        update = update.profile(normalize_optional(profile));
    }
    if let Some(avatar) = req.avatar {
        update = update.avatar(normalize_optional(avatar));
    }

    let repo = UserRepository::new(state.db.pool());
    let user = repo
        .update(claims.sub, &update)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update profile: {}", e);
            ApiError::internal("Failed to update profile")
        })?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let response = profile_response(&state, &user, Some(claims.sub)).await?;

    Ok(Json(ApiResponse::new(response)))
}

/// PUT /api/users/me/password - Change the current user's password.
pub async fn change_password(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    validate_password(&req.new_password)
        .map_err(|e| ApiError::unprocessable(format!("Password error: {e}")))?;

    let repo = UserRepository::new(state.db.pool());
    let user = repo
        .get_by_id(claims.sub)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    verify_password(&req.current_password, &user.password)
        .map_err(|_| ApiError::unauthorized("Current password is incorrect"))?;

    let new_hash = hash_password(&req.new_password).map_err(|e| {
        tracing::error!("Failed to hash password: {}", e);
        ApiError::internal("Failed to update password")
    })?;

    repo.update(claims.sub, &UserUpdate::new().password(new_hash))
        .await
        .map_err(|e| {
            tracing::error!("Failed to update password: {}", e);
            ApiError::internal("Failed to update password")
        })?;

    Ok(Json(ApiResponse::new(())))
}

/// GET /api/users/:id/posts - List a user's posts (public).
pub async fn list_user_posts(
    State(state): State<Arc<AppState>>,
    OptionalAuthUser(auth): OptionalAuthUser,
    Path(user_id): Path<i64>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<PaginatedResponse<crate::web::dto::PostResponse>>, ApiError> {
    let users = UserRepository::new(state.db.pool());
    if users
        .get_by_id(user_id)
        .await
        .map_err(ApiError::from)?
        .is_none()
    {
        return Err(ApiError::not_found("User not found"));
    }

    let (offset, limit) = pagination.to_offset_limit();
    let posts = PostRepository::new(state.db.pool());
    let page = posts
        .list_by_author(user_id, offset, limit)
        .await
        .map_err(ApiError::from)?;
    let total = posts.count_by_author(user_id).await.map_err(ApiError::from)?;

    let viewer = auth.map(|c| c.sub);
    let mut responses = Vec::with_capacity(page.len());
    for post in page {
        responses.push(super::post_response(&state, post, viewer).await?);
    }

    Ok(Json(PaginatedResponse::new(
        responses,
        pagination.page,
        pagination.per_page,
        total as u64,
    )))
}

/// GET /api/users/:id/followers - List the users following this user.
pub async fn list_followers(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<PaginatedResponse<UserListResponse>>, ApiError> {
    let users = UserRepository::new(state.db.pool());
    if users
        .get_by_id(user_id)
        .await
        .map_err(ApiError::from)?
        .is_none()
    {
        return Err(ApiError::not_found("User not found"));
    }

    let (offset, limit) = pagination.to_offset_limit();
    let follows = FollowRepository::new(state.db.pool());
    let followers = follows
        .followers(user_id, offset, limit)
        .await
        .map_err(ApiError::from)?;
    let total = follows.count_followers(user_id).await.map_err(ApiError::from)?;

    let responses: Vec<_> = followers
        .into_iter()
        .map(|u| UserListResponse {
            id: u.id,
            name: u.name,
            avatar: u.avatar,
        })
        .collect();

    Ok(Json(PaginatedResponse::new(
        responses,
        pagination.page,
        pagination.per_page,
        total as u64,
    )))
}

/// GET /api/users/:id/following - List the users this user follows.
pub async fn list_following(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<PaginatedResponse<UserListResponse>>, ApiError> {
    let users = UserRepository::new(state.db.pool());
    if users
        .get_by_id(user_id)
        .await
        .map_err(ApiError::from)?
        .is_none()
    {
        return Err(ApiError::not_found("User not found"));
    }

    let (offset, limit) = pagination.to_offset_limit();
    let follows = FollowRepository::new(state.db.pool());
    let following = follows
        .following(user_id, offset, limit)
        .await
        .map_err(ApiError::from)?;
    let total = follows.count_following(user_id).await.map_err(ApiError::from)?;

    let responses: Vec<_> = following
        .into_iter()
        .map(|u| UserListResponse {
            id: u.id,
            name: u.name,
            avatar: u.avatar,
        })
        .collect();

    Ok(Json(PaginatedResponse::new(
        responses,
        pagination.page,
        pagination.per_page,
        total as u64,
    )))
}
