//! Follow handlers.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::db::UserRepository;
use crate::follow::FollowRepository;
use crate::web::dto::{ApiResponse, UserDetailResponse};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::AuthUser;

use super::profile_response;

/// POST /api/users/:id/follow - Follow a user.
pub async fn follow_user(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(user_id): Path<i64>,
) -> Result<Json<ApiResponse<UserDetailResponse>>, ApiError> {
    if user_id == claims.sub {
        return Err(ApiError::unprocessable("You cannot follow yourself"));
    }

    let users = UserRepository::new(state.db.pool());
    let target = users
        .get_by_id(user_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let follows = FollowRepository::new(state.db.pool());
    if follows
        .is_following(claims.sub, user_id)
        .await
        .map_err(ApiError::from)?
    {
        return Err(ApiError::conflict("Already following this user"));
    }

    follows.add(claims.sub, user_id).await.map_err(|e| {
        tracing::error!("Failed to follow user: {}", e);
        ApiError::internal("Failed to follow user")
    })?;

    let response = profile_response(&state, &target, Some(claims.sub)).await?;

    Ok(Json(ApiResponse::new(response)))
}

/// DELETE /api/users/:id/follow - Unfollow a user.
pub async fn unfollow_user(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
    Path(user_id): Path<i64>,
) -> Result<Json<ApiResponse<UserDetailResponse>>, ApiError> {
    let users = UserRepository::new(state.db.pool());
    let target = users
        .get_by_id(user_id)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let follows = FollowRepository::new(state.db.pool());
    let removed = follows
        .remove(claims.sub, user_id)
        .await
        .map_err(ApiError::from)?;
    if !removed {
        return Err(ApiError::not_found("Follow not found"));
    }

    let response = profile_response(&state, &target, Some(claims.sub)).await?;

    Ok(Json(ApiResponse::new(response)))
}
