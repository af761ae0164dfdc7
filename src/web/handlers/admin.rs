//! Administration handlers.
//!
//! Every handler here takes the [`AdminUser`] extractor, so requests without
//! a valid admin token are rejected before any body runs.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use std::sync::Arc;

use crate::db::{RoleSet, UserRepository, UserUpdate};
use crate::follow::FollowRepository;
use crate::post::{LikeRepository, PostRepository};
use crate::web::dto::{
    AdminUserResponse, ApiResponse, PaginatedResponse, PaginationQuery, PostRanking,
    RankingsResponse, UpdateRolesRequest, UserRanking,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;
use crate::web::middleware::AdminUser;

use super::{author_info, post_response};

/// How many entries each ranking returns.
const RANKING_LIMIT: i64 = 10;

/// GET /api/admin/users - List all users with emails and role sets.
pub async fn admin_list_users(
    State(state): State<Arc<AppState>>,
    AdminUser(_claims): AdminUser,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<PaginatedResponse<AdminUserResponse>>, ApiError> {
    let (offset, limit) = pagination.to_offset_limit();

    let repo = UserRepository::new(state.db.pool());
    let users = repo
        .list_paginated(offset, limit)
        .await
        .map_err(ApiError::from)?;
    let total = repo.count().await.map_err(ApiError::from)?;

    let responses: Vec<_> = users
        .into_iter()
        .map(|u| AdminUserResponse {
            id: u.id,
            email: u.email,
            name: u.name,
            roles: u.roles.names(),
            created_at: u.created_at,
        })
        .collect();

    Ok(Json(PaginatedResponse::new(
        responses,
        pagination.page,
        pagination.per_page,
        total as u64,
    )))
}

/// PUT /api/admin/users/:id/roles - Replace a user's role set.
pub async fn admin_update_roles(
    State(state): State<Arc<AppState>>,
    AdminUser(_claims): AdminUser,
    Path(user_id): Path<i64>,
    Json(req): Json<UpdateRolesRequest>,
) -> Result<Json<ApiResponse<AdminUserResponse>>, ApiError> {
    let mut roles = RoleSet::new();
    for name in &req.roles {
        let role = name
            .parse()
            .map_err(|e: String| ApiError::unprocessable(e))?;
        roles.insert(role);
    }
    if roles.is_empty() {
        return Err(ApiError::unprocessable("At least one role is required"));
    }

    let repo = UserRepository::new(state.db.pool());
    let user = repo
        .update(user_id, &UserUpdate::new().roles(roles))
        .await
        .map_err(|e| {
            tracing::error!("Failed to update roles: {}", e);
            ApiError::internal("Failed to update roles")
        })?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    tracing::info!(user_id = user.id, roles = %user.roles, "Roles updated");

    let response = AdminUserResponse {
        id: user.id,
        email: user.email,
        name: user.name,
        roles: user.roles.names(),
        created_at: user.created_at,
    };

    Ok(Json(ApiResponse::new(response)))
}

/// DELETE /api/admin/users/:id - Delete a user account.
///
/// Posts, follows, likes and comments cascade. Administrators cannot delete
/// their own account through this path.
pub async fn admin_delete_user(
    State(state): State<Arc<AppState>>,
    AdminUser(claims): AdminUser,
    Path(user_id): Path<i64>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    if user_id == claims.sub {
        return Err(ApiError::unprocessable(
            "You cannot delete your own account",
        ));
    }

    let repo = UserRepository::new(state.db.pool());
    let deleted = repo.delete(user_id).await.map_err(|e| {
        tracing::error!("Failed to delete user: {}", e);
        ApiError::internal("Failed to delete user")
    })?;

    if !deleted {
        return Err(ApiError::not_found("User not found"));
    }

    tracing::info!(user_id, deleted_by = claims.sub, "User deleted");

    Ok(Json(ApiResponse::new(())))
}

/// GET /api/admin/rankings - Activity rankings for the admin dashboard.
pub async fn rankings(
    State(state): State<Arc<AppState>>,
    AdminUser(claims): AdminUser,
) -> Result<Json<ApiResponse<RankingsResponse>>, ApiError> {
    let posts = PostRepository::new(state.db.pool());
    let likes = LikeRepository::new(state.db.pool());
    let follows = FollowRepository::new(state.db.pool());

    let mut top_posters = Vec::new();
    for (author_id, count) in posts
        .top_authors(RANKING_LIMIT)
        .await
        .map_err(ApiError::from)?
    {
        top_posters.push(UserRanking {
            user: author_info(&state, author_id).await,
            count: count as u64,
        });
    }

    let mut top_posts = Vec::new();
    for (post_id, count) in likes.top_posts(RANKING_LIMIT).await.map_err(ApiError::from)? {
        // A post deleted between the two queries just drops out of the list
        if let Some(post) = posts.get_by_id(post_id).await.map_err(ApiError::from)? {
            top_posts.push(PostRanking {
                post: post_response(&state, post, Some(claims.sub)).await?,
                count: count as u64,
            });
        }
    }

    let mut most_followed = Vec::new();
    for (user_id, count) in follows
        .most_followed(RANKING_LIMIT)
        .await
        .map_err(ApiError::from)?
    {
        most_followed.push(UserRanking {
            user: author_info(&state, user_id).await,
            count: count as u64,
        });
    }

    let response = RankingsResponse {
        top_posters,
        top_posts,
        most_followed,
    };

    Ok(Json(ApiResponse::new(response)))
}
