//! Router configuration for the Chirp web API.

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

use super::handlers::{
    admin_delete_user, admin_list_users, admin_update_roles, change_password, create_comment,
    create_post, delete_comment, delete_post, feed, follow_user, get_post, get_user, like_post,
    list_comments, list_followers, list_following, list_posts, list_user_posts, list_users, login,
    logout, me, rankings, register, unfollow_user, unlike_post, update_my_profile, AppState,
};
use super::middleware::{
    api_rate_limit, create_cors_layer, jwt_auth, login_rate_limit, security_headers, JwtState,
    RateLimitState,
};

/// Create the main API router.
pub fn create_router(
    app_state: Arc<AppState>,
    jwt_state: Arc<JwtState>,
    config: &ServerConfig,
) -> Router {
    let rate_state = Arc::new(RateLimitState::new(
        config.login_rate_limit,
        config.api_rate_limit,
    ));

    // Credential-accepting endpoints get the stricter per-IP quota
    let login_rate_state = rate_state.clone();
    let auth_public_routes = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .layer(middleware::from_fn(move |req, next| {
            let state = login_rate_state.clone();
            login_rate_limit(state, req, next)
        }));

    let auth_routes = Router::new()
        .merge(auth_public_routes)
        .route("/logout", post(logout))
        .route("/me", get(me));

    let admin_routes = Router::new()
        .route("/users", get(admin_list_users))
        .route("/users/:id", delete(admin_delete_user))
        .route("/users/:id/roles", put(admin_update_roles))
        .route("/rankings", get(rankings));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/admin", admin_routes)
        .route("/users", get(list_users))
        .route("/users/me", put(update_my_profile))
        .route("/users/me/password", put(change_password))
        .route("/users/:id", get(get_user))
        .route("/users/:id/posts", get(list_user_posts))
        .route("/users/:id/followers", get(list_followers))
        .route("/users/:id/following", get(list_following))
        .route("/users/:id/follow", post(follow_user).delete(unfollow_user))
        .route("/feed", get(feed))
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/:id", get(get_post).delete(delete_post))
        .route("/posts/:id/like", post(like_post).delete(unlike_post))
        .route(
            "/posts/:id/comments",
            get(list_comments).post(create_comment),
        )
        .route("/comments/:id", delete(delete_comment));

    // Clone states for the middleware closures
    let jwt_state_for_middleware = jwt_state.clone();
    let api_rate_state = rate_state.clone();

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(&config.cors_origins))
                .layer(middleware::from_fn(security_headers))
                .layer(middleware::from_fn(move |req, next| {
                    let state = api_rate_state.clone();
                    api_rate_limit(state, req, next)
                }))
                .layer(middleware::from_fn(move |req, next| {
                    let state = jwt_state_for_middleware.clone();
                    jwt_auth(state, req, next)
                })),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

/// Create a router serving a built frontend, if the directory exists.
pub fn create_static_router(static_path: &str) -> Option<Router> {
    let path = std::path::Path::new(static_path);
    if !path.is_dir() {
        tracing::warn!(
            "Static path {:?} does not exist; static file serving disabled",
            path
        );
        return None;
    }

    // Unknown paths fall back to index.html for client-side routing
    let serve_dir = ServeDir::new(path).fallback(ServeFile::new(path.join("index.html")));
    Some(Router::new().fallback_service(serve_dir))
}
