//! Authentication handlers.

use axum::{extract::State, Json};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{encode, EncodingKey, Header};
use std::sync::Arc;

use crate::auth::{hash_password, verify_password};
use crate::db::{NewUser, User, UserRepository};
use crate::follow::FollowRepository;
use crate::post::PostRepository;
use crate::web::dto::{
    ApiResponse, AuthResponse, LoginRequest, MeResponse, RegisterRequest, UserInfo, ValidatedJson,
};
use crate::web::error::ApiError;
use crate::web::middleware::{build_auth_cookie, clear_auth_cookie, AuthUser, JwtClaims};
use crate::Database;

/// Shared database handle for the web API. The sqlx pool is internally
/// reference-counted and safe to use from concurrent handlers.
pub type SharedDatabase = Arc<Database>;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database handle.
    pub db: SharedDatabase,
    /// JWT encoding key.
    pub encoding_key: EncodingKey,
    /// Token lifetime in seconds.
    pub token_expiry_secs: u64,
    /// Whether the auth cookie is marked Secure.
    pub cookie_secure: bool,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        db: SharedDatabase,
        jwt_secret: &str,
        token_expiry_secs: u64,
        cookie_secure: bool,
    ) -> Self {
        Self {
            db,
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            token_expiry_secs,
            cookie_secure,
        }
    }

    /// Issue a signed token carrying a snapshot of the given user.
    pub fn issue_token(&self, user: &User) -> Result<String, ApiError> {
        let now = chrono::Utc::now().timestamp() as u64;
        let claims = JwtClaims {
            sub: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            roles: user.roles.clone(),
            iat: now,
            exp: now + self.token_expiry_secs,
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode JWT: {}", e);
            ApiError::internal("Failed to generate token")
        })
    }
}

fn user_info(user: &User) -> UserInfo {
    UserInfo {
        id: user.id,
        email: user.email.clone(),
        name: user.name.clone(),
        avatar: user.avatar.clone(),
        roles: user.roles.names(),
    }
}

/// POST /api/auth/register - User registration.
///
/// Returns the token in the body and sets the auth cookie.
pub async fn register(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<(CookieJar, Json<ApiResponse<AuthResponse>>), ApiError> {
    let repo = UserRepository::new(state.db.pool());

    if repo.email_exists(&req.email).await.map_err(ApiError::from)? {
        return Err(ApiError::conflict("Email is already registered"));
    }

    let password_hash =
        hash_password(&req.password).map_err(|_| ApiError::internal("Failed to hash password"))?;

    let new_user = NewUser::new(req.email.trim(), password_hash, req.name.trim());
    let user = repo.create(&new_user).await.map_err(|e| {
        // Losing the pre-check race surfaces as a UNIQUE violation
        if e.to_string().contains("UNIQUE") {
            ApiError::conflict("Email is already registered")
        } else {
            tracing::error!("User creation failed: {}", e);
            ApiError::internal("Failed to create user")
        }
    })?;

    let token = state.issue_token(&user)?;
    let cookie = build_auth_cookie(token.clone(), state.token_expiry_secs, state.cookie_secure);

    tracing::info!(user_id = user.id, "User registered");

    let response = AuthResponse {
        token,
        expires_in: state.token_expiry_secs,
        user: user_info(&user),
    };

    Ok((jar.add(cookie), Json(ApiResponse::new(response))))
}

/// POST /api/auth/login - User login.
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<ApiResponse<AuthResponse>>), ApiError> {
    if req.email.is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let repo = UserRepository::new(state.db.pool());
    let user = repo
        .get_by_email(&req.email)
        .await
        .map_err(|_| ApiError::unauthorized("Invalid email or password"))?
        .ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;

    verify_password(&req.password, &user.password)
        .map_err(|_| ApiError::unauthorized("Invalid email or password"))?;

    let token = state.issue_token(&user)?;
    let cookie = build_auth_cookie(token.clone(), state.token_expiry_secs, state.cookie_secure);

    tracing::debug!(user_id = user.id, "User logged in");

    let response = AuthResponse {
        token,
        expires_in: state.token_expiry_secs,
        user: user_info(&user),
    };

    Ok((jar.add(cookie), Json(ApiResponse::new(response))))
}

/// POST /api/auth/logout - User logout.
///
/// Tokens are stateless; logout clears the client cookie and nothing else.
pub async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> Result<(CookieJar, Json<ApiResponse<()>>), ApiError> {
    Ok((
        jar.add(clear_auth_cookie(state.cookie_secure)),
        Json(ApiResponse::new(())),
    ))
}

/// GET /api/auth/me - Get current user info.
///
/// Re-fetches the account record; a token whose principal has been deleted
/// is rejected here even though its signature is still valid.
pub async fn me(
    State(state): State<Arc<AppState>>,
    AuthUser(claims): AuthUser,
) -> Result<Json<ApiResponse<MeResponse>>, ApiError> {
    let repo = UserRepository::new(state.db.pool());
    let user = repo
        .get_by_id(claims.sub)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::unauthorized("Account no longer exists"))?;

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

    let response = MeResponse {
        id: user.id,
        email: user.email,
        name: user.name,
        avatar: user.avatar,
        profile: user.profile,
        roles: user.roles.names(),
        post_count: post_count as u64,
        follower_count: follower_count as u64,
        following_count: following_count as u64,
        created_at: user.created_at,
    };

    Ok(Json(ApiResponse::new(response)))
}
