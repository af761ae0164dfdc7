//! Middleware for the Chirp web API.

pub mod auth;
pub mod cors;
pub mod rate_limit;
pub mod security;

pub use auth::{
    build_auth_cookie, clear_auth_cookie, jwt_auth, AdminUser, AuthUser, JwtClaims, JwtState,
    OptionalAuthUser, AUTH_COOKIE,
};
pub use cors::create_cors_layer;
pub use rate_limit::{api_rate_limit, login_rate_limit, RateLimitState};
pub use security::security_headers;
