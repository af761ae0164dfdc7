//! JWT authentication middleware.
//!
//! The guard is expressed as axum extractors: handlers that take [`AuthUser`]
//! require a verified token, handlers that take [`AdminUser`] additionally
//! require the admin role, and handlers without either are public.

use axum::{
    async_trait,
    body::Body,
    extract::FromRequestParts,
    http::{
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
        Request,
    },
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::db::RoleSet;
use crate::web::error::ApiError;

/// Name of the authentication cookie.
pub const AUTH_COOKIE: &str = "jwt";

/// JWT claims structure.
///
/// This is the principal snapshot: whatever the user looked like at issuance
/// time. The guard trusts it for the token's lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (user ID).
    pub sub: i64,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Roles held at issuance time.
    pub roles: RoleSet,
    /// Issued at timestamp.
    pub iat: u64,
    /// Expiration timestamp.
    pub exp: u64,
    /// JWT ID (unique identifier).
    pub jti: String,
}

impl JwtClaims {
    /// Whether the snapshot grants administrator access.
    pub fn is_admin(&self) -> bool {
        self.roles.is_admin()
    }
}

/// Application state for JWT verification.
#[derive(Clone)]
pub struct JwtState {
    /// Decoding key for JWT verification.
    pub decoding_key: DecodingKey,
    /// Validation settings.
    pub validation: Validation,
}

impl JwtState {
    /// Create a new JWT state from a secret key.
    pub fn new(secret: &str) -> Self {
        let decoding_key = DecodingKey::from_secret(secret.as_bytes());
        let mut validation = Validation::default();
        validation.validate_exp = true;

        Self {
            decoding_key,
            validation,
        }
    }
}

/// Build the authentication cookie carrying a freshly issued token.
pub fn build_auth_cookie(token: String, max_age_secs: u64, secure: bool) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(secure)
        .max_age(time::Duration::seconds(max_age_secs as i64))
        .build()
}

/// Build an expired cookie that clears the authentication cookie.
pub fn clear_auth_cookie(secure: bool) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, ""))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(secure)
        .max_age(time::Duration::ZERO)
        .build()
}

/// Extract the token from the `jwt` cookie, if present.
fn token_from_cookie(parts: &Parts) -> Option<String> {
    let raw = parts.headers.get(COOKIE)?.to_str().ok()?;
    raw.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name == AUTH_COOKIE && !value.is_empty() {
            Some(value.to_string())
        } else {
            None
        }
    })
}

/// Extract the token from an `Authorization: Bearer` header, if present.
fn token_from_bearer(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(|t| t.to_string())
}

/// Extract the credential from a request. The cookie takes precedence over
/// the Authorization header when both exist.
fn token_from_parts(parts: &Parts) -> Option<String> {
    token_from_cookie(parts).or_else(|| token_from_bearer(parts))
}

/// Decode and validate a token against the configured verification state.
fn verify_token(parts: &Parts, token: &str) -> Result<JwtClaims, ApiError> {
    let jwt_state = parts
        .extensions
        .get::<Arc<JwtState>>()
        .ok_or_else(|| ApiError::internal("JWT state not configured"))?;

    let token_data = decode::<JwtClaims>(token, &jwt_state.decoding_key, &jwt_state.validation)
        .map_err(|e| {
            tracing::debug!("JWT validation failed: {}", e);
            ApiError::unauthorized("Invalid or expired token")
        })?;

    Ok(token_data.claims)
}

/// Extractor for authenticated users.
///
/// Use this extractor to require authentication for a handler.
/// The handler receives the verified principal snapshot.
#[derive(Debug, Clone)]
pub struct AuthUser(pub JwtClaims);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = token_from_parts(parts)
            .ok_or_else(|| ApiError::unauthorized("Missing authorization"))?;

        Ok(AuthUser(verify_token(parts, &token)?))
    }
}

/// Extractor for administrators.
///
/// Verifies the token like [`AuthUser`] and then requires the admin role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub JwtClaims);

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(claims) = AuthUser::from_request_parts(parts, state).await?;

        if !claims.is_admin() {
            return Err(ApiError::forbidden("Administrator access required"));
        }

        Ok(AdminUser(claims))
    }
}

/// Optional authentication extractor.
///
/// Similar to AuthUser but doesn't fail when no valid token is provided.
/// Public routes use this to personalize responses for logged-in users.
#[derive(Debug, Clone)]
pub struct OptionalAuthUser(pub Option<JwtClaims>);

#[async_trait]
impl<S> FromRequestParts<S> for OptionalAuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = match token_from_parts(parts) {
            Some(t) => t,
            None => return Ok(OptionalAuthUser(None)),
        };

        match verify_token(parts, &token) {
            Ok(claims) => Ok(OptionalAuthUser(Some(claims))),
            Err(_) => Ok(OptionalAuthUser(None)),
        }
    }
}

/// Middleware function to inject JWT state into request extensions.
pub async fn jwt_auth(
    jwt_state: Arc<JwtState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    request.extensions_mut().insert(jwt_state);
    next.run(request).await
}
