//! Request DTOs for the Chirp web API.

use serde::Deserialize;
use validator::Validate;

/// User registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address.
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    /// Password (plain; hashed server-side).
    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,
    /// Display name.
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    pub name: String,
}

/// Login request.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email address.
    pub email: String,
    /// Password.
    pub password: String,
}

/// Profile update request. Unset fields are left unchanged.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    /// New display name.
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    pub name: Option<String>,
    /// New profile text. An empty string clears it.
    #[validate(length(max = 1000, message = "Profile must be at most 1000 characters"))]
    pub profile: Option<String>,
    /// New avatar reference. An empty string clears it.
    #[validate(length(max = 255, message = "Avatar reference is too long"))]
    pub avatar: Option<String>,
}

/// Password change request.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    /// Current password, verified before the change is applied.
    pub current_password: String,
    /// New password.
    pub new_password: String,
}

/// Micropost creation request.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    /// Post body.
    #[validate(length(min = 1, max = 140, message = "Post must be 1-140 characters"))]
    pub body: String,
    /// Optional image reference.
    #[validate(length(max = 255, message = "Image reference is too long"))]
    pub image: Option<String>,
}

/// Comment creation request.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCommentRequest {
    /// Comment body.
    #[validate(length(min = 1, max = 500, message = "Comment must be 1-500 characters"))]
    pub body: String,
}

/// Role set replacement request (admin only).
#[derive(Debug, Deserialize)]
pub struct UpdateRolesRequest {
    /// The complete new set of role names.
    pub roles: Vec<String>,
}

/// Pagination query parameters.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PaginationQuery {
    /// Page number (1-based).
    #[serde(default = "default_page")]
    pub page: u32,
    /// Items per page (clamped to 100).
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    20
}

impl Default for PaginationQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

impl PaginationQuery {
    /// Convert to an (offset, limit) pair for SQL queries.
    pub fn to_offset_limit(&self) -> (i64, i64) {
        let page = self.page.max(1);
        let per_page = self.per_page.clamp(1, 100);
        (((page - 1) * per_page) as i64, per_page as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults() {
        let q = PaginationQuery::default();
        assert_eq!(q.to_offset_limit(), (0, 20));
    }

    #[test]
    fn test_pagination_offsets() {
        let q = PaginationQuery {
            page: 3,
            per_page: 10,
        };
        assert_eq!(q.to_offset_limit(), (20, 10));
    }

    #[test]
    fn test_pagination_clamps() {
        let q = PaginationQuery {
            page: 0,
            per_page: 1000,
        };
        assert_eq!(q.to_offset_limit(), (0, 100));

        let q = PaginationQuery {
            page: 1,
            per_page: 0,
        };
        assert_eq!(q.to_offset_limit(), (0, 1));
    }

    #[test]
    fn test_register_request_validation() {
        let ok = RegisterRequest {
            email: "alice@example.com".to_string(),
            password: "password123".to_string(),
            name: "Alice".to_string(),
        };
        assert!(validator::Validate::validate(&ok).is_ok());

        let bad_email = RegisterRequest {
            email: "not-an-email".to_string(),
            ..ok_clone(&ok)
        };
        assert!(validator::Validate::validate(&bad_email).is_err());

        let short_password = RegisterRequest {
            password: "short".to_string(),
            ..ok_clone(&ok)
        };
        assert!(validator::Validate::validate(&short_password).is_err());

        let empty_name = RegisterRequest {
            name: String::new(),
            ..ok_clone(&ok)
        };
        assert!(validator::Validate::validate(&empty_name).is_err());
    }

    #[test]
    fn test_create_post_request_validation() {
        let ok = CreatePostRequest {
            body: "hello".to_string(),
            image: None,
        };
        assert!(validator::Validate::validate(&ok).is_ok());

        let too_long = CreatePostRequest {
            body: "x".repeat(141),
            image: None,
        };
        assert!(validator::Validate::validate(&too_long).is_err());

        let empty = CreatePostRequest {
            body: String::new(),
            image: None,
        };
        assert!(validator::Validate::validate(&empty).is_err());
    }

    fn ok_clone(r: &RegisterRequest) -> RegisterRequest {
        RegisterRequest {
            email: r.email.clone(),
            password: r.password.clone(),
            name: r.name.clone(),
        }
    }
}
