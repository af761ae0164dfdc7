//! Response DTOs for the Chirp web API.

use serde::Serialize;

// ============================================================================
// Generic Response Wrappers
// ============================================================================

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Paginated response wrapper.
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T: Serialize> {
    /// Response data.
    pub data: Vec<T>,
    /// Pagination metadata.
    pub meta: PaginationMeta,
}

impl<T: Serialize> PaginatedResponse<T> {
    /// Create a new paginated response.
    pub fn new(data: Vec<T>, page: u32, per_page: u32, total: u64) -> Self {
        Self {
            data,
            meta: PaginationMeta {
                page,
                per_page,
                total,
            },
        }
    }
}

/// Pagination metadata.
#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    /// Current page number.
    pub page: u32,
    /// Items per page.
    pub per_page: u32,
    /// Total number of items.
    pub total: u64,
}

// ============================================================================
// Auth DTOs
// ============================================================================

/// Login / registration response.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// Signed session token (also set as the auth cookie).
    pub token: String,
    /// Token lifetime in seconds.
    pub expires_in: u64,
    /// User information.
    pub user: UserInfo,
}

/// User information in auth responses.
#[derive(Debug, Serialize)]
pub struct UserInfo {
    /// User ID.
    pub id: i64,
    /// Email address.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Avatar reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Role names.
    pub roles: Vec<String>,
}

/// Current user response (for /api/auth/me).
#[derive(Debug, Serialize)]
pub struct MeResponse {
    /// User ID.
    pub id: i64,
    /// Email address.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Avatar reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Profile text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    /// Role names.
    pub roles: Vec<String>,
    /// Number of posts.
    pub post_count: u64,
    /// Number of followers.
    pub follower_count: u64,
    /// Number of followed users.
    pub following_count: u64,
    /// Account creation timestamp.
    pub created_at: String,
}

// ============================================================================
// User DTOs
// ============================================================================

/// User list item response.
#[derive(Debug, Serialize)]
pub struct UserListResponse {
    /// User ID.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Avatar reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// User profile response.
#[derive(Debug, Serialize)]
pub struct UserDetailResponse {
    /// User ID.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Avatar reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Profile text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    /// Number of posts.
    pub post_count: u64,
    /// Number of followers.
    pub follower_count: u64,
    /// Number of followed users.
    pub following_count: u64,
    /// Whether the requesting user follows this user. Absent for anonymous
    /// requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub followed_by_me: Option<bool>,
    /// Account creation timestamp.
    pub created_at: String,
}

/// Admin view of a user, including email and roles.
#[derive(Debug, Serialize)]
pub struct AdminUserResponse {
    /// User ID.
    pub id: i64,
    /// Email address.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Role names.
    pub roles: Vec<String>,
    /// Account creation timestamp.
    pub created_at: String,
}

// ============================================================================
// Post DTOs
// ============================================================================

/// Author information embedded in post/comment responses.
#[derive(Debug, Serialize)]
pub struct AuthorInfo {
    /// User ID.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Avatar reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Micropost response.
#[derive(Debug, Serialize)]
pub struct PostResponse {
    /// Post ID.
    pub id: i64,
    /// Author info.
    pub author: AuthorInfo,
    /// Post body.
    pub body: String,
    /// Image reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Number of likes.
    pub like_count: u64,
    /// Number of comments.
    pub comment_count: u64,
    /// Whether the requesting user has liked this post. Absent for anonymous
    /// requests.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub liked_by_me: Option<bool>,
    /// Creation timestamp.
    pub created_at: String,
}

/// Comment response.
#[derive(Debug, Serialize)]
pub struct CommentResponse {
    /// Comment ID.
    pub id: i64,
    /// Post ID.
    pub post_id: i64,
    /// Author info.
    pub author: AuthorInfo,
    /// Comment body.
    pub body: String,
    /// Creation timestamp.
    pub created_at: String,
}

// ============================================================================
// Admin ranking DTOs
// ============================================================================

/// Rankings response for the admin dashboard.
#[derive(Debug, Serialize)]
pub struct RankingsResponse {
    /// Users ranked by post count.
    pub top_posters: Vec<UserRanking>,
    /// Posts ranked by like count.
    pub top_posts: Vec<PostRanking>,
    /// Users ranked by follower count.
    pub most_followed: Vec<UserRanking>,
}

/// A ranked user entry.
#[derive(Debug, Serialize)]
pub struct UserRanking {
    /// User info.
    pub user: AuthorInfo,
    /// Ranking metric value (post count or follower count).
    pub count: u64,
}

/// A ranked post entry.
#[derive(Debug, Serialize)]
pub struct PostRanking {
    /// Post info.
    pub post: PostResponse,
    /// Like count.
    pub count: u64,
}
