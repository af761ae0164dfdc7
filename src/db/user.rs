//! User model for Chirp.
//!
//! Defines the User entity together with the Role / RoleSet types used for
//! authorization decisions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

/// A named role granted to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular member.
    General,
    /// Administrator.
    Admin,
}

impl Role {
    /// Convert role to its database/wire string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::General => "general",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "general" => Ok(Role::General),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("unknown role: {s}")),
        }
    }
}

/// A set of roles held by a user.
///
/// Shared by the token issuer, the token verifier and the request guard so
/// that role names exist in exactly one shape. Serializes as a JSON array of
/// role names; stored in the database as a comma-separated string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet(Vec<Role>);

impl RoleSet {
    /// Create an empty role set.
    pub fn new() -> Self {
        Self::default()
    }

    /// The default role set for newly registered users.
    pub fn general() -> Self {
        Self(vec![Role::General])
    }

    /// Create a role set from a slice of roles (deduplicated, ordered).
    pub fn from_roles(roles: &[Role]) -> Self {
        let mut set = Self::new();
        for role in roles {
            set.insert(*role);
        }
        set
    }

    /// Add a role to the set.
    pub fn insert(&mut self, role: Role) {
        if !self.0.contains(&role) {
            self.0.push(role);
            self.0.sort();
        }
    }

    /// Check whether the set contains a role.
    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    /// Check whether the set grants administrator access.
    pub fn is_admin(&self) -> bool {
        self.contains(Role::Admin)
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate the roles in the set.
    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.0.iter().copied()
    }

    /// Role names as owned strings (for responses).
    pub fn names(&self) -> Vec<String> {
        self.0.iter().map(|r| r.as_str().to_string()).collect()
    }

    /// Database string representation ("general,admin").
    pub fn as_db_str(&self) -> String {
        self.0
            .iter()
            .map(|r| r.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_db_str())
    }
}

impl FromStr for RoleSet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut set = RoleSet::new();
        for part in s.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            set.insert(part.parse::<Role>()?);
        }
        Ok(set)
    }
}

/// User entity representing a registered account.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: i64,
    /// Email address (unique, case-insensitive).
    pub email: String,
    /// Password hash (Argon2). Never serialized outward.
    pub password: String,
    /// Display name.
    pub name: String,
    /// Avatar image reference (optional).
    pub avatar: Option<String>,
    /// Self-introduction text (optional).
    pub profile: Option<String>,
    /// Roles held by the user.
    pub roles: RoleSet,
    /// Account creation timestamp.
    pub created_at: String,
    /// Last modification timestamp.
    pub updated_at: String,
}

impl User {
    /// Check whether this user is an administrator.
    pub fn is_admin(&self) -> bool {
        self.roles.is_admin()
    }
}

impl FromRow<'_, SqliteRow> for User {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let roles: String = row.try_get("roles")?;
        let roles = roles
            .parse::<RoleSet>()
            .map_err(|e| sqlx::Error::ColumnDecode {
                index: "roles".to_string(),
                source: e.into(),
            })?;

        Ok(Self {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            password: row.try_get("password")?,
            name: row.try_get("name")?,
            avatar: row.try_get("avatar")?,
            profile: row.try_get("profile")?,
            roles,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Data for creating a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Email address.
    pub email: String,
    /// Password hash (must be pre-hashed with Argon2).
    pub password: String,
    /// Display name.
    pub name: String,
    /// Avatar image reference (optional).
    pub avatar: Option<String>,
    /// Roles (defaults to the general role).
    pub roles: RoleSet,
}

impl NewUser {
    /// Create a new user with the minimal required fields.
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            name: name.into(),
            avatar: None,
            roles: RoleSet::general(),
        }
    }

    /// Set the avatar reference.
    pub fn with_avatar(mut self, avatar: impl Into<String>) -> Self {
        self.avatar = Some(avatar.into());
        self
    }

    /// Set the role set.
    pub fn with_roles(mut self, roles: RoleSet) -> Self {
        self.roles = roles;
        self
    }
}

/// Data for updating an existing user.
///
/// Only fields that are set will be modified.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    /// New password hash (if changing password).
    pub password: Option<String>,
    /// New display name.
    pub name: Option<String>,
    /// New avatar reference (Some(None) clears it).
    pub avatar: Option<Option<String>>,
    /// New profile text (Some(None) clears it).
    pub profile: Option<Option<String>>,
    /// New role set.
    pub roles: Option<RoleSet>,
}

impl UserUpdate {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set new password hash.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Set new display name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set new avatar reference.
    pub fn avatar(mut self, avatar: Option<String>) -> Self {
        self.avatar = Some(avatar);
        self
    }

    /// Set new profile text.
    pub fn profile(mut self, profile: Option<String>) -> Self {
        self.profile = Some(profile);
        self
    }

    /// Set new role set.
    pub fn roles(mut self, roles: RoleSet) -> Self {
        self.roles = Some(roles);
        self
    }

    /// Check if any fields are set.
    pub fn is_empty(&self) -> bool {
        self.password.is_none()
            && self.name.is_none()
            && self.avatar.is_none()
            && self.profile.is_none()
            && self.roles.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_str() {
        assert_eq!(Role::from_str("general").unwrap(), Role::General);
        assert_eq!(Role::from_str("admin").unwrap(), Role::Admin);
        assert_eq!(Role::from_str("ADMIN").unwrap(), Role::Admin);
        assert!(Role::from_str("invalid").is_err());
    }

    #[test]
    fn test_role_display() {
        assert_eq!(format!("{}", Role::General), "general");
        assert_eq!(format!("{}", Role::Admin), "admin");
    }

    #[test]
    fn test_role_set_insert_dedup() {
        let mut set = RoleSet::new();
        set.insert(Role::Admin);
        set.insert(Role::General);
        set.insert(Role::Admin);
        assert_eq!(set.as_db_str(), "general,admin");
    }

    #[test]
    fn test_role_set_from_str() {
        let set: RoleSet = "general,admin".parse().unwrap();
        assert!(set.contains(Role::General));
        assert!(set.is_admin());

        let set: RoleSet = " admin , general ".parse().unwrap();
        assert_eq!(set.as_db_str(), "general,admin");

        assert!("general,bogus".parse::<RoleSet>().is_err());
    }

    #[test]
    fn test_role_set_empty_string() {
        let set: RoleSet = "".parse().unwrap();
        assert!(set.is_empty());
        assert!(!set.is_admin());
    }

    #[test]
    fn test_role_set_round_trip() {
        let set = RoleSet::from_roles(&[Role::Admin, Role::General]);
        let parsed: RoleSet = set.as_db_str().parse().unwrap();
        assert_eq!(parsed, set);
    }

    #[test]
    fn test_role_set_serde() {
        let set = RoleSet::from_roles(&[Role::General, Role::Admin]);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["general","admin"]"#);

        let back: RoleSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn test_new_user_builder() {
        let user = NewUser::new("alice@example.com", "hash", "Alice")
            .with_avatar("/avatars/alice.png")
            .with_roles(RoleSet::from_roles(&[Role::General, Role::Admin]));

        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.password, "hash");
        assert_eq!(user.name, "Alice");
        assert_eq!(user.avatar, Some("/avatars/alice.png".to_string()));
        assert!(user.roles.is_admin());
    }

    #[test]
    fn test_new_user_default_roles() {
        let user = NewUser::new("bob@example.com", "hash", "Bob");
        assert_eq!(user.roles, RoleSet::general());
        assert!(!user.roles.is_admin());
    }

    #[test]
    fn test_user_update_builder() {
        let update = UserUpdate::new()
            .name("New Name")
            .avatar(Some("/a.png".to_string()))
            .roles(RoleSet::general());

        assert!(update.name.is_some());
        assert!(update.avatar.is_some());
        assert!(update.roles.is_some());
        assert!(update.password.is_none());
        assert!(!update.is_empty());
    }

    #[test]
    fn test_user_update_empty() {
        assert!(UserUpdate::new().is_empty());
    }

    #[test]
    fn test_user_is_admin() {
        let user = User {
            id: 1,
            email: "a@example.com".to_string(),
            password: "hash".to_string(),
            name: "A".to_string(),
            avatar: None,
            profile: None,
            roles: RoleSet::general(),
            created_at: "2026-01-01".to_string(),
            updated_at: "2026-01-01".to_string(),
        };
        assert!(!user.is_admin());

        let admin = User {
            roles: RoleSet::from_roles(&[Role::General, Role::Admin]),
            ..user.clone()
        };
        assert!(admin.is_admin());
    }
}
