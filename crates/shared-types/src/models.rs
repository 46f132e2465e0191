use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Practice role controlling access to every resource.
///
/// - `Advocate`: owns cases and clients; full control over their own records.
/// - `Clerk`: firm-wide read/write on cases, clients, hearings and documents; no deletes.
/// - `Student`: read-only access to cases, hearings and documents.
/// - `Admin`: full access (superset of all roles).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Advocate,
    Clerk,
    Student,
    Admin,
}

/// Bitmask values for `RoleRequired<MASK>` guards.
pub mod roles {
    pub const ADVOCATE: u8 = 1 << 0;
    pub const CLERK: u8 = 1 << 1;
    pub const STUDENT: u8 = 1 << 2;
    pub const ADMIN: u8 = 1 << 3;

    /// Roles that manage firm records (create / update).
    pub const STAFF: u8 = ADVOCATE | CLERK;
    pub const ANY: u8 = ADVOCATE | CLERK | STUDENT | ADMIN;
}

/// Roles a user may pick for themselves at registration.
pub const SELF_SERVICE_ROLES: &[&str] = &["advocate", "clerk", "student"];

impl UserRole {
    /// Parse a role string. Unknown values yield `None` so callers fail closed.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "advocate" => Some(UserRole::Advocate),
            "clerk" => Some(UserRole::Clerk),
            "student" => Some(UserRole::Student),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }

    /// Lowercase string for database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Advocate => "advocate",
            UserRole::Clerk => "clerk",
            UserRole::Student => "student",
            UserRole::Admin => "admin",
        }
    }

    pub fn mask(&self) -> u8 {
        match self {
            UserRole::Advocate => roles::ADVOCATE,
            UserRole::Clerk => roles::CLERK,
            UserRole::Student => roles::STUDENT,
            UserRole::Admin => roles::ADMIN,
        }
    }

    /// True when this role is listed in `mask`. Admin satisfies every mask.
    pub fn allowed_by(&self, mask: u8) -> bool {
        *self == UserRole::Admin || self.mask() & mask != 0
    }

    pub fn is_admin(&self) -> bool {
        *self == UserRole::Admin
    }

    /// Human-readable list of the roles in `mask`, for 403 messages.
    pub fn describe_mask(mask: u8) -> String {
        [
            UserRole::Advocate,
            UserRole::Clerk,
            UserRole::Student,
            UserRole::Admin,
        ]
        .iter()
        .filter(|r| r.mask() & mask != 0)
        .map(|r| r.as_str())
        .collect::<Vec<_>>()
        .join(", ")
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A local user row. `id` is the Supabase auth user id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "server", derive(sqlx::FromRow))]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub phone: Option<String>,
    pub bar_council_id: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User profile as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bar_council_id: Option<String>,
    pub is_active: bool,
    pub created_at: String,
}

impl From<User> for UserProfile {
    fn from(u: User) -> Self {
        Self {
            id: u.id.to_string(),
            email: u.email,
            full_name: u.full_name,
            role: u.role,
            phone: u.phone,
            bar_council_id: u.bar_council_id,
            is_active: u.is_active,
            created_at: u.created_at.to_rfc3339(),
        }
    }
}

/// Supabase session tokens handed back to the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub token_type: String,
}

/// Response for register / login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthResponse {
    pub user: UserProfile,
    /// `None` when Supabase requires email confirmation before a session exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionTokens>,
}

/// Register request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "validation", derive(validator::Validate))]
pub struct RegisterRequest {
    #[cfg_attr(
        feature = "validation",
        validate(email(message = "Valid email is required"))
    )]
    pub email: String,
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 8, message = "Password must be at least 8 characters"))
    )]
    pub password: String,
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 2, max = 120, message = "Full name must be 2-120 characters"))
    )]
    pub full_name: String,
    pub role: String,
    pub phone: Option<String>,
    pub bar_council_id: Option<String>,
}

/// Login request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "validation", derive(validator::Validate))]
pub struct LoginRequest {
    #[cfg_attr(
        feature = "validation",
        validate(email(message = "Valid email is required"))
    )]
    pub email: String,
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 1, message = "Password is required"))
    )]
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Self-service profile update.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "validation", derive(validator::Validate))]
pub struct UpdateProfileRequest {
    #[cfg_attr(
        feature = "validation",
        validate(length(min = 2, max = 120, message = "Full name must be 2-120 characters"))
    )]
    pub full_name: Option<String>,
    pub phone: Option<String>,
    pub bar_council_id: Option<String>,
}

/// Admin update of another user's role or active flag.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AdminUpdateUserRequest {
    pub role: Option<String>,
    pub is_active: Option<bool>,
}

/// Query params for the admin user listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserListQuery {
    pub role: Option<String>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}
