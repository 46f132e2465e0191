pub mod extractors;
pub mod jwt;
pub mod middleware;

use axum::http::{header, HeaderMap};
use shared_types::UserRole;
use uuid::Uuid;

pub use extractors::{
    AdminRequired, AdvocateRequired, AuthRequired, RoleRequired, StaffRequired,
};

/// The authenticated caller, attached to request extensions by
/// [`middleware::auth_middleware`] when the bearer token is valid and the
/// local user row is active.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: UserRole,
}

impl CurrentUser {
    /// Advocates only see rows they own. Every other role reads firm-wide.
    pub fn advocate_scope(&self) -> Option<Uuid> {
        match self.role {
            UserRole::Advocate => Some(self.id),
            _ => None,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Extract the raw token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| {
            v.strip_prefix("Bearer ")
                .or_else(|| v.strip_prefix("bearer "))
        })
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
