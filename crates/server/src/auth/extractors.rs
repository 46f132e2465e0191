use axum::{extract::FromRequestParts, http::request::Parts};
use shared_types::{roles, AppError, UserRole};

use super::CurrentUser;

fn current_user(parts: &Parts) -> Result<CurrentUser, AppError> {
    parts
        .extensions
        .get::<CurrentUser>()
        .cloned()
        .ok_or_else(|| AppError::unauthorized("Authentication required"))
}

/// Extractor that requires authentication. Returns 401 if no valid token.
pub struct AuthRequired(pub CurrentUser);

impl<S: Send + Sync> FromRequestParts<S> for AuthRequired {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        current_user(parts).map(AuthRequired)
    }
}

/// Extractor that requires authentication AND one of the roles in `MASK`
/// (see [`shared_types::roles`]). Admin satisfies every mask.
/// Returns 401 if unauthenticated, 403 if the role is not allowed.
pub struct RoleRequired<const MASK: u8>(pub CurrentUser);

impl<const MASK: u8, S: Send + Sync> FromRequestParts<S> for RoleRequired<MASK> {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = current_user(parts)?;

        if !user.role.allowed_by(MASK) {
            return Err(AppError::forbidden(format!(
                "Requires role: {}",
                UserRole::describe_mask(MASK | roles::ADMIN)
            )));
        }

        Ok(RoleRequired(user))
    }
}

/// Advocate, clerk or admin: may create and update firm records.
pub type StaffRequired = RoleRequired<{ roles::STAFF }>;

/// Advocate or admin: may delete cases, clients and hearings.
pub type AdvocateRequired = RoleRequired<{ roles::ADVOCATE }>;

pub type AdminRequired = RoleRequired<{ roles::ADMIN }>;
