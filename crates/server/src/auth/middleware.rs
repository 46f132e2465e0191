use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::http::HeaderMap;
use axum::response::Response;
use shared_types::UserRole;
use sqlx::{Pool, Postgres};

use super::jwt::validate_access_token;
use super::{bearer_token, CurrentUser};
use crate::repo;

/// Permissive auth middleware.
///
/// Validates the bearer token as a Supabase access token, loads the local
/// user row by the token's `sub` and inserts a [`CurrentUser`] into the
/// request extensions. Missing or bad tokens, unknown or inactive users and
/// unknown role strings all leave the request anonymous; the extractors
/// decide whether that is acceptable.
pub async fn auth_middleware(
    State(pool): State<Pool<Postgres>>,
    mut req: Request,
    next: Next,
) -> Response {
    if let Some(user) = resolve_user(&pool, req.headers()).await {
        req.extensions_mut().insert(user);
    }
    next.run(req).await
}

async fn resolve_user(pool: &Pool<Postgres>, headers: &HeaderMap) -> Option<CurrentUser> {
    let token = bearer_token(headers)?;

    let claims = match validate_access_token(token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::debug!(error = %e, "rejected bearer token");
            return None;
        }
    };

    let user = match repo::user::find_by_id(pool, claims.sub).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            tracing::debug!(user_id = %claims.sub, "token subject has no local user row");
            return None;
        }
        Err(e) => {
            tracing::warn!(user_id = %claims.sub, error = %e, "user lookup failed during auth");
            return None;
        }
    };

    if !user.is_active {
        tracing::debug!(user_id = %user.id, "inactive user presented a valid token");
        return None;
    }

    let Some(role) = UserRole::parse(&user.role) else {
        tracing::warn!(user_id = %user.id, role = %user.role, "unknown role string, treating as anonymous");
        return None;
    };

    Some(CurrentUser {
        id: user.id,
        email: user.email,
        full_name: user.full_name,
        role,
    })
}
