use shared_types::{AppError, UpdateProfileRequest, User};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::error_convert::SqlxErrorExt;

/// Insert the local profile row for a freshly signed-up Supabase user.
pub async fn create(
    pool: &Pool<Postgres>,
    id: Uuid,
    email: &str,
    full_name: &str,
    role: &str,
    phone: Option<&str>,
    bar_council_id: Option<&str>,
) -> Result<User, AppError> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, email, full_name, role, phone, bar_council_id)
        VALUES ($1, LOWER($2), $3, $4, $5, $6)
        RETURNING id, email, full_name, role, phone, bar_council_id,
                  is_active, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(email)
    .bind(full_name)
    .bind(role)
    .bind(phone)
    .bind(bar_council_id)
    .fetch_one(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

pub async fn find_by_id(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<User>, AppError> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, full_name, role, phone, bar_council_id,
               is_active, created_at, updated_at
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

/// True when `id` belongs to an active advocate.
pub async fn is_active_advocate(pool: &Pool<Postgres>, id: Uuid) -> Result<bool, AppError> {
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS (SELECT 1 FROM users WHERE id = $1 AND role = 'advocate' AND is_active)",
    )
    .bind(id)
    .fetch_one(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

/// Update the caller's own profile with only the provided fields.
pub async fn update_profile(
    pool: &Pool<Postgres>,
    id: Uuid,
    req: &UpdateProfileRequest,
) -> Result<Option<User>, AppError> {
    sqlx::query_as::<_, User>(
        r#"
        UPDATE users SET
            full_name      = COALESCE($2, full_name),
            phone          = COALESCE($3, phone),
            bar_council_id = COALESCE($4, bar_council_id),
            updated_at     = NOW()
        WHERE id = $1
        RETURNING id, email, full_name, role, phone, bar_council_id,
                  is_active, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(req.full_name.as_deref())
    .bind(req.phone.as_deref())
    .bind(req.bar_council_id.as_deref())
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

/// Admin change of role and/or active flag.
pub async fn admin_update(
    pool: &Pool<Postgres>,
    id: Uuid,
    role: Option<&str>,
    is_active: Option<bool>,
) -> Result<Option<User>, AppError> {
    sqlx::query_as::<_, User>(
        r#"
        UPDATE users SET
            role       = COALESCE($2, role),
            is_active  = COALESCE($3, is_active),
            updated_at = NOW()
        WHERE id = $1
        RETURNING id, email, full_name, role, phone, bar_council_id,
                  is_active, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(role)
    .bind(is_active)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

/// Paginated user listing for admins.
pub async fn search(
    pool: &Pool<Postgres>,
    role: Option<&str>,
    q: Option<&str>,
    offset: i64,
    limit: i64,
) -> Result<(Vec<User>, i64), AppError> {
    let pattern = super::like_pattern(q);

    let total = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM users
        WHERE ($1::TEXT IS NULL OR role = $1)
          AND ($2::TEXT IS NULL OR full_name ILIKE $2 OR email ILIKE $2)
        "#,
    )
    .bind(role)
    .bind(pattern.as_deref())
    .fetch_one(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    let rows = sqlx::query_as::<_, User>(
        r#"
        SELECT id, email, full_name, role, phone, bar_council_id,
               is_active, created_at, updated_at
        FROM users
        WHERE ($1::TEXT IS NULL OR role = $1)
          AND ($2::TEXT IS NULL OR full_name ILIKE $2 OR email ILIKE $2)
        ORDER BY created_at DESC
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(role)
    .bind(pattern.as_deref())
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok((rows, total))
}
