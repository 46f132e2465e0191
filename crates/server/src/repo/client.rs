use shared_types::{AppError, Client, ClientListQuery, CreateClientRequest, UpdateClientRequest};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::error_convert::SqlxErrorExt;

pub async fn create(
    pool: &Pool<Postgres>,
    advocate_id: Uuid,
    req: &CreateClientRequest,
    client_type: &str,
) -> Result<Client, AppError> {
    sqlx::query_as::<_, Client>(
        r#"
        INSERT INTO clients (advocate_id, name, email, phone, address, client_type, notes)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id, advocate_id, name, email, phone, address, client_type,
                  notes, created_at, updated_at
        "#,
    )
    .bind(advocate_id)
    .bind(req.name.trim())
    .bind(req.email.as_deref())
    .bind(req.phone.as_deref())
    .bind(req.address.as_deref())
    .bind(client_type)
    .bind(req.notes.as_deref())
    .fetch_one(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

pub async fn find_by_id(
    pool: &Pool<Postgres>,
    id: Uuid,
    scope: Option<Uuid>,
) -> Result<Option<Client>, AppError> {
    sqlx::query_as::<_, Client>(
        r#"
        SELECT id, advocate_id, name, email, phone, address, client_type,
               notes, created_at, updated_at
        FROM clients
        WHERE id = $1 AND ($2::UUID IS NULL OR advocate_id = $2)
        "#,
    )
    .bind(id)
    .bind(scope)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

/// Paginated listing; `search` matches name, email or phone.
pub async fn search(
    pool: &Pool<Postgres>,
    scope: Option<Uuid>,
    query: &ClientListQuery,
    offset: i64,
    limit: i64,
) -> Result<(Vec<Client>, i64), AppError> {
    let pattern = super::like_pattern(query.search.as_deref());

    let total = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM clients
        WHERE ($1::UUID IS NULL OR advocate_id = $1)
          AND ($2::TEXT IS NULL OR client_type = $2)
          AND ($3::TEXT IS NULL OR name ILIKE $3 OR email ILIKE $3 OR phone ILIKE $3)
        "#,
    )
    .bind(scope)
    .bind(query.client_type.as_deref())
    .bind(pattern.as_deref())
    .fetch_one(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    let rows = sqlx::query_as::<_, Client>(
        r#"
        SELECT id, advocate_id, name, email, phone, address, client_type,
               notes, created_at, updated_at
        FROM clients
        WHERE ($1::UUID IS NULL OR advocate_id = $1)
          AND ($2::TEXT IS NULL OR client_type = $2)
          AND ($3::TEXT IS NULL OR name ILIKE $3 OR email ILIKE $3 OR phone ILIKE $3)
        ORDER BY name ASC
        LIMIT $4 OFFSET $5
        "#,
    )
    .bind(scope)
    .bind(query.client_type.as_deref())
    .bind(pattern.as_deref())
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok((rows, total))
}

pub async fn update(
    pool: &Pool<Postgres>,
    id: Uuid,
    scope: Option<Uuid>,
    req: &UpdateClientRequest,
) -> Result<Option<Client>, AppError> {
    sqlx::query_as::<_, Client>(
        r#"
        UPDATE clients SET
            name        = COALESCE($3, name),
            email       = COALESCE($4, email),
            phone       = COALESCE($5, phone),
            address     = COALESCE($6, address),
            client_type = COALESCE($7, client_type),
            notes       = COALESCE($8, notes),
            updated_at  = NOW()
        WHERE id = $1 AND ($2::UUID IS NULL OR advocate_id = $2)
        RETURNING id, advocate_id, name, email, phone, address, client_type,
                  notes, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(scope)
    .bind(req.name.as_deref().map(str::trim))
    .bind(req.email.as_deref())
    .bind(req.phone.as_deref())
    .bind(req.address.as_deref())
    .bind(req.client_type.as_deref())
    .bind(req.notes.as_deref())
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

/// Delete a client. Their cases keep existing with `client_id` cleared.
pub async fn delete(pool: &Pool<Postgres>, id: Uuid, scope: Option<Uuid>) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM clients WHERE id = $1 AND ($2::UUID IS NULL OR advocate_id = $2)")
        .bind(id)
        .bind(scope)
        .execute(pool)
        .await
        .map_err(SqlxErrorExt::into_app_error)?;

    Ok(result.rows_affected() > 0)
}
