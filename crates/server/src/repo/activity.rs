use shared_types::{Activity, ActivityAction, AppError};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::error_convert::SqlxErrorExt;

/// Append one activity row. Failures are logged, never returned.
pub async fn record(
    pool: &Pool<Postgres>,
    user_id: Uuid,
    action: ActivityAction,
    entity_type: &str,
    entity_id: Option<Uuid>,
    description: impl Into<String>,
) {
    let description = description.into();
    let result = sqlx::query(
        r#"
        INSERT INTO activities (user_id, action, entity_type, entity_id, description)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(user_id)
    .bind(action.as_str())
    .bind(entity_type)
    .bind(entity_id)
    .bind(&description)
    .execute(pool)
    .await;

    if let Err(e) = result {
        tracing::warn!(
            %user_id,
            action = action.as_str(),
            entity_type,
            error = %e,
            "failed to record activity"
        );
    }
}

/// Paginated activity log, newest first. `user_id = None` is the admin view.
pub async fn list(
    pool: &Pool<Postgres>,
    user_id: Option<Uuid>,
    entity_type: Option<&str>,
    offset: i64,
    limit: i64,
) -> Result<(Vec<Activity>, i64), AppError> {
    let total = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM activities
        WHERE ($1::UUID IS NULL OR user_id = $1)
          AND ($2::TEXT IS NULL OR entity_type = $2)
        "#,
    )
    .bind(user_id)
    .bind(entity_type)
    .fetch_one(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    let rows = sqlx::query_as::<_, Activity>(
        r#"
        SELECT id, user_id, action, entity_type, entity_id, description, created_at
        FROM activities
        WHERE ($1::UUID IS NULL OR user_id = $1)
          AND ($2::TEXT IS NULL OR entity_type = $2)
        ORDER BY created_at DESC
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(user_id)
    .bind(entity_type)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok((rows, total))
}
