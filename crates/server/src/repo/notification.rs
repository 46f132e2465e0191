use shared_types::{AppError, NewNotification, Notification};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::error_convert::SqlxErrorExt;

pub async fn create(pool: &Pool<Postgres>, n: &NewNotification) -> Result<Notification, AppError> {
    sqlx::query_as::<_, Notification>(
        r#"
        INSERT INTO notifications (user_id, title, message, notification_type, related_id)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, user_id, title, message, notification_type, is_read,
                  related_id, created_at
        "#,
    )
    .bind(n.user_id)
    .bind(&n.title)
    .bind(&n.message)
    .bind(n.notification_type)
    .bind(n.related_id)
    .fetch_one(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

/// Insert a system-generated notification. Failures are logged, never returned.
pub async fn notify(pool: &Pool<Postgres>, n: NewNotification) {
    if let Err(e) = create(pool, &n).await {
        tracing::warn!(
            user_id = %n.user_id,
            notification_type = n.notification_type,
            error = %e,
            "failed to create notification"
        );
    }
}

pub async fn list(
    pool: &Pool<Postgres>,
    user_id: Uuid,
    unread_only: bool,
    offset: i64,
    limit: i64,
) -> Result<(Vec<Notification>, i64), AppError> {
    let total = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND (NOT $2 OR NOT is_read)",
    )
    .bind(user_id)
    .bind(unread_only)
    .fetch_one(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    let rows = sqlx::query_as::<_, Notification>(
        r#"
        SELECT id, user_id, title, message, notification_type, is_read,
               related_id, created_at
        FROM notifications
        WHERE user_id = $1 AND (NOT $2 OR NOT is_read)
        ORDER BY created_at DESC
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(user_id)
    .bind(unread_only)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok((rows, total))
}

pub async fn unread_count(pool: &Pool<Postgres>, user_id: Uuid) -> Result<i64, AppError> {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND NOT is_read",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

pub async fn mark_read(
    pool: &Pool<Postgres>,
    id: Uuid,
    user_id: Uuid,
) -> Result<Option<Notification>, AppError> {
    sqlx::query_as::<_, Notification>(
        r#"
        UPDATE notifications SET is_read = TRUE
        WHERE id = $1 AND user_id = $2
        RETURNING id, user_id, title, message, notification_type, is_read,
                  related_id, created_at
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

/// Returns the number of notifications that flipped to read.
pub async fn mark_all_read(pool: &Pool<Postgres>, user_id: Uuid) -> Result<u64, AppError> {
    let result = sqlx::query("UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND NOT is_read")
        .bind(user_id)
        .execute(pool)
        .await
        .map_err(SqlxErrorExt::into_app_error)?;
    Ok(result.rows_affected())
}

pub async fn delete(pool: &Pool<Postgres>, id: Uuid, user_id: Uuid) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await
        .map_err(SqlxErrorExt::into_app_error)?;
    Ok(result.rows_affected() > 0)
}
