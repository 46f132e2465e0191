use chrono::{DateTime, Utc};
use shared_types::{AppError, CreateScheduleRequest, ScheduleEntry, UpdateScheduleRequest};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::error_convert::SqlxErrorExt;

// `owner = None` is the admin view across every user's schedule.

pub async fn create(
    pool: &Pool<Postgres>,
    user_id: Uuid,
    req: &CreateScheduleRequest,
    event_type: &str,
) -> Result<ScheduleEntry, AppError> {
    sqlx::query_as::<_, ScheduleEntry>(
        r#"
        INSERT INTO schedules
            (user_id, case_id, title, description, event_type, start_time,
             end_time, location, is_all_day)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING id, user_id, case_id, title, description, event_type,
                  start_time, end_time, location, is_all_day, created_at, updated_at
        "#,
    )
    .bind(user_id)
    .bind(req.case_id)
    .bind(req.title.trim())
    .bind(req.description.as_deref())
    .bind(event_type)
    .bind(req.start_time)
    .bind(req.end_time)
    .bind(req.location.as_deref())
    .bind(req.is_all_day)
    .fetch_one(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

pub async fn find_by_id(
    pool: &Pool<Postgres>,
    id: Uuid,
    owner: Option<Uuid>,
) -> Result<Option<ScheduleEntry>, AppError> {
    sqlx::query_as::<_, ScheduleEntry>(
        r#"
        SELECT id, user_id, case_id, title, description, event_type,
               start_time, end_time, location, is_all_day, created_at, updated_at
        FROM schedules
        WHERE id = $1 AND ($2::UUID IS NULL OR user_id = $2)
        "#,
    )
    .bind(id)
    .bind(owner)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

/// Entries overlapping `[from, to]`, ordered by start time.
pub async fn search(
    pool: &Pool<Postgres>,
    owner: Option<Uuid>,
    event_type: Option<&str>,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
    offset: i64,
    limit: i64,
) -> Result<(Vec<ScheduleEntry>, i64), AppError> {
    let total = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM schedules
        WHERE ($1::UUID IS NULL OR user_id = $1)
          AND ($2::TEXT IS NULL OR event_type = $2)
          AND ($3::TIMESTAMPTZ IS NULL OR end_time >= $3)
          AND ($4::TIMESTAMPTZ IS NULL OR start_time <= $4)
        "#,
    )
    .bind(owner)
    .bind(event_type)
    .bind(from)
    .bind(to)
    .fetch_one(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    let rows = sqlx::query_as::<_, ScheduleEntry>(
        r#"
        SELECT id, user_id, case_id, title, description, event_type,
               start_time, end_time, location, is_all_day, created_at, updated_at
        FROM schedules
        WHERE ($1::UUID IS NULL OR user_id = $1)
          AND ($2::TEXT IS NULL OR event_type = $2)
          AND ($3::TIMESTAMPTZ IS NULL OR end_time >= $3)
          AND ($4::TIMESTAMPTZ IS NULL OR start_time <= $4)
        ORDER BY start_time ASC
        LIMIT $5 OFFSET $6
        "#,
    )
    .bind(owner)
    .bind(event_type)
    .bind(from)
    .bind(to)
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
    owner: Option<Uuid>,
    req: &UpdateScheduleRequest,
) -> Result<Option<ScheduleEntry>, AppError> {
    sqlx::query_as::<_, ScheduleEntry>(
        r#"
        UPDATE schedules SET
            case_id     = COALESCE($3, case_id),
            title       = COALESCE($4, title),
            description = COALESCE($5, description),
            event_type  = COALESCE($6, event_type),
            start_time  = COALESCE($7, start_time),
            end_time    = COALESCE($8, end_time),
            location    = COALESCE($9, location),
            is_all_day  = COALESCE($10, is_all_day),
            updated_at  = NOW()
        WHERE id = $1 AND ($2::UUID IS NULL OR user_id = $2)
        RETURNING id, user_id, case_id, title, description, event_type,
                  start_time, end_time, location, is_all_day, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(owner)
    .bind(req.case_id)
    .bind(req.title.as_deref().map(str::trim))
    .bind(req.description.as_deref())
    .bind(req.event_type.as_deref())
    .bind(req.start_time)
    .bind(req.end_time)
    .bind(req.location.as_deref())
    .bind(req.is_all_day)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

pub async fn delete(pool: &Pool<Postgres>, id: Uuid, owner: Option<Uuid>) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM schedules WHERE id = $1 AND ($2::UUID IS NULL OR user_id = $2)")
        .bind(id)
        .bind(owner)
        .execute(pool)
        .await
        .map_err(SqlxErrorExt::into_app_error)?;
    Ok(result.rows_affected() > 0)
}
