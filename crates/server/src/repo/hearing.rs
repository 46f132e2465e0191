use chrono::{DateTime, Duration, Utc};
use shared_types::{AppError, CreateHearingRequest, HearingWithCase, UpdateHearingRequest};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::error_convert::SqlxErrorExt;

/// Filters for the hearing listing.
#[derive(Debug, Default, Clone)]
pub struct HearingFilter {
    pub case_id: Option<Uuid>,
    pub status: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// Insert a hearing and refresh the parent case's `next_hearing_date`
/// in the same transaction.
pub async fn create(
    pool: &Pool<Postgres>,
    req: &CreateHearingRequest,
    status: &str,
    created_by: Uuid,
) -> Result<HearingWithCase, AppError> {
    let mut tx = pool.begin().await.map_err(SqlxErrorExt::into_app_error)?;

    let row = sqlx::query_as::<_, HearingWithCase>(
        r#"
        WITH inserted AS (
            INSERT INTO hearings
                (case_id, title, hearing_date, court_room, judge_name, status, notes, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
        )
        SELECT i.id, i.case_id, i.title, i.hearing_date, i.court_room, i.judge_name,
               i.status, i.notes, i.created_by, i.created_at, i.updated_at,
               c.case_number, c.title AS case_title, c.advocate_id
        FROM inserted i
        JOIN cases c ON c.id = i.case_id
        "#,
    )
    .bind(req.case_id)
    .bind(req.title.trim())
    .bind(req.hearing_date)
    .bind(req.court_room.as_deref())
    .bind(req.judge_name.as_deref())
    .bind(status)
    .bind(req.notes.as_deref())
    .bind(created_by)
    .fetch_one(&mut *tx)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    super::case::refresh_next_hearing_date(&mut *tx, row.hearing.case_id).await?;
    tx.commit().await.map_err(SqlxErrorExt::into_app_error)?;

    Ok(row)
}

/// Find a hearing by ID; advocates only see hearings on their own cases.
pub async fn find_by_id(
    pool: &Pool<Postgres>,
    id: Uuid,
    scope: Option<Uuid>,
) -> Result<Option<HearingWithCase>, AppError> {
    sqlx::query_as::<_, HearingWithCase>(
        r#"
        SELECT h.id, h.case_id, h.title, h.hearing_date, h.court_room, h.judge_name,
               h.status, h.notes, h.created_by, h.created_at, h.updated_at,
               c.case_number, c.title AS case_title, c.advocate_id
        FROM hearings h
        JOIN cases c ON c.id = h.case_id
        WHERE h.id = $1 AND ($2::UUID IS NULL OR c.advocate_id = $2)
        "#,
    )
    .bind(id)
    .bind(scope)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

/// Filtered, paginated hearing listing ordered by hearing date.
pub async fn search(
    pool: &Pool<Postgres>,
    scope: Option<Uuid>,
    filter: &HearingFilter,
    offset: i64,
    limit: i64,
) -> Result<(Vec<HearingWithCase>, i64), AppError> {
    let total = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM hearings h
        JOIN cases c ON c.id = h.case_id
        WHERE ($1::UUID IS NULL OR c.advocate_id = $1)
          AND ($2::UUID IS NULL OR h.case_id = $2)
          AND ($3::TEXT IS NULL OR h.status = $3)
          AND ($4::TIMESTAMPTZ IS NULL OR h.hearing_date >= $4)
          AND ($5::TIMESTAMPTZ IS NULL OR h.hearing_date <= $5)
        "#,
    )
    .bind(scope)
    .bind(filter.case_id)
    .bind(filter.status.as_deref())
    .bind(filter.from)
    .bind(filter.to)
    .fetch_one(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    let rows = sqlx::query_as::<_, HearingWithCase>(
        r#"
        SELECT h.id, h.case_id, h.title, h.hearing_date, h.court_room, h.judge_name,
               h.status, h.notes, h.created_by, h.created_at, h.updated_at,
               c.case_number, c.title AS case_title, c.advocate_id
        FROM hearings h
        JOIN cases c ON c.id = h.case_id
        WHERE ($1::UUID IS NULL OR c.advocate_id = $1)
          AND ($2::UUID IS NULL OR h.case_id = $2)
          AND ($3::TEXT IS NULL OR h.status = $3)
          AND ($4::TIMESTAMPTZ IS NULL OR h.hearing_date >= $4)
          AND ($5::TIMESTAMPTZ IS NULL OR h.hearing_date <= $5)
        ORDER BY h.hearing_date ASC
        LIMIT $6 OFFSET $7
        "#,
    )
    .bind(scope)
    .bind(filter.case_id)
    .bind(filter.status.as_deref())
    .bind(filter.from)
    .bind(filter.to)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok((rows, total))
}

/// Scheduled hearings between now and `days` from now, soonest first.
pub async fn upcoming(
    pool: &Pool<Postgres>,
    scope: Option<Uuid>,
    days: i64,
    limit: i64,
) -> Result<Vec<HearingWithCase>, AppError> {
    let now = Utc::now();
    let until = now + Duration::days(days);

    sqlx::query_as::<_, HearingWithCase>(
        r#"
        SELECT h.id, h.case_id, h.title, h.hearing_date, h.court_room, h.judge_name,
               h.status, h.notes, h.created_by, h.created_at, h.updated_at,
               c.case_number, c.title AS case_title, c.advocate_id
        FROM hearings h
        JOIN cases c ON c.id = h.case_id
        WHERE ($1::UUID IS NULL OR c.advocate_id = $1)
          AND h.status = 'scheduled'
          AND h.hearing_date >= $2
          AND h.hearing_date <= $3
        ORDER BY h.hearing_date ASC
        LIMIT $4
        "#,
    )
    .bind(scope)
    .bind(now)
    .bind(until)
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

/// Update a hearing with only the provided fields and refresh the case's
/// `next_hearing_date`.
pub async fn update(
    pool: &Pool<Postgres>,
    id: Uuid,
    req: &UpdateHearingRequest,
) -> Result<Option<HearingWithCase>, AppError> {
    let mut tx = pool.begin().await.map_err(SqlxErrorExt::into_app_error)?;

    let row = sqlx::query_as::<_, HearingWithCase>(
        r#"
        WITH updated AS (
            UPDATE hearings SET
                title        = COALESCE($2, title),
                hearing_date = COALESCE($3, hearing_date),
                court_room   = COALESCE($4, court_room),
                judge_name   = COALESCE($5, judge_name),
                status       = COALESCE($6, status),
                notes        = COALESCE($7, notes),
                updated_at   = NOW()
            WHERE id = $1
            RETURNING *
        )
        SELECT u.id, u.case_id, u.title, u.hearing_date, u.court_room, u.judge_name,
               u.status, u.notes, u.created_by, u.created_at, u.updated_at,
               c.case_number, c.title AS case_title, c.advocate_id
        FROM updated u
        JOIN cases c ON c.id = u.case_id
        "#,
    )
    .bind(id)
    .bind(req.title.as_deref().map(str::trim))
    .bind(req.hearing_date)
    .bind(req.court_room.as_deref())
    .bind(req.judge_name.as_deref())
    .bind(req.status.as_deref())
    .bind(req.notes.as_deref())
    .fetch_optional(&mut *tx)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    if let Some(ref r) = row {
        super::case::refresh_next_hearing_date(&mut *tx, r.hearing.case_id).await?;
    }
    tx.commit().await.map_err(SqlxErrorExt::into_app_error)?;

    Ok(row)
}

/// Delete a hearing and refresh its case. Returns the case id when a row was deleted.
pub async fn delete(pool: &Pool<Postgres>, id: Uuid) -> Result<Option<Uuid>, AppError> {
    let mut tx = pool.begin().await.map_err(SqlxErrorExt::into_app_error)?;

    let case_id = sqlx::query_scalar::<_, Uuid>("DELETE FROM hearings WHERE id = $1 RETURNING case_id")
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(SqlxErrorExt::into_app_error)?;

    if let Some(case_id) = case_id {
        super::case::refresh_next_hearing_date(&mut *tx, case_id).await?;
    }
    tx.commit().await.map_err(SqlxErrorExt::into_app_error)?;

    Ok(case_id)
}
