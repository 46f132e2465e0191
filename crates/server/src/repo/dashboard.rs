use chrono::{Duration, Utc};
use shared_types::{AppError, DashboardStats, CLOSED_CASE_STATUSES};
use sqlx::{Pool, Postgres};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::error_convert::SqlxErrorExt;

/// Look-ahead window for the "upcoming hearings" counter.
pub const UPCOMING_WINDOW_DAYS: i64 = 7;

/// Aggregate counters for the dashboard, scoped the same way as the
/// listings: `scope = Some(advocate)` restricts cases, clients, hearings and
/// documents to that advocate. Unread notifications are always the caller's own.
pub async fn stats(
    pool: &Pool<Postgres>,
    scope: Option<Uuid>,
    user_id: Uuid,
) -> Result<DashboardStats, AppError> {
    let now = Utc::now();
    let until = now + Duration::days(UPCOMING_WINDOW_DAYS);
    let closed: Vec<String> = CLOSED_CASE_STATUSES.iter().map(|s| s.to_string()).collect();

    sqlx::query_as::<_, DashboardStats>(
        r#"
        SELECT
            (SELECT COUNT(*) FROM cases
              WHERE ($1::UUID IS NULL OR advocate_id = $1)) AS total_cases,
            (SELECT COUNT(*) FROM cases
              WHERE ($1::UUID IS NULL OR advocate_id = $1)
                AND status <> ALL($3)) AS open_cases,
            (SELECT COUNT(*) FROM cases
              WHERE ($1::UUID IS NULL OR advocate_id = $1)
                AND status = ANY($3)) AS closed_cases,
            (SELECT COUNT(*) FROM clients
              WHERE ($1::UUID IS NULL OR advocate_id = $1)) AS total_clients,
            (SELECT COUNT(*) FROM hearings h
               JOIN cases c ON c.id = h.case_id
              WHERE ($1::UUID IS NULL OR c.advocate_id = $1)
                AND h.status = 'scheduled'
                AND h.hearing_date >= $4 AND h.hearing_date <= $5) AS upcoming_hearings,
            (SELECT COUNT(*) FROM documents d
               LEFT JOIN cases c ON c.id = d.case_id
              WHERE ($1::UUID IS NULL OR c.advocate_id = $1 OR d.uploaded_by = $1)) AS total_documents,
            (SELECT COUNT(*) FROM notifications
              WHERE user_id = $2 AND NOT is_read) AS unread_notifications
        "#,
    )
    .bind(scope)
    .bind(user_id)
    .bind(&closed)
    .bind(now)
    .bind(until)
    .fetch_one(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

/// Active user count per role (admin dashboard).
pub async fn users_by_role(pool: &Pool<Postgres>) -> Result<BTreeMap<String, i64>, AppError> {
    let rows = sqlx::query_as::<_, (String, i64)>(
        "SELECT role, COUNT(*) FROM users WHERE is_active GROUP BY role ORDER BY role",
    )
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(rows.into_iter().collect())
}
