use shared_types::{AppError, Case, CaseListQuery, CreateCaseRequest, UpdateCaseRequest};
use sqlx::{Executor, Pool, Postgres};
use uuid::Uuid;

use crate::error_convert::SqlxErrorExt;

// `$n::UUID IS NULL OR advocate_id = $n` clauses below implement advocate
// scoping: `None` reads firm-wide, `Some(id)` only that advocate's rows.

/// Insert a new case.
pub async fn create(
    pool: &Pool<Postgres>,
    advocate_id: Uuid,
    req: &CreateCaseRequest,
    status: &str,
    priority: &str,
) -> Result<Case, AppError> {
    sqlx::query_as::<_, Case>(
        r#"
        INSERT INTO cases
            (advocate_id, client_id, case_number, title, description, case_type,
             status, priority, court_name, judge_name, filing_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING id, advocate_id, client_id, case_number, title, description,
                  case_type, status, priority, court_name, judge_name,
                  filing_date, next_hearing_date, created_at, updated_at
        "#,
    )
    .bind(advocate_id)
    .bind(req.client_id)
    .bind(req.case_number.trim())
    .bind(req.title.trim())
    .bind(&req.description)
    .bind(&req.case_type)
    .bind(status)
    .bind(priority)
    .bind(&req.court_name)
    .bind(req.judge_name.as_deref())
    .bind(req.filing_date)
    .fetch_one(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

/// Find a case by ID within the caller's scope.
pub async fn find_by_id(
    pool: &Pool<Postgres>,
    id: Uuid,
    scope: Option<Uuid>,
) -> Result<Option<Case>, AppError> {
    sqlx::query_as::<_, Case>(
        r#"
        SELECT id, advocate_id, client_id, case_number, title, description,
               case_type, status, priority, court_name, judge_name,
               filing_date, next_hearing_date, created_at, updated_at
        FROM cases
        WHERE id = $1 AND ($2::UUID IS NULL OR advocate_id = $2)
        "#,
    )
    .bind(id)
    .bind(scope)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

/// Filtered, paginated case listing.
pub async fn search(
    pool: &Pool<Postgres>,
    scope: Option<Uuid>,
    query: &CaseListQuery,
    offset: i64,
    limit: i64,
) -> Result<(Vec<Case>, i64), AppError> {
    let pattern = super::like_pattern(query.search.as_deref());

    let total = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM cases
        WHERE ($1::UUID IS NULL OR advocate_id = $1)
          AND ($2::TEXT IS NULL OR status = $2)
          AND ($3::TEXT IS NULL OR case_type = $3)
          AND ($4::TEXT IS NULL OR priority = $4)
          AND ($5::UUID IS NULL OR client_id = $5)
          AND ($6::TEXT IS NULL OR title ILIKE $6 OR case_number ILIKE $6)
        "#,
    )
    .bind(scope)
    .bind(query.status.as_deref())
    .bind(query.case_type.as_deref())
    .bind(query.priority.as_deref())
    .bind(query.client_id)
    .bind(pattern.as_deref())
    .fetch_one(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    let rows = sqlx::query_as::<_, Case>(
        r#"
        SELECT id, advocate_id, client_id, case_number, title, description,
               case_type, status, priority, court_name, judge_name,
               filing_date, next_hearing_date, created_at, updated_at
        FROM cases
        WHERE ($1::UUID IS NULL OR advocate_id = $1)
          AND ($2::TEXT IS NULL OR status = $2)
          AND ($3::TEXT IS NULL OR case_type = $3)
          AND ($4::TEXT IS NULL OR priority = $4)
          AND ($5::UUID IS NULL OR client_id = $5)
          AND ($6::TEXT IS NULL OR title ILIKE $6 OR case_number ILIKE $6)
        ORDER BY created_at DESC
        LIMIT $7 OFFSET $8
        "#,
    )
    .bind(scope)
    .bind(query.status.as_deref())
    .bind(query.case_type.as_deref())
    .bind(query.priority.as_deref())
    .bind(query.client_id)
    .bind(pattern.as_deref())
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok((rows, total))
}

/// Cases for one client, within the caller's scope.
pub async fn list_by_client(
    pool: &Pool<Postgres>,
    client_id: Uuid,
    scope: Option<Uuid>,
    offset: i64,
    limit: i64,
) -> Result<(Vec<Case>, i64), AppError> {
    let query = CaseListQuery {
        client_id: Some(client_id),
        ..Default::default()
    };
    search(pool, scope, &query, offset, limit).await
}

/// Update a case with only the provided fields.
pub async fn update(
    pool: &Pool<Postgres>,
    id: Uuid,
    scope: Option<Uuid>,
    req: &UpdateCaseRequest,
) -> Result<Option<Case>, AppError> {
    sqlx::query_as::<_, Case>(
        r#"
        UPDATE cases SET
            advocate_id = COALESCE($3, advocate_id),
            client_id   = COALESCE($4, client_id),
            title       = COALESCE($5, title),
            description = COALESCE($6, description),
            case_type   = COALESCE($7, case_type),
            status      = COALESCE($8, status),
            priority    = COALESCE($9, priority),
            court_name  = COALESCE($10, court_name),
            judge_name  = COALESCE($11, judge_name),
            filing_date = COALESCE($12, filing_date),
            updated_at  = NOW()
        WHERE id = $1 AND ($2::UUID IS NULL OR advocate_id = $2)
        RETURNING id, advocate_id, client_id, case_number, title, description,
                  case_type, status, priority, court_name, judge_name,
                  filing_date, next_hearing_date, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(scope)
    .bind(req.advocate_id)
    .bind(req.client_id)
    .bind(req.title.as_deref().map(str::trim))
    .bind(req.description.as_deref())
    .bind(req.case_type.as_deref())
    .bind(req.status.as_deref())
    .bind(req.priority.as_deref())
    .bind(req.court_name.as_deref())
    .bind(req.judge_name.as_deref())
    .bind(req.filing_date)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

/// Delete a case. Hearings and documents cascade. Returns true if a row was deleted.
pub async fn delete(pool: &Pool<Postgres>, id: Uuid, scope: Option<Uuid>) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM cases WHERE id = $1 AND ($2::UUID IS NULL OR advocate_id = $2)")
        .bind(id)
        .bind(scope)
        .execute(pool)
        .await
        .map_err(SqlxErrorExt::into_app_error)?;

    Ok(result.rows_affected() > 0)
}

/// Recompute `next_hearing_date` as the earliest scheduled hearing still in
/// the future, or NULL when there is none.
pub async fn refresh_next_hearing_date<'e, E>(executor: E, case_id: Uuid) -> Result<(), AppError>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        r#"
        UPDATE cases SET next_hearing_date = (
            SELECT MIN(hearing_date)
            FROM hearings
            WHERE case_id = $1 AND status = 'scheduled' AND hearing_date > NOW()
        )
        WHERE id = $1
        "#,
    )
    .bind(case_id)
    .execute(executor)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;
    Ok(())
}
