use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use shared_types::{
    is_valid_time_range, normalize_pagination, ActivityAction, ApiResponse, AppError,
    CreateScheduleRequest, Paginated, ScheduleEntry, ScheduleListQuery, UpdateScheduleRequest,
    SCHEDULE_EVENT_TYPES,
};

use super::{ensure_one_of, parse_uuid};
use crate::auth::{AuthRequired, CurrentUser};
use crate::error_convert::ValidateRequest;
use crate::repo;

/// Entries a caller may touch: their own, or any for an admin.
fn owner_filter(user: &CurrentUser) -> Option<Uuid> {
    (!user.is_admin()).then_some(user.id)
}

fn invalid_range() -> AppError {
    AppError::bad_request("end_time must not be before start_time")
}

/// A linked case must be visible to the caller.
async fn check_case(
    pool: &Pool<Postgres>,
    user: &CurrentUser,
    case_id: Option<Uuid>,
) -> Result<(), AppError> {
    if let Some(case_id) = case_id {
        repo::case::find_by_id(pool, case_id, user.advocate_scope())
            .await?
            .ok_or_else(|| AppError::not_found(format!("Case {case_id} not found")))?;
    }
    Ok(())
}

/// GET /api/schedule
pub async fn list_schedule(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(user): AuthRequired,
    Query(params): Query<ScheduleListQuery>,
) -> Result<ApiResponse<Paginated<ScheduleEntry>>, AppError> {
    if let Some(t) = params.event_type.as_deref() {
        ensure_one_of("event_type", t, SCHEDULE_EVENT_TYPES)?;
    }
    if let (Some(from), Some(to)) = (params.from, params.to) {
        if !is_valid_time_range(from, to) {
            return Err(AppError::bad_request("'to' must not be before 'from'"));
        }
    }

    // Admins see everyone unless they narrow to one user.
    let owner = if user.is_admin() {
        params.user_id
    } else {
        Some(user.id)
    };

    let page = normalize_pagination(params.page, params.limit);
    let (items, total) = repo::schedule::search(
        &pool,
        owner,
        params.event_type.as_deref(),
        params.from,
        params.to,
        page.offset(),
        page.limit,
    )
    .await?;

    Ok(ApiResponse::ok(
        "Schedule fetched",
        Paginated::new(items, page.page, page.limit, total),
    ))
}

/// GET /api/schedule/{id}
pub async fn get_schedule(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(user): AuthRequired,
    Path(id): Path<String>,
) -> Result<ApiResponse<ScheduleEntry>, AppError> {
    let entry_id = parse_uuid(&id)?;
    let entry = repo::schedule::find_by_id(&pool, entry_id, owner_filter(&user))
        .await?
        .ok_or_else(|| AppError::not_found(format!("Schedule entry {id} not found")))?;

    Ok(ApiResponse::ok("Schedule entry fetched", entry))
}

/// POST /api/schedule
#[tracing::instrument(skip(pool, user, body), fields(user_id = %user.id))]
pub async fn create_schedule(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(user): AuthRequired,
    Json(body): Json<CreateScheduleRequest>,
) -> Result<(StatusCode, ApiResponse<ScheduleEntry>), AppError> {
    body.validate_request()?;
    if !is_valid_time_range(body.start_time, body.end_time) {
        return Err(invalid_range());
    }
    let event_type = body.event_type.as_deref().unwrap_or("other");
    ensure_one_of("event_type", event_type, SCHEDULE_EVENT_TYPES)?;
    check_case(&pool, &user, body.case_id).await?;

    let entry = repo::schedule::create(&pool, user.id, &body, event_type).await?;

    repo::activity::record(
        &pool,
        user.id,
        ActivityAction::Create,
        "schedule",
        Some(entry.id),
        format!("Scheduled {}", entry.title),
    )
    .await;

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok("Schedule entry created", entry),
    ))
}

/// PUT /api/schedule/{id}
///
/// The time range is checked against the merged result, so moving only
/// `start_time` past the stored `end_time` is rejected.
#[tracing::instrument(skip(pool, user, body), fields(user_id = %user.id))]
pub async fn update_schedule(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(user): AuthRequired,
    Path(id): Path<String>,
    Json(body): Json<UpdateScheduleRequest>,
) -> Result<ApiResponse<ScheduleEntry>, AppError> {
    let entry_id = parse_uuid(&id)?;
    let owner = owner_filter(&user);

    if let Some(t) = body.event_type.as_deref() {
        ensure_one_of("event_type", t, SCHEDULE_EVENT_TYPES)?;
    }
    if body.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(AppError::bad_request("Title cannot be empty"));
    }

    let existing = repo::schedule::find_by_id(&pool, entry_id, owner)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Schedule entry {id} not found")))?;

    let start = body.start_time.unwrap_or(existing.start_time);
    let end = body.end_time.unwrap_or(existing.end_time);
    if !is_valid_time_range(start, end) {
        return Err(invalid_range());
    }
    check_case(&pool, &user, body.case_id).await?;

    let entry = repo::schedule::update(&pool, entry_id, owner, &body)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Schedule entry {id} not found")))?;

    repo::activity::record(
        &pool,
        user.id,
        ActivityAction::Update,
        "schedule",
        Some(entry.id),
        format!("Updated {}", entry.title),
    )
    .await;

    Ok(ApiResponse::ok("Schedule entry updated", entry))
}

/// DELETE /api/schedule/{id}
pub async fn delete_schedule(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(user): AuthRequired,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, AppError> {
    let entry_id = parse_uuid(&id)?;
    if !repo::schedule::delete(&pool, entry_id, owner_filter(&user)).await? {
        return Err(AppError::not_found(format!("Schedule entry {id} not found")));
    }

    repo::activity::record(
        &pool,
        user.id,
        ActivityAction::Delete,
        "schedule",
        Some(entry_id),
        "Deleted schedule entry",
    )
    .await;

    Ok(ApiResponse::message("Schedule entry deleted"))
}
