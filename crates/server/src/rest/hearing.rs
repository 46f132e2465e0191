use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{Duration, Utc};
use sqlx::{Pool, Postgres};

use shared_types::{
    normalize_pagination, normalize_upcoming_days, ActivityAction, ApiResponse, AppError,
    CreateHearingRequest, HearingListQuery, HearingResponse, NewNotification, Paginated,
    UpcomingQuery, UpdateHearingRequest, HEARING_STATUSES,
};

use super::{ensure_one_of, parse_uuid};
use crate::auth::{AdvocateRequired, AuthRequired, StaffRequired, RoleRequired};
use crate::error_convert::ValidateRequest;
use crate::repo::{self, hearing::HearingFilter};

/// GET /api/hearings
pub async fn list_hearings(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(user): AuthRequired,
    Query(params): Query<HearingListQuery>,
) -> Result<ApiResponse<Paginated<HearingResponse>>, AppError> {
    if let Some(s) = params.status.as_deref() {
        ensure_one_of("status", s, HEARING_STATUSES)?;
    }
    if let (Some(from), Some(to)) = (params.from, params.to) {
        if to < from {
            return Err(AppError::bad_request("'to' must not be before 'from'"));
        }
    }

    let page = normalize_pagination(params.page, params.limit);
    let filter = HearingFilter {
        case_id: params.case_id,
        status: params.status,
        from: params.from,
        to: params.to,
    };
    let (hearings, total) = repo::hearing::search(
        &pool,
        user.advocate_scope(),
        &filter,
        page.offset(),
        page.limit,
    )
    .await?;

    let items = hearings.into_iter().map(HearingResponse::from).collect();
    Ok(ApiResponse::ok(
        "Hearings fetched",
        Paginated::new(items, page.page, page.limit, total),
    ))
}

/// GET /api/cases/{id}/hearings
pub async fn list_case_hearings(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(user): AuthRequired,
    Path(id): Path<String>,
    Query(params): Query<HearingListQuery>,
) -> Result<ApiResponse<Paginated<HearingResponse>>, AppError> {
    let case_id = parse_uuid(&id)?;
    let scope = user.advocate_scope();

    repo::case::find_by_id(&pool, case_id, scope)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Case {id} not found")))?;

    if let Some(s) = params.status.as_deref() {
        ensure_one_of("status", s, HEARING_STATUSES)?;
    }

    let page = normalize_pagination(params.page, params.limit);
    let filter = HearingFilter {
        case_id: Some(case_id),
        status: params.status,
        from: params.from,
        to: params.to,
    };
    let (hearings, total) =
        repo::hearing::search(&pool, scope, &filter, page.offset(), page.limit).await?;

    let items = hearings.into_iter().map(HearingResponse::from).collect();
    Ok(ApiResponse::ok(
        "Case hearings fetched",
        Paginated::new(items, page.page, page.limit, total),
    ))
}

/// GET /api/hearings/upcoming?days=N
///
/// Scheduled hearings from now until `days` ahead, soonest first.
pub async fn upcoming_hearings(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(user): AuthRequired,
    Query(params): Query<UpcomingQuery>,
) -> Result<ApiResponse<Paginated<HearingResponse>>, AppError> {
    let days = normalize_upcoming_days(params.days);
    let now = Utc::now();
    let filter = HearingFilter {
        case_id: None,
        status: Some("scheduled".to_string()),
        from: Some(now),
        to: Some(now + Duration::days(days)),
    };

    let page = normalize_pagination(params.page, params.limit);
    let (hearings, total) = repo::hearing::search(
        &pool,
        user.advocate_scope(),
        &filter,
        page.offset(),
        page.limit,
    )
    .await?;

    let items = hearings.into_iter().map(HearingResponse::from).collect();
    Ok(ApiResponse::ok(
        format!("Hearings in the next {days} days"),
        Paginated::new(items, page.page, page.limit, total),
    ))
}

/// GET /api/hearings/{id}
pub async fn get_hearing(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(user): AuthRequired,
    Path(id): Path<String>,
) -> Result<ApiResponse<HearingResponse>, AppError> {
    let hearing_id = parse_uuid(&id)?;
    let hearing = repo::hearing::find_by_id(&pool, hearing_id, user.advocate_scope())
        .await?
        .ok_or_else(|| AppError::not_found(format!("Hearing {id} not found")))?;

    Ok(ApiResponse::ok("Hearing fetched", HearingResponse::from(hearing)))
}

/// POST /api/hearings
///
/// Recomputes the case's `next_hearing_date` and notifies the owning advocate.
#[tracing::instrument(skip(pool, user, body), fields(user_id = %user.id, case_id = %body.case_id))]
pub async fn create_hearing(
    State(pool): State<Pool<Postgres>>,
    RoleRequired(user): StaffRequired,
    Json(body): Json<CreateHearingRequest>,
) -> Result<(StatusCode, ApiResponse<HearingResponse>), AppError> {
    body.validate_request()?;
    let status = body.status.as_deref().unwrap_or("scheduled");
    ensure_one_of("status", status, HEARING_STATUSES)?;

    repo::case::find_by_id(&pool, body.case_id, user.advocate_scope())
        .await?
        .ok_or_else(|| AppError::not_found(format!("Case {} not found", body.case_id)))?;

    let hearing = repo::hearing::create(&pool, &body, status, user.id).await?;

    repo::notification::notify(
        &pool,
        NewNotification {
            user_id: hearing.advocate_id,
            title: "New hearing scheduled".to_string(),
            message: format!(
                "{} for case {} on {}",
                hearing.hearing.title,
                hearing.case_number,
                hearing.hearing.hearing_date.format("%d %b %Y %H:%M UTC")
            ),
            notification_type: "hearing",
            related_id: Some(hearing.hearing.id),
        },
    )
    .await;

    repo::activity::record(
        &pool,
        user.id,
        ActivityAction::Create,
        "hearing",
        Some(hearing.hearing.id),
        format!("Scheduled hearing for case {}", hearing.case_number),
    )
    .await;

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok("Hearing created successfully", HearingResponse::from(hearing)),
    ))
}

/// PUT /api/hearings/{id}
#[tracing::instrument(skip(pool, user, body), fields(user_id = %user.id))]
pub async fn update_hearing(
    State(pool): State<Pool<Postgres>>,
    RoleRequired(user): StaffRequired,
    Path(id): Path<String>,
    Json(body): Json<UpdateHearingRequest>,
) -> Result<ApiResponse<HearingResponse>, AppError> {
    let hearing_id = parse_uuid(&id)?;
    if let Some(s) = body.status.as_deref() {
        ensure_one_of("status", s, HEARING_STATUSES)?;
    }
    if body.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(AppError::bad_request("Title cannot be empty"));
    }

    repo::hearing::find_by_id(&pool, hearing_id, user.advocate_scope())
        .await?
        .ok_or_else(|| AppError::not_found(format!("Hearing {id} not found")))?;

    let hearing = repo::hearing::update(&pool, hearing_id, &body)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Hearing {id} not found")))?;

    repo::activity::record(
        &pool,
        user.id,
        ActivityAction::Update,
        "hearing",
        Some(hearing_id),
        format!("Updated hearing for case {}", hearing.case_number),
    )
    .await;

    Ok(ApiResponse::ok("Hearing updated successfully", HearingResponse::from(hearing)))
}

/// DELETE /api/hearings/{id}
#[tracing::instrument(skip(pool, user), fields(user_id = %user.id))]
pub async fn delete_hearing(
    State(pool): State<Pool<Postgres>>,
    RoleRequired(user): AdvocateRequired,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, AppError> {
    let hearing_id = parse_uuid(&id)?;

    let hearing = repo::hearing::find_by_id(&pool, hearing_id, user.advocate_scope())
        .await?
        .ok_or_else(|| AppError::not_found(format!("Hearing {id} not found")))?;

    repo::hearing::delete(&pool, hearing_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Hearing {id} not found")))?;

    repo::activity::record(
        &pool,
        user.id,
        ActivityAction::Delete,
        "hearing",
        Some(hearing_id),
        format!("Deleted hearing for case {}", hearing.case_number),
    )
    .await;

    Ok(ApiResponse::message("Hearing deleted successfully"))
}
