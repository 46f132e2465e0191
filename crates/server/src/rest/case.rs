use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use sqlx::{Pool, Postgres};

use shared_types::{
    normalize_pagination, ActivityAction, ApiResponse, AppError, CaseListQuery, CaseResponse,
    CreateCaseRequest, Paginated, UpdateCaseRequest, UserRole, CASE_PRIORITIES, CASE_STATUSES,
    CASE_TYPES,
};

use super::{ensure_one_of, owning_advocate, parse_uuid};
use crate::auth::{AdvocateRequired, AuthRequired, StaffRequired, RoleRequired};
use crate::error_convert::ValidateRequest;
use crate::repo;
use crate::storage::DynObjectStore;

/// GET /api/cases
pub async fn list_cases(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(user): AuthRequired,
    Query(params): Query<CaseListQuery>,
) -> Result<ApiResponse<Paginated<CaseResponse>>, AppError> {
    if let Some(s) = params.status.as_deref() {
        ensure_one_of("status", s, CASE_STATUSES)?;
    }
    if let Some(t) = params.case_type.as_deref() {
        ensure_one_of("case_type", t, CASE_TYPES)?;
    }
    if let Some(p) = params.priority.as_deref() {
        ensure_one_of("priority", p, CASE_PRIORITIES)?;
    }

    let page = normalize_pagination(params.page, params.limit);
    let (cases, total) = repo::case::search(
        &pool,
        user.advocate_scope(),
        &params,
        page.offset(),
        page.limit,
    )
    .await?;

    let items = cases.into_iter().map(CaseResponse::from).collect();
    Ok(ApiResponse::ok(
        "Cases fetched",
        Paginated::new(items, page.page, page.limit, total),
    ))
}

/// GET /api/cases/{id}
pub async fn get_case(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(user): AuthRequired,
    Path(id): Path<String>,
) -> Result<ApiResponse<CaseResponse>, AppError> {
    let case_id = parse_uuid(&id)?;
    let case = repo::case::find_by_id(&pool, case_id, user.advocate_scope())
        .await?
        .ok_or_else(|| AppError::not_found(format!("Case {id} not found")))?;

    Ok(ApiResponse::ok("Case fetched", CaseResponse::from(case)))
}

/// POST /api/cases
#[tracing::instrument(skip(pool, user, body), fields(user_id = %user.id, case_number = %body.case_number))]
pub async fn create_case(
    State(pool): State<Pool<Postgres>>,
    RoleRequired(user): StaffRequired,
    Json(body): Json<CreateCaseRequest>,
) -> Result<(StatusCode, ApiResponse<CaseResponse>), AppError> {
    body.validate_request()?;
    ensure_one_of("case_type", &body.case_type, CASE_TYPES)?;

    let status = body.status.as_deref().unwrap_or("open");
    ensure_one_of("status", status, CASE_STATUSES)?;
    let priority = body.priority.as_deref().unwrap_or("medium");
    ensure_one_of("priority", priority, CASE_PRIORITIES)?;

    let advocate_id = owning_advocate(&pool, &user, body.advocate_id).await?;

    if let Some(client_id) = body.client_id {
        repo::client::find_by_id(&pool, client_id, Some(advocate_id))
            .await?
            .ok_or_else(|| AppError::bad_request("Client not found for this advocate"))?;
    }

    let case = repo::case::create(&pool, advocate_id, &body, status, priority).await?;

    repo::activity::record(
        &pool,
        user.id,
        ActivityAction::Create,
        "case",
        Some(case.id),
        format!("Created case {}", case.case_number),
    )
    .await;

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok("Case created successfully", CaseResponse::from(case)),
    ))
}

/// PUT /api/cases/{id}
#[tracing::instrument(skip(pool, user, body), fields(user_id = %user.id))]
pub async fn update_case(
    State(pool): State<Pool<Postgres>>,
    RoleRequired(user): StaffRequired,
    Path(id): Path<String>,
    Json(body): Json<UpdateCaseRequest>,
) -> Result<ApiResponse<CaseResponse>, AppError> {
    let case_id = parse_uuid(&id)?;
    let scope = user.advocate_scope();

    if let Some(s) = body.status.as_deref() {
        ensure_one_of("status", s, CASE_STATUSES)?;
    }
    if let Some(t) = body.case_type.as_deref() {
        ensure_one_of("case_type", t, CASE_TYPES)?;
    }
    if let Some(p) = body.priority.as_deref() {
        ensure_one_of("priority", p, CASE_PRIORITIES)?;
    }
    if body.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(AppError::bad_request("Title cannot be empty"));
    }

    let existing = repo::case::find_by_id(&pool, case_id, scope)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Case {id} not found")))?;

    if let Some(new_owner) = body.advocate_id.filter(|a| *a != existing.advocate_id) {
        if user.role == UserRole::Advocate {
            return Err(AppError::forbidden("Advocates cannot reassign cases"));
        }
        if !repo::user::is_active_advocate(&pool, new_owner).await? {
            return Err(AppError::bad_request("advocate_id must refer to an active advocate"));
        }
    }

    if let Some(client_id) = body.client_id {
        let owner = body.advocate_id.unwrap_or(existing.advocate_id);
        repo::client::find_by_id(&pool, client_id, Some(owner))
            .await?
            .ok_or_else(|| AppError::bad_request("Client not found for this advocate"))?;
    }

    let case = repo::case::update(&pool, case_id, scope, &body)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Case {id} not found")))?;

    repo::activity::record(
        &pool,
        user.id,
        ActivityAction::Update,
        "case",
        Some(case.id),
        format!("Updated case {}", case.case_number),
    )
    .await;

    Ok(ApiResponse::ok("Case updated successfully", CaseResponse::from(case)))
}

/// DELETE /api/cases/{id}
///
/// Hearings and documents cascade in the database; the stored files behind
/// those documents are removed afterwards on a best-effort basis.
#[tracing::instrument(skip(pool, storage, user), fields(user_id = %user.id))]
pub async fn delete_case(
    State(pool): State<Pool<Postgres>>,
    State(storage): State<DynObjectStore>,
    RoleRequired(user): AdvocateRequired,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, AppError> {
    let case_id = parse_uuid(&id)?;
    let scope = user.advocate_scope();

    let case = repo::case::find_by_id(&pool, case_id, scope)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Case {id} not found")))?;
    let keys = repo::document::storage_keys_for_case(&pool, case_id).await?;

    if !repo::case::delete(&pool, case_id, scope).await? {
        return Err(AppError::not_found(format!("Case {id} not found")));
    }

    for key in &keys {
        if let Err(e) = storage.delete(key).await {
            tracing::warn!(%key, error = %e, "failed to delete stored document for removed case");
        }
    }

    repo::activity::record(
        &pool,
        user.id,
        ActivityAction::Delete,
        "case",
        Some(case_id),
        format!("Deleted case {}", case.case_number),
    )
    .await;

    Ok(ApiResponse::message("Case deleted successfully"))
}
