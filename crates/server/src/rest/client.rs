use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use sqlx::{Pool, Postgres};

use shared_types::{
    normalize_pagination, ActivityAction, ApiResponse, AppError, CaseListQuery, CaseResponse,
    ClientListQuery, ClientResponse, CreateClientRequest, Paginated, UpdateClientRequest,
    CLIENT_TYPES,
};

use super::{ensure_one_of, owning_advocate, parse_uuid};
use crate::auth::{AdvocateRequired, StaffRequired, RoleRequired};
use crate::error_convert::ValidateRequest;
use crate::repo;

/// GET /api/clients
pub async fn list_clients(
    State(pool): State<Pool<Postgres>>,
    RoleRequired(user): StaffRequired,
    Query(params): Query<ClientListQuery>,
) -> Result<ApiResponse<Paginated<ClientResponse>>, AppError> {
    if let Some(t) = params.client_type.as_deref() {
        ensure_one_of("client_type", t, CLIENT_TYPES)?;
    }

    let page = normalize_pagination(params.page, params.limit);
    let (clients, total) = repo::client::search(
        &pool,
        user.advocate_scope(),
        &params,
        page.offset(),
        page.limit,
    )
    .await?;

    let items = clients.into_iter().map(ClientResponse::from).collect();
    Ok(ApiResponse::ok(
        "Clients fetched",
        Paginated::new(items, page.page, page.limit, total),
    ))
}

/// GET /api/clients/{id}
pub async fn get_client(
    State(pool): State<Pool<Postgres>>,
    RoleRequired(user): StaffRequired,
    Path(id): Path<String>,
) -> Result<ApiResponse<ClientResponse>, AppError> {
    let client_id = parse_uuid(&id)?;
    let client = repo::client::find_by_id(&pool, client_id, user.advocate_scope())
        .await?
        .ok_or_else(|| AppError::not_found(format!("Client {id} not found")))?;

    Ok(ApiResponse::ok("Client fetched", ClientResponse::from(client)))
}

/// GET /api/clients/{id}/cases
pub async fn list_client_cases(
    State(pool): State<Pool<Postgres>>,
    RoleRequired(user): StaffRequired,
    Path(id): Path<String>,
    Query(params): Query<CaseListQuery>,
) -> Result<ApiResponse<Paginated<CaseResponse>>, AppError> {
    let client_id = parse_uuid(&id)?;
    let scope = user.advocate_scope();

    repo::client::find_by_id(&pool, client_id, scope)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Client {id} not found")))?;

    let page = normalize_pagination(params.page, params.limit);
    let (cases, total) =
        repo::case::list_by_client(&pool, client_id, scope, page.offset(), page.limit).await?;

    let items = cases.into_iter().map(CaseResponse::from).collect();
    Ok(ApiResponse::ok(
        "Client cases fetched",
        Paginated::new(items, page.page, page.limit, total),
    ))
}

/// POST /api/clients
#[tracing::instrument(skip(pool, user, body), fields(user_id = %user.id))]
pub async fn create_client(
    State(pool): State<Pool<Postgres>>,
    RoleRequired(user): StaffRequired,
    Json(body): Json<CreateClientRequest>,
) -> Result<(StatusCode, ApiResponse<ClientResponse>), AppError> {
    body.validate_request()?;
    let client_type = body.client_type.as_deref().unwrap_or("individual");
    ensure_one_of("client_type", client_type, CLIENT_TYPES)?;

    let advocate_id = owning_advocate(&pool, &user, body.advocate_id).await?;
    let client = repo::client::create(&pool, advocate_id, &body, client_type).await?;

    repo::activity::record(
        &pool,
        user.id,
        ActivityAction::Create,
        "client",
        Some(client.id),
        format!("Added client {}", client.name),
    )
    .await;

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok("Client created successfully", ClientResponse::from(client)),
    ))
}

/// PUT /api/clients/{id}
#[tracing::instrument(skip(pool, user, body), fields(user_id = %user.id))]
pub async fn update_client(
    State(pool): State<Pool<Postgres>>,
    RoleRequired(user): StaffRequired,
    Path(id): Path<String>,
    Json(body): Json<UpdateClientRequest>,
) -> Result<ApiResponse<ClientResponse>, AppError> {
    let client_id = parse_uuid(&id)?;
    body.validate_request()?;
    if let Some(t) = body.client_type.as_deref() {
        ensure_one_of("client_type", t, CLIENT_TYPES)?;
    }

    let client = repo::client::update(&pool, client_id, user.advocate_scope(), &body)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Client {id} not found")))?;

    repo::activity::record(
        &pool,
        user.id,
        ActivityAction::Update,
        "client",
        Some(client.id),
        format!("Updated client {}", client.name),
    )
    .await;

    Ok(ApiResponse::ok("Client updated successfully", ClientResponse::from(client)))
}

/// DELETE /api/clients/{id}
///
/// Cases that referenced the client keep existing with `client_id` cleared.
#[tracing::instrument(skip(pool, user), fields(user_id = %user.id))]
pub async fn delete_client(
    State(pool): State<Pool<Postgres>>,
    RoleRequired(user): AdvocateRequired,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, AppError> {
    let client_id = parse_uuid(&id)?;

    if !repo::client::delete(&pool, client_id, user.advocate_scope()).await? {
        return Err(AppError::not_found(format!("Client {id} not found")));
    }

    repo::activity::record(
        &pool,
        user.id,
        ActivityAction::Delete,
        "client",
        Some(client_id),
        "Deleted client",
    )
    .await;

    Ok(ApiResponse::message("Client deleted successfully"))
}
