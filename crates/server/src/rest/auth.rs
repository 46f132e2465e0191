use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use sqlx::{Pool, Postgres};
use std::sync::Arc;

use shared_types::{
    normalize_pagination, ActivityAction, AdminUpdateUserRequest, ApiResponse, AppError,
    AuthResponse, LoginRequest, Paginated, RefreshRequest, RegisterRequest, SessionTokens,
    UpdateProfileRequest, UserListQuery, UserProfile, UserRole, SELF_SERVICE_ROLES,
};

use super::parse_uuid;
use crate::auth::{bearer_token, AdminRequired, AuthRequired, RoleRequired};
use crate::error_convert::ValidateRequest;
use crate::repo;
use crate::supabase::SupabaseAuth;

fn supabase_client(
    supabase: Option<Arc<SupabaseAuth>>,
) -> Result<Arc<SupabaseAuth>, AppError> {
    supabase.ok_or_else(|| AppError::unavailable("Authentication provider is not configured"))
}

/// POST /api/auth/register
#[tracing::instrument(skip(pool, supabase, body), fields(email = %body.email))]
pub async fn register(
    State(pool): State<Pool<Postgres>>,
    State(supabase): State<Option<Arc<SupabaseAuth>>>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, ApiResponse<AuthResponse>), AppError> {
    body.validate_request()?;

    let role = body.role.trim().to_lowercase();
    if !SELF_SERVICE_ROLES.contains(&role.as_str()) {
        return Err(AppError::bad_request(format!(
            "Invalid role: {}. Valid values: {}",
            body.role,
            SELF_SERVICE_ROLES.join(", ")
        )));
    }

    let supabase = supabase_client(supabase)?;
    let email = body.email.trim().to_lowercase();

    let signup = supabase
        .sign_up(
            &email,
            &body.password,
            serde_json::json!({ "full_name": body.full_name, "role": role }),
        )
        .await?;

    let user = match repo::user::create(
        &pool,
        signup.user_id,
        &email,
        body.full_name.trim(),
        &role,
        body.phone.as_deref(),
        body.bar_council_id.as_deref(),
    )
    .await
    {
        Ok(user) => user,
        Err(e) => {
            // Roll back the auth user so the email can register again.
            if let Err(cleanup) = supabase.admin_delete_user(signup.user_id).await {
                tracing::error!(
                    user_id = %signup.user_id,
                    error = %cleanup,
                    "failed to remove auth user after local insert failed"
                );
            }
            return Err(e);
        }
    };

    repo::activity::record(
        &pool,
        user.id,
        ActivityAction::Create,
        "user",
        Some(user.id),
        format!("Registered as {role}"),
    )
    .await;

    tracing::info!(user_id = %user.id, %role, "user registered");

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(
            "User registered successfully",
            AuthResponse {
                user: UserProfile::from(user),
                session: signup.session,
            },
        ),
    ))
}

/// POST /api/auth/login
#[tracing::instrument(skip(pool, supabase, body), fields(email = %body.email))]
pub async fn login(
    State(pool): State<Pool<Postgres>>,
    State(supabase): State<Option<Arc<SupabaseAuth>>>,
    Json(body): Json<LoginRequest>,
) -> Result<ApiResponse<AuthResponse>, AppError> {
    body.validate_request()?;
    let supabase = supabase_client(supabase)?;

    let session = supabase
        .sign_in_with_password(&body.email.trim().to_lowercase(), &body.password)
        .await
        .map_err(|e| {
            if e.is_credential_rejection() {
                AppError::unauthorized("Invalid email or password")
            } else {
                e.into()
            }
        })?;

    let user = repo::user::find_by_id(&pool, session.user.id)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| AppError::unauthorized("Account is inactive or not registered"))?;

    repo::activity::record(
        &pool,
        user.id,
        ActivityAction::Login,
        "user",
        Some(user.id),
        "Logged in",
    )
    .await;

    Ok(ApiResponse::ok(
        "Login successful",
        AuthResponse {
            user: UserProfile::from(user),
            session: Some(SessionTokens::from(session)),
        },
    ))
}

/// POST /api/auth/refresh
#[tracing::instrument(skip_all)]
pub async fn refresh(
    State(supabase): State<Option<Arc<SupabaseAuth>>>,
    Json(body): Json<RefreshRequest>,
) -> Result<ApiResponse<SessionTokens>, AppError> {
    if body.refresh_token.trim().is_empty() {
        return Err(AppError::bad_request("Refresh token is required"));
    }
    let supabase = supabase_client(supabase)?;

    let session = supabase
        .refresh_session(body.refresh_token.trim())
        .await
        .map_err(|e| {
            if e.is_credential_rejection() {
                AppError::unauthorized("Invalid or expired refresh token")
            } else {
                e.into()
            }
        })?;

    Ok(ApiResponse::ok("Token refreshed", SessionTokens::from(session)))
}

/// POST /api/auth/logout
#[tracing::instrument(skip(supabase, headers, user), fields(user_id = %user.id))]
pub async fn logout(
    AuthRequired(user): AuthRequired,
    State(supabase): State<Option<Arc<SupabaseAuth>>>,
    headers: HeaderMap,
) -> Result<ApiResponse<()>, AppError> {
    let supabase = supabase_client(supabase)?;
    let token = bearer_token(&headers)
        .ok_or_else(|| AppError::unauthorized("Authentication required"))?;

    match supabase.sign_out(token).await {
        Ok(()) => {}
        // The session is already gone.
        Err(e) if e.is_credential_rejection() => {
            tracing::debug!(error = %e, "logout for an already revoked session");
        }
        Err(e) => return Err(e.into()),
    }

    Ok(ApiResponse::message("Logged out successfully"))
}

/// GET /api/auth/me
pub async fn me(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(user): AuthRequired,
) -> Result<ApiResponse<UserProfile>, AppError> {
    let row = repo::user::find_by_id(&pool, user.id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(ApiResponse::ok("Profile fetched", UserProfile::from(row)))
}

/// PUT /api/auth/profile
#[tracing::instrument(skip(pool, user, body), fields(user_id = %user.id))]
pub async fn update_profile(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(user): AuthRequired,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<ApiResponse<UserProfile>, AppError> {
    body.validate_request()?;

    let row = repo::user::update_profile(&pool, user.id, &body)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    repo::activity::record(
        &pool,
        user.id,
        ActivityAction::Update,
        "user",
        Some(user.id),
        "Updated profile",
    )
    .await;

    Ok(ApiResponse::ok("Profile updated", UserProfile::from(row)))
}

/// GET /api/auth/users
pub async fn list_users(
    State(pool): State<Pool<Postgres>>,
    RoleRequired(_admin): AdminRequired,
    Query(params): Query<UserListQuery>,
) -> Result<ApiResponse<Paginated<UserProfile>>, AppError> {
    let role = match params.role.as_deref() {
        Some(r) => Some(
            UserRole::parse(r)
                .ok_or_else(|| AppError::bad_request(format!("Invalid role: {r}")))?
                .as_str(),
        ),
        None => None,
    };
    let page = normalize_pagination(params.page, params.limit);

    let (users, total) = repo::user::search(
        &pool,
        role,
        params.search.as_deref(),
        page.offset(),
        page.limit,
    )
    .await?;

    let items = users.into_iter().map(UserProfile::from).collect();
    Ok(ApiResponse::ok(
        "Users fetched",
        Paginated::new(items, page.page, page.limit, total),
    ))
}

/// PATCH /api/auth/users/{id}
#[tracing::instrument(skip(pool, admin, body), fields(admin_id = %admin.id))]
pub async fn admin_update_user(
    State(pool): State<Pool<Postgres>>,
    RoleRequired(admin): AdminRequired,
    Path(id): Path<String>,
    Json(body): Json<AdminUpdateUserRequest>,
) -> Result<ApiResponse<UserProfile>, AppError> {
    let user_id = parse_uuid(&id)?;

    let role = match body.role.as_deref() {
        Some(r) => Some(
            UserRole::parse(r)
                .ok_or_else(|| AppError::bad_request(format!("Invalid role: {r}")))?
                .as_str(),
        ),
        None => None,
    };

    if user_id == admin.id && (body.is_active == Some(false) || role.is_some_and(|r| r != "admin")) {
        return Err(AppError::bad_request(
            "Admins cannot deactivate or demote themselves",
        ));
    }

    let row = repo::user::admin_update(&pool, user_id, role, body.is_active)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {id} not found")))?;

    repo::activity::record(
        &pool,
        admin.id,
        ActivityAction::Update,
        "user",
        Some(row.id),
        format!("Set role={} active={} for {}", row.role, row.is_active, row.email),
    )
    .await;

    Ok(ApiResponse::ok("User updated", UserProfile::from(row)))
}
