use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use sqlx::{Pool, Postgres};

use shared_types::{
    normalize_pagination, ApiResponse, AppError, CountResponse, NewNotification, Notification,
    NotificationListQuery, Paginated, SendNotificationRequest, NOTIFICATION_TYPES,
};

use super::{ensure_one_of, parse_uuid};
use crate::auth::{AdminRequired, AuthRequired, RoleRequired};
use crate::error_convert::ValidateRequest;
use crate::repo;

/// GET /api/notifications
pub async fn list_notifications(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(user): AuthRequired,
    Query(params): Query<NotificationListQuery>,
) -> Result<ApiResponse<Paginated<Notification>>, AppError> {
    let page = normalize_pagination(params.page, params.limit);
    let (items, total) = repo::notification::list(
        &pool,
        user.id,
        params.unread_only,
        page.offset(),
        page.limit,
    )
    .await?;

    Ok(ApiResponse::ok(
        "Notifications fetched",
        Paginated::new(items, page.page, page.limit, total),
    ))
}

/// GET /api/notifications/unread-count
pub async fn unread_count(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(user): AuthRequired,
) -> Result<ApiResponse<CountResponse>, AppError> {
    let count = repo::notification::unread_count(&pool, user.id).await?;
    Ok(ApiResponse::ok("Unread count fetched", CountResponse { count }))
}

/// PATCH /api/notifications/{id}/read
pub async fn mark_read(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(user): AuthRequired,
    Path(id): Path<String>,
) -> Result<ApiResponse<Notification>, AppError> {
    let notification_id = parse_uuid(&id)?;
    let notification = repo::notification::mark_read(&pool, notification_id, user.id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Notification {id} not found")))?;

    Ok(ApiResponse::ok("Notification marked as read", notification))
}

/// PATCH /api/notifications/read-all
pub async fn mark_all_read(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(user): AuthRequired,
) -> Result<ApiResponse<CountResponse>, AppError> {
    let updated = repo::notification::mark_all_read(&pool, user.id).await?;
    Ok(ApiResponse::ok(
        "All notifications marked as read",
        CountResponse {
            count: updated as i64,
        },
    ))
}

/// DELETE /api/notifications/{id}
pub async fn delete_notification(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(user): AuthRequired,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, AppError> {
    let notification_id = parse_uuid(&id)?;
    if !repo::notification::delete(&pool, notification_id, user.id).await? {
        return Err(AppError::not_found(format!("Notification {id} not found")));
    }
    Ok(ApiResponse::message("Notification deleted"))
}

/// POST /api/notifications (admin)
#[tracing::instrument(skip(pool, admin, body), fields(admin_id = %admin.id, recipient = %body.user_id))]
pub async fn send_notification(
    State(pool): State<Pool<Postgres>>,
    RoleRequired(admin): AdminRequired,
    Json(body): Json<SendNotificationRequest>,
) -> Result<(StatusCode, ApiResponse<Notification>), AppError> {
    body.validate_request()?;

    let notification_type = match body.notification_type.as_deref() {
        Some(t) => {
            ensure_one_of("notification_type", t, NOTIFICATION_TYPES)?;
            NOTIFICATION_TYPES
                .iter()
                .copied()
                .find(|known| *known == t)
                .unwrap_or("system")
        }
        None => "system",
    };

    repo::user::find_by_id(&pool, body.user_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {} not found", body.user_id)))?;

    let notification = repo::notification::create(
        &pool,
        &NewNotification {
            user_id: body.user_id,
            title: body.title.trim().to_string(),
            message: body.message.trim().to_string(),
            notification_type,
            related_id: body.related_id,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok("Notification sent", notification),
    ))
}
