pub mod activity;
pub mod auth;
pub mod case;
pub mod client;
pub mod dashboard;
pub mod document;
pub mod hearing;
pub mod notification;
pub mod payment;
pub mod schedule;

use axum::{
    routing::{get, patch, post, put},
    Router,
};
use shared_types::{AppError, UserRole};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::db::AppState;
use crate::repo;

/// Parse a path id, answering 400 for anything that is not a UUID.
pub(crate) fn parse_uuid(id: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id).map_err(|_| AppError::bad_request("Invalid UUID format"))
}

/// Reject a value outside its allowed set with a 400 naming the choices.
pub(crate) fn ensure_one_of(field: &str, value: &str, allowed: &[&str]) -> Result<(), AppError> {
    if allowed.contains(&value) {
        Ok(())
    } else {
        Err(AppError::bad_request(format!(
            "Invalid {field}: {value}. Valid values: {}",
            allowed.join(", ")
        )))
    }
}

/// The advocate a new case or client belongs to. Advocates always own what
/// they create; clerks and admins must name an active advocate.
pub(crate) async fn owning_advocate(
    pool: &Pool<Postgres>,
    user: &CurrentUser,
    requested: Option<Uuid>,
) -> Result<Uuid, AppError> {
    if user.role == UserRole::Advocate {
        return match requested {
            Some(id) if id != user.id => {
                Err(AppError::forbidden("Advocates can only create records for themselves"))
            }
            _ => Ok(user.id),
        };
    }

    let advocate_id =
        requested.ok_or_else(|| AppError::bad_request("advocate_id is required"))?;
    if !repo::user::is_active_advocate(pool, advocate_id).await? {
        return Err(AppError::bad_request("advocate_id must refer to an active advocate"));
    }
    Ok(advocate_id)
}

/// `/api/auth/*`. Kept separate so the binaries can rate-limit it.
pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/refresh", post(auth::refresh))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/profile", put(auth::update_profile))
        .route("/api/auth/users", get(auth::list_users))
        .route("/api/auth/users/{id}", patch(auth::admin_update_user))
}

/// Practice-management resources.
pub fn api_router() -> Router<AppState> {
    Router::new()
        // Cases
        .route("/api/cases", get(case::list_cases).post(case::create_case))
        .route(
            "/api/cases/{id}",
            get(case::get_case).put(case::update_case).delete(case::delete_case),
        )
        .route("/api/cases/{id}/hearings", get(hearing::list_case_hearings))
        .route("/api/cases/{id}/documents", get(document::list_case_documents))
        // Clients
        .route("/api/clients", get(client::list_clients).post(client::create_client))
        .route(
            "/api/clients/{id}",
            get(client::get_client).put(client::update_client).delete(client::delete_client),
        )
        .route("/api/clients/{id}/cases", get(client::list_client_cases))
        // Hearings
        .route("/api/hearings", get(hearing::list_hearings).post(hearing::create_hearing))
        .route("/api/hearings/upcoming", get(hearing::upcoming_hearings))
        .route(
            "/api/hearings/{id}",
            get(hearing::get_hearing)
                .put(hearing::update_hearing)
                .delete(hearing::delete_hearing),
        )
        // Documents
        .route(
            "/api/documents",
            get(document::list_documents).post(document::upload_document),
        )
        .route(
            "/api/documents/{id}",
            get(document::get_document)
                .put(document::update_document)
                .delete(document::delete_document),
        )
        .route("/api/documents/{id}/file", get(document::download_document))
        // Notifications
        .route(
            "/api/notifications",
            get(notification::list_notifications).post(notification::send_notification),
        )
        .route("/api/notifications/unread-count", get(notification::unread_count))
        .route("/api/notifications/read-all", patch(notification::mark_all_read))
        .route(
            "/api/notifications/{id}",
            axum::routing::delete(notification::delete_notification),
        )
        .route("/api/notifications/{id}/read", patch(notification::mark_read))
        // Schedule
        .route(
            "/api/schedule",
            get(schedule::list_schedule).post(schedule::create_schedule),
        )
        .route(
            "/api/schedule/{id}",
            get(schedule::get_schedule)
                .put(schedule::update_schedule)
                .delete(schedule::delete_schedule),
        )
        // Activity
        .route("/api/activity", get(activity::list_activity))
        // Dashboard
        .route("/api/dashboard/stats", get(dashboard::stats))
        .route("/api/dashboard/upcoming-hearings", get(dashboard::upcoming_hearings))
        .route("/api/dashboard/recent-activity", get(dashboard::recent_activity))
}

/// `/api/payments/*`, served by the payment service and optionally merged
/// into the main API.
pub fn payment_router() -> Router<AppState> {
    Router::new()
        .route("/api/payments", get(payment::list_payments))
        .route("/api/payments/orders", post(payment::create_order))
        .route("/api/payments/verify", post(payment::verify_payment))
        .route(
            "/api/payments/webhook",
            post(crate::razorpay::webhooks::handle_razorpay_webhook),
        )
}
