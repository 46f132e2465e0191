use axum::extract::{Query, State};
use sqlx::{Pool, Postgres};

use shared_types::{normalize_pagination, Activity, ActivityListQuery, ApiResponse, AppError, Paginated};

use crate::auth::AuthRequired;
use crate::repo;

/// GET /api/activity
///
/// Callers see their own log. Admins see every user's, optionally narrowed
/// with `user_id`.
pub async fn list_activity(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(user): AuthRequired,
    Query(params): Query<ActivityListQuery>,
) -> Result<ApiResponse<Paginated<Activity>>, AppError> {
    let user_filter = if user.is_admin() {
        params.user_id
    } else {
        Some(user.id)
    };

    let page = normalize_pagination(params.page, params.limit);
    let (items, total) = repo::activity::list(
        &pool,
        user_filter,
        params.entity_type.as_deref(),
        page.offset(),
        page.limit,
    )
    .await?;

    Ok(ApiResponse::ok(
        "Activity fetched",
        Paginated::new(items, page.page, page.limit, total),
    ))
}
