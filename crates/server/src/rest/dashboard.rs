use axum::extract::{Query, State};
use serde::Deserialize;
use sqlx::{Pool, Postgres};

use shared_types::{
    normalize_upcoming_days, Activity, ApiResponse, AppError, DashboardStats, HearingResponse,
    MAX_PAGE_SIZE,
};

use crate::auth::AuthRequired;
use crate::repo;

const DASHBOARD_LIST_SIZE: i64 = 5;

#[derive(Debug, Default, Deserialize)]
pub struct DashboardListQuery {
    pub days: Option<i64>,
    pub limit: Option<i64>,
}

impl DashboardListQuery {
    fn limit(&self) -> i64 {
        self.limit.unwrap_or(DASHBOARD_LIST_SIZE).clamp(1, MAX_PAGE_SIZE)
    }
}

/// GET /api/dashboard/stats
pub async fn stats(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(user): AuthRequired,
) -> Result<ApiResponse<DashboardStats>, AppError> {
    let mut stats = repo::dashboard::stats(&pool, user.advocate_scope(), user.id).await?;
    if user.is_admin() {
        stats.users_by_role = Some(repo::dashboard::users_by_role(&pool).await?);
    }
    Ok(ApiResponse::ok("Dashboard stats fetched", stats))
}

/// GET /api/dashboard/upcoming-hearings
pub async fn upcoming_hearings(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(user): AuthRequired,
    Query(params): Query<DashboardListQuery>,
) -> Result<ApiResponse<Vec<HearingResponse>>, AppError> {
    let days = normalize_upcoming_days(params.days);
    let hearings =
        repo::hearing::upcoming(&pool, user.advocate_scope(), days, params.limit()).await?;

    Ok(ApiResponse::ok(
        "Upcoming hearings fetched",
        hearings.into_iter().map(HearingResponse::from).collect(),
    ))
}

/// GET /api/dashboard/recent-activity
pub async fn recent_activity(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(user): AuthRequired,
    Query(params): Query<DashboardListQuery>,
) -> Result<ApiResponse<Vec<Activity>>, AppError> {
    let user_filter = (!user.is_admin()).then_some(user.id);
    let (items, _) = repo::activity::list(&pool, user_filter, None, 0, params.limit()).await?;

    Ok(ApiResponse::ok("Recent activity fetched", items))
}
