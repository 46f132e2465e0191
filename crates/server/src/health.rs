use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use sqlx::{Pool, Postgres};
use std::sync::OnceLock;
use std::time::Instant;

static START_TIME: OnceLock<Instant> = OnceLock::new();

/// Record the application start time. Call once during startup.
pub fn record_start_time() {
    START_TIME.get_or_init(Instant::now);
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub db: String,
    pub uptime_seconds: u64,
    pub version: String,
}

/// Health check handler. Answers 503 when the database is unreachable.
pub async fn health_check(
    State(pool): State<Pool<Postgres>>,
) -> (StatusCode, Json<HealthResponse>) {
    let (status, db_status) = match sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&pool)
        .await
    {
        Ok(_) => (StatusCode::OK, "connected".to_string()),
        Err(e) => {
            tracing::warn!(error = %e, "health check database probe failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unreachable".to_string())
        }
    };

    let uptime = START_TIME.get().map(|t| t.elapsed().as_secs()).unwrap_or(0);

    (
        status,
        Json(HealthResponse {
            status: if status.is_success() { "ok" } else { "degraded" }.to_string(),
            db: db_status,
            uptime_seconds: uptime,
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}
