//! Router assembly for the two binaries.

use axum::{extract::DefaultBodyLimit, http::HeaderValue, routing::get, Router};
use shared_types::FeatureFlags;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::auth::middleware::auth_middleware;
use crate::config::{env_nonempty, max_upload_bytes};
use crate::db::AppState;
use crate::health::health_check;
use crate::rate_limit::{rate_limit_middleware, RateLimitState};
use crate::rest;
use crate::telemetry::OtelTraceLayer;

/// Room for multipart boundaries and the metadata fields around the file.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// The main API: auth, practice resources, health, and the payment routes
/// when `payments` is enabled.
pub fn api_app(state: AppState, flags: &FeatureFlags) -> Router {
    let mut auth = rest::auth_router();
    if flags.rate_limit {
        auth = auth.layer(axum::middleware::from_fn_with_state(
            RateLimitState::for_auth_from_env(),
            rate_limit_middleware,
        ));
    }

    let mut router = Router::new()
        .merge(auth)
        .merge(rest::api_router())
        .route("/health", get(health_check));

    if flags.payments {
        router = router.merge(rest::payment_router());
    }

    with_common_layers(router, state, flags)
}

/// The standalone payment service.
pub fn payment_app(state: AppState, flags: &FeatureFlags) -> Router {
    let router = Router::new()
        .merge(rest::payment_router())
        .route("/health", get(health_check));

    with_common_layers(router, state, flags)
}

fn cors_layer() -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match env_nonempty("CORS_ALLOWED_ORIGINS") {
        Some(origins) => {
            let list: Vec<HeaderValue> = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .filter_map(|o| HeaderValue::from_str(o).ok())
                .collect();
            base.allow_origin(list)
        }
        None => base.allow_origin(Any),
    }
}

fn with_common_layers(router: Router<AppState>, state: AppState, flags: &FeatureFlags) -> Router {
    let mut router = router.with_state(state.clone());

    // Inside the auth middleware so the span sees the resolved user.
    if flags.telemetry {
        router = router.layer(OtelTraceLayer);
    }

    router
        .layer(DefaultBodyLimit::max(max_upload_bytes() + MULTIPART_OVERHEAD_BYTES))
        .layer(axum::middleware::from_fn_with_state(state, auth_middleware))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
