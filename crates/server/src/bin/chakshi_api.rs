use std::net::SocketAddr;
use std::sync::Arc;

use server::{
    app, config, db, health, logging,
    razorpay::RazorpayClient,
    storage::{DynObjectStore, S3ObjectStore},
    supabase::SupabaseAuth,
    telemetry,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    logging::init_logging();
    let flags = config::load_feature_flags();

    if flags.telemetry {
        if let Err(e) = telemetry::init_telemetry("chakshi-api") {
            tracing::warn!(error = %e, "telemetry disabled");
        }
    }
    health::record_start_time();

    let pool = db::create_pool()?;
    db::run_migrations(&pool).await?;

    let mut state = db::AppState::with_pool(pool)
        .with_supabase(SupabaseAuth::from_env().map(Arc::new));

    if state.supabase.is_none() {
        tracing::warn!("SUPABASE_URL / SUPABASE_ANON_KEY not set, /api/auth sign-in is unavailable");
    }

    if flags.storage {
        let store: DynObjectStore = Arc::new(S3ObjectStore::from_env()?);
        state = state.with_storage(store);
    } else {
        tracing::info!("storage feature off, documents are kept in memory");
    }

    if flags.payments {
        state = state.with_razorpay(RazorpayClient::from_env().map(Arc::new));
    }

    let router = app::api_app(state, flags);

    let addr = config::bind_addr("API_PORT", 5000);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "chakshi-api listening");

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
