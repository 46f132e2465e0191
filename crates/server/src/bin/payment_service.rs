use std::net::SocketAddr;
use std::sync::Arc;

use server::{app, config, db, health, logging, razorpay::RazorpayClient, telemetry};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    logging::init_logging();
    let flags = config::load_feature_flags();

    if flags.telemetry {
        if let Err(e) = telemetry::init_telemetry("chakshi-payments") {
            tracing::warn!(error = %e, "telemetry disabled");
        }
    }
    health::record_start_time();

    let razorpay = RazorpayClient::from_env()
        .ok_or("RAZORPAY_KEY_ID and RAZORPAY_KEY_SECRET must be set")?;
    if razorpay.webhook_secret().is_none() {
        tracing::warn!("RAZORPAY_WEBHOOK_SECRET not set, webhook deliveries will be refused");
    }

    let pool = db::create_pool()?;
    db::run_migrations(&pool).await?;

    let state = db::AppState::with_pool(pool).with_razorpay(Some(Arc::new(razorpay)));
    let router = app::payment_app(state, flags);

    let addr = config::bind_addr("PAYMENT_PORT", 5001);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "payment-service listening");

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("shutting down");
    })
    .await?;
    Ok(())
}
