use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use serde::Deserialize;
use shared_types::{ActivityAction, AppError, NewNotification, Payment};
use sqlx::{Pool, Postgres};
use std::sync::Arc;

use super::{signature::verify_webhook_signature, RazorpayClient};
use crate::repo;

const SIGNATURE_HEADER: &str = "x-razorpay-signature";
const EVENT_ID_HEADER: &str = "x-razorpay-event-id";

#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    #[serde(default)]
    pub payload: WebhookPayload,
}

#[derive(Debug, Default, Deserialize)]
pub struct WebhookPayload {
    pub payment: Option<PaymentWrapper>,
}

#[derive(Debug, Deserialize)]
pub struct PaymentWrapper {
    pub entity: PaymentEntity,
}

#[derive(Debug, Deserialize)]
pub struct PaymentEntity {
    pub id: String,
    pub order_id: Option<String>,
    #[serde(default)]
    pub amount: i64,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub error_description: Option<String>,
}

/// Axum handler for Razorpay webhook deliveries.
///
/// The signature is checked against the raw body before anything else.
/// Duplicate deliveries (same `x-razorpay-event-id`) answer 200 without
/// reprocessing. A processing failure forgets the event id and answers an
/// error so Razorpay retries.
#[tracing::instrument(skip(pool, razorpay, headers, body))]
pub async fn handle_razorpay_webhook(
    State(pool): State<Pool<Postgres>>,
    State(razorpay): State<Option<Arc<RazorpayClient>>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, AppError> {
    let secret = razorpay
        .as_deref()
        .and_then(RazorpayClient::webhook_secret)
        .ok_or_else(|| AppError::unavailable("Payment webhooks are not configured"))?;

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::bad_request("Missing webhook signature"))?;

    if !verify_webhook_signature(&body, signature, secret) {
        tracing::warn!("Razorpay webhook signature verification failed");
        return Err(AppError::bad_request("Invalid webhook signature"));
    }

    let event: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::bad_request("Malformed webhook payload").with_detail(e))?;

    let event_id = headers
        .get(EVENT_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    if let Some(id) = event_id.as_deref() {
        if !repo::payment::record_webhook_event(&pool, id, &event.event).await? {
            tracing::info!(event_id = %id, "Duplicate webhook event, skipping");
            return Ok(StatusCode::OK);
        }
    }

    if let Err(e) = route_event(&pool, &event).await {
        tracing::error!(
            error = %e,
            event_id = ?event_id,
            event_type = %event.event,
            "Error processing Razorpay webhook event"
        );
        if let Some(id) = event_id.as_deref() {
            repo::payment::forget_webhook_event(&pool, id).await?;
        }
        return Err(e);
    }

    Ok(StatusCode::OK)
}

async fn route_event(pool: &Pool<Postgres>, event: &WebhookEvent) -> Result<(), AppError> {
    let entity = event.payload.payment.as_ref().map(|p| &p.entity);

    match (event.event.as_str(), entity) {
        ("payment.captured", Some(payment)) => {
            let Some(order_id) = payment.order_id.as_deref() else {
                tracing::warn!(payment_id = %payment.id, "Captured payment without an order id");
                return Ok(());
            };
            settle_paid(pool, order_id, &payment.id).await?;
            Ok(())
        }
        ("payment.failed", Some(payment)) => {
            let Some(order_id) = payment.order_id.as_deref() else {
                return Ok(());
            };
            let failed = repo::payment::mark_failed(pool, order_id, Some(&payment.id)).await?;
            if failed.is_some() {
                tracing::info!(
                    %order_id,
                    payment_id = %payment.id,
                    reason = ?payment.error_description,
                    "Payment failed"
                );
            }
            Ok(())
        }
        (other, _) => {
            tracing::debug!(event_type = %other, "Unhandled Razorpay event type");
            Ok(())
        }
    }
}

/// Mark an order paid. On the first transition the owner gets a payment
/// notification and an activity row; repeats are no-ops.
/// Returns the current payment row, or `None` when the order is unknown.
pub(crate) async fn settle_paid(
    pool: &Pool<Postgres>,
    order_id: &str,
    payment_id: &str,
) -> Result<Option<Payment>, AppError> {
    let Some(payment) = repo::payment::mark_paid(pool, order_id, payment_id).await? else {
        return repo::payment::find_by_order_id(pool, order_id).await;
    };

    tracing::info!(%order_id, %payment_id, amount = payment.amount, "Payment captured");

    if let Some(user_id) = payment.user_id {
        let rupees = format_amount(payment.amount, &payment.currency);
        repo::notification::notify(
            pool,
            NewNotification {
                user_id,
                title: "Payment received".to_string(),
                message: format!("Your payment of {rupees} was successful."),
                notification_type: "payment",
                related_id: Some(payment.id),
            },
        )
        .await;
        repo::activity::record(
            pool,
            user_id,
            ActivityAction::Payment,
            "payment",
            Some(payment.id),
            format!("Paid {rupees} (order {order_id})"),
        )
        .await;
    }

    Ok(Some(payment))
}

/// `12345` paise in INR renders as `INR 123.45`.
fn format_amount(amount: i64, currency: &str) -> String {
    format!("{currency} {}.{:02}", amount / 100, (amount % 100).abs())
}
