use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use sqlx::{Pool, Postgres};
use std::sync::Arc;
use uuid::Uuid;

use shared_types::{
    normalize_pagination, ApiResponse, AppError, CreateOrderRequest, CreateOrderResponse,
    Paginated, Payment, PaymentListQuery, VerifyPaymentRequest, DEFAULT_CURRENCY,
    PAYMENT_STATUSES,
};

use super::ensure_one_of;
use crate::auth::AuthRequired;
use crate::error_convert::ValidateRequest;
use crate::razorpay::{verify_payment_signature, webhooks::settle_paid, RazorpayClient};
use crate::repo;

fn razorpay_client(
    razorpay: Option<Arc<RazorpayClient>>,
) -> Result<Arc<RazorpayClient>, AppError> {
    razorpay.ok_or_else(|| AppError::unavailable("Payments are not configured"))
}

/// Razorpay caps receipts at 40 characters.
fn new_receipt() -> String {
    format!("rcpt_{}", Uuid::new_v4().simple())
        .chars()
        .take(40)
        .collect()
}

/// POST /api/payments/orders
#[tracing::instrument(skip(pool, razorpay, user, body), fields(user_id = %user.id, amount = body.amount))]
pub async fn create_order(
    State(pool): State<Pool<Postgres>>,
    State(razorpay): State<Option<Arc<RazorpayClient>>>,
    AuthRequired(user): AuthRequired,
    Json(body): Json<CreateOrderRequest>,
) -> Result<(StatusCode, ApiResponse<CreateOrderResponse>), AppError> {
    body.validate_request()?;
    let razorpay = razorpay_client(razorpay)?;

    let currency = body
        .currency
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_CURRENCY)
        .to_uppercase();
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(AppError::bad_request("Currency must be a 3-letter ISO code"));
    }

    let receipt = new_receipt();
    let order = razorpay
        .create_order(body.amount, &currency, &receipt, &body.notes)
        .await?;

    let payment =
        repo::payment::create(&pool, user.id, &order.id, order.amount, &order.currency, &receipt)
            .await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(
            "Order created",
            CreateOrderResponse {
                order_id: payment.razorpay_order_id,
                amount: payment.amount,
                currency: payment.currency,
                receipt: payment.receipt,
                key_id: razorpay.key_id().to_string(),
            },
        ),
    ))
}

/// POST /api/payments/verify
///
/// Checks the checkout signature and marks the order paid. Verifying an
/// already-paid order succeeds again without repeating side effects.
#[tracing::instrument(skip(pool, razorpay, body), fields(order_id = %body.razorpay_order_id))]
pub async fn verify_payment(
    State(pool): State<Pool<Postgres>>,
    State(razorpay): State<Option<Arc<RazorpayClient>>>,
    Json(body): Json<VerifyPaymentRequest>,
) -> Result<ApiResponse<Payment>, AppError> {
    let razorpay = razorpay_client(razorpay)?;

    if !verify_payment_signature(
        &body.razorpay_order_id,
        &body.razorpay_payment_id,
        &body.razorpay_signature,
        razorpay.key_secret(),
    ) {
        tracing::warn!("payment signature verification failed");
        return Err(AppError::bad_request("Invalid payment signature"));
    }

    let payment = settle_paid(&pool, &body.razorpay_order_id, &body.razorpay_payment_id)
        .await?
        .ok_or_else(|| {
            AppError::not_found(format!("Order {} not found", body.razorpay_order_id))
        })?;

    Ok(ApiResponse::ok("Payment verified successfully", payment))
}

/// GET /api/payments
pub async fn list_payments(
    State(pool): State<Pool<Postgres>>,
    AuthRequired(user): AuthRequired,
    Query(params): Query<PaymentListQuery>,
) -> Result<ApiResponse<Paginated<Payment>>, AppError> {
    if let Some(s) = params.status.as_deref() {
        ensure_one_of("status", s, PAYMENT_STATUSES)?;
    }
    let owner = (!user.is_admin()).then_some(user.id);

    let page = normalize_pagination(params.page, params.limit);
    let (items, total) = repo::payment::list(
        &pool,
        owner,
        params.status.as_deref(),
        page.offset(),
        page.limit,
    )
    .await?;

    Ok(ApiResponse::ok(
        "Payments fetched",
        Paginated::new(items, page.page, page.limit, total),
    ))
}
