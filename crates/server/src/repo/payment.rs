use shared_types::{AppError, Payment};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::error_convert::SqlxErrorExt;

pub async fn create(
    pool: &Pool<Postgres>,
    user_id: Uuid,
    razorpay_order_id: &str,
    amount: i64,
    currency: &str,
    receipt: &str,
) -> Result<Payment, AppError> {
    sqlx::query_as::<_, Payment>(
        r#"
        INSERT INTO payments (user_id, razorpay_order_id, amount, currency, receipt)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, user_id, razorpay_order_id, razorpay_payment_id, amount,
                  currency, receipt, status, created_at, updated_at
        "#,
    )
    .bind(user_id)
    .bind(razorpay_order_id)
    .bind(amount)
    .bind(currency)
    .bind(receipt)
    .fetch_one(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

pub async fn find_by_order_id(
    pool: &Pool<Postgres>,
    razorpay_order_id: &str,
) -> Result<Option<Payment>, AppError> {
    sqlx::query_as::<_, Payment>(
        r#"
        SELECT id, user_id, razorpay_order_id, razorpay_payment_id, amount,
               currency, receipt, status, created_at, updated_at
        FROM payments
        WHERE razorpay_order_id = $1
        "#,
    )
    .bind(razorpay_order_id)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

/// Move an order to `paid`. Returns the row only when this call made the
/// transition, so repeated confirmations do not re-notify.
pub async fn mark_paid(
    pool: &Pool<Postgres>,
    razorpay_order_id: &str,
    razorpay_payment_id: &str,
) -> Result<Option<Payment>, AppError> {
    sqlx::query_as::<_, Payment>(
        r#"
        UPDATE payments SET
            status = 'paid',
            razorpay_payment_id = $2,
            updated_at = NOW()
        WHERE razorpay_order_id = $1 AND status <> 'paid'
        RETURNING id, user_id, razorpay_order_id, razorpay_payment_id, amount,
                  currency, receipt, status, created_at, updated_at
        "#,
    )
    .bind(razorpay_order_id)
    .bind(razorpay_payment_id)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

/// Move a still-open order to `failed`. A paid order is never downgraded.
pub async fn mark_failed(
    pool: &Pool<Postgres>,
    razorpay_order_id: &str,
    razorpay_payment_id: Option<&str>,
) -> Result<Option<Payment>, AppError> {
    sqlx::query_as::<_, Payment>(
        r#"
        UPDATE payments SET
            status = 'failed',
            razorpay_payment_id = COALESCE($2, razorpay_payment_id),
            updated_at = NOW()
        WHERE razorpay_order_id = $1 AND status = 'created'
        RETURNING id, user_id, razorpay_order_id, razorpay_payment_id, amount,
                  currency, receipt, status, created_at, updated_at
        "#,
    )
    .bind(razorpay_order_id)
    .bind(razorpay_payment_id)
    .fetch_optional(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)
}

/// Paginated payments, newest first. `user_id = None` is the admin view.
pub async fn list(
    pool: &Pool<Postgres>,
    user_id: Option<Uuid>,
    status: Option<&str>,
    offset: i64,
    limit: i64,
) -> Result<(Vec<Payment>, i64), AppError> {
    let total = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM payments
        WHERE ($1::UUID IS NULL OR user_id = $1)
          AND ($2::TEXT IS NULL OR status = $2)
        "#,
    )
    .bind(user_id)
    .bind(status)
    .fetch_one(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    let rows = sqlx::query_as::<_, Payment>(
        r#"
        SELECT id, user_id, razorpay_order_id, razorpay_payment_id, amount,
               currency, receipt, status, created_at, updated_at
        FROM payments
        WHERE ($1::UUID IS NULL OR user_id = $1)
          AND ($2::TEXT IS NULL OR status = $2)
        ORDER BY created_at DESC
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(user_id)
    .bind(status)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok((rows, total))
}

/// Idempotency guard for webhook deliveries. Returns false when the event
/// was already recorded.
pub async fn record_webhook_event(
    pool: &Pool<Postgres>,
    event_id: &str,
    event_type: &str,
) -> Result<bool, AppError> {
    let result = sqlx::query(
        r#"
        INSERT INTO payment_webhook_events (event_id, event_type)
        VALUES ($1, $2)
        ON CONFLICT (event_id) DO NOTHING
        "#,
    )
    .bind(event_id)
    .bind(event_type)
    .execute(pool)
    .await
    .map_err(SqlxErrorExt::into_app_error)?;

    Ok(result.rows_affected() > 0)
}

/// Forget a recorded event so a failed delivery can be retried.
pub async fn forget_webhook_event(pool: &Pool<Postgres>, event_id: &str) -> Result<(), AppError> {
    sqlx::query("DELETE FROM payment_webhook_events WHERE event_id = $1")
        .bind(event_id)
        .execute(pool)
        .await
        .map_err(SqlxErrorExt::into_app_error)?;
    Ok(())
}
