use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

pub const PAYMENT_STATUSES: &[&str] = &["created", "paid", "failed"];

pub const DEFAULT_CURRENCY: &str = "INR";

/// A Razorpay order tracked locally.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "server", derive(sqlx::FromRow))]
pub struct Payment {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub razorpay_order_id: String,
    pub razorpay_payment_id: Option<String>,
    /// Amount in the smallest currency unit (paise for INR).
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "validation", derive(validator::Validate))]
pub struct CreateOrderRequest {
    #[cfg_attr(
        feature = "validation",
        validate(range(min = 100, message = "Amount must be at least 100 paise"))
    )]
    pub amount: i64,
    pub currency: Option<String>,
    #[serde(default)]
    pub notes: HashMap<String, String>,
}

/// What the checkout widget needs to open.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateOrderResponse {
    pub order_id: String,
    pub amount: i64,
    pub currency: String,
    pub receipt: String,
    pub key_id: String,
}

/// Fields posted back by the checkout widget after a successful payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyPaymentRequest {
    pub razorpay_order_id: String,
    pub razorpay_payment_id: String,
    pub razorpay_signature: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentListQuery {
    pub status: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}
