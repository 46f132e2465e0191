use serde::{Deserialize, Serialize};
use shared_types::AppError;
use std::collections::HashMap;

use crate::config::env_nonempty;

const DEFAULT_API_BASE: &str = "https://api.razorpay.com";

#[derive(Debug, thiserror::Error)]
pub enum RazorpayError {
    #[error("Razorpay request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Razorpay API error ({status}): {description}")]
    Api { status: u16, description: String },
}

impl From<RazorpayError> for AppError {
    fn from(err: RazorpayError) -> Self {
        match &err {
            RazorpayError::Api { status, description } if *status == 400 => {
                AppError::bad_request(description.clone())
            }
            _ => AppError::external("Payment provider unavailable").with_detail(&err),
        }
    }
}

#[derive(Debug, Serialize)]
struct CreateOrderBody<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    notes: &'a HashMap<String, String>,
}

/// Order as returned by `POST /v1/orders`.
#[derive(Debug, Clone, Deserialize)]
pub struct RazorpayOrder {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    #[serde(default)]
    pub receipt: Option<String>,
    #[serde(default)]
    pub status: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    description: String,
}

/// Razorpay REST client plus the secrets used for signature checks.
pub struct RazorpayClient {
    http: reqwest::Client,
    base_url: String,
    key_id: String,
    key_secret: String,
    webhook_secret: Option<String>,
}

impl RazorpayClient {
    pub fn new(
        key_id: impl Into<String>,
        key_secret: impl Into<String>,
        webhook_secret: Option<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_API_BASE.to_string(),
            key_id: key_id.into(),
            key_secret: key_secret.into(),
            webhook_secret,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Build from `RAZORPAY_KEY_ID`, `RAZORPAY_KEY_SECRET`, the optional
    /// `RAZORPAY_WEBHOOK_SECRET` and `RAZORPAY_API_BASE`.
    /// `None` when the key pair is missing.
    pub fn from_env() -> Option<Self> {
        let key_id = env_nonempty("RAZORPAY_KEY_ID")?;
        let key_secret = env_nonempty("RAZORPAY_KEY_SECRET")?;
        let client = Self::new(key_id, key_secret, env_nonempty("RAZORPAY_WEBHOOK_SECRET"));
        Some(match env_nonempty("RAZORPAY_API_BASE") {
            Some(base) => client.with_base_url(base),
            None => client,
        })
    }

    /// Public key id handed to the checkout widget.
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    pub fn key_secret(&self) -> &str {
        &self.key_secret
    }

    pub fn webhook_secret(&self) -> Option<&str> {
        self.webhook_secret.as_deref()
    }

    #[tracing::instrument(skip(self, notes))]
    pub async fn create_order(
        &self,
        amount: i64,
        currency: &str,
        receipt: &str,
        notes: &HashMap<String, String>,
    ) -> Result<RazorpayOrder, RazorpayError> {
        let response = self
            .http
            .post(format!("{}/v1/orders", self.base_url))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&CreateOrderBody {
                amount,
                currency,
                receipt,
                notes,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            let description = serde_json::from_str::<ErrorEnvelope>(&body)
                .map(|e| e.error.description)
                .unwrap_or(body);
            return Err(RazorpayError::Api { status, description });
        }

        let order: RazorpayOrder = response.json().await?;
        tracing::info!(order_id = %order.id, amount = order.amount, "Razorpay order created");
        Ok(order)
    }
}
