//! Razorpay integration: order creation over REST plus HMAC-SHA256
//! verification of checkout callbacks and webhook deliveries.

pub mod client;
pub mod signature;
pub mod webhooks;

pub use client::{RazorpayClient, RazorpayError, RazorpayOrder};
pub use signature::{verify_payment_signature, verify_webhook_signature};
