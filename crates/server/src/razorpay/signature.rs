use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Hex-encoded HMAC-SHA256 of `message` under `secret`.
pub fn sign_hex(secret: &str, message: &[u8]) -> String {
    // HMAC accepts keys of any length, so this never fails.
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return String::new(),
    };
    mac.update(message);
    hex::encode(mac.finalize().into_bytes())
}

fn verify_hex(secret: &str, message: &[u8], signature_hex: &str) -> bool {
    let Ok(expected) = hex::decode(signature_hex.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(message);
    mac.verify_slice(&expected).is_ok()
}

/// Checkout callback check:
/// `hex(HMAC_SHA256(key_secret, "{order_id}|{payment_id}")) == signature`,
/// compared in constant time.
pub fn verify_payment_signature(
    order_id: &str,
    payment_id: &str,
    signature: &str,
    key_secret: &str,
) -> bool {
    if key_secret.is_empty() {
        return false;
    }
    let payload = format!("{order_id}|{payment_id}");
    verify_hex(key_secret, payload.as_bytes(), signature)
}

/// Webhook check: `hex(HMAC_SHA256(webhook_secret, raw_body)) == X-Razorpay-Signature`.
/// The body must be the exact bytes received, before any JSON parsing.
pub fn verify_webhook_signature(raw_body: &[u8], signature: &str, webhook_secret: &str) -> bool {
    if webhook_secret.is_empty() {
        return false;
    }
    verify_hex(webhook_secret, raw_body, signature)
}
