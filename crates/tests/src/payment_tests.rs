use axum::http::StatusCode;
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;

use crate::common::{
    get, post_raw, send_json, test_app, ADVOCATE_ID, CLERK_ID, KEY_SECRET, WEBHOOK_SECRET,
};

fn sign(secret: &str, message: &[u8]) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes()).unwrap();
    mac.update(message);
    hex::encode(mac.finalize().into_bytes())
}

async fn seed_order(pool: &sqlx::PgPool, user_id: uuid::Uuid, order_id: &str) {
    server::repo::payment::create(pool, user_id, order_id, 250_000, "INR", "rcpt_test")
        .await
        .expect("seed payment");
}

fn verify_body(order_id: &str, payment_id: &str) -> serde_json::Value {
    json!({
        "razorpay_order_id": order_id,
        "razorpay_payment_id": payment_id,
        "razorpay_signature": sign(KEY_SECRET, format!("{order_id}|{payment_id}").as_bytes()),
    })
}

fn captured_event(order_id: &str, payment_id: &str) -> Vec<u8> {
    json!({
        "event": "payment.captured",
        "payload": { "payment": { "entity": {
            "id": payment_id,
            "order_id": order_id,
            "amount": 250_000,
            "status": "captured",
        }}}
    })
    .to_string()
    .into_bytes()
}

#[tokio::test]
async fn verify_marks_paid_once() {
    let (app, pool, tokens, _guard) = test_app().await;
    seed_order(&pool, ADVOCATE_ID, "order_verify_1").await;

    let body = verify_body("order_verify_1", "pay_verify_1");
    let (status, resp) = send_json(&app, "POST", "/api/payments/verify", body.clone(), None).await;
    assert_eq!(status, StatusCode::OK, "{resp}");
    assert_eq!(resp["data"]["status"], "paid");
    assert_eq!(resp["data"]["razorpay_payment_id"], "pay_verify_1");

    let (status, resp) = send_json(&app, "POST", "/api/payments/verify", body, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["data"]["status"], "paid");

    let (_, unread) = get(&app, "/api/notifications/unread-count", &tokens.advocate).await;
    assert_eq!(unread["data"]["count"], 1);

    let (_, activity) = get(&app, "/api/activity?entity_type=payment", &tokens.advocate).await;
    assert_eq!(activity["data"]["pagination"]["total"], 1);
    assert_eq!(activity["data"]["items"][0]["action"], "payment");
}

#[tokio::test]
async fn verify_unknown_order_is_not_found() {
    let (app, _pool, _tokens, _guard) = test_app().await;
    let (status, _) = send_json(
        &app,
        "POST",
        "/api/payments/verify",
        verify_body("order_missing", "pay_missing"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn verify_with_bad_signature_leaves_order_open() {
    let (app, pool, _tokens, _guard) = test_app().await;
    seed_order(&pool, ADVOCATE_ID, "order_forged").await;

    let mut body = verify_body("order_forged", "pay_forged");
    body["razorpay_payment_id"] = json!("pay_swapped");
    let (status, _) = send_json(&app, "POST", "/api/payments/verify", body, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let payment = server::repo::payment::find_by_order_id(&pool, "order_forged")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(payment.status, "created");
}

#[tokio::test]
async fn webhook_capture_is_idempotent_per_event_id() {
    let (app, pool, tokens, _guard) = test_app().await;
    seed_order(&pool, ADVOCATE_ID, "order_hook_1").await;

    let payload = captured_event("order_hook_1", "pay_hook_1");
    let signature = sign(WEBHOOK_SECRET, &payload);
    let headers = [
        ("content-type", "application/json"),
        ("x-razorpay-signature", signature.as_str()),
        ("x-razorpay-event-id", "evt_hook_1"),
    ];

    let (status, _) = post_raw(&app, "/api/payments/webhook", payload.clone(), &headers).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = post_raw(&app, "/api/payments/webhook", payload, &headers).await;
    assert_eq!(status, StatusCode::OK);

    let payment = server::repo::payment::find_by_order_id(&pool, "order_hook_1")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(payment.status, "paid");

    let (_, unread) = get(&app, "/api/notifications/unread-count", &tokens.advocate).await;
    assert_eq!(unread["data"]["count"], 1);
}

#[tokio::test]
async fn webhook_failure_does_not_downgrade_paid_orders() {
    let (app, pool, _tokens, _guard) = test_app().await;
    seed_order(&pool, ADVOCATE_ID, "order_hook_2").await;
    seed_order(&pool, ADVOCATE_ID, "order_hook_3").await;
    server::repo::payment::mark_paid(&pool, "order_hook_2", "pay_ok")
        .await
        .unwrap();

    for order_id in ["order_hook_2", "order_hook_3"] {
        let payload = json!({
            "event": "payment.failed",
            "payload": { "payment": { "entity": {
                "id": "pay_declined",
                "order_id": order_id,
                "amount": 250_000,
                "status": "failed",
                "error_description": "Card declined",
            }}}
        })
        .to_string()
        .into_bytes();
        let signature = sign(WEBHOOK_SECRET, &payload);
        let (status, _) = post_raw(
            &app,
            "/api/payments/webhook",
            payload,
            &[("x-razorpay-signature", signature.as_str())],
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let paid = server::repo::payment::find_by_order_id(&pool, "order_hook_2").await.unwrap().unwrap();
    assert_eq!(paid.status, "paid");
    let failed = server::repo::payment::find_by_order_id(&pool, "order_hook_3").await.unwrap().unwrap();
    assert_eq!(failed.status, "failed");
}

#[tokio::test]
async fn unhandled_events_are_acknowledged() {
    let (app, _pool, _tokens, _guard) = test_app().await;
    let payload = br#"{"event":"refund.created","payload":{}}"#.to_vec();
    let signature = sign(WEBHOOK_SECRET, &payload);
    let (status, _) = post_raw(
        &app,
        "/api/payments/webhook",
        payload,
        &[("x-razorpay-signature", signature.as_str())],
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn payment_list_is_per_user_for_non_admins() {
    let (app, pool, tokens, _guard) = test_app().await;
    seed_order(&pool, ADVOCATE_ID, "order_list_1").await;
    seed_order(&pool, CLERK_ID, "order_list_2").await;

    let (_, mine) = get(&app, "/api/payments", &tokens.advocate).await;
    assert_eq!(mine["data"]["pagination"]["total"], 1);
    assert_eq!(mine["data"]["items"][0]["razorpay_order_id"], "order_list_1");

    let (_, all) = get(&app, "/api/payments", &tokens.admin).await;
    assert_eq!(all["data"]["pagination"]["total"], 2);

    let (status, _) = get(&app, "/api/payments?status=refunded", &tokens.admin).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn order_amount_is_validated_before_calling_razorpay() {
    let (app, _pool, tokens, _guard) = test_app().await;
    let (status, _) = send_json(
        &app,
        "POST",
        "/api/payments/orders",
        json!({ "amount": 0 }),
        Some(&tokens.advocate),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}
