use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use crate::common::{delete, get, patch, post_json, test_app, ADVOCATE_ID, CLERK_ID};

async fn send(app: &axum::Router, admin: &str, user_id: Uuid, title: &str) -> String {
    let (status, resp) = post_json(
        app,
        "/api/notifications",
        json!({ "user_id": user_id, "title": title, "message": "Please review" }),
        admin,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{resp}");
    resp["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn admin_sends_system_notification() {
    let (app, _pool, tokens, _guard) = test_app().await;
    send(&app, &tokens.admin, ADVOCATE_ID, "Bar council renewal").await;

    let (status, resp) = get(&app, "/api/notifications", &tokens.advocate).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["data"]["pagination"]["total"], 1);
    assert_eq!(resp["data"]["items"][0]["notification_type"], "system");
    assert_eq!(resp["data"]["items"][0]["is_read"], false);
}

#[tokio::test]
async fn only_admins_send() {
    let (app, _pool, tokens, _guard) = test_app().await;
    let (status, _) = post_json(
        &app,
        "/api/notifications",
        json!({ "user_id": CLERK_ID, "title": "Hi", "message": "Hello" }),
        &tokens.advocate,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn sending_to_unknown_user_or_type_fails() {
    let (app, _pool, tokens, _guard) = test_app().await;

    let (status, _) = post_json(
        &app,
        "/api/notifications",
        json!({ "user_id": Uuid::new_v4(), "title": "Hi", "message": "Hello" }),
        &tokens.admin,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = post_json(
        &app,
        "/api/notifications",
        json!({ "user_id": CLERK_ID, "title": "Hi", "message": "Hello", "notification_type": "sms" }),
        &tokens.admin,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn read_flow_updates_unread_count() {
    let (app, _pool, tokens, _guard) = test_app().await;
    let first = send(&app, &tokens.admin, ADVOCATE_ID, "One").await;
    send(&app, &tokens.admin, ADVOCATE_ID, "Two").await;
    send(&app, &tokens.admin, ADVOCATE_ID, "Three").await;

    let (_, resp) = get(&app, "/api/notifications/unread-count", &tokens.advocate).await;
    assert_eq!(resp["data"]["count"], 3);

    let (status, resp) = patch(&app, &format!("/api/notifications/{first}/read"), &tokens.advocate).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["data"]["is_read"], true);

    let (_, resp) = get(&app, "/api/notifications?unread_only=true", &tokens.advocate).await;
    assert_eq!(resp["data"]["pagination"]["total"], 2);

    let (_, resp) = patch(&app, "/api/notifications/read-all", &tokens.advocate).await;
    assert_eq!(resp["data"]["count"], 2);

    let (_, resp) = get(&app, "/api/notifications/unread-count", &tokens.advocate).await;
    assert_eq!(resp["data"]["count"], 0);
}

#[tokio::test]
async fn notifications_are_private() {
    let (app, _pool, tokens, _guard) = test_app().await;
    let id = send(&app, &tokens.admin, ADVOCATE_ID, "Private").await;

    let (_, resp) = get(&app, "/api/notifications", &tokens.clerk).await;
    assert_eq!(resp["data"]["pagination"]["total"], 0);

    let (status, _) = patch(&app, &format!("/api/notifications/{id}/read"), &tokens.clerk).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = delete(&app, &format!("/api/notifications/{id}"), &tokens.clerk).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = delete(&app, &format!("/api/notifications/{id}"), &tokens.advocate).await;
    assert_eq!(status, StatusCode::OK);
}
