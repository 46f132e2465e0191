use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use crate::common::{get, put_json, send_json, test_app, token_for, ADMIN_ID, ADVOCATE_ID, STUDENT_ID};

#[tokio::test]
async fn me_returns_the_local_profile() {
    let (app, _pool, tokens, _guard) = test_app().await;

    let (status, resp) = get(&app, "/api/auth/me", &tokens.advocate).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["data"]["id"], ADVOCATE_ID.to_string());
    assert_eq!(resp["data"]["email"], "asha@chakshi.test");
    assert_eq!(resp["data"]["role"], "advocate");
    assert_eq!(resp["data"]["is_active"], true);
}

#[tokio::test]
async fn token_for_unknown_user_is_anonymous() {
    let (app, _pool, _tokens, _guard) = test_app().await;
    let stranger = token_for(Uuid::new_v4());

    let (status, _) = get(&app, "/api/auth/me", &stranger).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profile_update_keeps_role() {
    let (app, _pool, tokens, _guard) = test_app().await;

    let (status, resp) = put_json(
        &app,
        "/api/auth/profile",
        json!({ "full_name": "Asha R. Rao", "bar_council_id": "MAH/1234/2015" }),
        &tokens.advocate,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["data"]["full_name"], "Asha R. Rao");
    assert_eq!(resp["data"]["bar_council_id"], "MAH/1234/2015");
    assert_eq!(resp["data"]["role"], "advocate");

    let (status, _) = put_json(&app, "/api/auth/profile", json!({ "full_name": "A" }), &tokens.advocate).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn user_admin_is_admin_only() {
    let (app, _pool, tokens, _guard) = test_app().await;

    let (status, _) = get(&app, "/api/auth/users", &tokens.advocate).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, resp) = get(&app, "/api/auth/users", &tokens.admin).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["data"]["pagination"]["total"], 5);

    let (_, resp) = get(&app, "/api/auth/users?role=advocate", &tokens.admin).await;
    assert_eq!(resp["data"]["pagination"]["total"], 2);

    let (status, _) = get(&app, "/api/auth/users?role=judge", &tokens.admin).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deactivated_users_lose_access() {
    let (app, _pool, tokens, _guard) = test_app().await;

    let (status, resp) = send_json(
        &app,
        "PATCH",
        &format!("/api/auth/users/{STUDENT_ID}"),
        json!({ "is_active": false }),
        Some(&tokens.admin),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["data"]["is_active"], false);

    let (status, _) = get(&app, "/api/auth/me", &tokens.student).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn promoting_a_user_changes_their_permissions() {
    let (app, _pool, tokens, _guard) = test_app().await;

    let (status, _) = get(&app, "/api/clients", &tokens.student).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send_json(
        &app,
        "PATCH",
        &format!("/api/auth/users/{STUDENT_ID}"),
        json!({ "role": "clerk" }),
        Some(&tokens.admin),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get(&app, "/api/clients", &tokens.student).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn admins_cannot_lock_themselves_out() {
    let (app, _pool, tokens, _guard) = test_app().await;

    let (status, resp) = send_json(
        &app,
        "PATCH",
        &format!("/api/auth/users/{ADMIN_ID}"),
        json!({ "role": "advocate" }),
        Some(&tokens.admin),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp["message"], "Admins cannot deactivate or demote themselves");
}

#[tokio::test]
async fn auth_provider_endpoints_are_unavailable_without_supabase() {
    let (app, _pool, tokens, _guard) = test_app().await;

    let (status, _) = send_json(&app, "POST", "/api/auth/logout", json!({}), Some(&tokens.advocate)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, _) = send_json(
        &app,
        "POST",
        "/api/auth/refresh",
        json!({ "refresh_token": "abc" }),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}
