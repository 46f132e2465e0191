use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::json;

use crate::common::{
    create_test_case, delete, get, post_json, put_json, test_app, CLERK_ID, OTHER_ADVOCATE_ID,
};

fn entry(title: &str, start_in_hours: i64, length_hours: i64) -> serde_json::Value {
    let start = Utc::now() + Duration::hours(start_in_hours);
    json!({
        "title": title,
        "start_time": start.to_rfc3339(),
        "end_time": (start + Duration::hours(length_hours)).to_rfc3339(),
    })
}

#[tokio::test]
async fn create_defaults_event_type() {
    let (app, _pool, tokens, _guard) = test_app().await;

    let (status, resp) = post_json(&app, "/api/schedule", entry("Client call", 2, 1), &tokens.clerk).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(resp["data"]["event_type"], "other");
    assert_eq!(resp["data"]["user_id"], CLERK_ID.to_string());
    assert_eq!(resp["data"]["is_all_day"], false);
}

#[tokio::test]
async fn end_before_start_is_rejected() {
    let (app, _pool, tokens, _guard) = test_app().await;

    let (status, resp) = post_json(&app, "/api/schedule", entry("Backwards", 5, -1), &tokens.advocate).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(resp["message"], "end_time must not be before start_time");

    let (status, _) = post_json(&app, "/api/schedule", entry("Instant", 5, 0), &tokens.advocate).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn update_checks_range_against_stored_times() {
    let (app, _pool, tokens, _guard) = test_app().await;
    let (_, resp) = post_json(&app, "/api/schedule", entry("Drafting", 10, 2), &tokens.advocate).await;
    let id = resp["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = put_json(
        &app,
        &format!("/api/schedule/{id}"),
        json!({ "end_time": Utc::now().to_rfc3339() }),
        &tokens.advocate,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, resp) = put_json(
        &app,
        &format!("/api/schedule/{id}"),
        json!({ "event_type": "deadline", "location": "Chambers" }),
        &tokens.advocate,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["data"]["event_type"], "deadline");
    assert_eq!(resp["data"]["location"], "Chambers");
}

#[tokio::test]
async fn entries_are_private_except_to_admins() {
    let (app, _pool, tokens, _guard) = test_app().await;
    let (_, resp) = post_json(&app, "/api/schedule", entry("Mine", 1, 1), &tokens.advocate).await;
    let id = resp["data"]["id"].as_str().unwrap().to_string();
    post_json(&app, "/api/schedule", entry("Clerk task", 3, 1), &tokens.clerk).await;

    let (_, resp) = get(&app, "/api/schedule", &tokens.advocate).await;
    assert_eq!(resp["data"]["pagination"]["total"], 1);

    let (status, _) = get(&app, &format!("/api/schedule/{id}"), &tokens.clerk).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, resp) = get(&app, "/api/schedule", &tokens.admin).await;
    assert_eq!(resp["data"]["pagination"]["total"], 2);

    let (_, resp) = get(&app, &format!("/api/schedule?user_id={CLERK_ID}"), &tokens.admin).await;
    assert_eq!(resp["data"]["pagination"]["total"], 1);

    let (status, _) = delete(&app, &format!("/api/schedule/{id}"), &tokens.clerk).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = delete(&app, &format!("/api/schedule/{id}"), &tokens.advocate).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn linked_case_must_be_visible() {
    let (app, _pool, tokens, _guard) = test_app().await;
    let theirs = create_test_case(&app, &tokens.clerk, "CS/300/2026", Some(OTHER_ADVOCATE_ID)).await;

    let mut body = entry("Prep for their case", 4, 1);
    body["case_id"] = json!(theirs);

    let (status, _) = post_json(&app, "/api/schedule", body.clone(), &tokens.advocate).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = post_json(&app, "/api/schedule", body, &tokens.clerk).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn list_filters_by_window() {
    let (app, _pool, tokens, _guard) = test_app().await;
    post_json(&app, "/api/schedule", entry("Soon", 2, 1), &tokens.advocate).await;
    post_json(&app, "/api/schedule", entry("Later", 24 * 10, 1), &tokens.advocate).await;

    let to = (Utc::now() + Duration::days(1)).to_rfc3339();
    let uri = format!("/api/schedule?to={}", to.replace('+', "%2B"));
    let (status, resp) = get(&app, &uri, &tokens.advocate).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["data"]["pagination"]["total"], 1);
    assert_eq!(resp["data"]["items"][0]["title"], "Soon");
}
