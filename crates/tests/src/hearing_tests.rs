use axum::http::StatusCode;
use chrono::{DateTime, Duration, Utc};
use serde_json::json;

use crate::common::{
    create_test_case, create_test_hearing, delete, get, post_json, put_json, test_app, ADVOCATE_ID,
    OTHER_ADVOCATE_ID,
};

fn parse_ts(value: &serde_json::Value) -> DateTime<Utc> {
    value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|d| d.with_timezone(&Utc))
        .expect("timestamp")
}

#[tokio::test]
async fn create_hearing_sets_next_hearing_date_and_notifies() {
    let (app, pool, tokens, _guard) = test_app().await;
    let case_id = create_test_case(&app, &tokens.clerk, "CS/100/2026", Some(ADVOCATE_ID)).await;

    let when = Utc::now() + Duration::days(4);
    let (status, resp) = post_json(
        &app,
        "/api/hearings",
        json!({
            "case_id": case_id,
            "title": "Framing of issues",
            "hearing_date": when.to_rfc3339(),
        }),
        &tokens.clerk,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(resp["data"]["status"], "scheduled");
    assert_eq!(resp["data"]["case_number"], "CS/100/2026");

    let (_, case) = get(&app, &format!("/api/cases/{case_id}"), &tokens.advocate).await;
    let next = parse_ts(&case["data"]["next_hearing_date"]);
    assert!((next - when).num_seconds().abs() <= 1);

    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND notification_type = 'hearing'",
    )
    .bind(ADVOCATE_ID)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn next_hearing_date_tracks_the_earliest_scheduled_hearing() {
    let (app, _pool, tokens, _guard) = test_app().await;
    let case_id = create_test_case(&app, &tokens.advocate, "CS/101/2026", None).await;

    let later = create_test_hearing(&app, &tokens.advocate, &case_id, 10).await;
    let sooner = create_test_hearing(&app, &tokens.advocate, &case_id, 2).await;
    let case_uri = format!("/api/cases/{case_id}");

    let (_, case) = get(&app, &case_uri, &tokens.advocate).await;
    let first = parse_ts(&case["data"]["next_hearing_date"]);
    assert!(first < Utc::now() + Duration::days(3));

    let (status, _) = put_json(
        &app,
        &format!("/api/hearings/{sooner}"),
        json!({ "status": "adjourned" }),
        &tokens.advocate,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, case) = get(&app, &case_uri, &tokens.advocate).await;
    let second = parse_ts(&case["data"]["next_hearing_date"]);
    assert!(second > Utc::now() + Duration::days(9));

    let (status, _) = delete(&app, &format!("/api/hearings/{later}"), &tokens.advocate).await;
    assert_eq!(status, StatusCode::OK);

    let (_, case) = get(&app, &case_uri, &tokens.advocate).await;
    assert!(case["data"]["next_hearing_date"].is_null());
}

#[tokio::test]
async fn past_hearings_do_not_count_as_next() {
    let (app, _pool, tokens, _guard) = test_app().await;
    let case_id = create_test_case(&app, &tokens.advocate, "CS/102/2026", None).await;
    create_test_hearing(&app, &tokens.advocate, &case_id, -3).await;

    let (_, case) = get(&app, &format!("/api/cases/{case_id}"), &tokens.advocate).await;
    assert!(case["data"]["next_hearing_date"].is_null());
}

#[tokio::test]
async fn upcoming_respects_the_window() {
    let (app, _pool, tokens, _guard) = test_app().await;
    let case_id = create_test_case(&app, &tokens.advocate, "CS/103/2026", None).await;
    create_test_hearing(&app, &tokens.advocate, &case_id, 2).await;
    create_test_hearing(&app, &tokens.advocate, &case_id, 20).await;
    create_test_hearing(&app, &tokens.advocate, &case_id, -1).await;

    let (status, resp) = get(&app, "/api/hearings/upcoming", &tokens.advocate).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["data"]["items"].as_array().unwrap().len(), 1);
    assert_eq!(resp["data"]["pagination"]["total"], 1);

    let (_, resp) = get(&app, "/api/hearings/upcoming?days=30", &tokens.advocate).await;
    let items = resp["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert!(parse_ts(&items[0]["hearing_date"]) < parse_ts(&items[1]["hearing_date"]));
}

#[tokio::test]
async fn upcoming_pages_past_the_limit() {
    let (app, _pool, tokens, _guard) = test_app().await;
    let case_id = create_test_case(&app, &tokens.advocate, "CS/119/2026", None).await;
    for day in 1..=3 {
        create_test_hearing(&app, &tokens.advocate, &case_id, day).await;
    }

    let (status, resp) = get(
        &app,
        "/api/hearings/upcoming?days=10&limit=2",
        &tokens.advocate,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp["data"]["items"].as_array().unwrap().len(), 2);
    assert_eq!(resp["data"]["pagination"]["total"], 3);
    assert_eq!(resp["data"]["pagination"]["has_next"], true);

    let (_, resp) = get(
        &app,
        "/api/hearings/upcoming?days=10&limit=2&page=2",
        &tokens.advocate,
    )
    .await;
    assert_eq!(resp["data"]["items"].as_array().unwrap().len(), 1);
    assert_eq!(resp["data"]["pagination"]["has_prev"], true);
}

#[tokio::test]
async fn hearing_on_foreign_case_is_not_found() {
    let (app, _pool, tokens, _guard) = test_app().await;
    let theirs = create_test_case(&app, &tokens.clerk, "CS/104/2026", Some(OTHER_ADVOCATE_ID)).await;

    let (status, _) = post_json(
        &app,
        "/api/hearings",
        json!({
            "case_id": theirs,
            "title": "Sneaky",
            "hearing_date": (Utc::now() + Duration::days(1)).to_rfc3339(),
        }),
        &tokens.advocate,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn hearing_list_rejects_inverted_range_and_bad_status() {
    let (app, _pool, tokens, _guard) = test_app().await;

    let (status, _) = get(
        &app,
        "/api/hearings?from=2026-05-01T00:00:00Z&to=2026-04-01T00:00:00Z",
        &tokens.advocate,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = get(&app, "/api/hearings?status=postponed", &tokens.advocate).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn clerks_cannot_delete_hearings() {
    let (app, _pool, tokens, _guard) = test_app().await;
    let case_id = create_test_case(&app, &tokens.advocate, "CS/105/2026", None).await;
    let hearing_id = create_test_hearing(&app, &tokens.advocate, &case_id, 5).await;

    let (status, _) = delete(&app, &format!("/api/hearings/{hearing_id}"), &tokens.clerk).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = delete(&app, &format!("/api/hearings/{hearing_id}"), &tokens.admin).await;
    assert_eq!(status, StatusCode::OK);
}
